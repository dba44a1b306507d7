//! StockDash Runner: request orchestration on top of `stockdash-core`.
//!
//! This crate provides:
//! - Dashboard configuration (TOML, credential via environment)
//! - The aggregation orchestrator with sequential or concurrent fetching
//! - Per-section result bundles
//! - Request supersession so stale results never overwrite newer ones
//! - An explicit memoization wrapper

pub mod bundle;
pub mod config;
pub mod memo;
pub mod orchestrator;
pub mod session;

pub use bundle::{RequestKey, ResultBundle, SectionResult, Statements};
pub use config::{ConfigError, DashboardConfig, FetchMode};
pub use memo::MemoizedOrchestrator;
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use session::{CancelToken, RequestGate, RequestTicket};
