//! One-shot HTTP responder for exercising client status handling offline.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

pub(crate) struct OneShot {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl OneShot {
    /// Answer the next request with `status` (e.g. `"429 Too Many Requests"`),
    /// the extra `headers`, and `body`, then close the connection.
    pub fn respond(status: &str, headers: &[(&str, &str)], body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
            body.len()
        );
        for (name, value) in headers {
            response.push_str(&format!("{name}: {value}\r\n"));
        }
        response.push_str("\r\n");
        response.push_str(body);

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request_line
        });

        Self { base_url, handle }
    }

    /// The request line the server received. Only call this when the client
    /// is expected to have connected.
    pub fn request_line(self) -> String {
        self.handle.join().unwrap()
    }
}
