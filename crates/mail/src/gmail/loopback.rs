//! Scripted HTTP server on 127.0.0.1 for exercising the ureq transports

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// A request as seen by the server: request line, lowercased header lines, body
#[derive(Debug)]
pub struct Recorded {
    pub request_line: String,
    pub headers: Vec<String>,
    pub body: String,
}

/// Serves one canned `(status, body)` reply per connection, in order.
///
/// Returns the base URL and a handle that yields the recorded requests once
/// every reply has been sent.
pub fn serve(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                headers.push(line.to_ascii_lowercase());
            }

            let content_length = headers
                .iter()
                .find_map(|h| h.strip_prefix("content-length:"))
                .map_or(0, |len| len.trim().parse().unwrap());
            let mut body_bytes = vec![0; content_length];
            reader.read_exact(&mut body_bytes).unwrap();

            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            recorded.push(Recorded {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(body_bytes).unwrap(),
            });
        }
        recorded
    });

    (format!("http://127.0.0.1:{}", port), handle)
}
