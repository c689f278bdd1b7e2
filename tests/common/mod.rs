#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use bloxpulse::orchestrator::RunOptions;

/// One canned HTTP reply: status line code, extra headers, body.
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: vec![],
            body: body.into(),
        }
    }

    pub fn throttled(retry_after: &str) -> Self {
        Self {
            status: 429,
            headers: vec![("Retry-After".to_string(), retry_after.to_string())],
            body: "rate limited".to_string(),
        }
    }
}

/// A received request: request line plus lowercased header lines.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub request_line: String,
    pub headers: Vec<String>,
}

/// Serve `responses` in order, one per connection, on a local port.
/// Returns the base URL and the log of requests received.
pub fn serve(responses: Vec<CannedResponse>) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        for response in responses {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                headers.push(line.trim_end().to_lowercase());
            }
            log.lock().unwrap().push(SeenRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
            });

            let mut stream = stream;
            let mut reply = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                response.status,
                response.body.len()
            );
            for (name, value) in &response.headers {
                reply.push_str(&format!("{name}: {value}\r\n"));
            }
            reply.push_str("\r\n");
            reply.push_str(&response.body);
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    (format!("http://{addr}"), seen)
}

pub fn upstream_item(review_id: i64, title: &str, rating: f64) -> serde_json::Value {
    serde_json::json!({
        "review_id": review_id,
        "review_title": title,
        "review_content": format!("What do you dislike about it?\n{title} answer\n"),
        "review_question_answers": [],
        "review_rating": rating,
        "reviewer": { "name": format!("Author {review_id}") },
        "publish_date": "2025-02-02T00:00:00Z",
        "review_link": ""
    })
}

pub fn upstream_body(categories: &[&str], items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "product_id": 1,
        "product_name": "Test Product",
        "categories": categories.iter().map(|c| serde_json::json!({ "name": c })).collect::<Vec<_>>(),
        "initial_reviews": items,
        "all_reviews": [],
    })
    .to_string()
}

pub fn run_options(output: &Path, product: Option<&str>, use_mock: bool) -> RunOptions {
    RunOptions {
        api_key: Some("test-key".to_string()),
        product: product.map(str::to_string),
        max_reviews: 100,
        output_file: output.to_path_buf(),
        use_mock,
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
