//! Just enough HTTP/1.1 to serve a handful of static files
//!
//! One request per connection: the response always carries
//! `Connection: close`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Upper bound on request line + headers
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target without the query string
    pub path: String,
}

/// Read the request head up to and including the blank line
pub async fn read_request_head<R>(reader: R) -> Result<String, String>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = reader.take(MAX_HEAD_BYTES as u64);
    let mut head = String::new();

    loop {
        let start = head.len();
        let read = limited
            .read_line(&mut head)
            .await
            .map_err(|e| format!("Failed to read request: {}", e))?;

        if read == 0 {
            return Err(if head.is_empty() {
                "Connection closed before request".to_string()
            } else {
                "Request head truncated or too large".to_string()
            });
        }

        let line = &head[start..];
        if line == "\r\n" || line == "\n" {
            return Ok(head);
        }
    }
}

/// Parse the request line. Header lines are not needed for routing.
pub fn parse_request(head: &str) -> Result<Request, String> {
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();

    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) => (m, t, v),
        _ => return Err(format!("Malformed request line: {:?}", request_line)),
    };

    if !version.starts_with("HTTP/1.") {
        return Err(format!("Unsupported protocol version: {}", version));
    }
    if !target.starts_with('/') {
        return Err(format!("Unsupported request target: {}", target));
    }

    let method = match method {
        "GET" => Method::Get,
        "HEAD" => Method::Head,
        other => Method::Other(other.to_string()),
    };
    let path = target.split('?').next().unwrap_or(target).to_string();

    Ok(Request { method, path })
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.as_bytes().to_vec())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize status line, headers and (unless answering HEAD) the body
    pub fn to_bytes(&self, include_body: bool) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        if include_body {
            bytes.extend_from_slice(&self.body);
        }
        bytes
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        _ => "",
    }
}
