//! cURL command rendering and parsing.
//!
//! Rendering is a bit-exact contract used for logging:
//!
//! ```text
//! curl -f -X <METHOD> --url '<url>' -H '<k>: <v>' ... [--data '<body>' | --data-binary $'\xNN..']
//! ```
//!
//! Headers are rendered in key order. Single quotes inside quoted values are written as `'\''`.
//! Bodies that are valid UTF-8 use `--data`, anything else is hex-escaped into an ANSI-C
//! quoted `--data-binary` argument.
//!
//! Parsing is the inverse, intended for test fixtures. It tokenizes with shell quoting rules
//! (single, double and `$'..'` quotes), recognizes `-X`, `-H`, `--data`, `--data-raw`,
//! `--data-binary`, `--url`, and takes the first bare `http(s)://` token as the URL.
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::{HttpMethod, WireRequest};
//!
//! let request = WireRequest::from_curl(
//!     "curl -X POST 'https://example.com/a' -H 'Accept: text/plain' --data 'hi'",
//! )
//! .unwrap();
//! assert_eq!(request.method, HttpMethod::Post);
//! assert_eq!(request.header("Accept"), Some("text/plain"));
//! assert_eq!(
//!     request.curl(),
//!     "curl -f -X POST --url 'https://example.com/a' -H 'Accept: text/plain' --data 'hi'"
//! );
//! ```

use crate::protocol::headers::{format_header_line, parse_header_line};
use crate::types::{HttpMethod, WireRequest};
use bytes::Bytes;
use url::Url;

/// Render `request` as a cURL command line.
pub fn render_curl(request: &WireRequest) -> String {
    let mut parts = vec![
        "curl -f".to_string(),
        format!("-X {}", request.method),
        format!("--url '{}'", escape_single_quoted(request.url.as_str())),
    ];

    for (key, value) in &request.headers {
        parts.push(format!(
            "-H '{}'",
            escape_single_quoted(&format_header_line(key, value))
        ));
    }

    if let Some(body) = request.body.as_ref().filter(|body| !body.is_empty()) {
        match std::str::from_utf8(body) {
            Ok(text) => parts.push(format!("--data '{}'", escape_single_quoted(text))),
            Err(_) => {
                let hex: String = body.iter().map(|byte| format!("\\x{:02X}", byte)).collect();
                parts.push(format!("--data-binary $'{}'", hex));
            }
        }
    }

    parts.join(" ")
}

/// Parse a cURL command line into a request.
///
/// Returns `None` if no URL is present or the method is not supported.
pub fn parse_curl(command: &str) -> Option<WireRequest> {
    let tokens = tokenize(command);
    let mut url: Option<String> = None;
    let mut method: Option<HttpMethod> = None;
    let mut request_headers = Vec::new();
    let mut body: Option<Vec<u8>> = None;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        let text = String::from_utf8_lossy(&token).into_owned();
        match text.as_str() {
            "-X" | "--request" => {
                let value = iter.next()?;
                method = Some(String::from_utf8_lossy(&value).parse().ok()?);
            }
            "-H" | "--header" => {
                let value = iter.next()?;
                if let Ok(header) = parse_header_line(&String::from_utf8_lossy(&value)) {
                    request_headers.push(header);
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                body = Some(iter.next()?);
            }
            "--url" => {
                let value = iter.next()?;
                url = Some(String::from_utf8_lossy(&value).into_owned());
            }
            _ if url.is_none() && (text.starts_with("http://") || text.starts_with("https://")) => {
                url = Some(text);
            }
            _ => {}
        }
    }

    let url = Url::parse(&url?).ok()?;
    let default_method = if body.is_some() {
        HttpMethod::Post
    } else {
        HttpMethod::Get
    };

    let mut request = WireRequest::from_url(url).with_method(method.unwrap_or(default_method));
    for (key, value) in request_headers {
        request.headers.insert(key, value);
    }
    request.body = body.map(Bytes::from);
    Some(request)
}

impl WireRequest {
    /// Render this request as a cURL command line.
    pub fn curl(&self) -> String {
        render_curl(self)
    }

    /// Parse a cURL command line. See [`parse_curl`].
    pub fn from_curl(command: &str) -> Option<Self> {
        parse_curl(command)
    }
}

fn escape_single_quoted(text: &str) -> String {
    text.replace('\'', "'\\''")
}

/// Split a command line into words using POSIX shell quoting plus `$'..'` strings.
fn tokenize(command: &str) -> Vec<Vec<u8>> {
    let mut tokens = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut in_token = false;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    push_char(&mut current, c);
                }
            }
            '"' => {
                in_token = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                chars.next();
                                push_char(&mut current, next);
                            }
                            _ => push_char(&mut current, '\\'),
                        },
                        c => push_char(&mut current, c),
                    }
                }
            }
            '$' if chars.peek() == Some(&'\'') => {
                chars.next();
                in_token = true;
                read_ansi_c(&mut chars, &mut current);
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some('\n') | None => {}
                    Some(next) => push_char(&mut current, next),
                }
            }
            c => {
                in_token = true;
                push_char(&mut current, c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

fn read_ansi_c(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut Vec<u8>) {
    while let Some(c) = chars.next() {
        match c {
            '\'' => return,
            '\\' => match chars.next() {
                Some('x') => {
                    let mut hex = String::new();
                    while hex.len() < 2 {
                        match chars.peek() {
                            Some(h) if h.is_ascii_hexdigit() => {
                                hex.push(*h);
                                chars.next();
                            }
                            _ => break,
                        }
                    }
                    match u8::from_str_radix(&hex, 16) {
                        Ok(byte) => out.push(byte),
                        Err(_) => out.extend_from_slice(b"\\x"),
                    }
                }
                Some('n') => out.push(b'\n'),
                Some('t') => out.push(b'\t'),
                Some('r') => out.push(b'\r'),
                Some(other) => push_char(out, other),
                None => out.push(b'\\'),
            },
            c => push_char(out, c),
        }
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}
