//! Wire-level conventions: header names, content types, cURL text and log rendering.
//!
//! # Module Organization
//!
//! ```text
//! protocol/
//! ├── headers - header constants, conflict policy, header line parsing
//! ├── curl    - cURL command rendering and parsing
//! └── debug   - human readable request/response log strings
//! ```

pub mod curl;
pub mod debug;
pub mod headers;

pub use curl::{parse_curl, render_curl};
pub use debug::{log_request, log_response};
pub use headers::{constants, format_header_line, parse_header_line, ConflictPolicy};
