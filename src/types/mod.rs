//! Core value types shared by encoders, decoders and the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpMethod`] | Closed set of HTTP methods |
//! | [`Route`] | Method and path of an endpoint, independent of the base URL |
//! | [`WireRequest`] | The transport-ready request built from a route and encoded parameters |
//! | [`CachePolicy`] | Cache behavior requested from the transport |
//! | [`ResponseMetadata`] | Status, URL and headers of a received response |

mod request;
mod response;
mod route;

pub use request::{CachePolicy, WireRequest, DEFAULT_TIMEOUT};
pub use response::ResponseMetadata;
pub use route::{HttpMethod, Route};
