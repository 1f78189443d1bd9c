//! Authorization header schemes.
//!
//! | Scheme | Header value |
//! |--------|--------------|
//! | Basic  | `Basic base64(username:password)` |
//! | Bearer | `Bearer <token>` |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::encoding::Authorization;
//!
//! let auth = Authorization::basic("rickb", "test");
//! assert_eq!(auth.header_value(), "Basic cmlja2I6dGVzdA==");
//!
//! let auth = Authorization::bearer("abc").with_key("X-Auth");
//! assert_eq!(auth.key(), "X-Auth");
//! assert_eq!(auth.header_value(), "Bearer abc");
//! ```

use crate::encoding::RequestTransform;
use crate::error::Result;
use crate::protocol::constants::headers::AUTHORIZATION;
use crate::types::WireRequest;
use base64::{engine::general_purpose, Engine as _};

/// Credential scheme carried by an [`Authorization`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationScheme {
    /// Pre-encoded basic token
    Basic(String),
    /// Bearer token
    Bearer(String),
}

/// An authorization header to set on outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    scheme: AuthorizationScheme,
    key: String,
}

impl Authorization {
    /// Basic authorization from a username and password.
    pub fn basic(username: &str, password: &str) -> Self {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
        Self::basic_token(token)
    }

    /// Basic authorization from an already encoded token.
    pub fn basic_token(token: impl Into<String>) -> Self {
        Self {
            scheme: AuthorizationScheme::Basic(token.into()),
            key: AUTHORIZATION.to_string(),
        }
    }

    /// Bearer authorization.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: AuthorizationScheme::Bearer(token.into()),
            key: AUTHORIZATION.to_string(),
        }
    }

    /// Send the credentials under a different header key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The header key, `Authorization` unless overridden.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The scheme and its token.
    pub fn scheme(&self) -> &AuthorizationScheme {
        &self.scheme
    }

    /// The full header value.
    pub fn header_value(&self) -> String {
        match &self.scheme {
            AuthorizationScheme::Basic(token) => format!("Basic {}", token),
            AuthorizationScheme::Bearer(token) => format!("Bearer {}", token),
        }
    }
}

impl RequestTransform for Authorization {
    fn transform(&self, request: WireRequest) -> Result<WireRequest> {
        Ok(request.set_header(self.key.clone(), self.header_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_basic_encoding() {
        let auth = Authorization::basic("rickb", "test");
        assert_eq!(
            auth.scheme(),
            &AuthorizationScheme::Basic("cmlja2I6dGVzdA==".to_string())
        );
        assert_eq!(auth.key(), "Authorization");
    }

    #[test]
    fn test_transform_replaces_header() {
        let request = WireRequest::from_url(Url::parse("https://example.com").unwrap())
            .set_header("Authorization", "Bearer stale");
        let request = Authorization::bearer("fresh").transform(request).unwrap();
        assert_eq!(request.header("Authorization"), Some("Bearer fresh"));
    }
}
