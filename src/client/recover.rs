//! Recovery hooks.
//!
//! A [`Recover`] hook gets one chance to remediate a failed call, typically by refreshing
//! credentials. When it succeeds the client rebuilds and resends the request exactly once.

use crate::client::utils::is_unauthorized;
use crate::error::{EndpointError, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Remediates a failed call before a single retry.
#[async_trait]
pub trait Recover: Send + Sync {
    /// Whether this hook handles `error` at all. Declined errors are surfaced unchanged.
    fn should_recover(&self, error: &EndpointError) -> bool {
        error.is_recoverable()
    }

    /// Remediate `error`. `Ok` triggers the retry, `Err` is logged and the original error surfaced.
    async fn recover(&self, error: &EndpointError) -> Result<()>;
}

type RecoverFn = dyn Fn(&EndpointError) -> BoxFuture<'static, Result<()>> + Send + Sync;

/// A [`Recover`] hook backed by a closure.
pub struct RecoverFnHook {
    recover: Box<RecoverFn>,
}

#[async_trait]
impl Recover for RecoverFnHook {
    async fn recover(&self, error: &EndpointError) -> Result<()> {
        (self.recover)(error).await
    }
}

/// Build a recovery hook from a closure.
///
/// # Examples
///
/// ```
/// use endpoint_kit::client::recover_fn;
/// use futures::FutureExt;
///
/// let hook = recover_fn(|_error| async { Ok(()) }.boxed());
/// ```
pub fn recover_fn<F>(recover: F) -> RecoverFnHook
where
    F: Fn(&EndpointError) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
{
    RecoverFnHook {
        recover: Box::new(recover),
    }
}

/// Limits a hook to HTTP 401 responses.
pub struct RetryUnauthorized<R> {
    inner: R,
}

#[async_trait]
impl<R: Recover> Recover for RetryUnauthorized<R> {
    fn should_recover(&self, error: &EndpointError) -> bool {
        is_unauthorized(error) && self.inner.should_recover(error)
    }

    async fn recover(&self, error: &EndpointError) -> Result<()> {
        self.inner.recover(error).await
    }
}

/// Only attempt `reauthorize` when the server answered 401.
pub fn retry_unauthorized<R: Recover>(reauthorize: R) -> RetryUnauthorized<R> {
    RetryUnauthorized { inner: reauthorize }
}
