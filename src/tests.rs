//! Crate-level behavior tests: endpoints, modifiers and the client working together.

use crate::client::{recover_fn, AnyDataProvider, ClientConfig, DataProviderExt, EndpointClient};
use crate::decoding::ResponseDecoder;
use crate::encoding::Authorization;
use crate::protocol::ConflictPolicy;
use crate::{AnyEndpoint, AnyEndpointModifier, Endpoint, EndpointError, ResponseMetadata, Route};
use bytes::Bytes;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct Person {
    name: String,
}
crate::structural_parameters!(Person);

#[derive(Debug, Clone, Serialize)]
struct Search {
    term: String,
    page: u32,
}
crate::structural_parameters!(Search);

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    error_code: u32,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}", self.error_code)
    }
}

impl std::error::Error for ApiError {}

struct CreatePerson(Person);

impl Endpoint for CreatePerson {
    type Parameters = Person;
    type Response = ();

    fn route(&self) -> Route {
        Route::post("curl")
    }

    fn parameters(&self) -> &Person {
        &self.0
    }
}

fn base() -> Url {
    Url::parse("https://www.rickb.com").unwrap()
}

fn rickb() -> CreatePerson {
    CreatePerson(Person {
        name: "rickb".to_string(),
    })
}

#[test]
fn test_default_encoder_follows_method() {
    let search = Search {
        term: "rust".to_string(),
        page: 2,
    };

    let get: AnyEndpoint<Search, ()> = AnyEndpoint::new(Route::get("search"), search.clone());
    let request = get.wire_request(&base()).unwrap();
    assert_eq!(request.url.as_str(), "https://www.rickb.com/search?page=2&term=rust");
    assert!(request.body.is_none());

    let post: AnyEndpoint<Search, ()> = AnyEndpoint::new(Route::post("search"), search);
    let request = post.wire_request(&base()).unwrap();
    assert_eq!(request.url.as_str(), "https://www.rickb.com/search");
    assert_eq!(
        request.body.as_deref(),
        Some(&br#"{"page":2,"term":"rust"}"#[..])
    );
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_merge_then_remove_clears_header() {
    let endpoint = rickb().modify_all(&[
        AnyEndpointModifier::merge([("a", "b")], ConflictPolicy::KeepExisting),
        AnyEndpointModifier::remove(["a"]),
    ]);
    let request = endpoint.wire_request(&base()).unwrap();
    assert!(request.header("a").is_none());
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_sequential_merges_keep_first_value() {
    let endpoint = rickb().modify_all(&[
        AnyEndpointModifier::merge([("X-Env", "first")], ConflictPolicy::KeepExisting),
        AnyEndpointModifier::merge([("X-Env", "second")], ConflictPolicy::KeepExisting),
    ]);
    let request = endpoint.wire_request(&base()).unwrap();
    assert_eq!(request.header("X-Env"), Some("first"));

    let endpoint = rickb().modify_all(&[
        AnyEndpointModifier::merge([("X-Env", "first")], ConflictPolicy::KeepExisting),
        AnyEndpointModifier::merge([("X-Env", "second")], ConflictPolicy::ReplaceExisting),
    ]);
    let request = endpoint.wire_request(&base()).unwrap();
    assert_eq!(request.header("X-Env"), Some("second"));
}

#[test]
fn test_validation_gated_on_http_error() {
    let endpoint = rickb().modify(AnyEndpointModifier::validate::<ApiError>(true));
    let decoder = endpoint.response_decoder();

    let error = decoder
        .decode(
            &ResponseMetadata::status(400),
            &Bytes::from_static(br#"{"errorCode":1}"#),
        )
        .unwrap_err();
    assert_eq!(
        error.downcast_application::<ApiError>(),
        Some(&ApiError { error_code: 1 })
    );

    assert!(decoder
        .decode(&ResponseMetadata::status(200), &Bytes::new())
        .is_ok());
}

#[test]
fn test_curl_rendering() {
    let request = rickb().wire_request(&base()).unwrap();
    assert_eq!(
        request.curl(),
        r#"curl -f -X POST --url 'https://www.rickb.com/curl' -H 'Content-Type: application/json' --data '{"name":"rickb"}'"#
    );
}

#[test]
fn test_modified_endpoint_is_reusable() {
    let endpoint = rickb().modify(AnyEndpointModifier::authorize(Authorization::bearer("t")));
    let first = endpoint.wire_request(&base()).unwrap();
    let second = endpoint.wire_request(&base()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.header("Authorization"), Some("Bearer t"));
    assert!(rickb().wire_request(&base()).unwrap().header("Authorization").is_none());
}

fn unauthorized(counter: Arc<AtomicUsize>) -> AnyDataProvider {
    AnyDataProvider::new(move |_request| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok((Bytes::new(), ResponseMetadata::status(401))) }.boxed()
    })
}

#[tokio::test]
async fn test_retry_once_with_recovery() {
    let counter = Arc::new(AtomicUsize::new(0));
    let client = EndpointClient::new(base())
        .with_provider(unauthorized(counter.clone()))
        .with_recover(recover_fn(|_| async { Ok(()) }.boxed()));

    let error = client.request(&rickb()).await.unwrap_err();
    assert_eq!(error.status_code(), Some(401));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_retry_without_recovery() {
    let counter = Arc::new(AtomicUsize::new(0));
    let client = EndpointClient::new(base()).with_provider(unauthorized(counter.clone()));

    let error = client.request(&rickb()).await.unwrap_err();
    assert!(matches!(error, EndpointError::Http(_)));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recovery_then_success() {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = counter.clone();
    let provider = AnyDataProvider::new(move |_request| {
        let status = if calls.fetch_add(1, Ordering::SeqCst) == 0 { 401 } else { 200 };
        async move { Ok((Bytes::from_static(b"\"welcome\""), ResponseMetadata::status(status))) }
            .boxed()
    });
    let client = EndpointClient::new(base())
        .with_provider(provider)
        .with_recover(recover_fn(|_| async { Ok(()) }.boxed()));

    let endpoint: AnyEndpoint<(), String> = AnyEndpoint::new(Route::get("me"), ());
    let body = client.request(&endpoint).await.unwrap();
    assert_eq!(body, "\"welcome\"");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_curl_fixture_drives_provider() {
    let fixture = crate::WireRequest::from_curl(
        r#"curl -X POST 'https://www.rickb.com/curl' -H 'Content-Type: application/json' --data '{"name":"rickb"}'"#,
    )
    .unwrap();
    let provider = AnyDataProvider::new(move |request| {
        let matches = request == fixture;
        async move {
            let status = if matches { 204 } else { 400 };
            Ok((Bytes::new(), ResponseMetadata::status(status)))
        }
        .boxed()
    });

    provider.request(&base(), &rickb()).await.unwrap();
}

#[tokio::test]
async fn test_transport_failure_is_recovered_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let recoveries = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let provider = AnyDataProvider::new(move |_request| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Err(EndpointError::transport("connection reset")) }.boxed()
    });
    let hook_counter = recoveries.clone();
    let client = EndpointClient::new(base())
        .with_provider(provider)
        .with_recover(recover_fn(move |_| {
            hook_counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }.boxed()
        }));

    let error = client.request(&rickb()).await.unwrap_err();
    assert!(matches!(error, EndpointError::Transport(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(recoveries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_decode_failure_is_recovered_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let provider = AnyDataProvider::new(move |_request| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok((Bytes::from_static(b"x"), ResponseMetadata::status(200))) }.boxed()
    });
    let client = EndpointClient::new(base())
        .with_provider(provider)
        .with_recover(recover_fn(|_| async { Ok(()) }.boxed()));

    let endpoint: AnyEndpoint<(), Vec<u32>> = AnyEndpoint::new(Route::get("numbers"), ());
    let error = client.request(&endpoint).await.unwrap_err();
    assert!(matches!(error, EndpointError::Decode(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_default_string_response_keeps_numeric_text() {
    let provider = AnyDataProvider::response("123456789012345678901234567890", 200);
    let endpoint: AnyEndpoint<(), String> = AnyEndpoint::new(Route::get("big"), ());

    let text = provider.request(&base(), &endpoint).await.unwrap();
    assert_eq!(text, "123456789012345678901234567890");
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs(buffer: &LogBuffer) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

#[test]
fn test_curl_logs_command() {
    let logs = LogBuffer::default();
    let _guard = capture_logs(&logs);

    let endpoint = rickb().modify(AnyEndpointModifier::curl());
    endpoint.wire_request(&base()).unwrap();

    let output = logs.contents();
    assert!(output.contains("INFO"));
    assert!(output.contains(
        r#"curl -f -X POST --url 'https://www.rickb.com/curl' -H 'Content-Type: application/json' --data '{"name":"rickb"}'"#
    ));
}

#[test]
fn test_print_logs_response() {
    let logs = LogBuffer::default();
    let _guard = capture_logs(&logs);

    let endpoint: AnyEndpoint<(), serde_json::Value> =
        AnyEndpoint::new(Route::get("me"), ()).modify(AnyEndpointModifier::print());
    let value = endpoint
        .response_decoder()
        .decode(&ResponseMetadata::status(200), &Bytes::from_static(br#"{"a":1}"#))
        .unwrap();
    assert_eq!(value, serde_json::json!({ "a": 1 }));

    let output = logs.contents();
    assert!(output.contains("HTTP 200 OK\n\n{\n  \"a\": 1\n}"));
}

#[tokio::test]
async fn test_terminal_failure_logs_request() {
    let logs = LogBuffer::default();
    let _guard = capture_logs(&logs);

    let config = ClientConfig {
        log_errors: true,
        ..Default::default()
    };
    let client = EndpointClient::with_config(base(), config)
        .with_provider(AnyDataProvider::response("nope", 500));

    client.request(&rickb()).await.unwrap_err();

    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("Request POST curl failed"));
    assert!(output.contains("POST /curl\nContent-Type: application/json\n\n{\n  \"name\": \"rickb\"\n}"));
}
