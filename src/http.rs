//! HTTP request wrapper with a deadline race.
//!
//! This module defines the `HttpTransport` trait to abstract the wire-level
//! call, enabling testability with mock implementations, and the [`Client`]
//! wrapper that merges headers, races the call against a timeout, and
//! normalizes the response into [`ResponseData`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, SatchelError};

/// Default timeout applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Raw response returned by a transport, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// HTTP status text (e.g. "Not Found")
    pub status_text: String,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as a string
    pub body: String,
}

impl RawResponse {
    /// Convenience constructor for building responses in tests.
    pub fn new(status: u16, status_text: &str, body: &str) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }
}

/// Normalized response handed back to callers on success.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseData {
    /// Response body decoded as JSON
    pub data: serde_json::Value,
    /// HTTP status code
    pub status: u16,
    /// HTTP status text
    pub status_text: String,
    /// Response headers
    pub headers: HashMap<String, String>,
}

/// Per-request configuration. All fields are optional and fall back to
/// defaults: GET method, `content-type: application/json`, and
/// [`DEFAULT_TIMEOUT_MS`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (e.g. "POST"). Defaults to GET.
    pub method: Option<String>,
    /// Headers merged over the defaults; the caller wins on key collision.
    pub headers: HashMap<String, String>,
    /// Request body, already serialized.
    pub body: Option<String>,
    /// Deadline for the whole call, in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Trait for executing the wire-level HTTP call.
///
/// This abstraction allows for different implementations (production vs.
/// testing) and makes the wrapper's race/merge/normalize logic testable
/// without making real HTTP calls.
///
/// Implementations perform the single network exchange and nothing else:
/// the deadline, header defaults, status checking, and body decoding all
/// live in [`Client`].
#[async_trait]
pub trait HttpTransport: Send + Sync + Clone {
    /// Execute one HTTP exchange.
    ///
    /// # Errors
    /// Returns `SatchelError::Transport` if the call fails before a response
    /// arrives (network issues, invalid URL or method).
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: Option<&str>,
    ) -> Result<RawResponse>;
}

// ============================================================================
// Client wrapper
// ============================================================================

/// Request wrapper implementing the deadline race and response normalization.
///
/// Each call owns its own deadline timer; concurrent calls through the same
/// client are fully independent. When the deadline wins the race, the
/// transport future is dropped and its eventual outcome is discarded -- the
/// wire-level call is not retracted, only the wrapper settles early.
///
/// # Example
/// ```ignore
/// let client = Client::new();
/// let response = client.get("https://api.example.com/items", Default::default()).await?;
/// println!("{}: {}", response.status, response.data);
/// ```
#[derive(Clone)]
pub struct Client<T: HttpTransport = ReqwestTransport> {
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Create a client backed by the production reqwest transport.
    pub fn new() -> Self {
        Self {
            transport: ReqwestTransport::new(),
        }
    }
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HttpTransport> Client<T> {
    /// Create a client over an arbitrary transport (used with
    /// [`MockTransport`] in tests).
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Issue a request and resolve with a normalized response.
    ///
    /// Exactly one of {transport result, deadline} determines the outcome;
    /// whichever settles first wins and the other is discarded. The timer is
    /// dropped as soon as either side settles, so no scheduled callback
    /// outlives the call.
    ///
    /// # Errors
    /// - `SatchelError::Timeout` if the deadline elapses first
    /// - `SatchelError::HttpStatus` for a non-success (outside 200-299) status
    /// - `SatchelError::Transport` if the call fails before completing, or if
    ///   a success body is not valid JSON
    #[tracing::instrument(skip(self, options), fields(url = %url))]
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<ResponseData> {
        let timeout_ms = options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let method = options.method.as_deref().unwrap_or("GET");

        // Merge caller headers over the defaults. Keys are lowercased so
        // "Content-Type" from the caller replaces the default entry.
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        for (name, value) in &options.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        tracing::debug!(method, timeout_ms, "executing request");

        let call = self
            .transport
            .send(url, method, &headers, options.body.as_deref());

        let raw = match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(timeout_ms, "request timed out");
                return Err(SatchelError::Timeout { timeout_ms });
            }
        };

        if !(200..=299).contains(&raw.status) {
            tracing::debug!(status = raw.status, "non-success status");
            return Err(SatchelError::HttpStatus {
                status: raw.status,
                status_text: raw.status_text,
            });
        }

        let data = serde_json::from_str(&raw.body)
            .map_err(|e| SatchelError::Transport(format!("invalid JSON response body: {}", e)))?;

        tracing::info!(status = raw.status, "request completed");

        Ok(ResponseData {
            data,
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
        })
    }

    /// GET preset: fixes the method, everything else passes through.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<ResponseData> {
        self.request(
            url,
            RequestOptions {
                method: Some("GET".to_string()),
                ..options
            },
        )
        .await
    }

    /// POST preset: serializes `body` to JSON and fixes the method.
    pub async fn post<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ResponseData> {
        let payload = serde_json::to_string(body)?;
        self.request(
            url,
            RequestOptions {
                method: Some("POST".to_string()),
                body: Some(payload),
                ..options
            },
        )
        .await
    }
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production transport using reqwest.
///
/// This implementation makes real HTTP requests to external endpoints. It
/// applies no timeout of its own; the deadline belongs to [`Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new reqwest-based transport.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: Option<&str>,
    ) -> Result<RawResponse> {
        let parsed = method.parse::<reqwest::Method>().map_err(|e| {
            tracing::error!(method, error = %e, "invalid HTTP method");
            SatchelError::Transport(format!("invalid HTTP method '{}': {}", method, e))
        })?;

        let mut req = self.client.request(parsed, url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        if let Some(body) = body {
            req = req.body(body.to_string());
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!(url, error = %e, "transport failure");
            SatchelError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| SatchelError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status,
            status_text,
            headers: response_headers,
            body,
        })
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

/// Mock transport for testing.
///
/// Allows configuring predetermined responses for specific requests without
/// making actual HTTP calls.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new();
/// mock.add_response(
///     "GET https://api.example.com/items",
///     Ok(RawResponse::new(200, "OK", r#"{"items":[]}"#)),
/// );
/// ```
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Vec<MockResponse>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
}

/// A mock response that can optionally wait for a trigger before completing.
enum MockResponse {
    /// Immediate response
    Immediate(Result<RawResponse>),
    /// Response that waits for a trigger signal before completing
    Triggered {
        response: Result<RawResponse>,
        trigger: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    },
}

/// Record of a call made to the mock transport.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a predetermined response for a specific method and URL.
    ///
    /// The key is formatted as "{method} {url}". Multiple responses can be
    /// added for the same key - they will be returned in FIFO order.
    pub fn add_response(&self, key: &str, response: Result<RawResponse>) {
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(MockResponse::Immediate(response));
    }

    /// Add a response that will wait for a manual trigger before completing.
    ///
    /// Returns a sender that when triggered (by sending `()` or dropping)
    /// will cause the call to complete with the given response. Holding the
    /// sender without firing it simulates an endpoint that never responds.
    pub fn add_response_with_trigger(
        &self,
        key: &str,
        response: Result<RawResponse>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(MockResponse::Triggered {
                response,
                trigger: Arc::new(Mutex::new(Some(rx))),
            });
        tx
    }

    /// Get all calls that have been made to this mock transport.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Clear all recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Get the number of calls currently in-flight (executing).
    ///
    /// Useful for observing that a call whose deadline won the race was
    /// dropped - the in-flight count decreases even though the response was
    /// never delivered.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: Option<&str>,
    ) -> Result<RawResponse> {
        // Increment in-flight counter
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        // Guard to ensure we decrement even if cancelled/panicked
        let in_flight = self.in_flight.clone();
        let _guard = InFlightGuard { in_flight };

        // Record this call
        self.calls.lock().push(MockCall {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(|b| b.to_string()),
        });

        // Look up the response
        let key = format!("{} {}", method, url);
        let mock_response = {
            let mut responses = self.responses.lock();
            if let Some(response_queue) = responses.get_mut(&key) {
                if !response_queue.is_empty() {
                    Some(response_queue.remove(0))
                } else {
                    None
                }
            } else {
                None
            }
        };

        match mock_response {
            Some(MockResponse::Immediate(response)) => response,
            Some(MockResponse::Triggered { response, trigger }) => {
                // Wait for the trigger signal before returning the response
                let rx = {
                    let mut trigger_guard = trigger.lock();
                    trigger_guard.take()
                };

                if let Some(rx) = rx {
                    // Wait for trigger (ignore the result - we proceed either way)
                    let _ = rx.await;
                }

                response
            }
            None => Err(SatchelError::Transport(format!(
                "no mock response configured for {} {}",
                method, url
            ))),
        }
    }
}

/// Guard that decrements the in-flight counter when dropped.
/// This ensures the counter is decremented even if the call is cancelled.
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
