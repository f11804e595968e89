//! api::transport
//!
//! Authenticated HTTP transport with bounded retry.
//!
//! # Design
//!
//! Every remote call goes through [`Transport::send`]. It:
//! - JSON-encodes the body (if any) and sets `Content-Type`
//! - adds `Authorization: ArgusID <token>` when a token is configured
//! - retries transient failures with exponential backoff and jitter
//!
//! # Failure classes
//!
//! - **Fatal auth** (401/403): returned immediately, never retried
//! - **Transient** (timeouts, 429, 500, 502, 503, 504): retried up to
//!   [`RetryPolicy::max_retries`] attempts, then reported as exhausted
//! - **Terminal** (anything else): returned after one attempt
//! - **Cancellation**: the [`Context`] error always wins, both during the
//!   HTTP exchange and during the backoff sleep
//!
//! Retried calls are not deduplicated. A non-idempotent request that times
//! out may have been applied by the server before it is sent again.

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::retry::{RetryPolicy, CONTENT_TYPE as JSON_CONTENT_TYPE};
use crate::core::context::{Context, ContextError};
use crate::ui::output::StatusLine;

/// Authorization scheme sent with every authenticated request.
pub const AUTH_SCHEME: &str = "ArgusID";

/// Error text fragments that mark an HTTP failure as retryable.
const TRANSIENT_MARKERS: [&str; 5] = ["500", "502", "503", "504", "429"];

/// Errors from the transport layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// 401/403 from the server. Never retried.
    #[error("authentication failed ({status}): {message}")]
    Auth {
        /// HTTP status code
        status: u16,
        /// Server message, or the status line
        message: String,
    },

    /// Any other non-success response.
    #[error("request failed with status {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server message, or the status line
        message: String,
    },

    /// The per-attempt timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response envelope had no `data` field.
    #[error("response is missing the data field")]
    MissingData,

    /// The context was cancelled or its deadline passed.
    #[error(transparent)]
    Canceled(#[from] ContextError),

    /// Every attempt failed with a transient error.
    #[error("failed after {attempts} retries")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// The last transient failure
        #[source]
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// 401/403 responses.
    pub fn is_auth(&self) -> bool {
        matches!(self, TransportError::Auth { .. })
    }

    /// Cancellation or deadline of the caller's context.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TransportError::Canceled(_))
    }

    /// The missing-data sentinel.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, TransportError::MissingData)
    }

    /// Whether a retry might succeed.
    ///
    /// Timeouts are transient. HTTP failures are transient when their
    /// status or message mentions 429 or one of the retryable 5xx codes.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout(_) => true,
            TransportError::Http { status, message } => {
                let status = status.to_string();
                TRANSIENT_MARKERS
                    .iter()
                    .any(|marker| status == *marker || message.contains(marker))
            }
            _ => false,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Error body shape; the message is optional.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP transport bound to one API base URL and (optionally) one token.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    token: Option<String>,
    policy: RetryPolicy,
    status: Option<StatusLine>,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Transport {
    /// Create a transport for `base_url` with the default retry policy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            policy: RetryPolicy::default(),
            status: None,
        }
    }

    /// Authenticate requests with `token`. Empty tokens are ignored.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Override the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report retries on an in-place status line.
    pub fn with_status_line(mut self, status: StatusLine) -> Self {
        self.status = Some(status);
        self
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry an Authorization header.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `GET path`.
    pub async fn get(&self, ctx: &Context, path: &str) -> Result<Vec<u8>, TransportError> {
        self.send::<()>(ctx, Method::GET, path, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, TransportError> {
        self.send(ctx, Method::POST, path, Some(body)).await
    }

    /// Send a request, retrying transient failures.
    ///
    /// # Returns
    ///
    /// The raw response body of the first successful attempt.
    ///
    /// # Errors
    ///
    /// - `Auth` on 401/403, without retrying
    /// - `Canceled` as soon as `ctx` is done
    /// - `RetriesExhausted` when every attempt failed transiently
    /// - any terminal error from the first attempt that produced it
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| TransportError::InvalidRequest(format!("cannot encode body: {}", e)))?;
        let auth = self
            .token
            .as_ref()
            .map(|token| HeaderValue::from_str(&format!("{} {}", AUTH_SCHEME, token)))
            .transpose()
            .map_err(|_| TransportError::InvalidRequest("token contains invalid characters".into()))?;

        let max = self.policy.max_retries.max(1);
        let mut last_err = None;

        for attempt in 0..max {
            let result = ctx
                .run(self.execute(&method, &url, auth.as_ref(), payload.as_deref()))
                .await;
            let err = match result {
                Ok(Ok(bytes)) => {
                    self.clear_status();
                    return Ok(bytes);
                }
                Ok(Err(err)) => err,
                Err(ctx_err) => {
                    self.clear_status();
                    return Err(ctx_err.into());
                }
            };

            if err.is_auth() || !err.is_transient() {
                self.clear_status();
                return Err(err);
            }

            if attempt + 1 < max {
                let delay = self.policy.backoff(attempt);
                tracing::debug!(
                    %method,
                    path,
                    attempt = attempt + 1,
                    max_attempts = max,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, retrying"
                );
                if let Some(status) = &self.status {
                    status.update(&format!(
                        "retrying… (attempt {}/{}, {})",
                        attempt + 2,
                        max,
                        err
                    ));
                }
                if let Err(ctx_err) = ctx.sleep(delay).await {
                    self.clear_status();
                    return Err(ctx_err.into());
                }
            }
            last_err = Some(err);
        }

        self.clear_status();
        tracing::warn!(%method, path, attempts = max, "request failed after retries");
        Err(TransportError::RetriesExhausted {
            attempts: max,
            last: Box::new(last_err.unwrap_or(TransportError::InvalidRequest(
                "no attempt was made".into(),
            ))),
        })
    }

    /// One HTTP exchange, classified.
    async fn execute(
        &self,
        method: &Method,
        url: &str,
        auth: Option<&HeaderValue>,
        payload: Option<&[u8]>,
    ) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .timeout(self.policy.timeout);
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth.clone());
        }
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(payload.to_vec());
        }

        let response = request.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status();

        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(TransportError::from_reqwest)?;
            return Ok(bytes.to_vec());
        }

        // Body read failures fall back to the status line
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_line(status));

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Auth {
                status: status.as_u16(),
                message,
            },
            _ => TransportError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn clear_status(&self) {
        if let Some(status) = &self.status {
            status.clear();
        }
    }
}

/// `"503 Service Unavailable"`-style status line.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
