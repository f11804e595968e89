//! api
//!
//! Client for the Argus HTTP API.
//!
//! # Architecture
//!
//! Two layers:
//!
//! - [`Transport`] sends one JSON request with the `ArgusID` auth header,
//!   retries transient failures with exponential backoff and jitter, and
//!   honours the caller's [`Context`](crate::core::context::Context).
//! - [`ArgusApi`] exposes one typed method per remote operation. [`HttpApi`]
//!   implements it over a transport; [`mock::MockApi`] implements it in memory.
//!
//! Every successful response is wrapped as `{"data": ...}`; see
//! [`parse_response`].
//!
//! # Modules
//!
//! - `transport`: HTTP send loop and [`TransportError`]
//! - `retry`: retry policy and backoff
//! - `envelope`: response envelope decoding
//! - `traits`: [`ArgusApi`] trait and wire records
//! - `client`: HTTP implementation
//! - [`mock`]: in-memory implementation for tests
//!
//! # Example
//!
//! ```ignore
//! use argus::api::{ArgusApi, HttpApi, Transport};
//! use argus::core::context::Context;
//!
//! let transport = Transport::new("https://api.argus.dev").with_token(token);
//! let api = HttpApi::new(transport);
//!
//! let user = api.get_user(&Context::background()).await?;
//! println!("Logged in as {}", user.email);
//! ```

mod client;
mod envelope;
pub mod mock;
mod retry;
mod traits;
mod transport;

pub use client::HttpApi;
pub use envelope::parse_response;
pub use retry::{RetryPolicy, BASE_DELAY, MAX_RETRIES, TIMEOUT};
pub use traits::*;
pub use transport::{Transport, TransportError, AUTH_SCHEME};
