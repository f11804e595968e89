//! api::envelope
//!
//! Unwrapping of the `{"data": ...}` response envelope.
//!
//! Successful responses carry their payload under `data`. A body without a
//! `data` key yields [`TransportError::MissingData`], which lookup callers
//! treat as "no match" rather than a failure.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::transport::TransportError;

/// Decode the `data` field of a response body into `T`.
///
/// # Errors
///
/// - [`TransportError::MissingData`] if the body has no `data` key
/// - [`TransportError::Decode`] if the body or payload does not parse
///
/// # Example
///
/// ```
/// use argus::api::{parse_response, TransportError};
///
/// let name: String = parse_response(br#"{"data": "acme"}"#).unwrap();
/// assert_eq!(name, "acme");
///
/// let err = parse_response::<String>(br#"{"message": "none"}"#).unwrap_err();
/// assert!(matches!(err, TransportError::MissingData));
/// ```
pub fn parse_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    let mut envelope: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| TransportError::Decode(format!("invalid response body: {}", e)))?;

    let data = envelope.remove("data").ok_or(TransportError::MissingData)?;

    serde_json::from_value(data)
        .map_err(|e| TransportError::Decode(format!("invalid response data: {}", e)))
}
