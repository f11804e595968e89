//! core
//!
//! Shared foundations used by every layer.
//!
//! # Modules
//!
//! - [`config`] - Persisted state (`Config`) and user settings
//! - [`context`] - Cancellation and deadlines for blocking operations

pub mod config;
pub mod context;
