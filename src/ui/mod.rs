//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - The `Prompter` trait and its terminal/scripted implementations
//! - [`output`] - Output formatting and the in-place status line
//!
//! # Design
//!
//! All output and prompts go through this module to ensure consistent
//! formatting and proper handling of interactive vs non-interactive modes.

pub mod output;
pub mod prompts;
