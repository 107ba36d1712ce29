//! Utility functions and helpers for gemstudio.
//!
//! This module provides cross-cutting concerns like structured logging,
//! API key sanitization, and bounded retry with exponential backoff.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and secret redaction.
//! - `retry`: Retry executor with a pluggable retryable-error predicate.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
pub mod retry;
