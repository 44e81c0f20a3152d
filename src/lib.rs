//! Small, self-contained utilities for async applications.
//!
//! This crate collects a few independent helpers: decimal-safe arithmetic
//! that avoids binary floating-point artifacts, an HTTP request wrapper that
//! races each call against a deadline and normalizes errors into a matchable
//! taxonomy, and date/collection conveniences. The pieces share no state;
//! each can be used on its own.

pub mod calc;
pub mod collections;
pub mod date;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use calc::{add, subtract};
pub use error::{Result, SatchelError};
pub use http::{
    Client, HttpTransport, MockTransport, RawResponse, ReqwestTransport, RequestOptions,
    ResponseData, DEFAULT_TIMEOUT_MS,
};
