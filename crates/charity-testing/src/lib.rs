//! Test utilities for the charity services.
//!
//! Provides `MockSession` for signed session cookies and response body helpers.
//! Import in `#[cfg(test)]` blocks and `tests/` only.

pub mod auth;
pub mod body;
