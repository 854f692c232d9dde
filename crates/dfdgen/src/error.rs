//! Error types for dfdgen operations.
//!
//! This module provides the main error type [`DfdError`], covering the
//! conditions that stop the application as a whole. Failures of a single
//! render are not errors at this level: they are committed into the
//! session as a [`crate::session::Failure`].

use std::io;

use thiserror::Error;

/// The main error type for dfdgen operations.
#[derive(Debug, Error)]
pub enum DfdError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("Server error: {0}")]
    Server(String),
}

impl DfdError {
    /// Create a new `Bind` error for the given address.
    pub fn new_bind_error(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
