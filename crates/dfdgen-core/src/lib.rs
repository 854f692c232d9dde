//! dfdgen Core Types
//!
//! This crate provides the vocabulary shared by the dfdgen engine and its
//! web front end. It includes:
//!
//! - **Formats**: The artifact formats the renderer can produce ([`format::OutputFormat`])
//! - **Share links**: Deterministic URLs carrying diagram source ([`share::ShareLink`])

pub mod format;
pub mod share;

pub use format::OutputFormat;
pub use share::{ShareError, ShareLink};
