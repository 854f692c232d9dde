//! Error adapter for converting DfdError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use dfdgen::DfdError;

/// Adapter giving a [`DfdError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a DfdError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DfdError::Io(_) => "dfdgen::io",
            DfdError::Config(_) => "dfdgen::config",
            DfdError::Bind { .. } | DfdError::Server(_) => "dfdgen::server",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            DfdError::Config(_) => "check the file passed with --config or dfdgen/config.toml",
            DfdError::Bind { .. } => "choose another address with --host or --port",
            DfdError::Io(_) | DfdError::Server(_) => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert a [`DfdError`] into a renderable report.
pub fn to_reportable(err: &DfdError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_codes() {
        let err = DfdError::Config("bad".to_string());
        let adapter = to_reportable(&err);
        assert_eq!(adapter.code().unwrap().to_string(), "dfdgen::config");
        assert!(adapter.help().is_some());

        let err = DfdError::new_bind_error(
            "127.0.0.1:8501",
            io::Error::from(io::ErrorKind::AddrInUse),
        );
        let adapter = to_reportable(&err);
        assert_eq!(adapter.code().unwrap().to_string(), "dfdgen::server");
        assert!(adapter.to_string().starts_with("Failed to bind 127.0.0.1:8501"));
    }

    #[test]
    fn test_io_error_has_no_help() {
        let err = DfdError::Io(io::Error::other("disk"));
        let adapter = to_reportable(&err);
        assert_eq!(adapter.code().unwrap().to_string(), "dfdgen::io");
        assert!(adapter.help().is_none());
        assert_eq!(adapter.to_string(), "I/O error: disk");
    }
}
