//! Shareable links that carry diagram source in a query parameter.
//!
//! A share link is `<base>?text=<percent-encoded source>`. Encoding keeps
//! only the RFC 3986 unreserved characters literal and escapes every other
//! byte of the UTF-8 representation, so newlines and non-ASCII text survive
//! a round trip through any browser.
//!
//! # Example
//!
//! ```
//! # use dfdgen_core::ShareLink;
//! let link = ShareLink::new("https://dfd.example.org/");
//! let url = link.url_for("A -> B");
//! assert_eq!(url, "https://dfd.example.org/?text=A%20-%3E%20B");
//! assert_eq!(ShareLink::text_param(&url).unwrap().unwrap(), "A -> B");
//! ```

use std::{borrow::Cow, string::FromUtf8Error};

use log::trace;
use thiserror::Error;

/// Name of the query parameter carrying the diagram source.
pub const TEXT_PARAM: &str = "text";

/// Errors raised while decoding a share link.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Share link text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Builds share links against a fixed base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    base: String,
}

impl ShareLink {
    /// Creates a link builder for the given base address.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Builds the share URL for `source`.
    ///
    /// The source is encoded exactly as given; callers decide whether it
    /// should be trimmed first.
    pub fn url_for(&self, source: &str) -> String {
        let separator = if self.base.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{separator}{TEXT_PARAM}={}",
            self.base,
            urlencoding::encode(source)
        );
        trace!(url:%; "Built share link");
        url
    }

    /// Percent-decodes a raw `text` parameter value.
    ///
    /// `+` is kept literally: links built by [`ShareLink::url_for`] never
    /// contain a bare `+`.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::InvalidUtf8`] when the decoded bytes are not
    /// valid UTF-8.
    pub fn decode_text(raw: &str) -> Result<String, ShareError> {
        Ok(urlencoding::decode(raw).map(Cow::into_owned)?)
    }

    /// Extracts and decodes the `text` parameter of a full URL.
    ///
    /// Returns `None` when the URL has no query string or no `text`
    /// parameter.
    pub fn text_param(url: &str) -> Option<Result<String, ShareError>> {
        let (_, query) = url.split_once('?')?;
        Self::text_from_query(query.split('#').next().unwrap_or_default())
    }

    /// Extracts and decodes the `text` parameter of a raw query string.
    pub fn text_from_query(query: &str) -> Option<Result<String, ShareError>> {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == TEXT_PARAM)
            .map(|(_, value)| Self::decode_text(value))
    }
}
