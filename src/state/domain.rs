//! Domain identifiers as read from the input list.

use std::fmt;

use crate::constants;

/// Errors raised when building a [`Domain`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainError {
    /// The entry is empty or whitespace only.
    #[error("domain entry is empty")]
    Empty,
}

/// A domain to probe: a bare hostname or a full URL.
///
/// Keeps the text exactly as listed (that is what gets logged) and derives the
/// URL to request from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    raw: String,
}

impl Domain {
    /// Builds a domain from a list entry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Empty`] when the entry has no visible characters.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }
        Ok(Self {
            raw: trimmed.to_string(),
        })
    }

    /// The entry as listed in the input file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// URL to request: the entry itself when it carries an `http://` or
    /// `https://` scheme, otherwise the entry prefixed with `https://`.
    pub fn url(&self) -> String {
        if has_http_scheme(&self.raw) {
            self.raw.clone()
        } else {
            format!("{}{}", constants::DEFAULT_SCHEME, self.raw)
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
