//! Packer error types.

use std::error::Error as _;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackError>;

/// Errors raised while turning a source asset into generated source.
///
/// Whether an error is fatal depends on the caller: the UI document aborts
/// the run, a secondary chunk is skipped with a warning.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("cannot read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("cannot write `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),

    #[error("missing resource `{reference}` referenced from `{}`", .document.display())]
    MissingResource { reference: String, document: PathBuf },

    #[error("malformed markup at line {line}: {message}")]
    Markup { line: usize, message: String },

    #[error("stylesheet minification failed: {0}")]
    Style(String),

    #[error("script minification failed: {0}")]
    Script(String),

    #[error("unknown filter `{0}`")]
    UnknownFilter(String),

    #[error("gzip compression failed")]
    Compress(#[source] std::io::Error),

    #[error("`{name}` is {len} bytes, more than a uint16_t length can describe")]
    TooLarge { name: String, len: usize },
}

impl PackError {
    /// Full message including the source chain, e.g. `cannot read `a.htm`: No such file`.
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// Truncate a diagnostic to at most `max` characters for one-line warnings.
pub fn truncate(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_includes_source() {
        let err = PackError::Read(
            PathBuf::from("update.htm"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.diagnostic(), "cannot read `update.htm`: not found");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("abcdef", 3), "abc");
        // multi-byte characters are never split
        assert_eq!(truncate("äöü", 2), "äö");
    }
}
