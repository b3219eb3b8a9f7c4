//! Definitions of error related things.

use thiserror::Error;

/// Errors of this crate
///
/// Every error is terminal for the parse call that produced it,
/// no partially decoded document is ever returned alongside one.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PcdError {
    /// A keyword line is missing, out of order, or has invalid tokens
    #[error("Invalid header while parsing {section:?}: {message}\n\t{line:?}")]
    MalformedHeader {
        /// The keyword being parsed when the error occurred
        section: String,
        /// What went wrong
        message: String,
        /// The line which caused the error
        line: String,
    },
    /// The payload encoding is declared but cannot be decoded,
    /// (ascii data, or a compressed layout other than xyz / xyz + rgb)
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    /// The field layout cannot be mapped to points
    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(String),
    /// A field name was looked up but is not declared in FIELDS
    #[error("Field {0:?} is not declared in the header")]
    UnknownField(String),
    /// The source ended before all the declared points were read
    #[error("Truncated payload: expected {expected} bytes, only {available} available")]
    TruncatedPayload { expected: u64, available: u64 },
    /// The LZF stream is malformed
    #[error("Decompression failed: {0}")]
    Decompression(String),
    /// Wrapper around an io error from the std lib
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PcdError {
    pub(crate) fn header(section: &str, message: impl Into<String>, line: &str) -> Self {
        PcdError::MalformedHeader {
            section: section.to_string(),
            message: message.into(),
            line: line.trim_end().to_string(),
        }
    }
}
