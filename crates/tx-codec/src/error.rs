//! Error types for CNV encoding and parsing.

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed data line: {what}")]
    MalformedLine { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
