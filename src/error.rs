//! Error types for frame decoding

use std::io;
use thiserror::Error as ThisError;

/// Errors that can terminate a frame decode.
///
/// The first error raised during a decode session is recorded as the
/// session's sticky error; later failures never overwrite it. See
/// [`Decoder::set_error`](crate::Decoder::set_error).
#[derive(Debug, ThisError)]
pub enum Error {
    /// A field declared more bytes than the frame had left.
    #[error("truncated input: field needs {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the field's layout requires.
        needed: usize,
        /// Bytes that could actually be served.
        available: usize,
    },

    /// A varint ran out of bytes before its terminating byte appeared.
    #[error("cannot decode varint from input stream")]
    Varint,

    /// A streaming copy asked for more bytes than the frame budget holds,
    /// or the source dried up mid-copy.
    #[error("unexpected end of frame")]
    UnexpectedEof,

    /// The underlying byte source failed.
    #[error("source error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for decode operations
pub type Result<T> = std::result::Result<T, Error>;
