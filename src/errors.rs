use crate::types::Rcode;
use std::io;
use thiserror::Error;

/// Errors returned by every public entry point of this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A domain name or message could not be encoded, for example a label
    /// longer than 63 bytes, or a name longer than 255 bytes.
    #[error("invalid format: {0}")]
    Format(String),

    /// The bytes received are not a valid DNS message. Decoding ran past the
    /// end of the buffer, followed a bad compression pointer, or the section
    /// counts did not agree with the data.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// No matching response arrived before the deadline.
    #[error("timed out waiting for a response")]
    TimedOut,

    /// The exchange was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The underlying socket or connection failed.
    #[error("transport error: {0}")]
    Transport(io::Error),

    /// The server answered with a non-success response code.
    #[error("server responded with {0}")]
    Server(Rcode),

    /// The response was well formed, but held no records of the requested type.
    #[error("no matching records found")]
    NoMatchingRecords,
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Blocking sockets report an expired read timeout as WouldBlock on unix.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::TimedOut,
            _ => Error::Transport(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returns early with the given [`Error`] variant, formatting the message.
///
/// ```ignore
/// bail!(Malformed, "invalid A record length ({}) expected 4", len);
/// ```
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {{
        return Err($crate::Error::$kind(format!($($arg)*)))
    }}
}

/// Converts a failed read of a fixed size field into a [`Error::Malformed`].
pub(crate) fn truncated(e: io::Error) -> Error {
    Error::Malformed(format!("unexpected end of message: {}", e))
}
