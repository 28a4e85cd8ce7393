//! Error types returned by the ECM encoder and decoder.
use std::error::Error;
use std::fmt::{self, Display};
use std::io;

/// Error conditions that can occur while encoding or decoding an ECM stream.
#[derive(Debug)]
pub enum EcmError {
    /// The first four bytes of the stream were not `ECM\0`.
    BadMagic,
    /// A read returned fewer bytes than required to make progress.
    UnexpectedEof,
    /// A record header decoded to an invalid run length, or was otherwise malformed.
    CorruptStream,
    /// The trailing whole-file EDC did not match the EDC computed over the decoded output.
    EdcMismatch {
        /// The EDC recorded in the stream's trailer.
        expected: u32,
        /// The EDC actually computed over the reconstructed output.
        actual: u32,
    },
    /// An underlying I/O operation failed.
    Io(io::Error),
}

impl Error for EcmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EcmError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for EcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcmError::BadMagic => f.write_str("header not found"),
            EcmError::UnexpectedEof => f.write_str("unexpected EOF"),
            EcmError::CorruptStream => f.write_str("corrupt ECM file"),
            EcmError::EdcMismatch { expected, actual } => write!(
                f,
                "EDC error ({actual:08X}, should be {expected:08X})"
            ),
            EcmError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl From<io::Error> for EcmError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => EcmError::UnexpectedEof,
            _ => EcmError::Io(err),
        }
    }
}

impl From<EcmError> for io::Error {
    fn from(err: EcmError) -> Self {
        match err {
            EcmError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// Result type for ECM encode/decode operations.
pub type EcmResult<T> = std::result::Result<T, EcmError>;
