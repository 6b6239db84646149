//! Error types for reading receiver update frames.

use bitstream::BitError;
use thiserror::Error;

/// Result type for frame decoding.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while reading a [`ReceiverUpdate`](crate::ReceiverUpdate).
///
/// Writing frames is infallible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// The underlying bit stream ran out or was malformed.
    #[error(transparent)]
    Bits(#[from] BitError),

    /// Unknown block kind tag.
    #[error("unknown block kind {kind}")]
    UnknownBlockKind { kind: u8 },

    /// A count or length exceeds what the remaining bytes could hold.
    #[error("{what} of {declared} exceeds the {available} bytes left")]
    Truncated {
        what: &'static str,
        declared: usize,
        available: usize,
    },
}
