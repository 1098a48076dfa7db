use thiserror::Error;

use crate::{
    consensus::EncodeDecodeError,
    io::{Error as IoError, ErrorKind as IoErrorKind},
};

/// Errors raised while decoding block data.
///
/// Decoding stops at the first error. Fields decoded before the failure
/// point may already have been written, so the partially decoded value must
/// be discarded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The underlying consensus codec failed, e.g. on truncated input, an
    /// oversized vector or a non-minimal length prefix.
    #[error("Consensus decode error: {0}")]
    Consensus(#[from] EncodeDecodeError),

    /// Reading from the stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The solution length prefix claims more bytes than the input holds.
    #[error("Solution length prefix of {declared} bytes exceeds the remaining input")]
    SolutionTruncated {
        /// Length announced by the prefix.
        declared: usize,
    },

    /// The solution length prefix is above the decoder's limit.
    #[error("Solution of {len} bytes exceeds the maximum of {max} bytes")]
    SolutionTooLarge {
        /// Length announced by the prefix.
        len: u64,
        /// Largest accepted length.
        max: usize,
    },

    /// The reserved field was built from the wrong number of words.
    #[error("Reserved field needs {expected} words, got {actual}")]
    ReservedLength {
        /// Number of reserved words in a header.
        expected: usize,
        /// Number of words supplied.
        actual: usize,
    },
}

/// Errors raised while encoding block data.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing to the stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The solution is longer than the encoding allows.
    #[error("Solution of {len} bytes exceeds the maximum of {max} bytes")]
    SolutionTooLarge {
        /// Length of the solution.
        len: usize,
        /// Largest encodable length.
        max: usize,
    },
}

impl From<EncodeError> for IoError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Io(err) => err,
            other => IoError::new(IoErrorKind::InvalidInput, other),
        }
    }
}

impl From<DecodeError> for EncodeDecodeError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Consensus(err) => err,
            DecodeError::Io(err) => EncodeDecodeError::Io(err),
            DecodeError::SolutionTruncated { .. } => {
                EncodeDecodeError::Io(IoError::from(IoErrorKind::UnexpectedEof))
            }
            DecodeError::SolutionTooLarge { len, max } => {
                EncodeDecodeError::OversizedVectorAllocation {
                    requested: usize::try_from(len).unwrap_or(usize::MAX),
                    max,
                }
            }
            DecodeError::ReservedLength { .. } => {
                EncodeDecodeError::ParseFailed("reserved field has the wrong number of words")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_into_io_error() {
        let err = IoError::from(EncodeError::SolutionTooLarge { len: 10, max: 5 });
        assert_eq!(err.kind(), IoErrorKind::InvalidInput);
        assert!(err.to_string().contains("10 bytes"));

        let err = IoError::from(EncodeError::Io(IoError::from(IoErrorKind::WriteZero)));
        assert_eq!(err.kind(), IoErrorKind::WriteZero);
    }

    #[test]
    fn test_decode_error_into_consensus_error() {
        let err = EncodeDecodeError::from(DecodeError::SolutionTruncated { declared: 4 });
        assert!(matches!(err, EncodeDecodeError::Io(ref e) if e.kind() == IoErrorKind::UnexpectedEof));

        let err = EncodeDecodeError::from(DecodeError::SolutionTooLarge { len: 9, max: 8 });
        assert!(matches!(
            err,
            EncodeDecodeError::OversizedVectorAllocation { requested: 9, max: 8 }
        ));

        let err = EncodeDecodeError::from(DecodeError::ReservedLength {
            expected: 7,
            actual: 6,
        });
        assert!(matches!(err, EncodeDecodeError::ParseFailed(_)));
    }
}
