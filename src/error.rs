//! Error types for decoding (and for the test-support assembler in [`crate::utils`]).

use thiserror::Error;

/// Errors that abort a decode. None of them are recoverable: the format has
/// no resynchronisation points, so decoding simply stops.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DecompressError {
    /// A bit or byte was requested after the compressed stream ran out.
    #[error("unexpected end of input after {position} bytes")]
    UnexpectedEndOfInput {
        /// Input offset where the failing read started. A tag wider than one byte
        /// that is cut off midway reports the offset of its first byte.
        position: usize,
    },

    /// A back-reference points before the start of the output (or has distance 0).
    #[error("invalid back-reference: offset {offset} with only {available} bytes decoded")]
    InvalidBackReference {
        /// The requested distance.
        offset: usize,
        /// Bytes in the output at the time of the copy.
        available: usize,
    },

    /// A number read from the bitstream (or an offset built from one) does not fit in `usize`.
    #[error("decoded number overflows usize")]
    NumberOverflow,

    /// A back-reference is longer than the output buffer can grow.
    #[error("cannot allocate {length} more bytes of output")]
    OutputTooLarge {
        /// The requested copy length.
        length: usize,
    },

    /// Tags must be between 1 and 8 bytes wide.
    #[error("invalid tag size {0}, expected 1..=8")]
    InvalidTagSize(usize),

    /// The underlying reader failed for a reason other than end of file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while assembling a stream with [`crate::utils::StreamBuilder`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// The format always starts with a literal, so there is nothing to pack.
    #[error("cannot pack an empty payload")]
    EmptyInput,

    /// Back-references need a distance of at least 1.
    #[error("back-reference offset must be non-zero")]
    ZeroOffset,

    /// The offset is outside what the chosen opcode can express.
    #[error("offset {offset} out of range for {opcode}")]
    OffsetOutOfRange {
        /// The rejected offset.
        offset: usize,
        /// Opcode name.
        opcode: &'static str,
    },

    /// The length is too short for a block with this offset
    /// (the decoder adds a length bonus that depends on the offset).
    #[error("length {length} cannot be encoded for offset {offset}")]
    LengthNotEncodable {
        /// The rejected length.
        length: usize,
        /// The offset it was paired with.
        offset: usize,
    },
}

/// Result type used throughout the decoder.
pub type Result<T> = std::result::Result<T, DecompressError>;
