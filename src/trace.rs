//! Optional observation of the decoding, one event per decoded operation.
//!
//! Decoding itself never prints anything. Pass a [`TraceSink`] to
//! [`crate::Decompressor::with_trace`] to see what the decoder does:
//! ```rust
//! use aplib::{Decompressor, trace::Operation};
//! let compressed = [0x2A_u8, 0xC0, 0x00];
//! let mut ops = Vec::new();
//! let sink = |op: &Operation, _emitted: &[u8]| ops.push(*op);
//! Decompressor::with_trace(&compressed[..], sink).decode().unwrap();
//! assert_eq!(ops, vec![Operation::InitialLiteral { value: 0x2A }, Operation::End { marker: 0 }]);
//! ```
use std::fmt;

use itertools::Itertools;

/// A fully decoded operation, with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The first byte of the stream, always a literal.
    InitialLiteral { value: u8 },
    Literal { value: u8 },
    /// `reused_offset`: the offset was taken from the previous block
    Block {
        offset: usize,
        length: usize,
        reused_offset: bool,
    },
    ShortBlock { offset: usize, length: usize },
    /// `offset == 0` emits a zero byte
    SingleByte { offset: usize },
    /// Terminal short block; `marker` is its parameter byte (0 or 1).
    End { marker: u8 },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::InitialLiteral { .. } => write!(f, "Initial literal"),
            Operation::Literal { .. } => write!(f, "Literal"),
            Operation::Block {
                offset,
                length,
                reused_offset,
            } => {
                let kind = if *reused_offset { "reused" } else { "encoded" };
                write!(f, "Block with {kind} offset {offset}, length {length}")
            }
            Operation::ShortBlock { offset, length } => {
                write!(f, "Short block offset {offset}, length {length}")
            }
            Operation::SingleByte { offset: 0 } => write!(f, "Single byte zero"),
            Operation::SingleByte { offset } => write!(f, "Single byte offset {offset}"),
            Operation::End { marker } => write!(f, "End of stream (marker {marker})"),
        }
    }
}

/// Receives every operation right after it was applied, together with the bytes
/// it appended to the output (empty for [`Operation::End`]).
pub trait TraceSink {
    fn record(&mut self, op: &Operation, emitted: &[u8]);
}

/// Discards everything; the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    #[inline(always)]
    fn record(&mut self, _op: &Operation, _emitted: &[u8]) {}
}

/// Logs each operation at `TRACE` level via `tracing`, with the emitted bytes in hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&mut self, op: &Operation, emitted: &[u8]) {
        tracing::trace!("{}: {}", op, hex_bytes(emitted));
    }
}

impl<F: FnMut(&Operation, &[u8])> TraceSink for F {
    fn record(&mut self, op: &Operation, emitted: &[u8]) {
        self(op, emitted)
    }
}

/// `[0x0a, 0xff]` -> `"0a ff"`
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).join(" ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let op = Operation::Block {
            offset: 300,
            length: 4,
            reused_offset: false,
        };
        assert_eq!(op.to_string(), "Block with encoded offset 300, length 4");
        assert_eq!(
            Operation::SingleByte { offset: 0 }.to_string(),
            "Single byte zero"
        );
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[0x0a, 0xff, 0x00]), "0a ff 00");
        assert_eq!(hex_bytes(&[]), "");
    }
}
