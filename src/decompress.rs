//! The aPLib decoding state machine.
//!
//! # Usage
//! ```rust
//! use aplib::{decompress, Decompressor};
//! // literal 'a', then `0` + literal 'b', then `110` + 0x00 (end of stream)
//! let compressed = [b'a', 0b0110_0000, b'b', 0x00];
//! assert_eq!(decompress(&compressed).unwrap(), b"ab");
//!
//! // same thing, keeping the statistics
//! let decoded = Decompressor::new(&compressed[..]).decode().unwrap();
//! assert_eq!(decoded.data, b"ab");
//! assert_eq!(decoded.stats.bits_read, 4);
//! ```
use std::io::Read;
use std::ops::ControlFlow;

use crate::bit_decode::TagReader;
use crate::error::{DecompressError, Result};
use crate::opcode::{
    length_delta, Opcode, END_MARKER_MAX, MAX_PREFIX_BITS, SHORT_BLOCK_MIN_LENGTH,
    SINGLE_BYTE_OFFSET_BITS, VARIABLE_NUMBER_MIN,
};
use crate::output::Window;
use crate::trace::{NoTrace, Operation, TraceSink};

/// Counters collected while decoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// bits consumed from tags (opcodes and bit-level parameters)
    pub bits_read: usize,
    /// raw bytes read outside of tags, including the initial literal
    pub data_bytes_read: usize,
    /// bytes used to fill tags
    pub tag_bytes_read: usize,
    /// largest back-reference distance
    pub max_offset: usize,
    /// longest back-reference
    pub max_match_length: usize,
    /// size of the decompressed data
    pub output_len: usize,
}

/// Output of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The decompressed bytes.
    pub data: Vec<u8>,
    /// Counters of the decode that produced `data`.
    pub stats: DecodeStats,
}

/// Decoder for a single aPLib stream.
///
/// Owns all decoding state: the bit reader, the output window and the
/// `pair`/`last_offset` context. One instance decodes one stream.
#[derive(Debug)]
pub struct Decompressor<R, S = NoTrace> {
    bits: TagReader<R>,
    out: Window,
    /// previous opcode was a literal or single byte: the next block may reuse `last_offset`
    pair: bool,
    last_offset: usize,
    trace: S,
}

impl<R: Read> Decompressor<R> {
    /// Decoder over `input`, without tracing.
    pub fn new(input: R) -> Self {
        Self::from_tag_reader(TagReader::new(input), NoTrace)
    }
}

impl<R: Read, S: TraceSink> Decompressor<R, S> {
    /// Decoder over `input`, reporting every operation to `trace`.
    pub fn with_trace(input: R, trace: S) -> Self {
        Self::from_tag_reader(TagReader::new(input), trace)
    }

    /// Decoder on top of an already configured [`TagReader`] (e.g. with wider tags).
    pub fn from_tag_reader(bits: TagReader<R>, trace: S) -> Self {
        Decompressor {
            bits,
            out: Window::new(),
            pair: true,
            last_offset: 0,
            trace,
        }
    }

    /// Runs the decoder until the end-of-stream marker.
    pub fn decode(mut self) -> Result<Decoded> {
        tracing::debug!("aPLib decode start (tag size {})", self.bits.tag_size());

        let first = self.bits.read_byte()?;
        self.out.push(first);
        self.trace
            .record(&Operation::InitialLiteral { value: first }, self.out.tail(1));

        loop {
            let opcode = Opcode::from_prefix(self.bits.read_unary_count(MAX_PREFIX_BITS, true)?);
            let flow = match opcode {
                Opcode::Literal => self.literal(),
                Opcode::Block => self.block(),
                Opcode::ShortBlock => self.short_block(),
                Opcode::SingleByte => self.single_byte(),
            }?;
            if flow.is_break() {
                break;
            }
        }

        let stats = self.stats();
        tracing::debug!(
            "aPLib decode done: {} bytes in, {} bytes out",
            stats.data_bytes_read + stats.tag_bytes_read,
            stats.output_len
        );
        Ok(Decoded {
            data: self.out.into_inner(),
            stats,
        })
    }

    /// Statistics of the decoding so far.
    pub fn stats(&self) -> DecodeStats {
        DecodeStats {
            bits_read: self.bits.bits_read(),
            data_bytes_read: self.bits.bytes_consumed() - self.bits.tag_bytes_read(),
            tag_bytes_read: self.bits.tag_bytes_read(),
            max_offset: self.out.max_offset(),
            max_match_length: self.out.max_match_length(),
            output_len: self.out.len(),
        }
    }

    fn copy(&mut self, op: Operation, offset: usize, length: usize) -> Result<()> {
        self.out.back_copy(offset, length)?;
        self.trace.record(&op, self.out.tail(length));
        Ok(())
    }

    fn literal(&mut self) -> Result<ControlFlow<()>> {
        let value = self.bits.read_byte()?;
        self.out.push(value);
        self.trace.record(&Operation::Literal { value }, self.out.tail(1));
        self.pair = true;
        Ok(ControlFlow::Continue(()))
    }

    fn block(&mut self) -> Result<ControlFlow<()>> {
        let mut b = self.bits.read_variable_number()? - VARIABLE_NUMBER_MIN;
        let (offset, length, reused_offset) = if b == 0 && self.pair {
            (self.last_offset, self.bits.read_variable_number()?, true)
        } else {
            // without a preceding literal, the reuse code is free for offsets
            if self.pair {
                b -= 1;
            }
            let low = usize::from(self.bits.read_byte()?);
            let offset = b
                .checked_mul(256)
                .map(|high| high | low)
                .ok_or(DecompressError::NumberOverflow)?;
            let length = self
                .bits
                .read_variable_number()?
                .checked_add(length_delta(offset))
                .ok_or(DecompressError::NumberOverflow)?;
            (offset, length, false)
        };

        self.last_offset = offset;
        let op = Operation::Block {
            offset,
            length,
            reused_offset,
        };
        self.copy(op, offset, length)?;
        self.pair = false;
        Ok(ControlFlow::Continue(()))
    }

    fn short_block(&mut self) -> Result<ControlFlow<()>> {
        let b = self.bits.read_byte()?;
        if b <= END_MARKER_MAX {
            self.trace.record(&Operation::End { marker: b }, &[]);
            return Ok(ControlFlow::Break(()));
        }
        let length = SHORT_BLOCK_MIN_LENGTH + usize::from(b & 1);
        let offset = usize::from(b >> 1);
        self.copy(Operation::ShortBlock { offset, length }, offset, length)?;
        self.last_offset = offset;
        self.pair = false;
        Ok(ControlFlow::Continue(()))
    }

    fn single_byte(&mut self) -> Result<ControlFlow<()>> {
        let offset = self.bits.read_fixed_number(SINGLE_BYTE_OFFSET_BITS, 0)?;
        if offset == 0 {
            self.out.push(0);
            self.trace
                .record(&Operation::SingleByte { offset }, self.out.tail(1));
        } else {
            self.copy(Operation::SingleByte { offset }, offset, 1)?;
        }
        self.pair = true;
        Ok(ControlFlow::Continue(()))
    }
}

/// Decompresses a complete aPLib stream held in memory.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_from_reader(input)
}

/// Decompresses an aPLib stream from any reader.
///
/// Stops reading right after the end-of-stream marker.
pub fn decompress_from_reader<R: Read>(reader: R) -> Result<Vec<u8>> {
    Ok(Decompressor::new(reader).decode()?.data)
}
