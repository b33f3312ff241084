//! The auto-reloading tag machine.
//!
//! Bits are taken MSB first out of the current tag. Once all bits of a tag are used,
//! the next `tag_size` bytes of the input become the new tag (little endian, i.e.
//! `byte0 | byte1 << 8 | ...`). aPLib always uses `tag_size == 1`.
//!
//! # Example
//! ```rust
//! use aplib::bit_decode::TagReader;
//! // tag 0b1010_0000, then a raw byte 0xFF
//! let data = [0b1010_0000_u8, 0xFF];
//! let mut r = TagReader::new(&data[..]);
//! assert!(r.read_bit().unwrap());
//! assert_eq!(r.read_byte().unwrap(), 0xFF); // raw bytes bypass the tag
//! assert!(!r.read_bit().unwrap());
//! assert!(r.read_bit().unwrap());
//! ```
use std::io::{ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{DecompressError, Result};

/// Tag width used by the aPLib format.
pub const APLIB_TAG_SIZE: usize = 1;

/// Bit reader over a forward-only byte source, with an auto-reloading tag.
#[derive(Debug)]
pub struct TagReader<R> {
    input: R,
    tag: u64,
    current_bit_count: u32, // bits left in `tag`
    tag_size: usize,
    bytes_consumed: usize,
    tag_bytes_read: usize,
    bits_read: usize,
}

impl<R: Read> TagReader<R> {
    /// Creates a reader with the one-byte tags of the aPLib format.
    pub fn new(input: R) -> Self {
        TagReader {
            input,
            tag: 0,
            current_bit_count: 0,
            tag_size: APLIB_TAG_SIZE,
            bytes_consumed: 0,
            tag_bytes_read: 0,
            bits_read: 0,
        }
    }

    /// Creates a reader whose tags are `tag_size` bytes wide (1 to 8).
    pub fn with_tag_size(input: R, tag_size: usize) -> Result<Self> {
        if !(1..=8).contains(&tag_size) {
            return Err(DecompressError::InvalidTagSize(tag_size));
        }
        let mut reader = Self::new(input);
        reader.tag_size = tag_size;
        Ok(reader)
    }

    #[inline]
    fn tag_bits(&self) -> u32 {
        (self.tag_size * 8) as u32
    }

    /// turns EOF into our own error, keeps everything else as IO error.
    /// The position is where the failed read started, even if it got some bytes.
    fn input_error(&self, e: std::io::Error) -> DecompressError {
        if e.kind() == ErrorKind::UnexpectedEof {
            DecompressError::UnexpectedEndOfInput {
                position: self.bytes_consumed,
            }
        } else {
            DecompressError::Io(e)
        }
    }

    fn reload(&mut self) -> Result<()> {
        let tag = match self.input.read_uint::<LittleEndian>(self.tag_size) {
            Ok(tag) => tag,
            Err(e) => return Err(self.input_error(e)),
        };
        self.tag = tag;
        self.bytes_consumed += self.tag_size;
        self.tag_bytes_read += self.tag_size;
        Ok(())
    }

    /// Reads the next bit, reloading the tag if necessary.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.current_bit_count != 0 {
            self.current_bit_count -= 1;
        } else {
            self.reload()?;
            self.current_bit_count = self.tag_bits() - 1;
        }
        let bit = (self.tag >> (self.tag_bits() - 1)) & 1;
        self.tag <<= 1;
        self.bits_read += 1;
        Ok(bit == 1)
    }

    /// Reads one raw byte from the input, leaving the tag untouched.
    pub fn read_byte(&mut self) -> Result<u8> {
        match self.input.read_u8() {
            Ok(byte) => {
                self.bytes_consumed += 1;
                Ok(byte)
            }
            Err(e) => Err(self.input_error(e)),
        }
    }

    #[inline]
    fn fold_bit(&mut self, acc: usize) -> Result<usize> {
        let bit = usize::from(self.read_bit()?);
        acc.checked_mul(2)
            .map(|shifted| shifted | bit)
            .ok_or(DecompressError::NumberOverflow)
    }

    /// Reads `nbits` bits MSB first and appends them to `init`.
    ///
    /// `init` lets callers pre-seed high bits; pass 0 for a plain fixed-width field.
    pub fn read_fixed_number(&mut self, nbits: u32, init: usize) -> Result<usize> {
        let mut result = init;
        for _ in 0..nbits {
            result = self.fold_bit(result)?;
        }
        Ok(result)
    }

    /// Reads a variable length number (always `>= 2`).
    ///
    /// The leading 1 is implicit; every data bit is followed by a continuation
    /// bit, `1` meaning another data bit follows:
    ///
    /// | value | code             |
    /// |-------|------------------|
    /// | 2     | `00`             |
    /// | 3     | `10`             |
    /// | 4     | `0100`           |
    /// | 7     | `1110`           |
    /// | 14    | `111100`         |
    /// | 170   | `01110111011100` |
    pub fn read_variable_number(&mut self) -> Result<usize> {
        let mut result = self.fold_bit(1)?;
        while self.read_bit()? {
            result = self.fold_bit(result)?;
        }
        Ok(result)
    }

    /// Counts consecutive bits equal to `set_value`, reading at most `max` of them.
    ///
    /// The first differing bit is consumed but not counted.
    pub fn read_unary_count(&mut self, max: usize, set_value: bool) -> Result<usize> {
        let mut count = 0;
        while count < max && self.read_bit()? == set_value {
            count += 1;
        }
        Ok(count)
    }

    /// Bytes taken from the input so far (tags and raw bytes).
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Bytes taken from the input to fill tags.
    pub fn tag_bytes_read(&self) -> usize {
        self.tag_bytes_read
    }

    /// Bits handed out by [`TagReader::read_bit`].
    pub fn bits_read(&self) -> usize {
        self.bits_read
    }

    /// Width of a tag in bytes.
    pub fn tag_size(&self) -> usize {
        self.tag_size
    }

    /// Gives back the input, positioned right after the last byte consumed.
    pub fn into_inner(self) -> R {
        self.input
    }
}
