//! Decompression of [aPLib](http://www.ibsensoftware.com/) compressed data.
//!
//! ## Introduction
//! aPLib is a small LZSS-style format. After a first literal byte, the stream is a
//! sequence of opcodes, selected by a unary prefix in a bitstream:
//!
//! | prefix | opcode      | effect                                                  |
//! |--------|-------------|---------------------------------------------------------|
//! | `0`    | literal     | emit the next raw byte                                  |
//! | `10`   | block       | copy with variable length offset/length                 |
//! | `110`  | short block | copy 2-3 bytes from up to 127 back; `0x00`/`0x01` = end |
//! | `111`  | single byte | copy 1 byte from up to 15 back, or emit a zero          |
//!
//! The bits come out of one-byte "tags" that are interleaved with the raw bytes
//! (literals, offset low bytes) exactly where the decoder needs them,
//! see [`bit_decode`].
//!
//! # Examples
//! Decoding a buffer in one go:
//! ```rust
//! use aplib::decompress;
//! // 'a', then `0` + 'b', `111` + `0001` (repeat the last byte), `110` + 0x00 (end)
//! let compressed = [b'a', 0b0111_0001, b'b', 0b1100_0000, 0x00];
//! assert_eq!(decompress(&compressed).unwrap(), b"abb");
//! ```
//!
//! Decoding with statistics and a trace of every operation:
//! ```rust
//! use aplib::{Decompressor, trace::TracingSink};
//! let compressed = [b'a', 0b0111_0001, b'b', 0b1100_0000, 0x00];
//! let decoded = Decompressor::with_trace(&compressed[..], TracingSink).decode().unwrap();
//! assert_eq!(decoded.data, b"abb");
//! assert_eq!(decoded.stats.max_offset, 1);
//! ```
//!
//! Every [`Decompressor`] owns all of its state; decoding the same input twice, or
//! several inputs on different threads, needs nothing but separate instances.
pub mod bit_decode;
pub mod decompress;
mod error;
pub mod opcode;
pub mod output;
pub mod trace;
pub mod utils;

pub use decompress::{decompress, decompress_from_reader, DecodeStats, Decoded, Decompressor};
pub use error::{DecompressError, EncodeError, Result};
