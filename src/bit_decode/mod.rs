//! Bit level access to an aPLib stream.
//!
//! The compressed stream is *not* a plain bitstream: single bits come out of a
//! one-byte "tag" which is reloaded from the input whenever it runs dry, while
//! literal bytes and offset low-bytes are read straight from the input, in between
//! the tags. [`TagReader`] handles both kinds of reads over one forward-only cursor.
//!
pub mod tag_reader;

pub use tag_reader::TagReader;

use bitvec::prelude as bv;

/// The type of bitvector used in the crate.
/// Importantly, the tag layout *relies* on `Msb0`
pub(crate) type MyStore = u8;
pub(crate) type MyBitOrder = bv::Msb0;
/// bitslice used in the crate
pub type MyBitSlice = bv::BitSlice<MyStore, MyBitOrder>;
/// reftype that goes with [`MyBitSlice`]
pub type MyBitVector = bv::BitVec<MyStore, MyBitOrder>;
