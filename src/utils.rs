//! Helpers for tests, benchmarks and debugging.
//!
//! Most importantly this holds [`StreamBuilder`], which assembles aPLib streams
//! operation by operation, and [`pack`], a naive greedy packer on top of it.
//! Neither is meant as a real compressor: they exist to produce valid streams
//! to feed the decoder.
//!
//! ```rust
//! use aplib::{decompress, utils::pack};
//! let data = b"abracadabra abracadabra".to_vec();
//! let packed = pack(&data).unwrap();
//! assert_eq!(decompress(&packed).unwrap(), data);
//! ```
use bitvec::{order::BitOrder, slice::BitSlice, store::BitStore, view::BitView};
use itertools::Itertools;
use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng, SeedableRng};

use crate::bit_decode::{MyBitOrder, MyBitSlice, MyBitVector};
use crate::error::EncodeError;
use crate::opcode::{
    length_delta, Opcode, SHORT_BLOCK_MAX_OFFSET, SHORT_BLOCK_MIN_LENGTH,
    SINGLE_BYTE_MAX_OFFSET, SINGLE_BYTE_OFFSET_BITS, VARIABLE_NUMBER_MIN,
};

/// turns a vec of 0/1 into a bitvector, convenient for writing down bit patterns
pub fn create_bitvector(bits: Vec<usize>) -> MyBitVector {
    bits.into_iter().map(|b| b == 1).collect()
}

/// The bytes holding `bits`, zero padded at the end.
pub fn bits_to_bytes(bits: &MyBitSlice) -> Vec<u8> {
    let mut bv = bits.to_bitvec();
    bv.set_uninitialized(false);
    bv.into_vec()
}

/// just for debugging purpose
pub fn bitstream_to_string<T: BitStore, O: BitOrder>(buffer: &BitSlice<T, O>) -> String {
    buffer.iter().map(|x| if *x { "1" } else { "0" }).join("")
}

/// Bit pattern of a variable length number, the inverse of
/// [`crate::bit_decode::TagReader::read_variable_number`].
///
/// # Panics
/// if `value < 2`, which has no encoding.
pub fn encode_variable_number(value: usize) -> MyBitVector {
    assert!(
        value >= VARIABLE_NUMBER_MIN,
        "variable length numbers start at 2"
    );
    let n_bits = usize::BITS - value.leading_zeros();
    let mut bits = MyBitVector::with_capacity(2 * n_bits as usize);
    // skip the implicit leading 1
    for i in (0..n_bits - 1).rev() {
        bits.push((value >> i) & 1 == 1);
        bits.push(i > 0);
    }
    bits
}

/// Assembles an aPLib stream operation by operation.
///
/// Keeps track of the encoder side of the `pair`/`last_offset` context, so
/// [`StreamBuilder::block`] automatically uses the short "same offset as before"
/// form when the decoder will accept it. Offsets are not checked against the
/// data emitted so far: invalid streams can be built on purpose.
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    out: Vec<u8>,
    tag_pos: usize,
    bits_left: usize,
    pair: bool,
    last_offset: usize,
}

impl StreamBuilder {
    /// Starts a stream; `first` is the mandatory initial literal.
    pub fn new(first: u8) -> Self {
        StreamBuilder {
            out: vec![first],
            tag_pos: 0,
            bits_left: 0,
            pair: true,
            last_offset: 0,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        if self.bits_left == 0 {
            // the decoder loads the next tag exactly when it needs its first bit
            self.tag_pos = self.out.len();
            self.out.push(0);
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        let index = 7 - self.bits_left;
        self.out[self.tag_pos]
            .view_bits_mut::<MyBitOrder>()
            .set(index, bit);
    }

    fn write_bits(&mut self, bits: &MyBitSlice) {
        for bit in bits.iter().by_vals() {
            self.write_bit(bit);
        }
    }

    fn write_opcode(&mut self, opcode: Opcode) {
        for &bit in opcode.prefix_bits() {
            self.write_bit(bit);
        }
    }

    fn write_fixed_number(&mut self, value: usize, n_bits: u32) {
        for i in (0..n_bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    fn write_variable_number(&mut self, value: usize) {
        self.write_bits(&encode_variable_number(value));
    }

    /// Whether the next block may reuse the previous offset.
    pub fn is_paired(&self) -> bool {
        self.pair
    }

    /// Offset of the last block / short block.
    pub fn last_offset(&self) -> usize {
        self.last_offset
    }

    /// `0` + the byte.
    pub fn literal(&mut self, byte: u8) -> &mut Self {
        self.write_opcode(Opcode::Literal);
        self.out.push(byte);
        self.pair = true;
        self
    }

    /// `10` + a back-reference of any offset and a length of at least 2.
    pub fn block(&mut self, offset: usize, length: usize) -> Result<&mut Self, EncodeError> {
        if offset == 0 {
            return Err(EncodeError::ZeroOffset);
        }
        if length < VARIABLE_NUMBER_MIN {
            return Err(EncodeError::LengthNotEncodable { length, offset });
        }

        if self.pair && offset == self.last_offset {
            self.write_opcode(Opcode::Block);
            self.write_variable_number(VARIABLE_NUMBER_MIN);
            self.write_variable_number(length);
        } else {
            let delta = length_delta(offset);
            if length < VARIABLE_NUMBER_MIN + delta {
                return Err(EncodeError::LengthNotEncodable { length, offset });
            }
            // after a literal the smallest code means "reuse", so everything moves up by one
            let high = (offset >> 8) + VARIABLE_NUMBER_MIN + usize::from(self.pair);
            self.write_opcode(Opcode::Block);
            self.write_variable_number(high);
            self.out.push((offset & 0xFF) as u8);
            self.write_variable_number(length - delta);
        }
        self.last_offset = offset;
        self.pair = false;
        Ok(self)
    }

    /// `110` + one byte: offset 1..=127, length 2 or 3.
    pub fn short_block(&mut self, offset: usize, length: usize) -> Result<&mut Self, EncodeError> {
        if offset == 0 {
            return Err(EncodeError::ZeroOffset);
        }
        if offset > SHORT_BLOCK_MAX_OFFSET {
            return Err(EncodeError::OffsetOutOfRange {
                offset,
                opcode: Opcode::ShortBlock.name(),
            });
        }
        if !(SHORT_BLOCK_MIN_LENGTH..=SHORT_BLOCK_MIN_LENGTH + 1).contains(&length) {
            return Err(EncodeError::LengthNotEncodable { length, offset });
        }
        self.write_opcode(Opcode::ShortBlock);
        self.out
            .push(((offset << 1) | (length - SHORT_BLOCK_MIN_LENGTH)) as u8);
        self.last_offset = offset;
        self.pair = false;
        Ok(self)
    }

    /// `111` + 4 bits: copy one byte from 1..=15 back, or emit a zero byte for offset 0.
    pub fn single_byte(&mut self, offset: usize) -> Result<&mut Self, EncodeError> {
        if offset > SINGLE_BYTE_MAX_OFFSET {
            return Err(EncodeError::OffsetOutOfRange {
                offset,
                opcode: Opcode::SingleByte.name(),
            });
        }
        self.write_opcode(Opcode::SingleByte);
        self.write_fixed_number(offset, SINGLE_BYTE_OFFSET_BITS);
        self.pair = true;
        Ok(self)
    }

    /// Appends the end-of-stream marker (`110` + `0x00`) and returns the stream.
    pub fn finish(self) -> Vec<u8> {
        self.finish_with_marker(0)
    }

    /// Like [`StreamBuilder::finish`], with a custom marker byte (0 and 1 end the stream).
    pub fn finish_with_marker(mut self, marker: u8) -> Vec<u8> {
        self.write_opcode(Opcode::ShortBlock);
        self.out.push(marker);
        self.out
    }

    /// The stream so far, without end marker (i.e. a truncated stream).
    pub fn into_unterminated(self) -> Vec<u8> {
        self.out
    }
}

/// Search window of [`pack`].
pub const DEFAULT_PACK_WINDOW: usize = 0x1000;

/// Packs `data` greedily with a search window of [`DEFAULT_PACK_WINDOW`] bytes.
pub fn pack(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    pack_with_window(data, DEFAULT_PACK_WINDOW)
}

/// how many bytes at `pos` repeat the bytes `offset` earlier (overlap allowed)
fn match_length(data: &[u8], pos: usize, offset: usize) -> usize {
    data[pos..]
        .iter()
        .zip(&data[pos - offset..])
        .take_while(|(a, b)| a == b)
        .count()
}

/// longest match within `window`, the closest one on ties
fn longest_match(data: &[u8], pos: usize, window: usize) -> (usize, usize) {
    let mut best = (0, 0);
    for offset in 1..=pos.min(window) {
        let length = match_length(data, pos, offset);
        if length > best.1 {
            best = (offset, length);
        }
    }
    best
}

/// Greedy packer: at each position, the first of these that applies is used
/// 1. block reusing the previous offset
/// 2. short block or block for the longest match
/// 3. single byte (zero, or a match up to 15 bytes back)
/// 4. literal
///
/// Quadratic in `window`; only meant for tests and benchmarks.
pub fn pack_with_window(data: &[u8], window: usize) -> Result<Vec<u8>, EncodeError> {
    let (&first, _) = data.split_first().ok_or(EncodeError::EmptyInput)?;
    let mut builder = StreamBuilder::new(first);
    let mut pos = 1;

    while pos < data.len() {
        let last = builder.last_offset();
        if builder.is_paired() && last > 0 && last <= pos {
            let length = match_length(data, pos, last);
            if length >= VARIABLE_NUMBER_MIN {
                builder.block(last, length)?;
                pos += length;
                continue;
            }
        }

        let (offset, length) = longest_match(data, pos, window);
        if length >= SHORT_BLOCK_MIN_LENGTH {
            if offset <= SHORT_BLOCK_MAX_OFFSET && length <= SHORT_BLOCK_MIN_LENGTH + 1 {
                builder.short_block(offset, length)?;
                pos += length;
                continue;
            }
            if length >= VARIABLE_NUMBER_MIN + length_delta(offset) {
                builder.block(offset, length)?;
                pos += length;
                continue;
            }
        }

        let byte = data[pos];
        let near = (1..=pos.min(SINGLE_BYTE_MAX_OFFSET)).find(|&o| data[pos - o] == byte);
        match (byte, near) {
            (0, _) => {
                builder.single_byte(0)?;
            }
            (_, Some(offset)) => {
                builder.single_byte(offset)?;
            }
            _ => {
                builder.literal(byte);
            }
        }
        pos += 1;
    }
    Ok(builder.finish())
}

/// Random bytes drawn uniformly from `0..alphabet` (small alphabets compress well).
pub fn random_payload(n_bytes: usize, alphabet: u16, seed: u64) -> Vec<u8> {
    assert!((1..=256).contains(&alphabet), "alphabet must be within 1..=256");
    let data_dist = Uniform::from(0..alphabet);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_bytes)
        .map(|_| data_dist.sample(&mut rng) as u8)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decompress::decompress;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_variable_number_table() {
        let table = [
            (2, "00"),
            (3, "10"),
            (4, "0100"),
            (7, "1110"),
            (14, "111100"),
            (170, "01110111011100"),
        ];
        for (value, code) in table {
            assert_eq!(bitstream_to_string(&encode_variable_number(value)), code);
        }
    }

    #[test]
    #[should_panic(expected = "variable length numbers start at 2")]
    fn test_encode_variable_number_too_small() {
        encode_variable_number(1);
    }

    #[test]
    fn test_bits_to_bytes_padding() {
        let bits = create_bitvector(vec![1, 0, 1]);
        assert_eq!(bits_to_bytes(&bits), vec![0b1010_0000]);
    }

    #[test]
    fn test_builder_layout() {
        // literal 'b' -> tag 0b0......., 'b'; end -> bits 110 in the same tag, then 0x00
        let mut s = StreamBuilder::new(b'a');
        s.literal(b'b');
        assert_eq!(s.finish(), vec![b'a', 0b0110_0000, b'b', 0x00]);
    }

    #[test]
    fn test_builder_tag_spill() {
        // 6 literal opcodes and the first two marker bits fill the first tag,
        // the second tag is loaded for the 9th bit, in the middle of the end marker
        let mut s = StreamBuilder::new(0);
        for b in 1..=6 {
            s.literal(b);
        }
        let stream = s.finish();
        assert_eq!(
            stream,
            vec![0, 0b0000_0011, 1, 2, 3, 4, 5, 6, 0b0000_0000, 0x00]
        );
        assert_eq!(decompress(&stream).unwrap(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_builder_errors() {
        let mut s = StreamBuilder::new(0);
        assert_eq!(s.block(0, 4).unwrap_err(), EncodeError::ZeroOffset);
        assert_eq!(
            s.block(10, 3).unwrap_err(),
            EncodeError::LengthNotEncodable {
                length: 3,
                offset: 10
            }
        );
        assert_eq!(
            s.short_block(128, 2).unwrap_err(),
            EncodeError::OffsetOutOfRange {
                offset: 128,
                opcode: "short block"
            }
        );
        assert_eq!(
            s.short_block(5, 4).unwrap_err(),
            EncodeError::LengthNotEncodable {
                length: 4,
                offset: 5
            }
        );
        assert_eq!(
            s.single_byte(16).unwrap_err(),
            EncodeError::OffsetOutOfRange {
                offset: 16,
                opcode: "single byte"
            }
        );
    }

    #[test]
    fn test_pack_empty() {
        assert_eq!(pack(&[]).unwrap_err(), EncodeError::EmptyInput);
    }

    #[test]
    fn test_pack_roundtrip_text() {
        let data = b"she sells sea shells by the sea shore, the shells she sells are sea shells".to_vec();
        let packed = pack(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_pack_roundtrip_random() {
        for seed in 0..10 {
            let data = random_payload(2000, 4, seed);
            assert_eq!(decompress(&pack(&data).unwrap()).unwrap(), data);
        }
    }

    #[test]
    fn test_random_payload_alphabet() {
        let data = random_payload(1000, 3, 42);
        assert!(data.iter().all(|&b| b < 3));
        assert_eq!(data, random_payload(1000, 3, 42));
    }
}
