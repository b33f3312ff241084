//! The four aPLib opcodes and the constants of their parameters.
//! Shared by the decoder and the test-support assembler in [`crate::utils`].

/// Longest opcode prefix: `111` selects [`Opcode::SingleByte`].
pub const MAX_PREFIX_BITS: usize = 3;

/// Bits in the offset of a single byte copy.
pub const SINGLE_BYTE_OFFSET_BITS: u32 = 4;
/// Largest distance a single byte copy can reach.
pub const SINGLE_BYTE_MAX_OFFSET: usize = (1 << SINGLE_BYTE_OFFSET_BITS) - 1;

/// Largest distance a short block can reach (7 bits).
pub const SHORT_BLOCK_MAX_OFFSET: usize = 0x7F;
/// Short blocks copy 2 or 3 bytes.
pub const SHORT_BLOCK_MIN_LENGTH: usize = 2;
/// Short block parameter bytes `<= END_MARKER_MAX` end the stream.
pub const END_MARKER_MAX: u8 = 1;

/// Smallest value of a variable length number.
pub const VARIABLE_NUMBER_MIN: usize = 2;

/// Offsets below this get 2 extra bytes of block length.
pub const SHORT_OFFSET_LIMIT: usize = 0x80;
/// Offsets from here on (up to [`FAR_OFFSET_START`]) get 1 extra byte.
pub const MEDIUM_OFFSET_START: usize = 0x500;
/// Offsets from here on get 2 extra bytes again.
pub const FAR_OFFSET_START: usize = 0x7D00;

/// Opcode, selected by a unary prefix in the bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `0`: one raw byte
    Literal,
    /// `10`: back-reference with variable offset and length
    Block,
    /// `110`: back-reference packed into one byte, or end of stream
    ShortBlock,
    /// `111`: one byte from up to 15 bytes back, or a zero byte
    SingleByte,
}

impl Opcode {
    /// Maps the number of leading set bits (0..=3) to the opcode.
    pub fn from_prefix(count: usize) -> Self {
        match count {
            0 => Opcode::Literal,
            1 => Opcode::Block,
            2 => Opcode::ShortBlock,
            _ => Opcode::SingleByte,
        }
    }

    /// The prefix bits of this opcode, in stream order.
    pub fn prefix_bits(self) -> &'static [bool] {
        match self {
            Opcode::Literal => &[false],
            Opcode::Block => &[true, false],
            Opcode::ShortBlock => &[true, true, false],
            Opcode::SingleByte => &[true, true, true],
        }
    }

    /// Short human readable name
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Literal => "literal",
            Opcode::Block => "block",
            Opcode::ShortBlock => "short block",
            Opcode::SingleByte => "single byte",
        }
    }
}

/// Extra length the decoder adds to a block with an explicitly encoded offset.
///
/// Very close and very far matches must be longer to be worth a block,
/// so the encoder stores their length reduced by this amount.
pub fn length_delta(offset: usize) -> usize {
    if offset < SHORT_OFFSET_LIMIT || offset >= FAR_OFFSET_START {
        2
    } else if offset >= MEDIUM_OFFSET_START {
        1
    } else {
        0
    }
}
