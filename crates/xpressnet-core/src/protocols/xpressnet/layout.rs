pub const PARITY_BIT: u8 = 0b1000_0000;
pub const CALL_CLASS_MASK: u8 = 0b0110_0000;
pub const CALL_CLASS_SHIFT: u32 = 5;
pub const ADDRESS_MASK: u8 = 0b0001_1111;
pub const BROADCAST_ADDRESS: u8 = 0;
pub const UNKNOWN_ADDRESS: u8 = 255;

pub const HEADER_TYPE_MASK: u8 = 0b1111_0000;
pub const HEADER_LENGTH_MASK: u8 = 0b0000_1111;
pub const HEADER_TYPE_SHIFT: u32 = 4;

pub const FEEDBACK_HEADER_TYPE: u8 = 0b0100;
pub const FEEDBACK_EXTENDED_LENGTH: u8 = 3;

pub const IDENTIFIER_PARTIAL_MASK: u8 = 0b1111_0000;

pub const CHECKSUM_LEN: usize = 1;
