use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout;

/// Parity convention applied to every call byte before any other check.
///
/// XpressNet sets bit 7 so the whole call byte has an even number of one
/// bits. `Odd` exists for buses (and captures) that use the inverted rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityRule {
    #[default]
    Even,
    Odd,
}

impl ParityRule {
    pub fn accepts(self, byte: u8) -> bool {
        let even = byte.count_ones() % 2 == 0;
        match self {
            ParityRule::Even => even,
            ParityRule::Odd => !even,
        }
    }
}

impl fmt::Display for ParityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParityRule::Even => f.write_str("even"),
            ParityRule::Odd => f.write_str("odd"),
        }
    }
}

impl FromStr for ParityRule {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "even" => Ok(ParityRule::Even),
            "odd" => Ok(ParityRule::Odd),
            other => Err(format!("unknown parity rule '{other}' (expected even or odd)")),
        }
    }
}

/// Bit-field view over a call byte (`P CC AAAAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallByte(pub u8);

impl CallByte {
    pub fn parity_bit(self) -> bool {
        self.0 & layout::PARITY_BIT != 0
    }

    pub fn address(self) -> u8 {
        self.0 & layout::ADDRESS_MASK
    }

    pub fn is_broadcast(self) -> bool {
        self.address() == layout::BROADCAST_ADDRESS
    }

    pub fn call_class(self) -> u8 {
        (self.0 & layout::CALL_CLASS_MASK) >> layout::CALL_CLASS_SHIFT
    }
}

/// Bit-field view over a header byte (`TTTT NNNN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderByte(pub u8);

impl HeaderByte {
    pub fn type_nibble(self) -> u8 {
        (self.0 & layout::HEADER_TYPE_MASK) >> layout::HEADER_TYPE_SHIFT
    }

    pub fn data_length(self) -> u8 {
        self.0 & layout::HEADER_LENGTH_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::{CallByte, HeaderByte, ParityRule};

    #[test]
    fn even_rule_accepts_even_popcount() {
        assert!(ParityRule::Even.accepts(0b0100_0001));
        assert!(ParityRule::Even.accepts(0b0000_0000));
        assert!(!ParityRule::Even.accepts(0b0100_0000));
    }

    #[test]
    fn odd_rule_is_inverse() {
        for byte in 0..=u8::MAX {
            assert_ne!(ParityRule::Even.accepts(byte), ParityRule::Odd.accepts(byte));
        }
    }

    #[test]
    fn call_byte_fields() {
        let call = CallByte(0b1110_0011);
        assert!(call.parity_bit());
        assert_eq!(call.call_class(), 0b11);
        assert_eq!(call.address(), 3);
        assert!(!call.is_broadcast());
        assert!(CallByte(0b0110_0000).is_broadcast());
    }

    #[test]
    fn header_byte_nibbles() {
        let header = HeaderByte(0b0100_0011);
        assert_eq!(header.type_nibble(), 0b0100);
        assert_eq!(header.data_length(), 3);
    }

    #[test]
    fn parity_rule_parses_case_insensitive() {
        assert_eq!("Even".parse::<ParityRule>(), Ok(ParityRule::Even));
        assert_eq!("odd".parse::<ParityRule>(), Ok(ParityRule::Odd));
        assert!("none".parse::<ParityRule>().is_err());
    }
}
