//! Static catalogue of XpressNet message shapes.
//!
//! Every entry states the structural contract a frame must satisfy to be read
//! as one [`MessageKind`]: call class, broadcast-ness, header byte, data
//! length, optional identifier byte, version window and checksum trailer.
//! Entries start from [`MessageDefinition::new`] and override only the fields
//! that differ from the defaults, so an absent identifier means "no
//! identifier constraint" rather than an implicit zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::VersionParseError;
use super::layout;
use super::reader::HeaderByte;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    NormalRequest,
    RequestAcknowledge,
    TBD,
    BroadcastAllOn,
    BroadcastAllOff,
    BroadcastAllLocoOff,
    BroadcastProgrammingMode,
    BroadcastFeedback,
    BroadcastFeedbackExtended,
    ServiceValueReport,
    SoftwareVersionReport23,
    SoftwareVersionReport30,
    StateLZ,
    ExtendedVersionInformation,
    PoMEventReport,
    ModelTime,
    TransmissionError,
    LZBusy,
    CommandNotFound,
    SwitchInfo,
    SwitchInfoExtended,
    LocoFreeV15,
    LocoOccupiedV15,
    LocoFreeV23,
    LocoOccupiedV23,
    LocoInfoNormalV30,
    LocoFunctionStateUpperV36,
    LocoFunctionStateUpperUpperV40,
    LocoInfoMultipleLocos,
    LocoInfoMultipleLocosBase,
    LocoInfoDoubleLocos,
    LocoInUseV30,
    LocoFunctionStateF0F12V30,
    LocoFunctionStateF13F28V36,
    LocoFunctionStateF29F68V40,
    LocoInfoSearchV30,
    LZErrorsV30,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Command station firmware / protocol version (`major.minor`).
///
/// # Examples
/// ```
/// use xpressnet_core::protocols::xpressnet::Version;
///
/// let version: Version = "3.6".parse()?;
/// assert_eq!(version, Version::new(3, 6));
/// assert!(Version::new(2, 3) < version);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const MIN: Version = Version::new(0, 0);
    pub const MAX: Version = Version::new(u8::MAX, u8::MAX);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let (major, minor) = trimmed.split_once('.').unwrap_or((trimmed, "0"));
        let parse = |component: &str| {
            component
                .parse::<u8>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: input.to_string(),
                    component: component.to_string(),
                })
        };
        Ok(Version::new(parse(major)?, parse(minor)?))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive version window in which a definition is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: Version,
    pub max: Version,
}

impl VersionRange {
    pub const UNBOUNDED: VersionRange = VersionRange {
        min: Version::MIN,
        max: Version::MAX,
    };

    pub const fn new(min: Version, max: Version) -> Self {
        Self { min, max }
    }

    pub const fn since(min: Version) -> Self {
        Self::new(min, Version::MAX)
    }

    pub const fn until(max: Version) -> Self {
        Self::new(Version::MIN, max)
    }

    pub fn contains(&self, version: Version) -> bool {
        self.min <= version && version <= self.max
    }
}

/// Expected value of the first data byte.
///
/// A partial identifier compares the high nibble only; the low nibble carries
/// payload (speed step mode, error code, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub value: u8,
    pub partial: bool,
}

impl Identifier {
    pub const fn exact(value: u8) -> Self {
        Self {
            value,
            partial: false,
        }
    }

    pub const fn partial(value: u8) -> Self {
        Self {
            value,
            partial: true,
        }
    }

    pub fn matches(&self, byte: u8) -> bool {
        if self.partial {
            byte & layout::IDENTIFIER_PARTIAL_MASK == self.value & layout::IDENTIFIER_PARTIAL_MASK
        } else {
            byte == self.value
        }
    }
}

/// Structural contract for one message kind.
///
/// `data_byte_count` is `-1` for variable-length messages, whose length is
/// read from the low nibble of the header. It never includes the checksum
/// trailer, nor the identifier byte when an identifier is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageDefinition {
    pub kind: MessageKind,
    pub call_byte_value: u8,
    pub requires_parity: bool,
    pub is_broadcast: bool,
    pub header: Option<u8>,
    pub data_byte_count: i8,
    pub identifier: Option<Identifier>,
    pub version_range: VersionRange,
    pub has_trailing_checksum: bool,
}

impl MessageDefinition {
    /// Base definition: no header, identifier or checksum, zero data bytes,
    /// unbounded version range, all flags cleared.
    pub const fn new(kind: MessageKind, call_byte_value: u8) -> Self {
        Self {
            kind,
            call_byte_value,
            requires_parity: false,
            is_broadcast: false,
            header: None,
            data_byte_count: 0,
            identifier: None,
            version_range: VersionRange::UNBOUNDED,
            has_trailing_checksum: false,
        }
    }

    pub fn is_variable_length(&self) -> bool {
        self.data_byte_count < 0
    }

    /// Whether `header_byte` is acceptable for this definition. Variable-length
    /// definitions only fix the type nibble.
    pub fn matches_header(&self, header_byte: u8) -> bool {
        match self.header {
            None => false,
            Some(expected) if self.is_variable_length() => {
                HeaderByte(expected).type_nibble() == HeaderByte(header_byte).type_nibble()
            }
            Some(expected) => expected == header_byte,
        }
    }

    /// Number of bytes between the header and the checksum trailer.
    pub fn body_len(&self, header_byte: u8) -> usize {
        let data = if self.is_variable_length() {
            HeaderByte(header_byte).data_length() as usize
        } else {
            self.data_byte_count as usize
        };
        data + usize::from(self.identifier.is_some())
    }

    pub fn trailer_len(&self) -> usize {
        if self.has_trailing_checksum {
            layout::CHECKSUM_LEN
        } else {
            0
        }
    }
}

use self::MessageKind::*;

static DEFINITIONS: [MessageDefinition; 37] = [
    MessageDefinition {
        requires_parity: true,
        ..MessageDefinition::new(NormalRequest, 0b10)
    },
    MessageDefinition {
        requires_parity: true,
        ..MessageDefinition::new(RequestAcknowledge, 0b00)
    },
    MessageDefinition {
        requires_parity: true,
        ..MessageDefinition::new(TBD, 0b01)
    },
    MessageDefinition {
        is_broadcast: true,
        header: Some(0b0110_0001),
        data_byte_count: 1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastAllOn, 0b11)
    },
    MessageDefinition {
        is_broadcast: true,
        header: Some(0b0110_0001),
        data_byte_count: 1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastAllOff, 0b11)
    },
    MessageDefinition {
        is_broadcast: true,
        header: Some(0b1000_0001),
        data_byte_count: 2,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastAllLocoOff, 0b11)
    },
    MessageDefinition {
        is_broadcast: true,
        header: Some(0b0110_0001),
        data_byte_count: 2,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastProgrammingMode, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        is_broadcast: true,
        header: Some(0b0100_0000),
        data_byte_count: -1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastFeedback, 0b01)
    },
    MessageDefinition {
        is_broadcast: true,
        header: Some(0b0100_0011),
        data_byte_count: 3,
        has_trailing_checksum: true,
        ..MessageDefinition::new(BroadcastFeedbackExtended, 0b01)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0011),
        data_byte_count: 3,
        has_trailing_checksum: true,
        ..MessageDefinition::new(ServiceValueReport, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0010),
        data_byte_count: 2,
        version_range: VersionRange::until(Version::new(2, 3)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(SoftwareVersionReport23, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0011),
        data_byte_count: 3,
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(SoftwareVersionReport30, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0010),
        data_byte_count: 2,
        has_trailing_checksum: true,
        ..MessageDefinition::new(StateLZ, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0111),
        data_byte_count: 7,
        has_trailing_checksum: true,
        ..MessageDefinition::new(ExtendedVersionInformation, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0100),
        data_byte_count: 4,
        has_trailing_checksum: true,
        ..MessageDefinition::new(PoMEventReport, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0100),
        data_byte_count: 4,
        has_trailing_checksum: true,
        ..MessageDefinition::new(ModelTime, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0001),
        data_byte_count: 1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(TransmissionError, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0001),
        data_byte_count: 1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(LZBusy, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0110_0001),
        data_byte_count: 1,
        has_trailing_checksum: true,
        ..MessageDefinition::new(CommandNotFound, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0100_0010),
        data_byte_count: 2,
        has_trailing_checksum: true,
        ..MessageDefinition::new(SwitchInfo, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b0100_0011),
        data_byte_count: 3,
        has_trailing_checksum: true,
        ..MessageDefinition::new(SwitchInfoExtended, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1000_0011),
        data_byte_count: 3,
        version_range: VersionRange::until(Version::new(1, 5)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFreeV15, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1010_0011),
        data_byte_count: 3,
        version_range: VersionRange::until(Version::new(1, 5)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoOccupiedV15, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1000_0100),
        data_byte_count: 4,
        version_range: VersionRange::new(Version::new(2, 0), Version::new(2, 3)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFreeV23, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1010_0100),
        data_byte_count: 4,
        version_range: VersionRange::new(Version::new(2, 0), Version::new(2, 3)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoOccupiedV23, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0100),
        data_byte_count: 3,
        identifier: Some(Identifier::partial(0b0000_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInfoNormalV30, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0011),
        data_byte_count: 2,
        identifier: Some(Identifier::exact(0b0101_0010)),
        version_range: VersionRange::since(Version::new(3, 6)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFunctionStateUpperV36, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0110),
        data_byte_count: 5,
        identifier: Some(Identifier::exact(0b0101_0011)),
        version_range: VersionRange::since(Version::new(4, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFunctionStateUpperUpperV40, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0101),
        data_byte_count: 4,
        identifier: Some(Identifier::partial(0b0001_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInfoMultipleLocos, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0010),
        data_byte_count: 1,
        identifier: Some(Identifier::partial(0b0010_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInfoMultipleLocosBase, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0110),
        data_byte_count: 5,
        identifier: Some(Identifier::partial(0b0110_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInfoDoubleLocos, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0011),
        data_byte_count: 2,
        identifier: Some(Identifier::exact(0b0100_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInUseV30, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0011),
        data_byte_count: 2,
        identifier: Some(Identifier::exact(0b0101_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFunctionStateF0F12V30, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0100),
        data_byte_count: 3,
        identifier: Some(Identifier::exact(0b0101_0001)),
        version_range: VersionRange::since(Version::new(3, 6)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFunctionStateF13F28V36, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0110),
        data_byte_count: 5,
        identifier: Some(Identifier::exact(0b0101_0100)),
        version_range: VersionRange::since(Version::new(4, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoFunctionStateF29F68V40, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0011),
        data_byte_count: 2,
        identifier: Some(Identifier::partial(0b0011_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LocoInfoSearchV30, 0b11)
    },
    MessageDefinition {
        requires_parity: true,
        header: Some(0b1110_0001),
        data_byte_count: 0,
        identifier: Some(Identifier::partial(0b1000_0000)),
        version_range: VersionRange::since(Version::new(3, 0)),
        has_trailing_checksum: true,
        ..MessageDefinition::new(LZErrorsV30, 0b11)
    },
];

/// The complete, ordered definition table.
pub fn definitions() -> &'static [MessageDefinition] {
    &DEFINITIONS
}
