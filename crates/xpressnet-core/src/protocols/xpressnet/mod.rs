//! XpressNet frame identification.
//!
//! The first byte of a frame (call byte, `P CC AAAAA`) carries parity, a
//! two-bit call class and a five-bit address (0 = broadcast). The header byte
//! that usually follows carries a type nibble and a length nibble. Several
//! message kinds share both, so identification is a progressive narrowing of
//! the static definition table: [`DefinitionFilter`] applies one predicate per
//! observed byte, and [`FrameDecoder`] drives it over a byte stream to delimit
//! whole frames.
//!
//! Call bytes use even parity by default ([`ParityRule::Even`]); the gate
//! applies to every call byte regardless of a definition's
//! `requires_parity` flag. Checksum trailers are delimited but not verified.

pub mod decoder;
pub mod definitions;
pub mod error;
pub mod filter;
pub mod layout;
pub mod reader;

pub use decoder::{DecoderConfig, Frame, FrameDecoder, FrameEvent, RejectedFrame};
pub use definitions::{
    Identifier, MessageDefinition, MessageKind, Version, VersionRange, definitions,
};
pub use error::{FilterRejection, FrameError, HeaderAnomaly, VersionParseError};
pub use filter::DefinitionFilter;
pub use reader::{CallByte, HeaderByte, ParityRule};
