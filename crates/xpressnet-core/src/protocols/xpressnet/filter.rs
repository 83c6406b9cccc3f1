//! Per-frame narrowing of the definition table.
//!
//! A [`DefinitionFilter`] starts from the full table and removes every
//! definition contradicted by the bytes seen so far. The set only ever
//! shrinks until the next [`DefinitionFilter::reset`]. An empty set is the
//! failure signal; the reason is kept in [`DefinitionFilter::rejection`].

use tracing::{trace, warn};

use super::definitions::{MessageDefinition, MessageKind, Version, definitions};
use super::error::{FilterRejection, HeaderAnomaly};
use super::layout;
use super::reader::{CallByte, HeaderByte, ParityRule};

/// Stateful candidate set for one frame.
///
/// # Examples
/// ```
/// use xpressnet_core::protocols::xpressnet::{DefinitionFilter, MessageKind};
///
/// let mut filter = DefinitionFilter::new();
/// filter.filter_call(0b0100_0001);
/// let remaining = filter.remaining_message_definitions();
/// assert_eq!(remaining.len(), 1);
/// assert_eq!(remaining[0].kind, MessageKind::NormalRequest);
/// assert_eq!(filter.get_call_address(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DefinitionFilter {
    candidates: Vec<MessageDefinition>,
    call_address: u8,
    parity: ParityRule,
    rejection: Option<FilterRejection>,
}

impl Default for DefinitionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionFilter {
    pub fn new() -> Self {
        Self::with_parity(ParityRule::default())
    }

    pub fn with_parity(parity: ParityRule) -> Self {
        Self {
            candidates: definitions().to_vec(),
            call_address: layout::UNKNOWN_ADDRESS,
            parity,
            rejection: None,
        }
    }

    /// Restores the full table and forgets the decoded address.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.candidates.extend_from_slice(definitions());
        self.call_address = layout::UNKNOWN_ADDRESS;
        self.rejection = None;
    }

    /// First pass: parity gate, then broadcast and call-class partitions.
    ///
    /// The parity gate applies to every call byte, whatever the surviving
    /// definitions declare in `requires_parity`.
    pub fn filter_call(&mut self, call_byte: u8) {
        let call = CallByte(call_byte);
        if !self.parity.accepts(call_byte) {
            self.reject(FilterRejection::Parity {
                call: call_byte,
                rule: self.parity,
            });
            return;
        }

        self.call_address = call.address();
        let broadcast = call.is_broadcast();
        self.candidates.retain(|d| d.is_broadcast == broadcast);

        let call_value = call.call_class();
        self.candidates.retain(|d| d.call_byte_value == call_value);

        trace!(
            call = call_byte,
            address = self.call_address,
            remaining = self.candidates.len(),
            "filtered definitions by call byte"
        );
        if self.candidates.is_empty() {
            self.rejection = Some(FilterRejection::NoMatchingCall { call: call_byte });
        }
    }

    /// Resolves the plain/extended feedback broadcast pair from the header.
    ///
    /// Does nothing unless the candidates are exactly that pair.
    pub fn filter_header(&mut self, header_byte: u8, call_byte: u8) {
        if !self.is_feedback_pair() {
            return;
        }

        let header = HeaderByte(header_byte);
        if header.type_nibble() != layout::FEEDBACK_HEADER_TYPE {
            warn!(
                header = header_byte,
                call = call_byte,
                "feedback broadcast header has unexpected type nibble"
            );
            self.reject(HeaderAnomaly::UnexpectedTypeNibble {
                header: header_byte,
            });
            return;
        }

        let length = header.data_length();
        let keep = if length == layout::FEEDBACK_EXTENDED_LENGTH {
            MessageKind::BroadcastFeedbackExtended
        } else if length % 2 == 0 {
            MessageKind::BroadcastFeedback
        } else {
            warn!(
                header = header_byte,
                call = call_byte,
                length,
                "feedback broadcast header has unsupported odd length"
            );
            self.reject(HeaderAnomaly::UnsupportedFeedbackLength { length });
            return;
        };
        self.candidates.retain(|d| d.kind == keep);
    }

    /// Keeps definitions whose header accepts `header_byte`.
    pub fn filter_header_value(&mut self, header_byte: u8) {
        self.narrow(
            |d| d.matches_header(header_byte),
            || FilterRejection::NoMatchingHeader {
                header: header_byte,
            },
        );
    }

    /// Keeps definitions whose identifier accepts the first data byte, along
    /// with definitions that declare no identifier.
    pub fn filter_identifier(&mut self, identifier_byte: u8) {
        self.narrow(
            |d| d.identifier.is_none_or(|id| id.matches(identifier_byte)),
            || FilterRejection::NoMatchingIdentifier {
                identifier: identifier_byte,
            },
        );
    }

    /// Keeps definitions valid for the given protocol version.
    pub fn filter_version(&mut self, version: Version) {
        self.narrow(
            |d| d.version_range.contains(version),
            || FilterRejection::VersionExcluded { version },
        );
    }

    pub fn remaining_message_definitions(&self) -> Vec<MessageDefinition> {
        self.candidates.clone()
    }

    pub fn candidates(&self) -> &[MessageDefinition] {
        &self.candidates
    }

    /// The single remaining definition, if identification is complete.
    pub fn identified(&self) -> Option<&MessageDefinition> {
        match self.candidates.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Decoded address of the last call byte, or 255 before `filter_call`.
    pub fn get_call_address(&self) -> u8 {
        self.call_address
    }

    pub fn rejection(&self) -> Option<&FilterRejection> {
        self.rejection.as_ref()
    }

    fn is_feedback_pair(&self) -> bool {
        matches!(
            self.candidates.as_slice(),
            [a, b] if matches!(
                (a.kind, b.kind),
                (MessageKind::BroadcastFeedback, MessageKind::BroadcastFeedbackExtended)
                    | (MessageKind::BroadcastFeedbackExtended, MessageKind::BroadcastFeedback)
            )
        )
    }

    fn narrow<P, R>(&mut self, keep: P, rejection: R)
    where
        P: Fn(&MessageDefinition) -> bool,
        R: FnOnce() -> FilterRejection,
    {
        if self.candidates.is_empty() {
            return;
        }
        self.candidates.retain(|d| keep(d));
        if self.candidates.is_empty() {
            self.rejection = Some(rejection());
        }
    }

    fn reject(&mut self, rejection: impl Into<FilterRejection>) {
        self.candidates.clear();
        self.rejection = Some(rejection.into());
    }
}
