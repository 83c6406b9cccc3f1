//! Byte-stream framing on top of [`DefinitionFilter`].
//!
//! The decoder is sans-IO: callers push bytes as they arrive and receive a
//! [`FrameEvent`] whenever a frame completes or an attempt is dropped. Frame
//! boundaries come from the surviving definitions (header, identifier, data
//! count, checksum trailer). Checksums are carried through unverified.
//!
//! On any rejection the bytes of the attempt are reported and discarded, and
//! the next byte is treated as a new call byte.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::definitions::{MessageDefinition, MessageKind, Version};
use super::error::{FilterRejection, FrameError};
use super::filter::DefinitionFilter;
use super::reader::{HeaderByte, ParityRule};

/// Decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub parity: ParityRule,
    /// Command station version; definitions outside their window are dropped.
    pub protocol_version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Stream offset of the call byte.
    pub offset: u64,
    pub call_byte: u8,
    pub address: u8,
    pub header: Option<u8>,
    pub body: Vec<u8>,
    pub checksum: Option<u8>,
    /// Kinds still consistent with the frame, in table order.
    pub kinds: Vec<MessageKind>,
}

impl Frame {
    pub fn kind(&self) -> Option<MessageKind> {
        match self.kinds.as_slice() {
            [kind] => Some(*kind),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.body.len() + 1);
        bytes.push(self.call_byte);
        bytes.extend(self.header);
        bytes.extend_from_slice(&self.body);
        bytes.extend(self.checksum);
        bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFrame {
    pub offset: u64,
    pub bytes: Vec<u8>,
    pub error: FrameError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    Frame(Frame),
    Rejected(RejectedFrame),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Header,
    Identifier,
    Collect {
        header_len: usize,
        body_len: usize,
        trailer_len: usize,
    },
}

impl State {
    fn total_len(self) -> Option<usize> {
        match self {
            State::Collect {
                header_len,
                body_len,
                trailer_len,
            } => Some(1 + header_len + body_len + trailer_len),
            _ => None,
        }
    }
}

/// Incremental XpressNet frame decoder.
///
/// # Examples
/// ```
/// use xpressnet_core::protocols::xpressnet::{DecoderConfig, FrameDecoder, FrameEvent, MessageKind};
///
/// let mut decoder = FrameDecoder::new(DecoderConfig::default());
/// let events: Vec<_> = [0x60, 0x81, 0x00, 0x00, 0xE1]
///     .into_iter()
///     .filter_map(|byte| decoder.push(byte))
///     .collect();
/// match events.as_slice() {
///     [FrameEvent::Frame(frame)] => {
///         assert_eq!(frame.kind(), Some(MessageKind::BroadcastAllLocoOff));
///     }
///     other => panic!("unexpected events: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    config: DecoderConfig,
    filter: DefinitionFilter,
    state: State,
    buffer: Vec<u8>,
    kinds: Vec<MessageKind>,
    position: u64,
    frame_start: u64,
}

impl FrameDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            filter: DefinitionFilter::with_parity(config.parity),
            state: State::Idle,
            buffer: Vec::new(),
            kinds: Vec::new(),
            position: 0,
            frame_start: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn push(&mut self, byte: u8) -> Option<FrameEvent> {
        if self.state == State::Idle {
            self.buffer.clear();
            self.frame_start = self.position;
        }
        self.buffer.push(byte);
        self.position += 1;

        match self.state {
            State::Idle => self.on_call(byte),
            State::Header => self.on_header(byte),
            State::Identifier => self.on_identifier(byte),
            State::Collect { .. } => self.collect(),
        }
    }

    /// Flushes an unfinished frame attempt as truncated.
    pub fn finish(&mut self) -> Option<FrameEvent> {
        if self.state == State::Idle {
            return None;
        }
        let actual = self.buffer.len();
        let needed = self.state.total_len().unwrap_or(actual + 1);
        Some(self.reject(FrameError::Truncated { needed, actual }))
    }

    fn on_call(&mut self, call_byte: u8) -> Option<FrameEvent> {
        self.filter.reset();
        self.filter.filter_call(call_byte);
        if let Some(version) = self.config.protocol_version {
            self.filter.filter_version(version);
        }
        if self.filter.is_exhausted() {
            return Some(self.reject_from_filter());
        }

        if self.filter.candidates().iter().any(|d| d.header.is_some()) {
            self.state = State::Header;
            return None;
        }
        self.resolve_shape(None)
    }

    fn on_header(&mut self, header_byte: u8) -> Option<FrameEvent> {
        let call_byte = self.buffer[0];
        self.filter.filter_header(header_byte, call_byte);
        self.filter.filter_header_value(header_byte);
        if self.filter.is_exhausted() {
            return Some(self.reject_from_filter());
        }

        // The first body byte must satisfy every declared identifier, even
        // when a single definition is left.
        if self.filter.candidates().iter().any(|d| d.identifier.is_some()) {
            self.state = State::Identifier;
            return None;
        }
        self.resolve_shape(Some(header_byte))
    }

    fn on_identifier(&mut self, identifier_byte: u8) -> Option<FrameEvent> {
        self.filter.filter_identifier(identifier_byte);
        if self.filter.is_exhausted() {
            return Some(self.reject_from_filter());
        }
        let header_byte = self.buffer[1];
        self.resolve_shape(Some(header_byte))
    }

    fn resolve_shape(&mut self, header_byte: Option<u8>) -> Option<FrameEvent> {
        let mut survivors: Vec<&MessageDefinition> = self.filter.candidates().iter().collect();
        let first = shape(survivors[0], header_byte);
        if survivors.iter().any(|d| shape(d, header_byte) != first) {
            if let Some(header_byte) = header_byte {
                let announced = HeaderByte(header_byte).data_length() as usize;
                survivors.retain(|d| d.body_len(header_byte) == announced);
            } else {
                survivors.clear();
            }
        }

        let agreed = survivors.first().map(|d| shape(d, header_byte));
        let (body_len, trailer_len) = match agreed {
            Some(agreed) if survivors.iter().all(|d| shape(d, header_byte) == agreed) => agreed,
            _ => {
                let kinds = self.filter.candidates().iter().map(|d| d.kind).collect();
                return Some(self.reject(FrameError::AmbiguousLength { kinds }));
            }
        };

        self.kinds = survivors.iter().map(|d| d.kind).collect();
        self.state = State::Collect {
            header_len: usize::from(header_byte.is_some()),
            body_len,
            trailer_len,
        };
        self.collect()
    }

    fn collect(&mut self) -> Option<FrameEvent> {
        let total = self.state.total_len()?;
        match self.buffer.len().cmp(&total) {
            std::cmp::Ordering::Less => None,
            std::cmp::Ordering::Equal => Some(self.complete()),
            std::cmp::Ordering::Greater => {
                let kinds = std::mem::take(&mut self.kinds);
                Some(self.reject(FrameError::AmbiguousLength { kinds }))
            }
        }
    }

    fn complete(&mut self) -> FrameEvent {
        let State::Collect {
            header_len,
            body_len,
            trailer_len,
        } = self.state
        else {
            unreachable!("complete called outside collect state");
        };
        let bytes = std::mem::take(&mut self.buffer);
        let body_start = 1 + header_len;
        let frame = Frame {
            offset: self.frame_start,
            call_byte: bytes[0],
            address: self.filter.get_call_address(),
            header: (header_len > 0).then(|| bytes[1]),
            body: bytes[body_start..body_start + body_len].to_vec(),
            checksum: (trailer_len > 0).then(|| bytes[bytes.len() - 1]),
            kinds: std::mem::take(&mut self.kinds),
        };
        debug!(
            offset = frame.offset,
            kinds = ?frame.kinds,
            len = bytes.len(),
            "decoded frame"
        );
        self.state = State::Idle;
        FrameEvent::Frame(frame)
    }

    fn reject_from_filter(&mut self) -> FrameEvent {
        let rejection = self
            .filter
            .rejection()
            .cloned()
            .unwrap_or(FilterRejection::NoMatchingCall {
                call: self.buffer[0],
            });
        self.reject(rejection.into())
    }

    fn reject(&mut self, error: FrameError) -> FrameEvent {
        debug!(offset = self.frame_start, %error, "dropped frame attempt");
        self.state = State::Idle;
        self.kinds.clear();
        FrameEvent::Rejected(RejectedFrame {
            offset: self.frame_start,
            bytes: std::mem::take(&mut self.buffer),
            error,
        })
    }
}

fn shape(definition: &MessageDefinition, header_byte: Option<u8>) -> (usize, usize) {
    let body_len = match header_byte {
        Some(header_byte) => definition.body_len(header_byte),
        None => {
            definition.data_byte_count.max(0) as usize
                + usize::from(definition.identifier.is_some())
        }
    };
    (body_len, definition.trailer_len())
}

#[cfg(test)]
mod tests {
    use super::{DecoderConfig, Frame, FrameDecoder, FrameEvent, RejectedFrame};
    use crate::protocols::xpressnet::definitions::{MessageKind, Version};
    use crate::protocols::xpressnet::error::{FilterRejection, FrameError, HeaderAnomaly};

    fn decode(config: DecoderConfig, bytes: &[u8]) -> Vec<FrameEvent> {
        let mut decoder = FrameDecoder::new(config);
        let mut events: Vec<_> = bytes.iter().filter_map(|b| decoder.push(*b)).collect();
        events.extend(decoder.finish());
        events
    }

    fn single_frame(bytes: &[u8]) -> Frame {
        match decode(DecoderConfig::default(), bytes).as_slice() {
            [FrameEvent::Frame(frame)] => frame.clone(),
            other => panic!("expected one frame, got {other:?}"),
        }
    }

    fn single_rejection(bytes: &[u8]) -> RejectedFrame {
        match decode(DecoderConfig::default(), bytes).as_slice() {
            [FrameEvent::Rejected(rejected)] => rejected.clone(),
            other => panic!("expected one rejection, got {other:?}"),
        }
    }

    #[test]
    fn call_only_frame() {
        let frame = single_frame(&[0b0100_0001]);
        assert_eq!(frame.kind(), Some(MessageKind::NormalRequest));
        assert_eq!(frame.address, 1);
        assert_eq!(frame.header, None);
        assert!(frame.body.is_empty());
        assert_eq!(frame.checksum, None);
    }

    #[test]
    fn broadcast_header_resolved_by_announced_length() {
        let frame = single_frame(&[0x60, 0x61, 0x01, 0x60]);
        assert_eq!(
            frame.kinds,
            vec![MessageKind::BroadcastAllOn, MessageKind::BroadcastAllOff]
        );
        assert_eq!(frame.kind(), None);
        assert_eq!(frame.body, vec![0x01]);
        assert_eq!(frame.checksum, Some(0x60));
        assert_eq!(frame.bytes(), vec![0x60, 0x61, 0x01, 0x60]);
    }

    #[test]
    fn feedback_frames() {
        let plain = single_frame(&[0xA0, 0x42, 0x12, 0x34, 0x64]);
        assert_eq!(plain.kind(), Some(MessageKind::BroadcastFeedback));
        assert_eq!(plain.body, vec![0x12, 0x34]);

        let extended = single_frame(&[0xA0, 0x43, 0x01, 0x02, 0x03, 0x43]);
        assert_eq!(extended.kind(), Some(MessageKind::BroadcastFeedbackExtended));
        assert_eq!(extended.body, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn identifier_selects_loco_info() {
        let frame = single_frame(&[0x63, 0xE4, 0x04, 0x05, 0x06, 0x07, 0xE6]);
        assert_eq!(frame.kind(), Some(MessageKind::LocoInfoNormalV30));
        assert_eq!(frame.address, 3);
        assert_eq!(frame.body, vec![0x04, 0x05, 0x06, 0x07]);
        assert_eq!(frame.checksum, Some(0xE6));
    }

    #[test]
    fn resynchronizes_after_parity_error() {
        let events = decode(DecoderConfig::default(), &[0x40, 0x41]);
        assert_eq!(events.len(), 2);
        match &events[0] {
            FrameEvent::Rejected(rejected) => {
                assert_eq!(rejected.offset, 0);
                assert_eq!(rejected.bytes, vec![0x40]);
                assert!(matches!(
                    rejected.error,
                    FrameError::Filter(FilterRejection::Parity { .. })
                ));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        match &events[1] {
            FrameEvent::Frame(frame) => {
                assert_eq!(frame.offset, 1);
                assert_eq!(frame.kind(), Some(MessageKind::NormalRequest));
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn truncated_frame_on_finish() {
        let rejected = single_rejection(&[0x60, 0x61]);
        assert_eq!(
            rejected.error,
            FrameError::Truncated {
                needed: 4,
                actual: 2
            }
        );
        assert_eq!(rejected.bytes, vec![0x60, 0x61]);
    }

    #[test]
    fn truncated_before_header() {
        let rejected = single_rejection(&[0x60]);
        assert_eq!(
            rejected.error,
            FrameError::Truncated {
                needed: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn version_config_narrows_shared_header() {
        let bytes = [0xE1, 0x62, 0x05, 0x00, 0x87];
        let unversioned = single_frame(&bytes);
        assert_eq!(
            unversioned.kinds,
            vec![MessageKind::SoftwareVersionReport23, MessageKind::StateLZ]
        );

        let config = DecoderConfig {
            protocol_version: Some(Version::new(3, 6)),
            ..DecoderConfig::default()
        };
        match decode(config, &bytes).as_slice() {
            [FrameEvent::Frame(frame)] => assert_eq!(frame.kind(), Some(MessageKind::StateLZ)),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let rejected = single_rejection(&[0x63, 0xE3, 0x99]);
        assert_eq!(rejected.bytes, vec![0x63, 0xE3, 0x99]);
        assert_eq!(
            rejected.error,
            FrameError::Filter(FilterRejection::NoMatchingIdentifier { identifier: 0x99 })
        );
    }

    #[test]
    fn lone_survivor_identifier_is_checked() {
        let events = decode(DecoderConfig::default(), &[0xE1, 0xE1, 0x05, 0xE5]);
        match events.as_slice() {
            [FrameEvent::Rejected(first), FrameEvent::Rejected(second)] => {
                assert_eq!(first.offset, 0);
                assert_eq!(first.bytes, vec![0xE1, 0xE1, 0x05]);
                assert_eq!(
                    first.error,
                    FrameError::Filter(FilterRejection::NoMatchingIdentifier { identifier: 0x05 })
                );
                assert_eq!(first.error.id(), "XN-IDENTIFIER");
                // 0xE5 has odd parity and cannot start a new frame
                assert_eq!(second.offset, 3);
                assert_eq!(second.error.id(), "XN-PARITY");
            }
            other => panic!("unexpected events: {other:?}"),
        }

        let frame = single_frame(&[0xE1, 0xE1, 0x82, 0xE2]);
        assert_eq!(frame.kind(), Some(MessageKind::LZErrorsV30));
        assert_eq!(frame.body, vec![0x82]);
    }

    #[test]
    fn unknown_header_is_rejected() {
        let rejected = single_rejection(&[0xE1, 0xFF]);
        assert_eq!(
            rejected.error,
            FrameError::Filter(FilterRejection::NoMatchingHeader { header: 0xFF })
        );
    }

    #[test]
    fn odd_feedback_length_is_rejected() {
        let rejected = single_rejection(&[0xA0, 0x45]);
        assert_eq!(
            rejected.error,
            FrameError::Filter(FilterRejection::Header(
                HeaderAnomaly::UnsupportedFeedbackLength { length: 5 }
            ))
        );
    }

    #[test]
    fn back_to_back_frames_track_offsets() {
        let events = decode(
            DecoderConfig::default(),
            &[0x41, 0xA0, 0x42, 0x00, 0x00, 0x42, 0x81],
        );
        let offsets: Vec<_> = events
            .iter()
            .map(|event| match event {
                FrameEvent::Frame(frame) => frame.offset,
                FrameEvent::Rejected(rejected) => rejected.offset,
            })
            .collect();
        assert_eq!(offsets, vec![0, 1, 6]);
        assert!(events.iter().all(|e| matches!(e, FrameEvent::Frame(_))));
    }
}
