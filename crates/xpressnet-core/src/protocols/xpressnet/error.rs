use thiserror::Error;

use super::definitions::{MessageKind, Version};
use super::reader::ParityRule;

/// Anomalies detected while resolving the feedback broadcast pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderAnomaly {
    #[error("unexpected feedback header type nibble in {header:#04x}")]
    UnexpectedTypeNibble { header: u8 },
    #[error("unsupported feedback data length {length}")]
    UnsupportedFeedbackLength { length: u8 },
}

/// Why the candidate set of a [`DefinitionFilter`](super::filter::DefinitionFilter)
/// became empty.
///
/// # Examples
/// ```
/// use xpressnet_core::protocols::xpressnet::{DefinitionFilter, FilterRejection};
///
/// let mut filter = DefinitionFilter::new();
/// filter.filter_call(0b0100_0000);
/// assert!(matches!(filter.rejection(), Some(FilterRejection::Parity { .. })));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterRejection {
    #[error("call byte {call:#04x} violates {rule} parity")]
    Parity { call: u8, rule: ParityRule },
    #[error("no definition matches call byte {call:#04x}")]
    NoMatchingCall { call: u8 },
    #[error("header mismatch: {0}")]
    Header(#[from] HeaderAnomaly),
    #[error("no definition matches header byte {header:#04x}")]
    NoMatchingHeader { header: u8 },
    #[error("no definition matches identifier byte {identifier:#04x}")]
    NoMatchingIdentifier { identifier: u8 },
    #[error("no definition is valid for protocol version {version}")]
    VersionExcluded { version: Version },
}

impl FilterRejection {
    /// Stable identifier used in reports.
    pub fn id(&self) -> &'static str {
        match self {
            FilterRejection::Parity { .. } => "XN-PARITY",
            FilterRejection::NoMatchingCall { .. } => "XN-CALL",
            FilterRejection::Header(HeaderAnomaly::UnexpectedTypeNibble { .. }) => {
                "XN-FEEDBACK-TYPE"
            }
            FilterRejection::Header(HeaderAnomaly::UnsupportedFeedbackLength { .. }) => {
                "XN-FEEDBACK-LENGTH"
            }
            FilterRejection::NoMatchingHeader { .. } => "XN-HEADER",
            FilterRejection::NoMatchingIdentifier { .. } => "XN-IDENTIFIER",
            FilterRejection::VersionExcluded { .. } => "XN-VERSION",
        }
    }
}

/// Errors reported by the frame decoder for a dropped frame attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error(transparent)]
    Filter(#[from] FilterRejection),
    #[error("ambiguous frame length between {kinds:?}")]
    AmbiguousLength { kinds: Vec<MessageKind> },
    #[error("frame truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
}

impl FrameError {
    pub fn id(&self) -> &'static str {
        match self {
            FrameError::Filter(rejection) => rejection.id(),
            FrameError::AmbiguousLength { .. } => "XN-AMBIGUOUS-LENGTH",
            FrameError::Truncated { .. } => "XN-TRUNCATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },
}

#[cfg(test)]
mod tests {
    use super::{FilterRejection, FrameError, HeaderAnomaly};
    use crate::protocols::xpressnet::reader::ParityRule;

    #[test]
    fn rejection_messages_are_actionable() {
        let err = FilterRejection::Parity {
            call: 0x40,
            rule: ParityRule::Even,
        };
        assert_eq!(err.to_string(), "call byte 0x40 violates even parity");

        let err = FilterRejection::from(HeaderAnomaly::UnsupportedFeedbackLength { length: 5 });
        assert!(err.to_string().contains("unsupported feedback data length 5"));
        assert_eq!(err.id(), "XN-FEEDBACK-LENGTH");
    }

    #[test]
    fn frame_error_ids_delegate_to_filter() {
        let err = FrameError::from(FilterRejection::NoMatchingHeader { header: 0x99 });
        assert_eq!(err.id(), "XN-HEADER");
        assert_eq!(err.to_string(), "no definition matches header byte 0x99");
    }
}
