use std::collections::BTreeMap;

use crate::protocols::xpressnet::RejectedFrame;
use crate::{RejectionCount, RejectionSummary};

use super::format_hex;

#[derive(Debug, Default)]
pub(crate) struct RejectionStats {
    pub rejections: Vec<RejectionSummary>,
    pub by_id: BTreeMap<&'static str, u64>,
}

pub(crate) fn add_rejection(stats: &mut RejectionStats, rejected: &RejectedFrame) {
    let id = rejected.error.id();
    *stats.by_id.entry(id).or_default() += 1;
    stats.rejections.push(RejectionSummary {
        offset: rejected.offset,
        id: id.to_string(),
        message: rejected.error.to_string(),
        bytes: format_hex(&rejected.bytes),
    });
}

pub(crate) fn build_rejection_counts(by_id: &BTreeMap<&'static str, u64>) -> Vec<RejectionCount> {
    by_id
        .iter()
        .map(|(id, count)| RejectionCount {
            id: id.to_string(),
            count: *count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RejectionStats, add_rejection, build_rejection_counts};
    use crate::protocols::xpressnet::{FilterRejection, FrameError, ParityRule, RejectedFrame};

    #[test]
    fn rejections_are_recorded_and_counted_by_id() {
        let mut stats = RejectionStats::default();
        let parity = RejectedFrame {
            offset: 4,
            bytes: vec![0x40],
            error: FrameError::Filter(FilterRejection::Parity {
                call: 0x40,
                rule: ParityRule::Even,
            }),
        };
        let truncated = RejectedFrame {
            offset: 9,
            bytes: vec![0x60, 0x61],
            error: FrameError::Truncated {
                needed: 4,
                actual: 2,
            },
        };
        add_rejection(&mut stats, &truncated);
        add_rejection(&mut stats, &parity);
        add_rejection(&mut stats, &parity);

        assert_eq!(stats.rejections.len(), 3);
        assert_eq!(stats.rejections[0].id, "XN-TRUNCATED");
        assert_eq!(stats.rejections[0].bytes, "60 61");
        assert_eq!(stats.rejections[1].message, "call byte 0x40 violates even parity");

        let counts = build_rejection_counts(&stats.by_id);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].id, "XN-PARITY");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].id, "XN-TRUNCATED");
    }
}
