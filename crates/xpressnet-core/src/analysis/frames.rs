use std::collections::BTreeMap;

use crate::protocols::xpressnet::{Frame, MessageKind};
use crate::{AddressSummary, FrameSummary, KindSummary};

use super::format_hex;

#[derive(Debug, Default)]
pub(crate) struct FrameStats {
    pub frames: Vec<FrameSummary>,
    pub identified: u64,
    pub ambiguous: u64,
    pub kinds: BTreeMap<MessageKind, u64>,
    pub addresses: BTreeMap<u8, AddressStats>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct AddressStats {
    pub frames: u64,
    pub bytes: u64,
}

pub(crate) fn add_frame(stats: &mut FrameStats, frame: &Frame) {
    let bytes = frame.bytes();
    match frame.kind() {
        Some(kind) => {
            stats.identified += 1;
            *stats.kinds.entry(kind).or_default() += 1;
        }
        None => stats.ambiguous += 1,
    }

    let address = stats.addresses.entry(frame.address).or_default();
    address.frames += 1;
    address.bytes += bytes.len() as u64;

    stats.frames.push(FrameSummary {
        offset: frame.offset,
        address: frame.address,
        kinds: frame.kinds.clone(),
        bytes: format_hex(&bytes),
        has_checksum: frame.checksum.is_some(),
    });
}

pub(crate) fn build_kind_summaries(kinds: &BTreeMap<MessageKind, u64>) -> Vec<KindSummary> {
    kinds
        .iter()
        .map(|(kind, count)| KindSummary {
            kind: *kind,
            count: *count,
        })
        .collect()
}

pub(crate) fn build_address_summaries(addresses: &BTreeMap<u8, AddressStats>) -> Vec<AddressSummary> {
    addresses
        .iter()
        .map(|(address, stats)| AddressSummary {
            address: *address,
            broadcast: *address == 0,
            frames: stats.frames,
            bytes: stats.bytes,
        })
        .collect()
}
