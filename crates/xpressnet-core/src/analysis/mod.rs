use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::protocols::xpressnet::{DecoderConfig, FrameDecoder, FrameEvent};
use crate::source::{ByteSource, CaptureFileSource, SourceError};
use crate::{ConfigInfo, Report, StreamSummary, make_stub_report};

mod frames;
mod rejections;

use frames::{FrameStats, add_frame, build_address_summaries, build_kind_summaries};
use rejections::{RejectionStats, add_rejection, build_rejection_counts};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_capture_file(path: &Path, config: &DecoderConfig) -> Result<Report, AnalysisError> {
    let source = CaptureFileSource::open(path)?;
    let format = source.format();
    let mut report = analyze_source(path, source, config)?;
    report.input.format = Some(format);
    Ok(report)
}

pub fn analyze_source<S: ByteSource>(
    path: &Path,
    mut source: S,
    config: &DecoderConfig,
) -> Result<Report, AnalysisError> {
    let mut decoder = FrameDecoder::new(*config);
    let mut frame_stats = FrameStats::default();
    let mut rejection_stats = RejectionStats::default();

    while let Some(byte) = source.next_byte()? {
        if let Some(event) = decoder.push(byte) {
            record(&mut frame_stats, &mut rejection_stats, &event);
        }
    }
    if let Some(event) = decoder.finish() {
        record(&mut frame_stats, &mut rejection_stats, &event);
    }

    let mut report = make_stub_report(&path.display().to_string(), decoder.position());
    report.config = ConfigInfo {
        parity: config.parity,
        protocol_version: config.protocol_version,
    };
    report.summary = StreamSummary {
        frames_total: frame_stats.frames.len() as u64,
        identified: frame_stats.identified,
        ambiguous: frame_stats.ambiguous,
        rejected: rejection_stats.rejections.len() as u64,
    };
    debug!(
        bytes = decoder.position(),
        frames = report.summary.frames_total,
        rejected = report.summary.rejected,
        "stream analyzed"
    );

    report.kinds = build_kind_summaries(&frame_stats.kinds);
    report.addresses = build_address_summaries(&frame_stats.addresses);
    report.rejection_counts = build_rejection_counts(&rejection_stats.by_id);
    report.frames = frame_stats.frames;
    report.rejections = rejection_stats.rejections;
    Ok(report)
}

fn record(frames: &mut FrameStats, rejections: &mut RejectionStats, event: &FrameEvent) {
    match event {
        FrameEvent::Frame(frame) => add_frame(frames, frame),
        FrameEvent::Rejected(rejected) => add_rejection(rejections, rejected),
    }
}

/// Lowercase hex pairs separated by single spaces.
pub(crate) fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{analyze_source, format_hex};
    use crate::protocols::xpressnet::{DecoderConfig, MessageKind, ParityRule, Version};
    use crate::source::SliceSource;

    #[test]
    fn hex_formatting() {
        assert_eq!(format_hex(&[]), "");
        assert_eq!(format_hex(&[0x0A, 0xFF, 0x00]), "0a ff 00");
    }

    #[test]
    fn summarizes_mixed_stream() {
        // request, parity error, feedback broadcast, truncated broadcast
        let bytes = [0x41, 0x40, 0xA0, 0x42, 0x12, 0x34, 0x64, 0x60, 0x61];
        let report = analyze_source(
            Path::new("bus.hex"),
            SliceSource::new(&bytes),
            &DecoderConfig::default(),
        )
        .unwrap();

        assert_eq!(report.input.bytes, 9);
        assert_eq!(report.input.format, None);
        assert_eq!(report.summary.frames_total, 2);
        assert_eq!(report.summary.identified, 2);
        assert_eq!(report.summary.ambiguous, 0);
        assert_eq!(report.summary.rejected, 2);

        let kinds: Vec<_> = report.kinds.iter().map(|k| k.kind).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::NormalRequest, MessageKind::BroadcastFeedback]
        );
        assert_eq!(report.frames[1].bytes, "a0 42 12 34 64");
        assert!(report.frames[1].has_checksum);

        assert_eq!(report.rejections[0].offset, 1);
        assert_eq!(report.rejections[0].id, "XN-PARITY");
        assert_eq!(report.rejections[1].offset, 7);
        assert_eq!(report.rejections[1].id, "XN-TRUNCATED");

        let ids: Vec<_> = report
            .rejection_counts
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["XN-PARITY", "XN-TRUNCATED"]);
    }

    #[test]
    fn config_is_echoed_into_report() {
        let config = DecoderConfig {
            parity: ParityRule::Odd,
            protocol_version: Some(Version::new(3, 6)),
        };
        let report = analyze_source(Path::new("empty"), SliceSource::new(&[]), &config).unwrap();
        assert_eq!(report.config.parity, ParityRule::Odd);
        assert_eq!(report.config.protocol_version, Some(Version::new(3, 6)));
        assert_eq!(report.summary.frames_total, 0);
        assert!(report.frames.is_empty());
    }
}
