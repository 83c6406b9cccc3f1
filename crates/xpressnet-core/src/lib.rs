//! XpressNet core library: message classification and offline bus decoding.
//!
//! The crate is layered like the bus itself. The protocol layer holds the
//! immutable message definition table and the per-frame definition filter
//! that narrows it byte by byte. A sans-IO frame decoder drives that filter
//! over a byte stream. Byte sources (capture files, in-memory slices) feed the
//! analysis layer, which aggregates decoded frames into a deterministic report.
//! All I/O lives in `source`; the protocol layer never touches it.
//!
//! Invariants:
//! - The definition table is static and its order is stable.
//! - Within one frame the candidate set only ever shrinks.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use xpressnet_core::analyze_capture_file;
//! use xpressnet_core::protocols::xpressnet::DecoderConfig;
//!
//! let report = analyze_capture_file(Path::new("bus.hex"), &DecoderConfig::default())?;
//! println!("frames: {}", report.summary.frames_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_capture_file, analyze_source};
pub use source::{ByteSource, CaptureFileSource, CaptureFormat, SliceSource, SourceError};

use protocols::xpressnet::{MessageKind, ParityRule, Version};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Aggregated decoding report with deterministic ordering.
///
/// # Examples
/// ```
/// use xpressnet_core::make_stub_report;
///
/// let report = make_stub_report("bus.hex", 12);
/// assert_eq!(report.report_version, xpressnet_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    /// Decoder settings the stream was read with.
    pub config: ConfigInfo,
    pub summary: StreamSummary,
    /// Identified kinds with counts, in table order.
    pub kinds: Vec<KindSummary>,
    /// Per call address totals, ascending by address.
    pub addresses: Vec<AddressSummary>,
    /// Rejection counts per reason id, ascending by id.
    pub rejection_counts: Vec<RejectionCount>,
    /// Decoded frames in stream order.
    pub frames: Vec<FrameSummary>,
    /// Dropped frame attempts in stream order.
    pub rejections: Vec<RejectionSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use xpressnet_core::{CaptureFormat, InputInfo};
///
/// let input = InputInfo {
///     path: "bus.hex".to_string(),
///     format: Some(CaptureFormat::Hex),
///     bytes: 42,
/// };
/// assert_eq!(input.bytes, 42);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Capture encoding, when read from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CaptureFormat>,
    /// Bus bytes consumed by the decoder (not the file size).
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub parity: ParityRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<Version>,
}

/// Stream totals.
///
/// `frames_total` is `identified + ambiguous`; rejected attempts are counted
/// separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamSummary {
    pub frames_total: u64,
    /// Frames with exactly one surviving kind.
    pub identified: u64,
    /// Frames whose length resolved but more than one kind survived.
    pub ambiguous: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: MessageKind,
    pub count: u64,
}

/// Traffic seen on one call address.
///
/// # Examples
/// ```
/// use xpressnet_core::AddressSummary;
///
/// let summary = AddressSummary {
///     address: 0,
///     broadcast: true,
///     frames: 3,
///     bytes: 12,
/// };
/// assert!(summary.broadcast);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSummary {
    pub address: u8,
    /// Address 0 is the broadcast address.
    pub broadcast: bool,
    pub frames: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionCount {
    /// Stable reason identifier (e.g., `XN-PARITY`).
    pub id: String,
    pub count: u64,
}

/// One decoded frame.
///
/// # Examples
/// ```
/// use xpressnet_core::FrameSummary;
/// use xpressnet_core::protocols::xpressnet::MessageKind;
///
/// let frame = FrameSummary {
///     offset: 0,
///     address: 1,
///     kinds: vec![MessageKind::NormalRequest],
///     bytes: "41".to_string(),
///     has_checksum: false,
/// };
/// assert_eq!(frame.kinds.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Stream offset of the call byte.
    pub offset: u64,
    pub address: u8,
    /// Surviving kinds; more than one means the frame stayed ambiguous.
    pub kinds: Vec<MessageKind>,
    /// Frame bytes as lowercase hex pairs.
    pub bytes: String,
    /// Whether the last byte is an (unverified) checksum.
    pub has_checksum: bool,
}

/// One dropped frame attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionSummary {
    pub offset: u64,
    /// Stable reason identifier (e.g., `XN-TRUNCATED`).
    pub id: String,
    /// Human-readable message explaining the rejection.
    pub message: String,
    /// Discarded bytes as lowercase hex pairs.
    pub bytes: String,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use xpressnet_core::make_stub_report;
///
/// let report = make_stub_report("bus.bin", 0);
/// assert_eq!(report.tool.name, "xpressnet");
/// assert!(report.frames.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "xpressnet".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            format: None,
            bytes: input_bytes,
        },
        config: ConfigInfo::default(),
        summary: StreamSummary::default(),
        kinds: vec![],
        addresses: vec![],
        rejection_counts: vec![],
        frames: vec![],
        rejections: vec![],
    }
}
