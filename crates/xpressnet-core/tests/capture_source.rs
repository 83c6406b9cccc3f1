use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use xpressnet_core::protocols::xpressnet::{DecoderConfig, MessageKind};
use xpressnet_core::{
    AnalysisError, ByteSource, CaptureFileSource, CaptureFormat, SourceError,
    analyze_capture_file,
};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn temp_path(name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("xpressnet_{unique}_{name}"))
}

fn drain(source: &mut impl ByteSource) -> Result<Vec<u8>, SourceError> {
    let mut bytes = Vec::new();
    while let Some(byte) = source.next_byte()? {
        bytes.push(byte);
    }
    Ok(bytes)
}

#[test]
fn hex_source_reads_bytes_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("bus_basic")
        .join("input.hex");
    let mut source = CaptureFileSource::open(&path).unwrap();
    assert_eq!(source.format(), CaptureFormat::Hex);

    let bytes = drain(&mut source).unwrap();
    assert_eq!(bytes.len(), 19);
    assert_eq!(&bytes[..2], &[0x41, 0x81]);
}

#[test]
fn raw_source_reads_binary_file() {
    let path = temp_path("raw.bin");
    fs::write(&path, [0x60, 0x81, 0x00, 0x00, 0xE1]).unwrap();

    let mut source = CaptureFileSource::open(&path).unwrap();
    let format = source.format();
    let bytes = drain(&mut source);
    let report = analyze_capture_file(&path, &DecoderConfig::default());
    let _ = fs::remove_file(&path);

    assert_eq!(format, CaptureFormat::Raw);
    assert_eq!(bytes.unwrap(), vec![0x60, 0x81, 0x00, 0x00, 0xE1]);
    let report = report.unwrap();
    assert_eq!(report.input.format, Some(CaptureFormat::Raw));
    assert_eq!(report.kinds[0].kind, MessageKind::BroadcastAllLocoOff);
}

#[test]
fn hex_source_reports_line_of_invalid_token() {
    let path = temp_path("broken.hex");
    fs::write(&path, "41\n# fine\n60 zz\n").unwrap();

    let mut source = CaptureFileSource::open(&path).unwrap();
    let result = drain(&mut source);
    let _ = fs::remove_file(&path);

    match result {
        Err(SourceError::Hex { line, token }) => {
            assert_eq!(line, 3);
            assert_eq!(token, "zz");
        }
        other => panic!("expected hex error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let path = temp_path("missing.hex");
    let err = match CaptureFileSource::open(&path) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn analysis_reports_io_failures_through_source_error() {
    let path = temp_path("absent.bin");
    let err = analyze_capture_file(&path, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Source(SourceError::Io(_))));
    assert!(err.to_string().starts_with("Source error: I/O error:"));
}
