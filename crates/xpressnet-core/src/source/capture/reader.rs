use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::CaptureSourceError;
use super::layout;

/// On-disk representation of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    Raw,
    Hex,
}

/// Pick the capture format from the file extension.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use std::path::Path;
///
/// assert_eq!(detect_format(Path::new("bus.hex")), CaptureFormat::Hex);
/// assert_eq!(detect_format(Path::new("bus.bin")), CaptureFormat::Raw);
/// ```
pub fn detect_format(path: &Path) -> CaptureFormat {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if layout::HEX_EXTENSIONS.contains(&ext.as_str()) {
        CaptureFormat::Hex
    } else {
        CaptureFormat::Raw
    }
}

/// Decode the hex byte tokens of one transcript line.
///
/// # Errors
/// Returns `CaptureSourceError::InvalidHex` for tokens that are not one or two
/// hex digits (with an optional `0x` prefix).
pub fn parse_hex_line(line: &str, line_no: usize) -> Result<Vec<u8>, CaptureSourceError> {
    let content = line
        .split_once(layout::HEX_COMMENT)
        .map_or(line, |(before, _)| before);
    content
        .split(|c: char| c.is_whitespace() || layout::HEX_SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .map(|token| parse_hex_token(token, line_no))
        .collect()
}

fn parse_hex_token(token: &str, line_no: usize) -> Result<u8, CaptureSourceError> {
    let digits = layout::HEX_PREFIXES
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix))
        .unwrap_or(token);
    let invalid = || CaptureSourceError::InvalidHex {
        line: line_no,
        token: token.to_string(),
    };
    if digits.is_empty()
        || digits.len() > layout::HEX_TOKEN_MAX_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(invalid());
    }
    u8::from_str_radix(digits, 16).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{CaptureFormat, detect_format, parse_hex_line};
    use crate::source::capture::error::CaptureSourceError;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(detect_format(Path::new("bus.HEX")), CaptureFormat::Hex);
        assert_eq!(detect_format(Path::new("bus.txt")), CaptureFormat::Hex);
        assert_eq!(detect_format(Path::new("bus.bin")), CaptureFormat::Raw);
        assert_eq!(detect_format(Path::new("bus")), CaptureFormat::Raw);
    }

    #[test]
    fn parses_tokens_and_skips_comments() {
        let bytes = parse_hex_line("60 61,0x01 ; 60  # all on", 1).unwrap();
        assert_eq!(bytes, vec![0x60, 0x61, 0x01, 0x60]);
        assert!(parse_hex_line("   # only a comment", 2).unwrap().is_empty());
        assert_eq!(parse_hex_line("a", 3).unwrap(), vec![0x0a]);
    }

    #[test]
    fn rejects_invalid_tokens() {
        for bad in ["zz", "123", "0x", "+1", "-1", "0x+f"] {
            let err = parse_hex_line(bad, 7).unwrap_err();
            match err {
                CaptureSourceError::InvalidHex { line, token } => {
                    assert_eq!(line, 7);
                    assert_eq!(token, bad);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
