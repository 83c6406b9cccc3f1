mod capture;

pub use capture::{CaptureFileSource, CaptureFormat};

use thiserror::Error;

/// Supplies raw bus bytes one at a time, in arrival order.
pub trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex byte '{token}' on line {line}")]
    Hex { line: usize, token: String },
}

impl From<capture::error::CaptureSourceError> for SourceError {
    fn from(value: capture::error::CaptureSourceError) -> Self {
        match value {
            capture::error::CaptureSourceError::Io(err) => SourceError::Io(err),
            capture::error::CaptureSourceError::InvalidHex { line, token } => {
                SourceError::Hex { line, token }
            }
        }
    }
}

/// In-memory byte source.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteSource, SliceSource};

    #[test]
    fn slice_source_yields_bytes_then_none() {
        let mut source = SliceSource::new(&[0x41, 0x60]);
        assert_eq!(source.next_byte().unwrap(), Some(0x41));
        assert_eq!(source.next_byte().unwrap(), Some(0x60));
        assert_eq!(source.next_byte().unwrap(), None);
        assert_eq!(source.next_byte().unwrap(), None);
    }
}
