use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Bytes, Lines, Read};
use std::path::Path;

use crate::source::{ByteSource, SourceError};

use super::error::CaptureSourceError;
use super::layout;
use super::reader::{CaptureFormat, detect_format, parse_hex_line};

pub struct CaptureFileSource {
    inner: CaptureReader,
}

enum CaptureReader {
    Raw(Bytes<BufReader<File>>),
    Hex {
        lines: Lines<BufReader<File>>,
        line_no: usize,
        pending: VecDeque<u8>,
    },
}

impl CaptureFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::open_as(path, detect_format(path))
    }

    pub fn open_as(path: &Path, format: CaptureFormat) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        let reader = BufReader::with_capacity(layout::READER_BUFFER_SIZE, file);
        let inner = match format {
            CaptureFormat::Raw => CaptureReader::Raw(reader.bytes()),
            CaptureFormat::Hex => CaptureReader::Hex {
                lines: reader.lines(),
                line_no: 0,
                pending: VecDeque::new(),
            },
        };
        Ok(Self { inner })
    }

    pub fn format(&self) -> CaptureFormat {
        match self.inner {
            CaptureReader::Raw(_) => CaptureFormat::Raw,
            CaptureReader::Hex { .. } => CaptureFormat::Hex,
        }
    }
}

impl ByteSource for CaptureFileSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        next_byte(&mut self.inner).map_err(SourceError::from)
    }
}

fn next_byte(reader: &mut CaptureReader) -> Result<Option<u8>, CaptureSourceError> {
    match reader {
        CaptureReader::Raw(bytes) => Ok(bytes.next().transpose()?),
        CaptureReader::Hex {
            lines,
            line_no,
            pending,
        } => loop {
            if let Some(byte) = pending.pop_front() {
                return Ok(Some(byte));
            }
            let Some(line) = lines.next() else {
                return Ok(None);
            };
            *line_no += 1;
            pending.extend(parse_hex_line(&line?, *line_no)?);
        },
    }
}
