use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex byte '{token}' on line {line}")]
    InvalidHex { line: usize, token: String },
}
