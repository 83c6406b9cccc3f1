//! Capture file source implementation.
//!
//! A capture is either a raw dump of bus bytes or a hex text transcript (one
//! or more hex byte tokens per line, `#` comments). This module handles file
//! I/O and tokenizing, emitting bytes for the analysis pipeline.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::CaptureFileSource;
pub use reader::CaptureFormat;
