//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: bit masks and constants (source of truth)
//! - `reader`: bit-field access and protocol conventions
//! - `definitions`: declarative message catalogue
//! - `filter` / `decoder`: domain-level narrowing and framing
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub mod xpressnet;
