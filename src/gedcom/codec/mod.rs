//! Codec layer for byte-level text handling.
//!
//! This module provides the encoding primitives used by the GEDCOM
//! format parsers.
//!
//! # Submodules
//!
//! - [`bom`][]: Byte-order-mark detection
//! - [`charset`][]: Decoding bytes to text, with and without fallbacks
//!   (`encoding_rs`)

pub mod bom;
pub mod charset;
