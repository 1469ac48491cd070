//! File format parsing layer for GEDCOM files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw bytes and the high-level [`GedcomReader`](crate::gedcom::reader::GedcomReader).
//!
//! # Module Organization
//!
//! - [`dialect`]: Detects the GEDCOM version from the raw header prefix
//! - [`line`]: Splits, checks and tokenizes physical lines
//! - [`tree`]: Assembles tokenized lines into the record forest
//! - [`header`]: Validates the `HEAD` record once the forest is built
//!
//! # Architecture
//!
//! ```text
//! raw bytes ─► codec::bom ─► dialect::detect_dialect ─► codec::charset
//!                                                            │
//!                 header::validate ◄── tree::TreeBuilder ◄── line::LineValidator
//!                 (strict only)
//! ```

pub mod dialect;
pub mod header;
pub mod line;
pub mod tree;
