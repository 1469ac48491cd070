//! # gedcom-reader
//!
//! A validating reader for GEDCOM genealogy files.
//! Supports versions 4.0, 5.5.1, 5.5.5 and 7.0, in a strict mode that
//! enforces the 5.5.5 rules and a relaxed mode that recovers locally.
pub mod gedcom;

// Re-export the main types for convenience
pub use gedcom::{
    GedcomReader,
    format::tree::Recovery,
    iter::{ChildrenWithTag, Descendants, TaggedRecords},
    types::{
        error::{ErrorCategory, GedcomError, HeaderError, Result, StructuralKind},
        models::{Bom, CharacterSet, Dialect, ParseMode, ParseOptions, TextCodec},
        record::Record,
    },
};
