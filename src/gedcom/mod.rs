//! Core GEDCOM reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
pub mod utils;

pub use reader::GedcomReader;
pub use types::error::{ErrorCategory, GedcomError, HeaderError, Result, StructuralKind};
