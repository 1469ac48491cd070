//! Custom error types for the gedcom-reader crate.

use std::fmt;

use thiserror::Error;

use super::models::{CharacterSet, Dialect, TextCodec};

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum GedcomError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// No attempted codec could decode the byte stream.
    #[error("Encoding error: content cannot be decoded as {codec}")]
    Encoding { codec: TextCodec },

    /// The dialect requires a byte-order mark, but the file has none.
    #[error("No valid BOM found. GEDCOM {dialect} requires a BOM for UTF-8 or UTF-16")]
    MissingBom { dialect: Dialect },

    /// No version marker was found anywhere in the header bytes.
    #[error("Could not determine GEDCOM version from file")]
    DialectUndetected,

    /// The header declares a version that strict mode does not accept.
    #[error("Unsupported GEDCOM version: {declared}. Only 5.5.5 is supported in strict mode")]
    UnsupportedDialect { declared: String },

    /// The line stream violates the structural grammar.
    #[error("{kind}{}", LineSuffix(.line))]
    Structural {
        line: Option<usize>,
        kind: StructuralKind,
    },

    /// The header record is missing or misdeclares required substructure.
    #[error("Invalid header: {0}")]
    Header(#[from] HeaderError),
}

/// A convenience `Result` type alias using the crate's `GedcomError` type.
pub type Result<T> = std::result::Result<T, GedcomError>;

/// Coarse classification of a [`GedcomError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Encoding,
    Dialect,
    Structural,
    HeaderSemantic,
}

impl GedcomError {
    pub(crate) fn structural(line: usize, kind: StructuralKind) -> Self {
        GedcomError::Structural {
            line: Some(line),
            kind,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GedcomError::Io(_) => ErrorCategory::Io,
            GedcomError::Encoding { .. } | GedcomError::MissingBom { .. } => ErrorCategory::Encoding,
            GedcomError::DialectUndetected | GedcomError::UnsupportedDialect { .. } => {
                ErrorCategory::Dialect
            }
            GedcomError::Structural { .. } => ErrorCategory::Structural,
            GedcomError::Header(_) => ErrorCategory::HeaderSemantic,
        }
    }

    /// The 1-based source line the failure is attached to, if it is line-local.
    pub fn line(&self) -> Option<usize> {
        match self {
            GedcomError::Structural { line, .. } => *line,
            GedcomError::Header(HeaderError::ContinuationInHeader { line }) => *line,
            _ => None,
        }
    }
}

/// A structural rule violated by one physical line (or by the line stream as a whole).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralKind {
    #[error("Empty line")]
    EmptyLine,

    #[error("Leading whitespace")]
    LeadingWhitespace,

    #[error("Line exceeds maximum length of {limit}")]
    LineTooLong { limit: usize },

    #[error("Invalid GEDCOM format: {0:?}")]
    Malformed(String),

    #[error("Leading zeros in level number")]
    LeadingZero,

    /// `from` is the deepest level a new line could attach under, `None` before the first record.
    #[error("Skipped level (jumped from {} to {to})", LevelDisplay(.from))]
    SkippedLevel { from: Option<u32>, to: u32 },

    #[error("Duplicate XREF ID: {0}")]
    DuplicateXref(String),

    #[error("{0} tag without parent record")]
    OrphanContinuation(String),

    #[error("No HEAD record found in GEDCOM file")]
    MissingHeader,

    #[error("Multiple HEAD records found")]
    MultipleHeaders,
}

/// A violated rule inside the `HEAD` record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Missing {0} record in header")]
    MissingSection(&'static str),

    #[error("Missing VERS record under GEDC")]
    MissingVersion,

    #[error("Missing FORM record under GEDC")]
    MissingForm,

    #[error("Unsupported GEDCOM form: {0}. Only LINEAGE-LINKED is supported")]
    InvalidForm(String),

    #[error("Missing CHAR record in header")]
    MissingCharset,

    #[error("Unsupported character encoding: {0}")]
    InvalidCharset(String),

    #[error("Invalid encoding for GEDCOM {dialect}: {charset}. Only UTF-8 and UNICODE (UTF-16) are supported")]
    CharsetNotAllowed {
        charset: CharacterSet,
        dialect: Dialect,
    },

    #[error("CONC or CONT tags are not allowed in the basic header{}", LineSuffix(.line))]
    ContinuationInHeader { line: Option<usize> },
}

struct LineSuffix<'a>(&'a Option<usize>);

impl fmt::Display for LineSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(line) => write!(f, " at line {}", line),
            None => Ok(()),
        }
    }
}

struct LevelDisplay<'a>(&'a Option<u32>);

impl fmt::Display for LevelDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(level) => write!(f, "{}", level),
            None => write!(f, "-1"),
        }
    }
}
