//! Core data structures describing how a GEDCOM file is read.
//!
//! This module defines the closed vocabularies the parser reasons about:
//! - Format dialects and their per-version rules
//! - Declared character sets and the concrete codecs used to decode them
//! - Byte-order marks
//! - Enforcement mode and caller-facing parse options

use std::fmt;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Default number of leading bytes inspected while sniffing the dialect.
pub const HEADER_SCAN_LEN: usize = 5000;

/// One of the supported GEDCOM format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    V40,
    V551,
    V555,
    V70,
    /// A version string that matched none of the above.
    Unknown,
}

impl Dialect {
    /// Maps a `VERS` value onto a dialect. Unrecognised strings yield `Unknown`.
    pub fn from_version(version: &str) -> Self {
        match version.trim() {
            "4.0" => Dialect::V40,
            "5.5.1" => Dialect::V551,
            "5.5.5" => Dialect::V555,
            "7.0" | "7.00" => Dialect::V70,
            _ => Dialect::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::V40 => "4.0",
            Dialect::V551 => "5.5.1",
            Dialect::V555 => "5.5.5",
            Dialect::V70 => "7.0",
            Dialect::Unknown => "unknown",
        }
    }

    /// Maximum line length in characters, excluding the terminator.
    ///
    /// - 4.0 / 5.5.1 / 5.5.5: 255
    /// - 7.0: no limit
    pub fn max_line_length(&self) -> Option<usize> {
        match self {
            Dialect::V70 => None,
            Dialect::V40 | Dialect::V551 | Dialect::V555 | Dialect::Unknown => Some(255),
        }
    }

    /// Whether `HEAD.GEDC.FORM` must be present and equal `LINEAGE-LINKED`.
    pub fn requires_form(&self) -> bool {
        matches!(self, Dialect::V551 | Dialect::V555)
    }

    /// Whether `HEAD.CHAR` must be present.
    pub fn requires_charset(&self) -> bool {
        matches!(self, Dialect::V551 | Dialect::V555)
    }

    /// Whether strict mode rejects files without a byte-order mark.
    pub fn requires_bom(&self) -> bool {
        matches!(self, Dialect::V555)
    }

    /// Whether `CONC`/`CONT` are forbidden directly under `HEAD`.
    pub fn forbids_header_continuations(&self) -> bool {
        matches!(self, Dialect::V555)
    }

    /// Whether `CHAR` is limited to the Unicode encodings.
    pub fn requires_unicode(&self) -> bool {
        matches!(self, Dialect::V555)
    }

    /// Character set assumed when neither a BOM nor a `CHAR` declaration is available.
    pub fn default_charset(&self) -> CharacterSet {
        match self {
            Dialect::V555 | Dialect::V70 => CharacterSet::Utf8,
            Dialect::V40 | Dialect::V551 | Dialect::Unknown => CharacterSet::Ascii,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A character set as declared by `HEAD.CHAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    Ascii,
    Ansel,
    Utf8,
    /// UTF-16, spelled `UNICODE` in GEDCOM.
    Unicode,
    Unknown,
}

impl CharacterSet {
    /// Maps a `CHAR` value (case-insensitive) onto a character set.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "ASCII" => CharacterSet::Ascii,
            "ANSEL" => CharacterSet::Ansel,
            "UTF-8" => CharacterSet::Utf8,
            "UNICODE" => CharacterSet::Unicode,
            _ => CharacterSet::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterSet::Ascii => "ASCII",
            CharacterSet::Ansel => "ANSEL",
            CharacterSet::Utf8 => "UTF-8",
            CharacterSet::Unicode => "UNICODE",
            CharacterSet::Unknown => "unknown",
        }
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self, CharacterSet::Utf8 | CharacterSet::Unicode)
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A byte-order mark found at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bom {
    Utf8,
    Utf16Le,
    Utf16Be,
    None,
}

impl Bom {
    /// Length of the mark in bytes.
    pub fn len(&self) -> usize {
        match self {
            Bom::Utf8 => 3,
            Bom::Utf16Le | Bom::Utf16Be => 2,
            Bom::None => 0,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Bom::None
    }

    /// The character set this mark implies, if any.
    pub fn charset_hint(&self) -> Option<CharacterSet> {
        match self {
            Bom::Utf8 => Some(CharacterSet::Utf8),
            Bom::Utf16Le | Bom::Utf16Be => Some(CharacterSet::Unicode),
            Bom::None => None,
        }
    }

    /// The codec this mark selects, if any.
    pub fn codec(&self) -> Option<TextCodec> {
        match self {
            Bom::Utf8 => Some(TextCodec::Utf8),
            Bom::Utf16Le => Some(TextCodec::Utf16Le),
            Bom::Utf16Be => Some(TextCodec::Utf16Be),
            Bom::None => None,
        }
    }
}

/// A concrete byte-to-text decoder.
///
/// ANSEL has no codec of its own; Latin-1 stands in for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCodec {
    /// 7-bit only; any byte >= 0x80 is a decode failure.
    Ascii,
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Windows-1252, the WHATWG reading of `latin1`.
    Latin1,
}

impl TextCodec {
    pub fn encoding(&self) -> &'static Encoding {
        match self {
            TextCodec::Ascii | TextCodec::Latin1 => WINDOWS_1252,
            TextCodec::Utf8 => UTF_8,
            TextCodec::Utf16Le => UTF_16LE,
            TextCodec::Utf16Be => UTF_16BE,
        }
    }

    pub fn is_utf16(&self) -> bool {
        matches!(self, TextCodec::Utf16Le | TextCodec::Utf16Be)
    }
}

impl fmt::Display for TextCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextCodec::Ascii => f.write_str("ASCII"),
            other => f.write_str(other.encoding().name()),
        }
    }
}

/// How rule violations are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Fail on the first violation.
    #[default]
    Strict,
    /// Skip or repair locally and keep going.
    Relaxed,
}

impl ParseMode {
    pub fn is_strict(&self) -> bool {
        *self == ParseMode::Strict
    }
}

/// Caller-supplied settings for one parse.
///
/// Priority for determining the text encoding (highest → lowest):
/// 1. `charset_override`
/// 2. The byte-order mark
/// 3. The `CHAR` declaration found while sniffing the header
/// 4. UTF-16, if only a UTF-16 codec could read the header
/// 5. [`Dialect::default_charset`]
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub mode: ParseMode,
    pub charset_override: Option<CharacterSet>,
    /// Bytes read from the start of the file for dialect detection.
    pub header_scan_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Strict,
            charset_override: None,
            header_scan_len: HEADER_SCAN_LEN,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn relaxed() -> Self {
        Self {
            mode: ParseMode::Relaxed,
            ..Self::default()
        }
    }

    pub fn with_charset(mut self, charset: CharacterSet) -> Self {
        self.charset_override = Some(charset);
        self
    }

    pub fn with_header_scan_len(mut self, len: usize) -> Self {
        self.header_scan_len = len;
        self
    }
}
