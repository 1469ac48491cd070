//! Dialect detection from the first bytes of a file.
//!
//! The dialect decides how the rest of the file is decoded and validated,
//! but it is itself declared inside the encoded content. Detection therefore
//! works on the raw prefix in two passes:
//!
//! 1. A literal byte scan for `VERS <version>` markers. These are ASCII and
//!    survive any ASCII-compatible encoding untouched.
//! 2. The prefix is decoded with each candidate codec in turn and walked as
//!    GEDCOM lines, looking for `HEAD.GEDC.VERS` by level nesting rather than
//!    by text search. A declaration found here overrides the literal marker.
//!
//! The structural pass also picks up `HEAD.CHAR` and remembers which codec
//! produced a readable header.

use log::{debug, trace};

use crate::gedcom::codec::charset::sniff_codecs;
use crate::gedcom::types::models::{Bom, CharacterSet, Dialect, TextCodec};
use crate::gedcom::utils;

use super::line::{PhysicalLines, split_grammar};

const VERSION_MARKERS: &[(&[u8], Dialect)] = &[
    (b"VERS 4.0", Dialect::V40),
    (b"VERS 5.5.1", Dialect::V551),
    (b"VERS 5.5.5", Dialect::V555),
    // Also matches the `7.00` spelling.
    (b"VERS 7.0", Dialect::V70),
];

/// How a dialect was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Literal,
    Structure,
}

/// Everything learned from the header prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sniffed {
    pub dialect: Option<(Dialect, DetectionSource)>,
    /// `HEAD.CHAR`, if it names a known character set.
    pub declared_charset: Option<CharacterSet>,
    /// The codec under which the header was readable.
    pub codec: Option<TextCodec>,
}

/// Result of walking one decoded prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderScan {
    pub saw_header: bool,
    pub dialect: Option<Dialect>,
    pub charset: Option<CharacterSet>,
}

/// Determines the dialect (and any declared charset) from the raw header prefix.
///
/// `prefix` includes the byte-order mark, if any.
///
/// A `HEAD.GEDC.VERS` declaration found by the structural pass wins over a
/// literal marker naming a different version (e.g. one under `HEAD.SOUR`).
pub fn detect_dialect(prefix: &[u8], bom: Bom) -> Sniffed {
    let literal = scan_literal(prefix);
    let mut sniffed = Sniffed {
        dialect: literal.map(|d| (d, DetectionSource::Literal)),
        ..Sniffed::default()
    };
    if let Some(dialect) = literal {
        debug!("Dialect {} found by literal marker", dialect);
    }

    let body = &prefix[bom.len().min(prefix.len())..];
    for codec in sniff_codecs(bom) {
        let text = codec.decode_lossy(body);
        let scan = scan_structure(&text);
        if !scan.saw_header {
            trace!("No readable HEAD under {}", codec);
            continue;
        }

        if sniffed.codec.is_none() || scan.dialect.is_some() {
            sniffed.codec = Some(codec);
            sniffed.declared_charset = scan.charset;
        }
        if let Some(declared) = scan.dialect {
            if literal != Some(declared) {
                match literal {
                    Some(marker) => debug!(
                        "HEAD.GEDC.VERS declares {} but literal marker says {}; using {}",
                        declared, marker, declared
                    ),
                    None => debug!("Dialect {} found under HEAD.GEDC.VERS using {}", declared, codec),
                }
                sniffed.dialect = Some((declared, DetectionSource::Structure));
            }
            break;
        }
        if literal.is_some() {
            break;
        }
    }

    sniffed
}

/// Looks for a `VERS <version>` byte sequence anywhere in `prefix`.
pub fn scan_literal(prefix: &[u8]) -> Option<Dialect> {
    VERSION_MARKERS
        .iter()
        .find(|(marker, _)| utils::contains_bytes(prefix, marker))
        .map(|(_, dialect)| *dialect)
}

/// Walks decoded header text for `HEAD.GEDC.VERS` and `HEAD.CHAR`.
///
/// Lines are trimmed and ungrammatical lines ignored; the walk stops at the
/// first level-0 record after `HEAD`.
pub fn scan_structure(text: &str) -> HeaderScan {
    let mut scan = HeaderScan::default();
    let mut in_head = false;
    let mut in_gedc = false;

    for (_, raw) in PhysicalLines::new(text) {
        let line = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        let Some(parts) = split_grammar(line) else {
            continue;
        };
        let Ok(level) = parts.level.parse::<u32>() else {
            continue;
        };

        match level {
            0 => {
                if in_head {
                    break;
                }
                in_head = parts.tag == "HEAD";
                scan.saw_header |= in_head;
            }
            1 if in_head => {
                in_gedc = parts.tag == "GEDC";
                if parts.tag == "CHAR" && !parts.value.is_empty() {
                    let charset = CharacterSet::from_label(parts.value);
                    if charset != CharacterSet::Unknown {
                        scan.charset = Some(charset);
                    }
                }
            }
            2 if in_gedc && parts.tag == "VERS" && !parts.value.is_empty() => {
                scan.dialect.get_or_insert(Dialect::from_version(parts.value));
            }
            _ => {}
        }
    }

    scan
}
