use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::codec::bom::detect_bom;
use super::codec::charset::{codec_for, decode_document};
use super::format::dialect::{self, DetectionSource};
use super::format::header::{self, HeaderState};
use super::format::line::PhysicalLines;
use super::format::tree::{Recovery, TreeBuilder};
use super::iter::TaggedRecords;
use super::types::error::{GedcomError, Result};
use super::types::models::*;
use super::types::record::Record;

/// Decisions made from the header prefix, before the full decode.
#[derive(Debug, Clone, Copy)]
struct Detection {
    bom: Bom,
    dialect: Dialect,
    charset: CharacterSet,
    codec: TextCodec,
}

/// A parsed GEDCOM file: the record forest plus the identifier index.
///
/// Supports GEDCOM 4.0, 5.5.1, 5.5.5 and 7.0. Each call to [`open`](Self::open)
/// or [`from_bytes`](Self::from_bytes) runs a fresh parse; the result is
/// read-only.
#[derive(Debug)]
pub struct GedcomReader {
    source: Option<PathBuf>,
    mode: ParseMode,
    dialect: Dialect,
    charset: CharacterSet,
    bom: Bom,
    codec: TextCodec,

    roots: Vec<Record>,
    index: HashMap<String, usize>,
    header: Option<usize>,
    recoveries: Vec<Recovery>,
}

impl GedcomReader {
    /// Read a GEDCOM file from the given path.
    ///
    /// The first `options.header_scan_len` bytes are read for dialect
    /// detection, then the whole file is read and parsed.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened or read
    /// - No dialect can be determined (strict mode)
    /// - The content cannot be decoded
    /// - Any structural rule is broken (strict mode)
    /// - The header is invalid (strict mode)
    pub fn open(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening GEDCOM file: {} ({:?} mode)", path.display(), options.mode);
        let mut file = File::open(path)?;

        let mut prefix = Vec::with_capacity(options.header_scan_len);
        file.by_ref()
            .take(options.header_scan_len as u64)
            .read_to_end(&mut prefix)?;
        let detection = detect(&prefix, &options)?;

        file.rewind()?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        drop(file);

        let mut reader = Self::build(&bytes, detection, &options)?;
        reader.source = Some(path.to_path_buf());
        Ok(reader)
    }

    /// Parse GEDCOM content already in memory.
    pub fn from_bytes(bytes: &[u8], options: ParseOptions) -> Result<Self> {
        let prefix = &bytes[..bytes.len().min(options.header_scan_len)];
        let detection = detect(prefix, &options)?;
        Self::build(bytes, detection, &options)
    }

    fn build(bytes: &[u8], detection: Detection, options: &ParseOptions) -> Result<Self> {
        let mode = options.mode;

        // Step 1: Decode the body (BOM stripped)
        let body = &bytes[detection.bom.len().min(bytes.len())..];
        let (text, codec) = decode_document(body, detection.codec, mode)?;

        // Step 2: Stream lines into the tree
        let mut builder = TreeBuilder::new(detection.dialect, mode);
        for (number, raw) in PhysicalLines::new(&text) {
            builder.push_line(raw, number)?;
        }
        let tree = builder.finish()?;

        // Step 3: Header semantics (strict only)
        let mut state = HeaderState {
            dialect: detection.dialect,
            charset: detection.charset,
        };
        if mode.is_strict()
            && let Some(head) = tree.header.map(|i| &tree.roots[i])
        {
            header::validate(head, &mut state, mode)?;

            // The declared dialect may differ from the detected one.
            if state.dialect.requires_bom() && detection.bom.is_none() {
                return Err(GedcomError::MissingBom {
                    dialect: state.dialect,
                });
            }
        }

        info!(
            "GEDCOM parsed: version={}, charset={}, decoded as {}, {} root records, {} identifiers",
            state.dialect,
            state.charset,
            codec,
            tree.roots.len(),
            tree.index.len()
        );

        Ok(Self {
            source: None,
            mode,
            dialect: state.dialect,
            charset: state.charset,
            bom: detection.bom,
            codec,
            roots: tree.roots,
            index: tree.index,
            header: tree.header,
            recoveries: tree.recoveries,
        })
    }

    /// The file this reader was opened from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// The dialect in effect: the header's declaration in strict mode,
    /// the detected (or default) one in relaxed mode.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn charset(&self) -> CharacterSet {
        self.charset
    }

    pub fn bom(&self) -> Bom {
        self.bom
    }

    /// The codec the body was actually decoded with.
    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    /// All level-0 records in document order.
    pub fn roots(&self) -> &[Record] {
        &self.roots
    }

    /// The first `HEAD` record.
    pub fn header(&self) -> Option<&Record> {
        self.header.map(|i| &self.roots[i])
    }

    /// Lines skipped or repaired in relaxed mode, plus a missing `HEAD`
    /// (reported at the last line). Always empty in strict mode.
    pub fn recoveries(&self) -> &[Recovery] {
        &self.recoveries
    }

    /// Root records with the given tag, in document order.
    pub fn records_by_tag<'a>(&'a self, tag: &'a str) -> TaggedRecords<'a> {
        TaggedRecords::new(&self.roots, tag)
    }

    /// Looks up a level-0 record by identifier, whatever its tag.
    pub fn resolve(&self, xref: &str) -> Option<&Record> {
        self.index.get(xref).map(|&i| &self.roots[i])
    }

    /// Looks up a level-0 record by identifier, requiring a specific tag.
    pub fn get(&self, xref: &str, tag: &str) -> Option<&Record> {
        self.resolve(xref).filter(|r| r.tag() == tag)
    }

    /// Follows a pointer value such as `1 FAMS @F1@`. Dangling pointers yield `None`.
    pub fn resolve_pointer(&self, record: &Record) -> Option<&Record> {
        record.pointer().and_then(|xref| self.resolve(xref))
    }

    pub fn individuals(&self) -> TaggedRecords<'_> {
        self.records_by_tag("INDI")
    }

    pub fn families(&self) -> TaggedRecords<'_> {
        self.records_by_tag("FAM")
    }

    pub fn get_individual(&self, xref: &str) -> Option<&Record> {
        self.get(xref, "INDI")
    }

    pub fn get_family(&self, xref: &str) -> Option<&Record> {
        self.get(xref, "FAM")
    }
}

/// Runs BOM detection and dialect sniffing, and settles the decode codec.
fn detect(prefix: &[u8], options: &ParseOptions) -> Result<Detection> {
    let strict = options.mode.is_strict();

    // Step 1: Byte-order mark
    let bom = detect_bom(prefix);
    debug!("BOM: {:?} ({} bytes)", bom, bom.len());

    // Step 2: Dialect
    let sniffed = dialect::detect_dialect(prefix, bom);
    let dialect = match sniffed.dialect {
        Some((dialect, source)) if strict || dialect != Dialect::Unknown => {
            debug!("Dialect {} ({})", dialect, match source {
                DetectionSource::Literal => "literal marker",
                DetectionSource::Structure => "header structure",
            });
            dialect
        }
        _ if strict => return Err(GedcomError::DialectUndetected),
        _ => {
            warn!("Could not determine GEDCOM version; assuming {}", Dialect::V551);
            Dialect::V551
        }
    };

    // Step 3: BOM requirement
    if strict && dialect.requires_bom() && bom.is_none() {
        return Err(GedcomError::MissingBom { dialect });
    }

    // Step 4: Character set and codec
    let charset = options
        .charset_override
        .or(bom.charset_hint())
        .or(sniffed.declared_charset)
        .or(sniffed.codec.filter(TextCodec::is_utf16).map(|_| CharacterSet::Unicode))
        .unwrap_or_else(|| dialect.default_charset());
    let codec = codec_for(charset, bom, sniffed.codec);
    debug!("Charset {} → codec {}", charset, codec);

    Ok(Detection {
        bom,
        dialect,
        charset,
        codec,
    })
}
