//! Decoding GEDCOM bytes to text.
//!
//! Two flavours are provided:
//! - exact decoding, which fails on any malformed sequence and is used for
//!   the full document
//! - lossy decoding, which replaces malformed sequences and is only used
//!   while sniffing the header prefix (the prefix may end mid-character)

use std::borrow::Cow;

use log::{debug, trace, warn};

use crate::gedcom::types::error::{GedcomError, Result};
use crate::gedcom::types::models::{Bom, CharacterSet, ParseMode, TextCodec};

/// Codecs tried, in order, after the preferred one fails in relaxed mode.
const RELAXED_FALLBACKS: &[TextCodec] = &[TextCodec::Utf8, TextCodec::Latin1];

/// Codecs tried, in order, when sniffing a header without a usable literal marker.
const SNIFF_CODECS: &[TextCodec] = &[
    TextCodec::Utf8,
    TextCodec::Utf16Le,
    TextCodec::Utf16Be,
    TextCodec::Latin1,
];

impl TextCodec {
    /// Decodes `bytes` without replacement. Returns `None` on any malformed input.
    pub fn decode_exact(&self, bytes: &[u8]) -> Option<String> {
        if *self == TextCodec::Ascii && !bytes.is_ascii() {
            return None;
        }
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
    }

    /// Decodes `bytes`, substituting U+FFFD for malformed sequences.
    pub fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, had_errors) = self.encoding().decode_without_bom_handling(bytes);
        if had_errors {
            trace!("Lossy {} decode replaced malformed input", self);
        }
        text
    }
}

/// Chooses the codec for a character set.
///
/// `UNICODE` needs a byte order: the BOM decides if present, otherwise the
/// codec that successfully decoded the header (`sniffed`), otherwise little-endian.
pub fn codec_for(charset: CharacterSet, bom: Bom, sniffed: Option<TextCodec>) -> TextCodec {
    match charset {
        CharacterSet::Ascii => TextCodec::Ascii,
        // No ANSEL codec exists; Latin-1 is the closest approximation.
        CharacterSet::Ansel => TextCodec::Latin1,
        CharacterSet::Utf8 | CharacterSet::Unknown => TextCodec::Utf8,
        CharacterSet::Unicode => match (bom, sniffed) {
            (Bom::Utf16Be, _) => TextCodec::Utf16Be,
            (Bom::Utf16Le, _) => TextCodec::Utf16Le,
            (_, Some(TextCodec::Utf16Be)) => TextCodec::Utf16Be,
            _ => TextCodec::Utf16Le,
        },
    }
}

/// The codecs to try when sniffing the header, BOM-selected codec first.
pub fn sniff_codecs(bom: Bom) -> Vec<TextCodec> {
    let mut codecs: Vec<TextCodec> = bom.codec().into_iter().collect();
    for codec in SNIFF_CODECS {
        if !codecs.contains(codec) {
            codecs.push(*codec);
        }
    }
    codecs
}

/// Decodes the document body (BOM already stripped).
///
/// Strict mode uses `preferred` only. Relaxed mode falls back to UTF-8 and
/// then Latin-1. Fails with [`GedcomError::Encoding`] once every candidate
/// has been exhausted, naming the last codec tried.
pub fn decode_document(bytes: &[u8], preferred: TextCodec, mode: ParseMode) -> Result<(String, TextCodec)> {
    let mut candidates = vec![preferred];
    if !mode.is_strict() {
        for codec in RELAXED_FALLBACKS {
            if !candidates.contains(codec) {
                candidates.push(*codec);
            }
        }
    }

    let mut last = preferred;
    for codec in candidates {
        last = codec;
        match codec.decode_exact(bytes) {
            Some(text) => {
                if codec != preferred {
                    warn!("Content is not valid {}; decoded as {} instead", preferred, codec);
                }
                debug!("Decoded {} bytes as {}", bytes.len(), codec);
                return Ok((text, codec));
            }
            None => trace!("{} decode failed", codec),
        }
    }
    Err(GedcomError::Encoding { codec: last })
}
