//! Byte-order-mark detection.

use log::trace;

use crate::gedcom::types::models::Bom;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Inspects up to the first 4 bytes for a UTF-8 or UTF-16 byte-order mark.
///
/// Returns [`Bom::None`] (length 0) when no mark is recognised. The
/// charset hint and mark length are available from the returned value.
pub fn detect_bom(bytes: &[u8]) -> Bom {
    let head = &bytes[..bytes.len().min(4)];
    let bom = if head.starts_with(UTF8_BOM) {
        Bom::Utf8
    } else if head.starts_with(UTF16LE_BOM) {
        Bom::Utf16Le
    } else if head.starts_with(UTF16BE_BOM) {
        Bom::Utf16Be
    } else {
        Bom::None
    };
    trace!("BOM check on {:02x?}: {:?}", head, bom);
    bom
}
