//! Semantic validation of the `HEAD` record.
//!
//! This module handles:
//! - Locating `HEAD.GEDC` and its `VERS` declaration
//! - Letting the declared version override the sniffed dialect
//! - Checking `GEDC.FORM` and `HEAD.CHAR` where the dialect requires them
//! - Rejecting `CONC`/`CONT` directly under `HEAD`
//!
//! Runs once, after the structural pass has succeeded. Every failing check
//! returns immediately.

use log::{debug, info};

use crate::gedcom::types::error::{GedcomError, HeaderError, Result};
use crate::gedcom::types::models::{CharacterSet, Dialect, ParseMode};
use crate::gedcom::types::record::Record;

use super::tree::{CONC, CONT};

/// The only accepted `GEDC.FORM` value.
pub const LINEAGE_LINKED: &str = "LINEAGE-LINKED";

/// Dialect and character set in effect; updated when the header says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    pub dialect: Dialect,
    pub charset: CharacterSet,
}

/// Validates `header` against the rules of its declared dialect.
///
/// In strict mode only 5.5.5 headers are accepted and an unknown `CHAR`
/// value is an error; relaxed mode skips those two checks.
pub fn validate(header: &Record, state: &mut HeaderState, mode: ParseMode) -> Result<()> {
    // Step 1: Required GEDC subsection
    let gedc = header
        .child("GEDC")
        .ok_or(HeaderError::MissingSection("GEDC"))?;

    // Step 2: Version declaration
    let vers = gedc.child("VERS").ok_or(HeaderError::MissingVersion)?;
    let declared = Dialect::from_version(vers.value());
    if mode.is_strict() && declared != Dialect::V555 {
        return Err(GedcomError::UnsupportedDialect {
            declared: vers.value().to_string(),
        });
    }
    if declared != state.dialect {
        info!("Header declares GEDCOM {}; overriding detected {}", declared, state.dialect);
        state.dialect = declared;
    }

    // Step 3: Schema form
    if state.dialect.requires_form() {
        let form = gedc.child("FORM").ok_or(HeaderError::MissingForm)?;
        if form.value() != LINEAGE_LINKED {
            return Err(HeaderError::InvalidForm(form.value().to_string()).into());
        }
    }

    // Step 4: Character set declaration
    match header.child("CHAR") {
        None if state.dialect.requires_charset() => return Err(HeaderError::MissingCharset.into()),
        None => {}
        Some(char_record) => check_charset(char_record.value(), state, mode)?,
    }

    // Step 5: Basic-header hygiene
    if state.dialect.forbids_header_continuations()
        && let Some(cont) = header.children().iter().find(|c| c.tag() == CONC || c.tag() == CONT)
    {
        return Err(HeaderError::ContinuationInHeader {
            line: Some(cont.line()),
        }
        .into());
    }

    debug!("Header valid: dialect={}, charset={}", state.dialect, state.charset);
    Ok(())
}

fn check_charset(label: &str, state: &mut HeaderState, mode: ParseMode) -> Result<()> {
    let charset = CharacterSet::from_label(label);
    if charset == CharacterSet::Unknown {
        if mode.is_strict() {
            return Err(HeaderError::InvalidCharset(label.to_string()).into());
        }
        return Ok(());
    }

    if charset != state.charset {
        info!("Header declares CHAR {}; overriding {}", charset, state.charset);
        state.charset = charset;
    }

    if mode.is_strict() && state.dialect.requires_unicode() && !charset.is_unicode() {
        return Err(HeaderError::CharsetNotAllowed {
            charset,
            dialect: state.dialect,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gedcom::types::error::ErrorCategory;

    fn rec(level: u32, tag: &str, value: &str, children: Vec<Record>) -> Record {
        let mut record = Record::new(level, None, tag, value, 0);
        record.children = children;
        record
    }

    fn header_555(form: &str, charset: Option<&str>) -> Record {
        let gedc = rec(
            1,
            "GEDC",
            "",
            vec![rec(2, "VERS", "5.5.5", vec![]), rec(2, "FORM", form, vec![])],
        );
        let mut children = vec![gedc];
        if let Some(c) = charset {
            children.push(rec(1, "CHAR", c, vec![]));
        }
        rec(0, "HEAD", "", children)
    }

    fn state(dialect: Dialect, charset: CharacterSet) -> HeaderState {
        HeaderState { dialect, charset }
    }

    #[test]
    fn accepts_valid_555_header() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        validate(&header_555(LINEAGE_LINKED, Some("UTF-8")), &mut st, ParseMode::Strict).unwrap();
        assert_eq!(st, state(Dialect::V555, CharacterSet::Utf8));
    }

    #[test]
    fn rejects_wrong_form() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let err = validate(&header_555("OTHER", Some("UTF-8")), &mut st, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, GedcomError::Header(HeaderError::InvalidForm(ref v)) if v == "OTHER"));
        assert!(err.to_string().contains("Unsupported GEDCOM form"));
    }

    #[test]
    fn rejects_missing_charset() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let err = validate(&header_555(LINEAGE_LINKED, None), &mut st, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, GedcomError::Header(HeaderError::MissingCharset)));
    }

    #[test]
    fn rejects_unknown_charset_in_strict_mode() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let err = validate(&header_555(LINEAGE_LINKED, Some("INVALID_ENCODING")), &mut st, ParseMode::Strict)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::HeaderSemantic);
    }

    #[test]
    fn rejects_ascii_for_555() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let err = validate(&header_555(LINEAGE_LINKED, Some("ASCII")), &mut st, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, GedcomError::Header(HeaderError::CharsetNotAllowed { .. })));
    }

    #[test]
    fn declared_charset_updates_state() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        validate(&header_555(LINEAGE_LINKED, Some("unicode")), &mut st, ParseMode::Strict).unwrap();
        assert_eq!(st.charset, CharacterSet::Unicode);
    }

    #[test]
    fn continuation_child_of_header_is_rejected() {
        let mut header = header_555(LINEAGE_LINKED, Some("UTF-8"));
        let mut conc = rec(1, "CONC", "more", vec![]);
        conc.line = 7;
        header.children.push(conc);
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let err = validate(&header, &mut st, ParseMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            GedcomError::Header(HeaderError::ContinuationInHeader { line: Some(7) })
        ));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn strict_mode_rejects_other_versions() {
        let gedc = rec(1, "GEDC", "", vec![rec(2, "VERS", "5.5.1", vec![]), rec(2, "FORM", LINEAGE_LINKED, vec![])]);
        let header = rec(0, "HEAD", "", vec![gedc, rec(1, "CHAR", "ASCII", vec![])]);
        let mut st = state(Dialect::V551, CharacterSet::Ascii);
        let err = validate(&header, &mut st, ParseMode::Strict).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Dialect);
    }

    #[test]
    fn relaxed_mode_accepts_older_versions() {
        let gedc = rec(1, "GEDC", "", vec![rec(2, "VERS", "5.5.1", vec![]), rec(2, "FORM", LINEAGE_LINKED, vec![])]);
        let header = rec(0, "HEAD", "", vec![gedc, rec(1, "CHAR", "ASCII", vec![])]);
        let mut st = state(Dialect::V551, CharacterSet::Ascii);
        validate(&header, &mut st, ParseMode::Relaxed).unwrap();

        // 4.0 needs neither FORM nor CHAR.
        let gedc_40 = rec(1, "GEDC", "", vec![rec(2, "VERS", "4.0", vec![])]);
        let header_40 = rec(0, "HEAD", "", vec![gedc_40]);
        validate(&header_40, &mut st, ParseMode::Relaxed).unwrap();
        assert_eq!(st.dialect, Dialect::V40);
    }

    #[test]
    fn missing_gedc_and_vers_are_named() {
        let mut st = state(Dialect::V555, CharacterSet::Utf8);
        let bare = rec(0, "HEAD", "", vec![rec(1, "CHAR", "UTF-8", vec![])]);
        let err = validate(&bare, &mut st, ParseMode::Strict).unwrap_err();
        assert!(err.to_string().contains("Missing GEDC record in header"));

        let no_vers = rec(0, "HEAD", "", vec![rec(1, "GEDC", "", vec![rec(2, "FORM", LINEAGE_LINKED, vec![])])]);
        let err = validate(&no_vers, &mut st, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, GedcomError::Header(HeaderError::MissingVersion)));
    }
}
