//! Physical-line splitting, structural line checks, and grammar decomposition.
//!
//! Every line has the shape
//! `<level> [<@xref@> ]<TAG>[ <value>]`, e.g. `0 @I1@ INDI` or `1 NAME John /Doe/`.

use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use crate::gedcom::types::error::{GedcomError, Result, StructuralKind};
use crate::gedcom::types::models::{Dialect, ParseMode};

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Returns the cached line grammar.
fn line_regex() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+) (?:(@[^@]+@) )?([A-Z0-9_]+)(?: (.*))?$")
            .expect("Invalid GEDCOM line regex pattern")
    })
}

/// The raw captures of one grammatical line, before the level is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParts<'a> {
    pub level: &'a str,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: &'a str,
}

/// Splits a line into its grammar parts, or `None` if it does not match.
pub fn split_grammar(line: &str) -> Option<LineParts<'_>> {
    let caps = line_regex().captures(line)?;
    Some(LineParts {
        level: caps.get(1)?.as_str(),
        xref: caps.get(2).map(|m| m.as_str()),
        tag: caps.get(3)?.as_str(),
        value: caps.get(4).map_or("", |m| m.as_str()),
    })
}

/// A validated, tokenized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based physical line number.
    pub number: usize,
    pub level: u32,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: &'a str,
}

/// Outcome of checking one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checked<'a> {
    Line(Line<'a>),
    /// Usable after a relaxed-mode repair.
    Repaired(Line<'a>, StructuralKind),
    /// Dropped in relaxed mode.
    Skip(StructuralKind),
}

/// Per-line structural checks for one dialect and mode.
#[derive(Debug, Clone, Copy)]
pub struct LineValidator {
    mode: ParseMode,
    max_len: Option<usize>,
}

impl LineValidator {
    pub fn new(dialect: Dialect, mode: ParseMode) -> Self {
        Self {
            mode,
            max_len: dialect.max_line_length(),
        }
    }

    /// Checks and tokenizes one line with its terminator already removed.
    ///
    /// Strict mode returns the first violation as an error. Relaxed mode
    /// skips blank and ungrammatical lines, strips leading whitespace, and
    /// ignores the length and leading-zero rules.
    pub fn check<'a>(&self, raw: &'a str, number: usize) -> Result<Checked<'a>> {
        let strict = self.mode.is_strict();

        if raw.trim().is_empty() {
            return self.reject(number, StructuralKind::EmptyLine);
        }

        let mut repaired = None;
        let mut text = raw;
        if raw.starts_with(char::is_whitespace) {
            if strict {
                return Err(GedcomError::structural(number, StructuralKind::LeadingWhitespace));
            }
            text = raw.trim_start();
            repaired = Some(StructuralKind::LeadingWhitespace);
        }

        if strict
            && let Some(limit) = self.max_len
            && text.chars().count() > limit
        {
            return Err(GedcomError::structural(number, StructuralKind::LineTooLong { limit }));
        }

        let Some(parts) = split_grammar(text) else {
            return self.reject(number, StructuralKind::Malformed(text.to_string()));
        };

        if strict && parts.level.len() > 1 && parts.level.starts_with('0') {
            return Err(GedcomError::structural(number, StructuralKind::LeadingZero));
        }

        let Ok(level) = parts.level.parse::<u32>() else {
            return self.reject(number, StructuralKind::Malformed(text.to_string()));
        };

        let line = Line {
            number,
            level,
            xref: parts.xref,
            tag: parts.tag,
            value: parts.value,
        };
        trace!("Line {}: level={} xref={:?} tag={}", number, level, line.xref, line.tag);

        Ok(match repaired {
            Some(kind) => Checked::Repaired(line, kind),
            None => Checked::Line(line),
        })
    }

    fn reject<'a>(&self, number: usize, kind: StructuralKind) -> Result<Checked<'a>> {
        if self.mode.is_strict() {
            Err(GedcomError::structural(number, kind))
        } else {
            Ok(Checked::Skip(kind))
        }
    }
}

/// Iterator over `(line_number, line)` pairs.
///
/// Accepts `\n`, `\r\n` and a lone `\r` as terminators. A terminator at the
/// very end does not produce a trailing empty line.
pub struct PhysicalLines<'a> {
    rest: &'a str,
    number: usize,
}

impl<'a> PhysicalLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text, number: 0 }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        self.number += 1;
        let line = match self.rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = &self.rest[..end];
                let skip = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[end + skip..];
                line
            }
            None => std::mem::take(&mut self.rest),
        };
        Some((self.number, line))
    }
}
