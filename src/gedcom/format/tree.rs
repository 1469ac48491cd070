//! Stack-based assembly of the record tree from the line stream.
//!
//! The builder keeps one open record per depth, from level 0 down to the
//! deepest record still accepting children. A new line at level `n` closes
//! every open record at depth `>= n`, attaching each to its parent (or to
//! the root list), and is then opened itself.
//!
//! `CONC` and `CONT` lines are not nodes: they extend the value of the
//! record they sit under, without and with a newline separator respectively.

use std::collections::HashMap;

use log::{debug, warn};

use crate::gedcom::types::error::{GedcomError, HeaderError, Result, StructuralKind};
use crate::gedcom::types::models::{Dialect, ParseMode};
use crate::gedcom::types::record::Record;

use super::line::{Checked, Line, LineValidator};

pub const HEAD: &str = "HEAD";
pub const CONC: &str = "CONC";
pub const CONT: &str = "CONT";

/// A rule violation that relaxed mode recovered from instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub line: usize,
    pub kind: StructuralKind,
}

/// The finished forest and its identifier index.
#[derive(Debug)]
pub struct BuiltTree {
    pub roots: Vec<Record>,
    /// Identifier → position in `roots`.
    pub index: HashMap<String, usize>,
    /// Position of the first `HEAD` root.
    pub header: Option<usize>,
    pub recoveries: Vec<Recovery>,
}

/// Per-parse build context. Consumed by [`TreeBuilder::finish`].
#[derive(Debug)]
pub struct TreeBuilder {
    mode: ParseMode,
    validator: LineValidator,
    stack: Vec<Record>,
    roots: Vec<Record>,
    index: HashMap<String, usize>,
    header: Option<usize>,
    recoveries: Vec<Recovery>,
    /// Number of the last physical line pushed.
    last_line: usize,
}

impl TreeBuilder {
    pub fn new(dialect: Dialect, mode: ParseMode) -> Self {
        Self {
            mode,
            validator: LineValidator::new(dialect, mode),
            stack: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
            header: None,
            recoveries: Vec::new(),
            last_line: 0,
        }
    }

    /// Feeds one physical line (terminator removed).
    pub fn push_line(&mut self, raw: &str, number: usize) -> Result<()> {
        self.last_line = number;
        let line = match self.validator.check(raw, number)? {
            Checked::Line(line) => line,
            Checked::Repaired(line, kind) => {
                self.recover(number, kind);
                line
            }
            Checked::Skip(kind) => {
                self.recover(number, kind);
                return Ok(());
            }
        };

        // A line may open at most one level below the deepest open record.
        let depth = self.stack.len();
        if line.level as usize > depth {
            let from = depth.checked_sub(1).map(|d| d as u32);
            return self.violation(number, StructuralKind::SkippedLevel { from, to: line.level });
        }

        if line.tag == CONC || line.tag == CONT {
            self.extend_value(line)
        } else {
            self.open_record(line)
        }
    }

    /// Closes every open record and returns the forest.
    pub fn finish(mut self) -> Result<BuiltTree> {
        self.close_to(0);

        if self.header.is_none() {
            if self.mode.is_strict() {
                return Err(GedcomError::Structural {
                    line: None,
                    kind: StructuralKind::MissingHeader,
                });
            }
            // Not line-local; attached to the end of the document.
            self.recover(self.last_line, StructuralKind::MissingHeader);
        }

        debug!(
            "Tree built: {} roots, {} identifiers, {} recoveries",
            self.roots.len(),
            self.index.len(),
            self.recoveries.len()
        );

        Ok(BuiltTree {
            roots: self.roots,
            index: self.index,
            header: self.header,
            recoveries: self.recoveries,
        })
    }

    fn extend_value(&mut self, line: Line<'_>) -> Result<()> {
        self.close_to(line.level as usize);

        let Some(target) = self.stack.last_mut() else {
            return self.violation(line.number, StructuralKind::OrphanContinuation(line.tag.to_string()));
        };

        // Fatal in every mode.
        if target.level == 0 && target.tag == HEAD {
            return Err(HeaderError::ContinuationInHeader {
                line: Some(line.number),
            }
            .into());
        }

        if line.tag == CONT {
            target.value.push('\n');
        }
        target.value.push_str(line.value);
        Ok(())
    }

    fn open_record(&mut self, line: Line<'_>) -> Result<()> {
        self.close_to(line.level as usize);

        let record = Record::new(line.level, line.xref, line.tag, line.value, line.number);
        if line.level == 0 {
            self.register_root(&record, line.number)?;
        }
        self.stack.push(record);
        Ok(())
    }

    /// Indexes a level-0 record by identifier and tracks the header.
    ///
    /// Must be called after the stack is fully closed, so that the record's
    /// position is `roots.len()`.
    fn register_root(&mut self, record: &Record, number: usize) -> Result<()> {
        let position = self.roots.len();

        if let Some(xref) = record.xref() {
            if self.index.contains_key(xref) {
                // Relaxed mode keeps the first record under this identifier.
                self.violation(number, StructuralKind::DuplicateXref(xref.to_string()))?;
            } else {
                self.index.insert(xref.to_string(), position);
            }
        }

        if record.tag() == HEAD {
            if self.header.is_some() {
                self.violation(number, StructuralKind::MultipleHeaders)?;
            } else {
                self.header = Some(position);
            }
        }

        Ok(())
    }

    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            let Some(record) = self.stack.pop() else {
                break;
            };
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(record),
                None => self.roots.push(record),
            }
        }
    }

    /// Fails in strict mode; records a recovery in relaxed mode.
    fn violation(&mut self, number: usize, kind: StructuralKind) -> Result<()> {
        if self.mode.is_strict() {
            return Err(GedcomError::structural(number, kind));
        }
        self.recover(number, kind);
        Ok(())
    }

    fn recover(&mut self, number: usize, kind: StructuralKind) {
        warn!("Relaxed mode: {} at line {}", kind, number);
        self.recoveries.push(Recovery { line: number, kind });
    }
}
