//! The record tree produced by a parse.

use std::fmt;

use crate::gedcom::iter::{ChildrenWithTag, Descendants};

/// One GEDCOM record and the subtree it owns.
///
/// Records are built once during the streaming pass and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) level: u32,
    pub(crate) xref: Option<String>,
    pub(crate) tag: String,
    pub(crate) value: String,
    pub(crate) line: usize,
    pub(crate) children: Vec<Record>,
}

impl Record {
    pub(crate) fn new(level: u32, xref: Option<&str>, tag: &str, value: &str, line: usize) -> Self {
        Self {
            level,
            xref: xref.map(str::to_owned),
            tag: tag.to_owned(),
            value: value.to_owned(),
            line,
            children: Vec::new(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The `@...@` identifier, including the delimiters.
    pub fn xref(&self) -> Option<&str> {
        self.xref.as_deref()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The payload with all `CONC`/`CONT` continuations applied.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 1-based physical line the record started on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn children(&self) -> &[Record] {
        &self.children
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Record> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Value of the first direct child with the given tag.
    pub fn child_value(&self, tag: &str) -> Option<&str> {
        self.child(tag).map(Record::value)
    }

    pub fn children_with_tag<'a>(&'a self, tag: &'a str) -> ChildrenWithTag<'a> {
        ChildrenWithTag::new(&self.children, tag)
    }

    /// Depth-first walk over every record below this one, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// The identifier this record's value points at, if the value is a pointer.
    pub fn pointer(&self) -> Option<&str> {
        crate::gedcom::utils::is_xref(&self.value).then_some(self.value.as_str())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)?;
        if let Some(xref) = &self.xref {
            write!(f, " {}", xref)?;
        }
        write!(f, " {}", self.tag)?;
        if !self.value.is_empty() {
            // Continuation lines are folded into the value; show them escaped.
            write!(f, " {}", self.value.replace('\n', "\\n"))?;
        }
        Ok(())
    }
}
