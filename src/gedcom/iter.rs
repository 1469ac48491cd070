//! Iterators over a parsed record tree.
//!
//! - [`TaggedRecords`] - root records with one tag, in document order
//! - [`ChildrenWithTag`] - direct children of a record with one tag
//! - [`Descendants`] - depth-first walk below a record
//!
//! # Example
//! ```no_run
//! # use gedcom_reader::{GedcomReader, ParseOptions};
//! # let reader = GedcomReader::open("family.ged", ParseOptions::strict()).unwrap();
//! for person in reader.records_by_tag("INDI") {
//!     println!("{}: {}", person.xref().unwrap_or("?"), person.child_value("NAME").unwrap_or(""));
//! }
//! ```

use std::slice::Iter;

use super::types::record::Record;

/// Root records carrying a given tag.
///
/// Created by [`GedcomReader::records_by_tag()`](crate::GedcomReader::records_by_tag).
pub struct TaggedRecords<'a> {
    roots: Iter<'a, Record>,
    tag: &'a str,
}

impl<'a> TaggedRecords<'a> {
    pub(super) fn new(roots: &'a [Record], tag: &'a str) -> Self {
        Self {
            roots: roots.iter(),
            tag,
        }
    }
}

impl<'a> Iterator for TaggedRecords<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.tag;
        self.roots.by_ref().find(|r| r.tag() == tag)
    }
}

/// Direct children of one record carrying a given tag.
pub struct ChildrenWithTag<'a> {
    children: Iter<'a, Record>,
    tag: &'a str,
}

impl<'a> ChildrenWithTag<'a> {
    pub(crate) fn new(children: &'a [Record], tag: &'a str) -> Self {
        Self {
            children: children.iter(),
            tag,
        }
    }
}

impl<'a> Iterator for ChildrenWithTag<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.tag;
        self.children.by_ref().find(|r| r.tag() == tag)
    }
}

/// Pre-order traversal of every record below a starting record.
///
/// The starting record itself is not yielded.
pub struct Descendants<'a> {
    stack: Vec<Iter<'a, Record>>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(root: &'a Record) -> Self {
        Self {
            stack: vec![root.children().iter()],
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(record) => {
                    self.stack.push(record.children().iter());
                    return Some(record);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
