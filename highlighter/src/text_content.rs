use hashbrown::HashMap;
use html_highlighter_dom::{Document, DocumentOrder, NodeId};
use ropey::{Rope, RopeSlice};

use crate::error::{Error, Result};

/// One text node's position in the flat projection: `offset` is the
/// cumulative character count of every text node visited before it in
/// document order. Invariant: markers are strictly ordered by `offset`;
/// `offset[i+1] = offset[i] + length(node[i])`; `marker[0].offset == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMarker {
    pub node: NodeId,
    pub offset: u32,
}

/// The flat, text-only projection of a container subtree.
///
/// Built once and kept until [`Self::refresh`] is called explicitly - the
/// engine never updates it mid-wrap, so a caller that mutates the DOM
/// outside the registry must refresh before relying on offsets again.
#[derive(Debug)]
pub struct TextContent {
    markers: Vec<TextMarker>,
    index: HashMap<NodeId, usize>,
    text: Rope,
}

impl TextContent {
    /// Walks `container`'s subtree in document order, recording a marker
    /// for every non-empty text node. Whitespace is preserved verbatim: the
    /// projection is exactly the concatenation of each visited node's raw
    /// `data`.
    pub fn build(doc: &Document, container: NodeId) -> Self {
        let mut builder = ropey::RopeBuilder::new();
        let mut markers = Vec::new();
        let mut index = HashMap::new();
        let mut offset: u32 = 0;

        for node in DocumentOrder::new(doc, container) {
            let Some(text) = doc.text(node) else { continue };
            if text.is_empty() {
                continue;
            }
            index.insert(node, markers.len());
            markers.push(TextMarker { node, offset });
            builder.append(text);
            offset += text.chars().count() as u32;
        }

        TextContent {
            markers,
            index,
            text: builder.finish(),
        }
    }

    /// Rebuilds the projection from scratch. Required after any DOM
    /// mutation the registry didn't perform itself.
    pub fn refresh(&mut self, doc: &Document, container: NodeId) {
        *self = Self::build(doc, container);
    }

    pub fn at(&self, index: usize) -> Option<&TextMarker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// The marker index for `node`, by identity (arena key equality), or
    /// `None` if `node` isn't part of this projection.
    pub fn find(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    /// The full flat text, for substring/regex matching.
    pub fn text(&self) -> RopeSlice<'_> {
        self.text.slice(..)
    }

    pub fn char_len(&self) -> usize {
        self.text.len_chars()
    }

    /// The marker whose text node's span contains the absolute char offset
    /// `absolute`, found by binary search over the (sorted) marker offsets.
    pub fn marker_at_offset(&self, absolute: u32) -> Option<usize> {
        if self.markers.is_empty() || absolute as usize >= self.text.len_chars() {
            return None;
        }
        let i = self.markers.partition_point(|m| m.offset <= absolute);
        i.checked_sub(1)
    }

    /// Debug invariant check: markers are strictly ordered by offset,
    /// `marker[0].offset == 0`, and the flat text's length matches the last
    /// marker's offset plus its node's length.
    pub fn assert_invariants(&self) -> Result<()> {
        if self.markers.is_empty() {
            return Ok(());
        }
        if self.markers[0].offset != 0 {
            return Err(Error::InvariantViolation(
                "first marker must start at offset 0".into(),
            ));
        }
        if !self.markers.is_sorted_by_key(|m| m.offset) {
            return Err(Error::InvariantViolation(
                "markers must be sorted by offset".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html_highlighter_dom::parse;

    #[test]
    fn builds_flat_projection_in_document_order() {
        let doc = parse("<p>Hello <b>brave</b> world</p>");
        let container = doc.root();
        let content = TextContent::build(&doc, container);
        assert_eq!(content.text().to_string(), "Hello brave world");
        assert_eq!(content.len(), 3);
        content.assert_invariants().unwrap();
    }

    #[test]
    fn skips_empty_text_nodes() {
        let mut doc = html_highlighter_dom::Document::empty();
        let root = doc.root();
        let p = doc.new_element("p", &[]);
        doc.append_child(root, p).unwrap();
        let empty = doc.new_text("");
        let word = doc.new_text("hi");
        doc.append_child(p, empty).unwrap();
        doc.append_child(p, word).unwrap();

        let content = TextContent::build(&doc, root);
        assert_eq!(content.len(), 1);
        assert_eq!(content.find(empty), None);
        assert_eq!(content.find(word), Some(0));
    }

    #[test]
    fn marker_at_offset_binary_searches() {
        let doc = parse("<p>abc</p><p>defgh</p>");
        let content = TextContent::build(&doc, doc.root());
        assert_eq!(content.text().to_string(), "abcdefgh");
        assert_eq!(content.marker_at_offset(0), Some(0));
        assert_eq!(content.marker_at_offset(2), Some(0));
        assert_eq!(content.marker_at_offset(3), Some(1));
        assert_eq!(content.marker_at_offset(7), Some(1));
        assert_eq!(content.marker_at_offset(8), None);
    }
}
