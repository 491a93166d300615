use html_highlighter_dom::{Document, NodeId};

use crate::position::PositionDescriptor;
use crate::text_content::TextContent;
use crate::xpath::{self, XPathDescriptor};

/// A pair of position descriptors over a [`TextContent`]. Invariant:
/// `absolute(start) <= absolute(end)`; both endpoints are inclusive.
///
/// A `Range` does not hold a reference to the `TextContent` it was computed
/// against - methods take `&TextContent` explicitly. `Range` values outlive
/// any single `TextContent` generation by design: callers resolve them
/// fresh against whatever `TextContent` is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: PositionDescriptor,
    pub end: PositionDescriptor,
}

/// The XPath form of a [`Range`], computed by [`Range::compute_xpath`] and
/// resolved back by [`Range::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathRange {
    pub start: XPathDescriptor,
    pub end: XPathDescriptor,
}

impl Range {
    pub fn new(start: PositionDescriptor, end: PositionDescriptor) -> Self {
        Range { start, end }
    }

    /// Resolves the inclusive absolute char span `[start_abs, end_abs]` into
    /// positions on `content`, by binary-searching the marker list for each
    /// endpoint. Absolute offsets are stable across text-node splits (a
    /// split only subdivides a node, it never changes character counts), so
    /// this is the right way to re-derive a `Range` against a `TextContent`
    /// that was rebuilt since the offsets were captured.
    pub fn from_absolute(content: &TextContent, start_abs: u32, end_abs: u32) -> Option<Range> {
        let start_marker = content.marker_at_offset(start_abs)?;
        let end_marker = content.marker_at_offset(end_abs)?;
        let start_m = content.at(start_marker)?;
        let end_m = content.at(end_marker)?;
        Some(Range::new(
            PositionDescriptor {
                marker: start_marker,
                offset: start_abs - start_m.offset,
            },
            PositionDescriptor {
                marker: end_marker,
                offset: end_abs - end_m.offset,
            },
        ))
    }

    /// `absolute(end) - absolute(start) + 1`.
    pub fn length(&self, content: &TextContent) -> Option<u32> {
        let start = self.start.absolute(content)?;
        let end = self.end.absolute(content)?;
        Some(end - start + 1)
    }

    /// The slice of the flat text `[absolute(start), absolute(end)]`
    /// inclusive.
    pub fn text(&self, content: &TextContent) -> Option<String> {
        let start = self.start.absolute(content)? as usize;
        let end = self.end.absolute(content)? as usize;
        Some(content.text().slice(start..end + 1).to_string())
    }

    /// The raw DOM text nodes spanned by this range, in document order,
    /// start through end inclusive. Used by [`crate::RangeHighlighter`] to
    /// know which nodes to wrap.
    pub fn enclosing_nodes(&self, content: &TextContent) -> Vec<NodeId> {
        (self.start.marker..=self.end.marker)
            .filter_map(|i| content.at(i).map(|m| m.node))
            .collect()
    }

    /// Produces the XPath form of both endpoints, relative to `container`.
    pub fn compute_xpath(
        &self,
        doc: &Document,
        content: &TextContent,
        container: NodeId,
    ) -> Option<XPathRange> {
        let start_marker = content.at(self.start.marker)?;
        let end_marker = content.at(self.end.marker)?;
        let start = xpath::xpath_of(doc, container, start_marker.node, self.start.offset)?;
        let end = xpath::xpath_of(doc, container, end_marker.node, self.end.offset)?;
        Some(XPathRange { start, end })
    }

    /// The inverse of [`Self::compute_xpath`]: resolves an [`XPathRange`]
    /// back to positions on `content`.
    pub fn resolve(
        doc: &Document,
        content: &TextContent,
        container: NodeId,
        range: &XPathRange,
    ) -> Option<Range> {
        let (start_node, start_offset) =
            xpath::resolve(doc, container, &range.start.xpath, range.start.offset)?;
        let (end_node, end_offset) =
            xpath::resolve(doc, container, &range.end.xpath, range.end.offset)?;
        let start = PositionDescriptor {
            marker: content.find(start_node)?,
            offset: start_offset,
        };
        let end = PositionDescriptor {
            marker: content.find(end_node)?,
            offset: end_offset,
        };
        Some(Range::new(start, end))
    }
}
