use crate::text_content::TextContent;

/// `{marker, offset}` locating a point within a single text node: `marker`
/// is an index into a [`TextContent`]'s marker table and `offset` is
/// 0-based within that marker's node data. Valid range:
/// `0 <= offset < length(marker.node.data)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionDescriptor {
    pub marker: usize,
    pub offset: u32,
}

impl PositionDescriptor {
    /// Clamps `rel_offset` into `marker`'s node (whose text is `node_len`
    /// characters long).
    pub fn clamped(marker: usize, rel_offset: u32, node_len: u32) -> Self {
        let max = node_len.saturating_sub(1);
        PositionDescriptor {
            marker,
            offset: rel_offset.min(max),
        }
    }

    /// The absolute character offset in the container's flat text.
    pub fn absolute(&self, content: &TextContent) -> Option<u32> {
        content.at(self.marker).map(|m| m.offset + self.offset)
    }
}
