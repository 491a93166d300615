use slotmap::HopSlotMap;

use crate::error::{Error, Result};
use crate::node::{ElementData, Node, NodeData, NodeId};

/// An arena-backed DOM tree.
///
/// A minimal capability set - `{children, tag_name, class_list, node_type,
/// text}` - made concrete as a single real implementation the highlighting
/// engine is written against, rather than a literal browser `Document`.
/// Using `slotmap` keys for node identity means `NodeId` equality is
/// reference equality without unsafe aliasing.
#[derive(Debug)]
pub struct Document {
    arena: HopSlotMap<NodeId, Node>,
    root: NodeId,
}

impl Document {
    /// An empty document containing only the root container node.
    pub fn empty() -> Self {
        let mut arena = HopSlotMap::with_capacity_and_key(64);
        let root = arena.insert(Node::new(NodeData::Document));
        Document { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    fn get_checked(&self, id: NodeId) -> Result<&Node> {
        self.arena.get(id).ok_or(Error::Detached(id))
    }

    fn get_mut_checked(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena.get_mut(id).ok_or(Error::Detached(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.arena
            .get(id)?
            .data
            .as_element()
            .map(|e| e.name.as_str())
    }

    pub fn is_highlight_wrapper(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .and_then(|n| n.data.as_element())
            .is_some_and(|e| e.is_highlight_wrapper)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.arena
            .get(id)
            .and_then(|n| n.data.as_element())
            .is_some_and(|e| e.has_class(class))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.arena.get(id)?.data.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.arena.get_mut(id)?.data.as_element_mut()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id)?.data.as_text()
    }

    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |t| t.chars().count())
    }

    /// Creates a detached element node. Callers must attach it with
    /// [`Self::append_child`] or [`Self::insert_after`].
    pub fn new_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(name.to_ascii_lowercase());
        for (k, v) in attrs {
            data.set_attr(k, *v);
        }
        self.arena.insert(Node::new(NodeData::Element(data)))
    }

    /// Creates a detached text node.
    pub fn new_text(&mut self, data: impl Into<String>) -> NodeId {
        self.arena.insert(Node::new(NodeData::Text(data.into())))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.detach(child);
        self.get_mut_checked(parent)?.children.push(child);
        self.get_mut_checked(child)?.parent = Some(parent);
        Ok(())
    }

    /// Inserts `node` as the sibling immediately after `after`.
    pub fn insert_after(&mut self, after: NodeId, node: NodeId) -> Result<()> {
        let parent = self.get_checked(after)?.parent.ok_or(Error::Detached(after))?;
        self.detach(node);
        let siblings = &mut self.get_mut_checked(parent)?.children;
        let idx = siblings
            .iter()
            .position(|&s| s == after)
            .ok_or(Error::Detached(after))?;
        siblings.insert(idx + 1, node);
        self.get_mut_checked(node)?.parent = Some(parent);
        Ok(())
    }

    /// Removes `node` from its parent's child list without dropping it from
    /// the arena (it becomes detached; a freshly-created node that has never
    /// been attached is a no-op).
    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.arena.get(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.parent = None;
        }
    }

    /// Recursively removes `node` and its descendants from the arena.
    fn remove_subtree(&mut self, node: NodeId) {
        let children = self
            .arena
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
        self.arena.remove(node);
    }

    /// Splits a text node at `offset` (a char index), inserting the
    /// remainder as a new next sibling and returning its id. `node` keeps
    /// the characters `[0, offset)`; the returned node holds `[offset, len)`.
    ///
    /// If `offset == 0` or `offset == len`, no split is necessary: returns
    /// `node` itself or a fresh empty sibling respectively never appears in
    /// practice because `RangeHighlighter` only calls this when a split is
    /// actually required.
    pub fn split_text(&mut self, node: NodeId, offset: u32) -> Result<NodeId> {
        let text = self
            .arena
            .get(node)
            .and_then(|n| n.data.as_text())
            .ok_or(Error::NotText(node))?;
        let len = text.chars().count() as u32;
        if offset > len {
            return Err(Error::OffsetOutOfBounds { offset, len });
        }
        let char_idx = offset as usize;
        let split_at = text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let tail = text[split_at..].to_owned();
        let head = text[..split_at].to_owned();

        let new_node = self.new_text(tail);
        if let Some(n) = self.arena.get_mut(node) {
            *n.data.as_text_mut().expect("checked above") = head;
        }
        self.insert_after(node, new_node)?;
        Ok(new_node)
    }

    /// Wraps a contiguous run of sibling nodes in a new `tag` element,
    /// replacing the run in its parent's child list. Returns the wrapper's
    /// id. The wrapper is marked as a highlight wrapper for XPath indexing
    /// purposes (see [`ElementData::is_highlight_wrapper`]).
    pub fn wrap(&mut self, nodes: &[NodeId], tag: &str, attrs: &[(&str, &str)]) -> Result<NodeId> {
        let &first = nodes.first().ok_or(Error::EmptyWrap)?;
        let parent = self
            .get_checked(first)?
            .parent
            .ok_or(Error::Detached(first))?;

        let positions: Vec<usize> = {
            let siblings = &self.get_checked(parent)?.children;
            nodes
                .iter()
                .map(|&n| siblings.iter().position(|&s| s == n).ok_or(Error::Detached(n)))
                .collect::<Result<_>>()?
        };
        let is_contiguous = positions
            .windows(2)
            .all(|w| w[1] == w[0] + 1);
        if !is_contiguous {
            return Err(Error::NotContiguous);
        }

        let wrapper = self.new_element(tag, attrs);
        if let Some(e) = self.element_mut(wrapper) {
            e.is_highlight_wrapper = true;
        }

        let insert_at = positions[0];
        {
            let siblings = &mut self.get_mut_checked(parent)?.children;
            siblings.splice(insert_at..insert_at + nodes.len(), [wrapper]);
        }
        for &n in nodes {
            self.get_mut_checked(wrapper)?.children.push(n);
            self.get_mut_checked(n)?.parent = Some(wrapper);
        }
        Ok(wrapper)
    }

    /// Replaces `node` (an element) with a single text node holding the
    /// concatenation of its descendants' text, mirroring
    /// `RangeUnhighlighter.undo`'s "replace the wrapper with a single text
    /// node" step. The wrapper subtree is dropped from the arena.
    pub fn unwrap(&mut self, node: NodeId) -> Result<NodeId> {
        if self.element(node).is_none() {
            return Err(Error::NotElement(node));
        }
        let parent = self.get_checked(node)?.parent.ok_or(Error::Detached(node))?;
        let text = self.collect_text(node);

        let replacement = self.new_text(text);
        {
            let siblings = &mut self.get_mut_checked(parent)?.children;
            let idx = siblings
                .iter()
                .position(|&s| s == node)
                .ok_or(Error::Detached(node))?;
            siblings[idx] = replacement;
        }
        self.get_mut_checked(replacement)?.parent = Some(parent);
        self.remove_subtree(node);
        Ok(replacement)
    }

    fn collect_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text_into(node, &mut out);
        out
    }

    fn collect_text_into(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.arena.get(node) else {
            return;
        };
        match &n.data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(_) | NodeData::Document => {
                for &child in &n.children {
                    self.collect_text_into(child, out);
                }
            }
        }
    }

    /// Merges adjacent text-node children anywhere in `node`'s subtree,
    /// mirroring `Node.normalize()`. Used by `remove` when `normalise` is
    /// configured, and after unhighlighting.
    pub fn normalize(&mut self, node: NodeId) {
        let children = self.children(node).to_vec();
        let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let is_text = self.arena.get(child).is_some_and(|n| n.data.is_text());
            if is_text {
                if let Some(&prev) = merged.last() {
                    let prev_is_text = self.arena.get(prev).is_some_and(|n| n.data.is_text());
                    if prev_is_text {
                        let tail = self.text(child).unwrap_or_default().to_owned();
                        if let Some(prev_node) = self.arena.get_mut(prev) {
                            prev_node
                                .data
                                .as_text_mut()
                                .expect("checked above")
                                .push_str(&tail);
                        }
                        self.arena.remove(child);
                        continue;
                    }
                }
                merged.push(child);
            } else {
                self.normalize(child);
                merged.push(child);
            }
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.children = merged;
        }
    }

    /// Finds every element in `root`'s subtree carrying `attr == value`,
    /// in document order. Used by `RangeUnhighlighter::undo` to locate a
    /// highlight's wrapper elements by id attribute.
    pub fn find_by_attr(&self, root: NodeId, attr: &str, value: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.find_by_attr_into(root, attr, value, &mut out);
        out
    }

    fn find_by_attr_into(&self, node: NodeId, attr: &str, value: &str, out: &mut Vec<NodeId>) {
        let Some(n) = self.arena.get(node) else {
            return;
        };
        if let Some(e) = n.data.as_element() {
            if e.attr(attr) == Some(value) {
                out.push(node);
            }
        }
        for &child in &n.children {
            self.find_by_attr_into(child, attr, value, out);
        }
    }
}
