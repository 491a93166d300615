//! Computes and resolves a `/tag[n]/.../text()[k]` XPath dialect relative to
//! a container node.
//!
//! Two hazards are handled here:
//!
//! - Element sibling indexing skips the highlighter's own wrapper elements,
//!   identified by [`Document::is_highlight_wrapper`] (a node property) so
//!   that wrapping text never perturbs the index of a pre-existing sibling
//!   element, and cannot misfire just because user content happens to carry
//!   the highlight CSS class.
//! - Text-node indexing merges adjacent *logical* text: a raw text node and
//!   a highlight wrapper (which always wraps exactly one raw text node) are
//!   both treated as "text" for the purposes of finding the k-th run, so
//!   splitting and wrapping a text node never changes anyone else's XPath.

use html_highlighter_dom::{Document, NodeId};

/// `{xpath, offset}` locating a point relative to the container.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct XPathDescriptor {
    pub xpath: String,
    pub offset: u32,
}

/// A raw text node is a "leaf" of a logical text run: either the node
/// itself, or - if it has been split and wrapped - the single text child of
/// a highlight wrapper.
fn leaf_text(doc: &Document, child: NodeId) -> Option<NodeId> {
    if doc.text(child).is_some() {
        return Some(child);
    }
    if doc.is_highlight_wrapper(child) {
        let kids = doc.children(child);
        if let [only] = kids {
            if doc.text(*only).is_some() {
                return Some(*only);
            }
        }
    }
    None
}

/// The nearest ancestor of `node` that isn't itself a highlight wrapper.
/// Wrappers only ever wrap text, so this is always an element (or the
/// container).
fn logical_parent(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut parent = doc.parent(node)?;
    while doc.is_highlight_wrapper(parent) {
        parent = doc.parent(parent)?;
    }
    Some(parent)
}

/// Finds `target`'s 0-based logical text-run index among `parent`'s
/// children, and its offset from the start of that run.
fn text_run_index(doc: &Document, parent: NodeId, target: NodeId) -> Option<(usize, u32)> {
    let mut run = 0;
    let mut in_run = false;
    let mut offset_in_run = 0u32;
    for &child in doc.children(parent) {
        match leaf_text(doc, child) {
            Some(leaf) => {
                if !in_run {
                    in_run = true;
                    offset_in_run = 0;
                }
                if leaf == target {
                    return Some((run, offset_in_run));
                }
                offset_in_run += doc.text_len(leaf) as u32;
            }
            None => {
                if in_run {
                    run += 1;
                    in_run = false;
                }
            }
        }
    }
    None
}

/// All raw-text leaves of the `run_idx`-th logical text run among
/// `parent`'s children, in order.
fn run_leaves(doc: &Document, parent: NodeId, run_idx: usize) -> Option<Vec<NodeId>> {
    let mut run = 0;
    let mut current: Vec<NodeId> = Vec::new();
    let mut in_run = false;
    for &child in doc.children(parent) {
        match leaf_text(doc, child) {
            Some(leaf) => {
                in_run = true;
                if run == run_idx {
                    current.push(leaf);
                }
            }
            None => {
                if in_run {
                    if run == run_idx {
                        return Some(current);
                    }
                    run += 1;
                    in_run = false;
                }
            }
        }
    }
    if in_run && run == run_idx {
        return Some(current);
    }
    None
}

/// 1-based position of `node` among `parent`'s children sharing its tag
/// name, skipping highlight wrappers entirely.
fn element_index(doc: &Document, parent: NodeId, node: NodeId) -> Option<usize> {
    let tag = doc.tag_name(node)?;
    let mut count = 0;
    for &child in doc.children(parent) {
        if doc.is_highlight_wrapper(child) {
            continue;
        }
        if doc.tag_name(child) == Some(tag) {
            count += 1;
            if child == node {
                return Some(count);
            }
        }
    }
    None
}

/// The `n`-th (1-based) child of `parent` with the given tag name, skipping
/// highlight wrappers.
fn nth_child_with_tag(doc: &Document, parent: NodeId, tag: &str, n: usize) -> Option<NodeId> {
    let mut count = 0;
    for &child in doc.children(parent) {
        if doc.is_highlight_wrapper(child) {
            continue;
        }
        if doc.tag_name(child) == Some(tag) {
            count += 1;
            if count == n {
                return Some(child);
            }
        }
    }
    None
}

fn parse_element_segment(segment: &str) -> Option<(&str, usize)> {
    match segment.split_once('[') {
        Some((tag, rest)) => {
            let n: usize = rest.strip_suffix(']')?.parse().ok()?;
            Some((tag, n))
        }
        None => Some((segment, 1)),
    }
}

/// Returns the 0-based run index encoded by a `text()` / `text()[k]`
/// terminal segment.
fn parse_text_segment(segment: &str) -> Option<usize> {
    let inner = segment.strip_prefix("text()")?;
    if inner.is_empty() {
        return Some(0);
    }
    let n: usize = inner.strip_prefix('[')?.strip_suffix(']')?.parse().ok()?;
    n.checked_sub(1)
}

/// Computes the XPath of the text position `(node, local_offset)`, relative
/// to `container`. `node` must be a raw text node reachable (optionally
/// through a highlight wrapper) from `container`.
pub fn xpath_of(
    doc: &Document,
    container: NodeId,
    node: NodeId,
    local_offset: u32,
) -> Option<XPathDescriptor> {
    let parent = logical_parent(doc, node)?;
    let (run, prefix) = text_run_index(doc, parent, node)?;
    let text_segment = if run == 0 {
        "text()".to_owned()
    } else {
        format!("text()[{}]", run + 1)
    };

    let mut segments = vec![text_segment];
    let mut current = parent;
    while current != container {
        let up = doc.parent(current)?;
        let n = element_index(doc, up, current)?;
        let tag = doc.tag_name(current)?;
        segments.push(format!("{tag}[{n}]"));
        current = up;
    }
    segments.reverse();
    Some(XPathDescriptor {
        xpath: format!("/{}", segments.join("/")),
        offset: prefix + local_offset,
    })
}

/// Resolves an XPath descriptor back to a raw text node and an offset local
/// to that node, adjusting for any prior split within the logical run: a
/// caller that needs a specific raw node within a split run must account
/// for the offset by subtracting preceding siblings' lengths.
pub fn resolve(doc: &Document, container: NodeId, xpath: &str, offset: u32) -> Option<(NodeId, u32)> {
    let trimmed = xpath.strip_prefix('/')?;
    let mut segments: Vec<&str> = trimmed.split('/').collect();
    let text_segment = segments.pop()?;
    let run_idx = parse_text_segment(text_segment)?;

    let mut current = container;
    for segment in segments {
        let (tag, n) = parse_element_segment(segment)?;
        current = nth_child_with_tag(doc, current, tag, n)?;
    }

    let leaves = run_leaves(doc, current, run_idx)?;
    let mut remaining = offset;
    let mut iter = leaves.iter().peekable();
    while let Some(&leaf) = iter.next() {
        let len = doc.text_len(leaf) as u32;
        if remaining < len || iter.peek().is_none() {
            return Some((leaf, remaining));
        }
        remaining -= len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use html_highlighter_dom::Document;
    use pretty_assertions::assert_eq;

    fn doc_from(html: &str) -> Document {
        html_highlighter_dom::parse(html)
    }

    fn body(doc: &Document) -> NodeId {
        let html = doc.children(doc.root())[0];
        let body = doc
            .children(html)
            .iter()
            .copied()
            .find(|&n| doc.tag_name(n) == Some("body"))
            .unwrap();
        body
    }

    #[test]
    fn xpath_round_trips_plain_text() {
        let doc = doc_from("<p>hello</p><p>world</p>");
        let container = body(&doc);
        let p2 = doc.children(container)[1];
        let text = doc.children(p2)[0];

        let desc = xpath_of(&doc, container, text, 2).unwrap();
        assert_eq!(desc.xpath, "/p[2]/text()");
        assert_eq!(desc.offset, 2);

        let (node, offset) = resolve(&doc, container, &desc.xpath, desc.offset).unwrap();
        assert_eq!(node, text);
        assert_eq!(offset, 2);
    }

    #[test]
    fn xpath_indexes_text_runs_per_parent() {
        let doc = doc_from("<p>a<a href=\"#\">b</a>c</p>");
        let container = body(&doc);
        let p = doc.children(container)[0];
        let c_node = doc.children(p)[2];

        let desc = xpath_of(&doc, container, c_node, 0).unwrap();
        assert_eq!(desc.xpath, "/p[1]/text()[2]");

        let (node, offset) = resolve(&doc, container, &desc.xpath, 0).unwrap();
        assert_eq!(node, c_node);
        assert_eq!(offset, 0);
    }
}
