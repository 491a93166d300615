//! Turns a [`Range`] into (or back out of) wrapper elements in the DOM.

use html_highlighter_dom::{Document, DocumentOrder, NodeId};

use crate::css;
use crate::range::Range;
use crate::text_content::TextContent;

/// How a single highlight should be rendered into the DOM.
pub struct HighlightStyle<'a> {
    pub id: u64,
    /// The owning query set's rotating CSS variant selector, always
    /// rendered as a `highlight-id_<n>` class.
    pub id_highlight: u32,
    pub query: &'a str,
    pub use_query_as_class: bool,
    pub disabled: bool,
}

/// Wraps every node `range` spans in `<span>` elements carrying the CSS
/// contract from [`crate::css`]. A range that crosses element boundaries
/// (e.g. a multi-paragraph selection) produces one wrapper per maximal run
/// of same-parent siblings, all tagged with the same [`css::ID_ATTR`] so
/// [`unhighlight`] can find them again as a group.
///
/// `content` is read-only: splitting text nodes invalidates its offsets, so
/// callers must `TextContent::refresh` after this returns - it is not
/// updated in-flight.
pub fn highlight(
    doc: &mut Document,
    content: &TextContent,
    container: NodeId,
    range: &Range,
    style: &HighlightStyle,
) -> Option<Vec<NodeId>> {
    let start_marker = content.at(range.start.marker)?;
    let end_marker = content.at(range.end.marker)?;
    let (start_node, end_node) = (start_marker.node, end_marker.node);

    // Split the end first: if start and end share a node, splitting at the
    // end offset doesn't disturb the start offset we still need to act on.
    let end_len = doc.text_len(end_node) as u32;
    if range.end.offset + 1 < end_len {
        doc.split_text(end_node, range.end.offset + 1).ok()?;
    }
    let start_node = if range.start.offset > 0 {
        doc.split_text(start_node, range.start.offset).ok()?
    } else {
        start_node
    };

    let span = collect_span(doc, container, start_node, end_node);
    if span.is_empty() {
        return Some(Vec::new());
    }

    let mut classes = vec![
        css::HIGHLIGHT_CLASS.to_owned(),
        css::highlight_id_class(style.id_highlight),
    ];
    if style.use_query_as_class {
        classes.push(css::query_class(style.query));
    }
    if style.disabled {
        classes.push(css::DISABLED_CLASS.to_owned());
    }
    let class_attr = classes.join(" ");
    let id_attr = style.id.to_string();

    let mut wrappers = Vec::new();
    for run in group_by_parent(doc, &span) {
        let wrapper = doc
            .wrap(
                &run,
                "span",
                &[
                    ("class", class_attr.as_str()),
                    (css::ID_ATTR, id_attr.as_str()),
                    (css::QUERY_ATTR, style.query),
                ],
            )
            .ok()?;
        wrappers.push(wrapper);
    }
    Some(wrappers)
}

/// Removes every wrapper tagged with `id`, restoring the raw text they
/// wrapped, and normalizes each affected parent back to merged text nodes.
pub fn unhighlight(doc: &mut Document, container: NodeId, id: u64) -> Vec<NodeId> {
    let wrappers = doc.find_by_attr(container, css::ID_ATTR, &id.to_string());
    let mut parents = Vec::new();
    for wrapper in wrappers {
        if let Some(parent) = doc.parent(wrapper) {
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        let _ = doc.unwrap(wrapper);
    }
    for parent in &parents {
        doc.normalize(*parent);
    }
    parents
}

/// Collects every raw text/element node between `start` and `end` inclusive,
/// in document order, by walking `container`'s subtree and slicing between
/// the two markers.
fn collect_span(doc: &Document, container: NodeId, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut span = Vec::new();
    let mut collecting = false;
    for node in DocumentOrder::new(doc, container) {
        if doc.text(node).is_none() {
            continue;
        }
        if node == start {
            collecting = true;
        }
        if collecting {
            span.push(node);
        }
        if node == end {
            break;
        }
    }
    span
}

/// Splits `nodes` (assumed to be in document order) into maximal runs of
/// actual contiguous siblings, since [`Document::wrap`] rejects anything
/// else. Same-parent is necessary but not sufficient: `<p>Hello<br>World</p>`
/// has both text nodes parented by `<p>`, but a `<br>` sits between them in
/// its child list, so they must not be merged into one run.
fn group_by_parent(doc: &Document, nodes: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    for &node in nodes {
        let extends_last_run = match (runs.last(), doc.parent(node)) {
            (Some(run), Some(parent)) => is_next_sibling(doc, parent, *run.last().unwrap(), node),
            _ => false,
        };
        if extends_last_run {
            runs.last_mut().expect("checked above").push(node);
        } else {
            runs.push(vec![node]);
        }
    }
    runs
}

/// Whether `candidate` immediately follows `node` among `parent`'s children.
fn is_next_sibling(doc: &Document, parent: NodeId, node: NodeId, candidate: NodeId) -> bool {
    let siblings = doc.children(parent);
    siblings
        .iter()
        .position(|&s| s == node)
        .is_some_and(|i| siblings.get(i + 1) == Some(&candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionDescriptor;
    use html_highlighter_dom::parse;

    #[test]
    fn highlights_a_single_word() {
        let mut doc = parse("<p>hello world</p>");
        let container = doc.root();
        let content = TextContent::build(&doc, container);
        let range = Range::new(
            PositionDescriptor { marker: 0, offset: 0 },
            PositionDescriptor { marker: 0, offset: 4 },
        );
        let style = HighlightStyle {
            id: 1,
            id_highlight: 3,
            query: "demo",
            use_query_as_class: true,
            disabled: false,
        };
        let wrappers = highlight(&mut doc, &content, container, &range, &style).unwrap();
        assert_eq!(wrappers.len(), 1);
        assert!(doc.has_class(wrappers[0], "highlight"));
        assert!(doc.has_class(wrappers[0], "highlight-id_3"));
        assert!(doc.has_class(wrappers[0], "highlight-demo"));

        let refreshed = TextContent::build(&doc, container);
        assert_eq!(refreshed.text().to_string(), "hello world");

        let touched = unhighlight(&mut doc, container, 1);
        assert_eq!(touched.len(), 1);
        let restored = TextContent::build(&doc, container);
        assert_eq!(restored.text().to_string(), "hello world");
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn highlights_across_paragraphs_with_one_wrapper_per_parent() {
        let mut doc = parse("<p>one two</p><p>three four</p>");
        let container = doc.root();
        let content = TextContent::build(&doc, container);
        // "two three" spans both paragraphs.
        let range = Range::new(
            PositionDescriptor { marker: 0, offset: 4 },
            PositionDescriptor { marker: 1, offset: 4 },
        );
        let style = HighlightStyle {
            id: 7,
            id_highlight: 0,
            query: "demo",
            use_query_as_class: false,
            disabled: false,
        };
        let wrappers = highlight(&mut doc, &content, container, &range, &style).unwrap();
        assert_eq!(wrappers.len(), 2);
    }

    #[test]
    fn highlights_across_a_same_parent_non_adjacent_gap() {
        // Both text nodes are parented by <p>, but <br> sits between them in
        // <p>'s child list - they must wrap as two separate runs, not one.
        let mut doc = parse("<p>Hello<br>World</p>");
        let container = doc.root();
        let content = TextContent::build(&doc, container);
        let range = Range::new(
            PositionDescriptor { marker: 0, offset: 0 },
            PositionDescriptor { marker: 1, offset: 4 },
        );
        let style = HighlightStyle {
            id: 1,
            id_highlight: 0,
            query: "demo",
            use_query_as_class: false,
            disabled: false,
        };
        let wrappers = highlight(&mut doc, &content, container, &range, &style).unwrap();
        assert_eq!(wrappers.len(), 2);

        let refreshed = TextContent::build(&doc, container);
        assert_eq!(refreshed.text().to_string(), "HelloWorld");
    }
}
