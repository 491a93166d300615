use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::document::Document;
use crate::node::NodeId;

/// Parses a complete HTML document with `html5ever` and converts the
/// resulting tree into this crate's arena.
///
/// Comments, doctypes and processing instructions are dropped during
/// conversion: they carry no addressable text and the XPath dialect this
/// system implements has no vocabulary for them.
pub fn parse(html: &str) -> Document {
    let rc_dom: RcDom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut doc = Document::empty();
    let root = doc.root();
    convert_children(&mut doc, root, &rc_dom.document);
    doc
}

fn convert_children(doc: &mut Document, parent: NodeId, rc_node: &Handle) {
    for child in rc_node.children.borrow().iter() {
        if let Some(converted) = convert_node(doc, child) {
            doc.append_child(parent, converted).expect("parent just created");
            convert_children(doc, converted, child);
        }
    }
}

fn convert_node(doc: &mut Document, rc_node: &Handle) -> Option<NodeId> {
    match &rc_node.data {
        RcNodeData::Text { contents } => Some(doc.new_text(contents.borrow().to_string())),
        RcNodeData::Element { name, attrs, .. } => {
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let attr_refs: Vec<(&str, &str)> =
                attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            Some(doc.new_element(&name.local, &attr_refs))
        }
        // `Document` shouldn't recur (we start from `rc_dom.document`'s children).
        RcNodeData::Document
        | RcNodeData::Doctype { .. }
        | RcNodeData::Comment { .. }
        | RcNodeData::ProcessingInstruction { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::DocumentOrder;

    #[test]
    fn parses_paragraphs_and_inline_markup() {
        let doc = parse("<p>Hello <a href=\"#\">world</a>!</p>");
        let root = doc.root();
        // html > head, body; body > p; p > text, a, text
        let nodes: Vec<NodeId> = DocumentOrder::new(&doc, root).collect();
        let tags: Vec<&str> = nodes.iter().filter_map(|&n| doc.tag_name(n)).collect();
        assert!(tags.contains(&"html"));
        assert!(tags.contains(&"body"));
        assert!(tags.contains(&"p"));
        assert!(tags.contains(&"a"));

        let texts: Vec<&str> = nodes.iter().filter_map(|&n| doc.text(n)).collect();
        assert_eq!(texts, vec!["Hello ", "world", "!"]);
    }

    #[test]
    fn preserves_ampersand_entities_as_literal_text() {
        let doc = parse("<p>rock &amp; roll</p>");
        let root = doc.root();
        let texts: Vec<&str> = DocumentOrder::new(&doc, root)
            .filter_map(|n| doc.text(n))
            .collect();
        assert_eq!(texts, vec!["rock & roll"]);
    }
}
