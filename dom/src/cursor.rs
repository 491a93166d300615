use crate::document::Document;
use crate::node::NodeId;

/// Walks a subtree in document order (pre-order, depth first), the order
/// `TextContent::build` and the XPath sibling-indexing routines both rely
/// on. An explicit stack rather than recursion, so arbitrarily deep
/// documents don't blow the call stack.
pub struct DocumentOrder<'a> {
    doc: &'a Document,
    // Reversed remaining-sibling stacks, one per ancestor level; popping the
    // last element of the top frame gives the next node to descend into.
    stack: Vec<Vec<NodeId>>,
}

impl<'a> DocumentOrder<'a> {
    pub fn new(doc: &'a Document, root: NodeId) -> Self {
        let mut siblings = doc.children(root).to_vec();
        siblings.reverse();
        DocumentOrder {
            doc,
            stack: vec![siblings],
        }
    }
}

impl Iterator for DocumentOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(node) = frame.pop() else {
                self.stack.pop();
                continue;
            };
            let mut children = self.doc.children(node).to_vec();
            children.reverse();
            self.stack.push(children);
            return Some(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_in_document_order() {
        let mut doc = Document::empty();
        let root = doc.root();
        let p1 = doc.new_element("p", &[]);
        let p2 = doc.new_element("p", &[]);
        doc.append_child(root, p1).unwrap();
        doc.append_child(root, p2).unwrap();
        let t1 = doc.new_text("a");
        let t2 = doc.new_text("b");
        let t3 = doc.new_text("c");
        doc.append_child(p1, t1).unwrap();
        doc.append_child(p1, t2).unwrap();
        doc.append_child(p2, t3).unwrap();

        let order: Vec<NodeId> = DocumentOrder::new(&doc, root).collect();
        assert_eq!(order, vec![p1, t1, t2, p2, t3]);
    }
}
