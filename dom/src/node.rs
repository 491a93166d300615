use slotmap::new_key_type;

new_key_type! {
    /// A handle into a [`Document`](crate::Document)'s arena.
    ///
    /// Stands in for a live DOM node reference: equality of `NodeId` is
    /// reference identity on a node, which `TextContent::find` relies on.
    pub struct NodeId;
}

/// Element-specific data: tag name, attributes and the parsed class list.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub name: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    /// Set by [`Document::wrap`](crate::Document::wrap) and cleared by
    /// [`Document::unwrap`](crate::Document::unwrap). Identifies the
    /// highlighter's own wrapper elements by a node property rather than by
    /// class name, so XPath sibling-indexing never desyncs if user content
    /// happens to carry the highlight class itself.
    pub is_highlight_wrapper: bool,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        ElementData {
            name: name.into(),
            attrs: Vec::new(),
            classes: Vec::new(),
            is_highlight_wrapper: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "class" {
            self.classes = value.split_ascii_whitespace().map(str::to_owned).collect();
        }
        if let Some(existing) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            existing.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
        if name == "class" {
            self.classes.clear();
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
            self.sync_class_attr();
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        if self.classes.len() != before {
            self.sync_class_attr();
        }
    }

    fn sync_class_attr(&mut self) {
        let joined = self.classes.join(" ");
        if let Some(existing) = self.attrs.iter_mut().find(|(k, _)| k == "class") {
            existing.1 = joined;
        } else {
            self.attrs.push(("class".to_owned(), joined));
        }
    }
}

/// Per-node payload. Comments and processing instructions from the parsed
/// markup are dropped during conversion (see `dom::parse`): they carry no
/// text and are not addressable by this system's XPath dialect.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

impl NodeData {
    pub fn is_text(&self) -> bool {
        matches!(self, NodeData::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeData::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Node {
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
