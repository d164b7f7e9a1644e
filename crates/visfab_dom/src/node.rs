//! Node storage

use indexmap::IndexMap;
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node owned by a [`Document`](crate::Document)
    pub struct NodeId;
}

/// What a node is
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// The document root
    Document,
    /// An element such as `div` or `vis-fab`
    Element(ElementData),
    /// A text node
    Text(String),
    /// Root of a shadow tree; never appears in its host's child list
    ShadowRoot { host: NodeId },
}

/// Element-specific state
#[derive(Clone, Debug, Default)]
pub struct ElementData {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    /// Inline style declarations (custom properties included)
    pub style: IndexMap<String, String>,
    /// Checkedness, meaningful for `<input type="checkbox">`
    pub checked: bool,
    pub shadow_root: Option<NodeId>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// A node in the arena
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Whether this node may hold children
    pub(crate) fn is_container(&self) -> bool {
        !matches!(self.kind, NodeKind::Text(_))
    }
}
