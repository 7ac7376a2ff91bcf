//! Node representation for section trees.
//!
//! A section tree is a nested, heterogeneous structure: user-defined constructs such as
//! `Section` or `Sidebar` sit alongside built-in primitives such as `div`, `input` and
//! plain text. The only distinction the tree algorithms care about is whether a node is a
//! composite (it may receive injected edit capabilities) or opaque (it must never receive
//! them, though its children might). That distinction is fixed when the node is built,
//! from the tag it is built with, and never from its content.

use crate::context::EditCapabilities;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag used for plain text leaves.
pub const TEXT_TAG: &str = "#text";

/// Tag of the transparent grouping construct.
pub const FRAGMENT_TAG: &str = "Fragment";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Eligibility of a node for capability injection.
pub enum NodeKind {
    /// User-defined construct that has children and accepts injected capabilities.
    Composite,
    /// Built-in primitive, text leaf or transparent grouping; never receives capabilities.
    Opaque,
}

impl NodeKind {
    #[must_use]
    /// Classifies a tag structurally.
    ///
    /// Uppercase-initial tags name user-defined constructs. Lowercase built-ins, `#` pseudo
    /// tags and the transparent `Fragment` wrapper all map to [`NodeKind::Opaque`].
    pub fn of_tag(tag: &str) -> Self {
        if tag == FRAGMENT_TAG {
            return Self::Opaque;
        }
        match tag.chars().next() {
            Some(c) if c.is_ascii_uppercase() => Self::Composite,
            _ => Self::Opaque,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
/// A unit of the section tree.
///
/// Nodes are treated as immutable values: every edit produces new nodes along the path
/// from the root to the change, and unrelated subtrees are carried over as they were.
pub struct Node {
    tag: String,
    #[serde(skip)]
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    props: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
    #[serde(skip)]
    capabilities: Option<EditCapabilities>,
}

/// Wire shape of a node, before its kind is derived.
#[derive(Deserialize)]
struct RawNode {
    tag: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    props: Map<String, Value>,
    #[serde(default)]
    children: Vec<Node>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let mut node = Self::element(raw.tag);
        node.key = raw.key;
        node.id = raw.id;
        node.props = raw.props;
        node.children = raw.children;
        node
    }
}

impl Node {
    #[must_use]
    /// Builds a childless node for `tag`, deciding its kind from the tag.
    pub fn element(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let kind = NodeKind::of_tag(&tag);
        Self {
            tag,
            kind,
            key: None,
            id: None,
            props: Map::new(),
            children: Vec::new(),
            capabilities: None,
        }
    }

    #[must_use]
    /// Builds an opaque text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::element(TEXT_TAG).with_prop("text", Value::String(text.into()))
    }

    #[must_use]
    /// Sets the addressable id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    /// Sets the stable key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    /// Inserts a prop, replacing any previous value under `name`.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    #[must_use]
    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    /// Appends one child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    /// Copies this node with its children swapped for `children`.
    ///
    /// Tag, kind, key, id, props and capabilities are carried over unchanged.
    pub fn rebuild(&self, children: Vec<Node>) -> Self {
        Self {
            tag: self.tag.clone(),
            kind: self.kind,
            key: self.key.clone(),
            id: self.id.clone(),
            props: self.props.clone(),
            children,
            capabilities: self.capabilities.clone(),
        }
    }

    pub(crate) fn set_capabilities(&mut self, capabilities: Option<EditCapabilities>) {
        self.capabilities = capabilities;
    }

    #[must_use]
    /// Descriptor the node was built from.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    /// Injection eligibility, fixed at construction.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    /// Whether this node may receive injected capabilities.
    pub fn is_composite(&self) -> bool {
        self.kind == NodeKind::Composite
    }

    #[must_use]
    /// Stable key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    /// Addressable id, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    /// Node-specific data.
    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    #[must_use]
    /// Looks up a string prop.
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    #[must_use]
    /// Ordered children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[must_use]
    /// Injected edit capabilities; only composites produced by injection carry them.
    pub fn capabilities(&self) -> Option<&EditCapabilities> {
        self.capabilities.as_ref()
    }

    #[must_use]
    /// Concatenated text of every text leaf below this node, one leaf per line.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.push_text(&mut parts);
        parts.join("\n")
    }

    fn push_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if self.tag == TEXT_TAG {
            if let Some(text) = self.prop_str("text") {
                parts.push(text);
            }
        }
        for child in &self.children {
            child.push_text(parts);
        }
    }
}

#[cfg(test)]
#[path = "tests/node.rs"]
mod tests;
