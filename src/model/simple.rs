//! Simple in-memory tree implementing [`XPathNode`], used by the test suite
//! and as a reference adapter.
//!
//! Namespace declarations are ordinary attributes (`xmlns`, `xmlns:p`); the
//! engine synthesises namespace nodes from them on demand.
//!
//! ```
//! use openrosa_xpath::model::simple::{elem, attr, text};
//! use openrosa_xpath::model::XPathNode;
//!
//! // <root id="r"><child>Hello</child></root>
//! let root = elem("root")
//!     .attr(attr("id", "r"))
//!     .child(elem("child").child(text("Hello")))
//!     .build();
//!
//! assert_eq!(root.name().as_deref(), Some("root"));
//! assert_eq!(root.children().len(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use super::{NodeKind, XPathNode};

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    name: Option<String>,
    value: Option<String>,
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: RwLock<Vec<SimpleNode>>,
    children: RwLock<Vec<SimpleNode>>,
}

/// An `Arc`-backed node with pointer identity.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0)).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<String>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value,
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
        }))
    }
}

impl XPathNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<String> {
        self.0.name.clone()
    }

    fn data(&self) -> String {
        self.0.value.clone().unwrap_or_default()
    }

    fn parent(&self) -> Option<Self> {
        self.0
            .parent
            .read()
            .ok()?
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0
            .attributes
            .read()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    fn compare_document_order(&self, _other: &Self) -> Option<Ordering> {
        None
    }
}

/// Builder producing a finished subtree; parent links are wired on `build`.
pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleNode>,
}

/// Either a finished node or a builder, so `child(...)` accepts both.
pub enum NodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl From<SimpleNode> for NodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        NodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for NodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        NodeOrBuilder::Builder(b)
    }
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<String>) -> Self {
        Self {
            node: SimpleNode::new(kind, name, None),
            pending_children: Vec::new(),
            pending_attrs: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<NodeOrBuilder>) -> Self {
        match child.into() {
            NodeOrBuilder::Built(n) => self.pending_children.push(n),
            NodeOrBuilder::Builder(b) => self.pending_children.push(b.build()),
        }
        self
    }

    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.pending_attrs.push(attr);
        self
    }

    pub fn build(self) -> SimpleNode {
        {
            let mut attrs = self.node.0.attributes.write().expect("builder lock");
            for a in &self.pending_attrs {
                *a.0.parent.write().expect("builder lock") = Some(Arc::downgrade(&self.node.0));
            }
            attrs.extend(self.pending_attrs);
        }
        {
            let mut children = self.node.0.children.write().expect("builder lock");
            for c in &self.pending_children {
                *c.0.parent.write().expect("builder lock") = Some(Arc::downgrade(&self.node.0));
            }
            children.extend(self.pending_children);
        }
        self.node
    }
}

/// Document root builder.
pub fn doc() -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Document, None)
}

/// Element builder; `name` may carry a prefix (`p:local`).
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Element, Some(name.to_string()))
}

/// Attribute node. Namespace declarations are written as plain attributes:
/// `attr("xmlns:p", "urn:x")`.
pub fn attr(name: &str, value: &str) -> SimpleNode {
    SimpleNode::new(
        NodeKind::Attribute,
        Some(name.to_string()),
        Some(value.to_string()),
    )
}

pub fn text(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::Text, None, Some(value.to_string()))
}

pub fn cdata(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::CData, None, Some(value.to_string()))
}

pub fn comment(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::Comment, None, Some(value.to_string()))
}

pub fn pi(target: &str, data: &str) -> SimpleNode {
    SimpleNode::new(
        NodeKind::ProcessingInstruction,
        Some(target.to_string()),
        Some(data.to_string()),
    )
}
