//! The engine's node view: host tree nodes plus synthesised namespace
//! nodes, expanded names, string-values and document-order comparison.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::consts::{XML_NS, XMLNS_NS};
use crate::engine::runtime::{Error, Options};
use crate::model::{compare_by_ancestry, NodeKind, XPathNode};

/// A pair (namespace URI, local name) identifying an element or attribute
/// across prefix aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

/// A namespace node synthesised for one requesting element.
///
/// `pos` is the node's index in the owner's deterministic in-scope list,
/// which makes ordering two namespace nodes of one owner a plain integer
/// comparison — no shared comparator state. Structural equality over
/// (owner, prefix, uri) coincides with identity because the list is
/// deterministic per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceNode<N: XPathNode> {
    pub prefix: String,
    pub uri: String,
    pub owner: N,
    pub(crate) pos: usize,
}

/// A node as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node<N: XPathNode> {
    Tree(N),
    Namespace(NamespaceNode<N>),
}

/// Split a raw qualified name on `:`.
pub(crate) fn split_qname(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, raw),
    }
}

fn is_xmlns_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

impl<N: XPathNode> Node<N> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Tree(n) => n.kind(),
            Node::Namespace(_) => NodeKind::Namespace,
        }
    }

    pub fn as_tree(&self) -> Option<&N> {
        match self {
            Node::Tree(n) => Some(n),
            Node::Namespace(_) => None,
        }
    }

    /// Raw qualified name: element/attribute name as written, PI target,
    /// the prefix for a namespace node.
    pub fn raw_name(&self) -> Option<String> {
        match self {
            Node::Tree(n) => n.name(),
            Node::Namespace(ns) => Some(ns.prefix.clone()),
        }
    }

    pub fn parent(&self) -> Option<Node<N>> {
        match self {
            Node::Tree(n) => n.parent().map(Node::Tree),
            Node::Namespace(ns) => Some(Node::Tree(ns.owner.clone())),
        }
    }

    /// Children visible to XPath: elements keep element/text/CDATA/PI/
    /// comment children, the document keeps element/PI/comment children,
    /// every other kind has none.
    pub fn children(&self) -> Vec<Node<N>> {
        let Node::Tree(n) = self else {
            return Vec::new();
        };
        let keep: &[NodeKind] = match n.kind() {
            NodeKind::Element => &[
                NodeKind::Element,
                NodeKind::Text,
                NodeKind::CData,
                NodeKind::ProcessingInstruction,
                NodeKind::Comment,
            ],
            NodeKind::Document => &[
                NodeKind::Element,
                NodeKind::ProcessingInstruction,
                NodeKind::Comment,
            ],
            _ => return Vec::new(),
        };
        n.children()
            .into_iter()
            .filter(|c| keep.contains(&c.kind()))
            .map(Node::Tree)
            .collect()
    }

    /// Specified attributes of an element, namespace declarations excluded.
    pub fn attributes(&self) -> Vec<Node<N>> {
        let Node::Tree(n) = self else {
            return Vec::new();
        };
        if n.kind() != NodeKind::Element {
            return Vec::new();
        }
        n.attributes()
            .into_iter()
            .filter(|a| {
                a.kind() == NodeKind::Attribute
                    && !a.name().is_some_and(|name| is_xmlns_declaration(&name))
            })
            .map(Node::Tree)
            .collect()
    }

    /// Synthesise the in-scope namespace nodes of an element: walk to the
    /// root collecting `xmlns`/`xmlns:p` attributes, first occurrence of a
    /// prefix wins, an empty default namespace is dropped and `xml` is
    /// always appended. Each node is owned by the *requesting* element.
    pub fn namespaces(&self, options: &Options) -> Vec<NamespaceNode<N>> {
        let Node::Tree(el) = self else {
            return Vec::new();
        };
        if el.kind() != NodeKind::Element {
            return Vec::new();
        }
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor = Some(el.clone());
        while let Some(n) = cursor {
            if n.kind() == NodeKind::Element {
                for a in n.attributes() {
                    let Some(name) = a.name() else { continue };
                    let prefix = if name == "xmlns" {
                        String::new()
                    } else if let Some(rest) = name.strip_prefix("xmlns:") {
                        options.fold_name(rest)
                    } else {
                        continue;
                    };
                    if prefix == "xml" || prefix == "xmlns" {
                        continue;
                    }
                    if seen.insert(prefix.clone()) {
                        entries.push((prefix, a.data()));
                    }
                }
            }
            cursor = n.parent();
        }
        entries.retain(|(p, uri)| !(p.is_empty() && uri.is_empty()));
        entries.push(("xml".to_string(), XML_NS.to_string()));
        entries
            .into_iter()
            .enumerate()
            .map(|(pos, (prefix, uri))| NamespaceNode {
                prefix,
                uri,
                owner: el.clone(),
                pos,
            })
            .collect()
    }

    /// XPath string-value. Elements and documents concatenate descendant
    /// text/CDATA data in document order.
    pub fn string_value(&self) -> String {
        match self {
            Node::Namespace(ns) => ns.uri.clone(),
            Node::Tree(n) => match n.kind() {
                NodeKind::Document | NodeKind::Element => {
                    let mut out = String::new();
                    collect_text(n, &mut out);
                    out
                }
                _ => n.data(),
            },
        }
    }

    /// Expanded name per node kind; `Ok(None)` for unnamed kinds. A bare
    /// element name takes the in-scope default namespace; a bare attribute
    /// name never does. An unresolved prefix is an internal error.
    pub fn expanded_name(&self, options: &Options) -> Result<Option<ExpandedName>, Error> {
        match self {
            Node::Namespace(ns) => Ok(Some(ExpandedName {
                ns_uri: None,
                local: ns.prefix.clone(),
            })),
            Node::Tree(n) => match n.kind() {
                NodeKind::Element => {
                    let Some(raw) = n.name() else {
                        return Ok(None);
                    };
                    match split_qname(&raw) {
                        (Some(p), local) => {
                            let uri = resolve_prefix(n, p, options).ok_or_else(|| {
                                Error::internal(format!("undeclared namespace prefix '{}'", p))
                            })?;
                            Ok(Some(ExpandedName {
                                ns_uri: Some(uri),
                                local: local.to_string(),
                            }))
                        }
                        (None, local) => Ok(Some(ExpandedName {
                            ns_uri: default_namespace(n),
                            local: local.to_string(),
                        })),
                    }
                }
                NodeKind::Attribute => {
                    let Some(raw) = n.name() else {
                        return Ok(None);
                    };
                    match split_qname(&raw) {
                        (Some(p), local) => {
                            let owner = n.parent().ok_or_else(|| {
                                Error::internal("attribute node without an owner element")
                            })?;
                            let uri = resolve_prefix(&owner, p, options).ok_or_else(|| {
                                Error::internal(format!("undeclared namespace prefix '{}'", p))
                            })?;
                            Ok(Some(ExpandedName {
                                ns_uri: Some(uri),
                                local: local.to_string(),
                            }))
                        }
                        (None, local) => Ok(Some(ExpandedName {
                            ns_uri: None,
                            local: local.to_string(),
                        })),
                    }
                }
                NodeKind::ProcessingInstruction => Ok(n.name().map(|target| ExpandedName {
                    ns_uri: None,
                    local: target,
                })),
                _ => Ok(None),
            },
        }
    }

    /// The root of the tree holding this node.
    pub fn document_root(&self) -> Node<N> {
        let mut cur = match self {
            Node::Tree(n) => n.clone(),
            Node::Namespace(ns) => ns.owner.clone(),
        };
        while let Some(p) = cur.parent() {
            cur = p;
        }
        Node::Tree(cur)
    }
}

fn collect_text<N: XPathNode>(n: &N, out: &mut String) {
    for c in n.children() {
        match c.kind() {
            NodeKind::Text | NodeKind::CData => out.push_str(&c.data()),
            NodeKind::Element => collect_text(&c, out),
            _ => {}
        }
    }
}

/// Resolve `prefix` against the `xmlns:` declarations in scope at `el`.
pub(crate) fn resolve_prefix<N: XPathNode>(
    el: &N,
    prefix: &str,
    options: &Options,
) -> Option<String> {
    if prefix == "xml" {
        return Some(XML_NS.to_string());
    }
    if prefix == "xmlns" {
        return Some(XMLNS_NS.to_string());
    }
    let folded = options.fold_name(prefix);
    let mut cursor = Some(el.clone());
    while let Some(n) = cursor {
        if n.kind() == NodeKind::Element {
            for a in n.attributes() {
                if let Some(name) = a.name() {
                    if let Some(p) = name.strip_prefix("xmlns:") {
                        if options.fold_name(p) == folded {
                            return Some(a.data());
                        }
                    }
                }
            }
        }
        cursor = n.parent();
    }
    None
}

/// The in-scope default namespace at `el`, if any. An empty `xmlns=""`
/// un-declares it.
fn default_namespace<N: XPathNode>(el: &N) -> Option<String> {
    let mut cursor = Some(el.clone());
    while let Some(n) = cursor {
        if n.kind() == NodeKind::Element {
            for a in n.attributes() {
                if a.name().as_deref() == Some("xmlns") {
                    let uri = a.data();
                    return if uri.is_empty() { None } else { Some(uri) };
                }
            }
        }
        cursor = n.parent();
    }
    None
}

/// Document-order comparison over engine nodes.
///
/// Namespace nodes of one owner order by their synthesised positions; a
/// namespace node otherwise stands in for its owner element, following the
/// element itself and preceding its attributes and children.
pub fn compare_order<N: XPathNode>(a: &Node<N>, b: &Node<N>) -> Result<Ordering, Error> {
    match (a, b) {
        (Node::Namespace(x), Node::Namespace(y)) if x.owner == y.owner => {
            Ok(x.pos.cmp(&y.pos))
        }
        _ => {
            let ta = reduce(a);
            let tb = reduce(b);
            if ta == tb {
                // Same element after substitution: an element precedes its
                // own namespace nodes.
                return Ok(match (a, b) {
                    (Node::Namespace(_), Node::Tree(_)) => Ordering::Greater,
                    (Node::Tree(_), Node::Namespace(_)) => Ordering::Less,
                    _ => Ordering::Equal,
                });
            }
            match ta.compare_document_order(&tb) {
                Some(ord) => Ok(ord),
                None => compare_by_ancestry(&ta, &tb),
            }
        }
    }
}

/// The tree node a namespace node stands in for when ordered against
/// anything outside its owner; an attribute compared against a namespace
/// node of its own element reduces to itself.
fn reduce<N: XPathNode>(n: &Node<N>) -> N {
    match n {
        Node::Tree(t) => t.clone(),
        Node::Namespace(ns) => ns.owner.clone(),
    }
}
