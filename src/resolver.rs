//! Prefix → URI lookup against the in-scope declarations of a reference
//! node. `xml` and `xmlns` are reserved.

use std::collections::HashMap;

use crate::consts::{XML_NS, XMLNS_NS};
use crate::model::{NodeKind, XPathNode};

pub trait NamespaceResolver {
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<String>;
}

/// A fixed prefix table is a resolver.
impl NamespaceResolver for HashMap<String, String> {
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<String> {
        self.get(prefix).cloned()
    }
}

/// Resolver backed by a reference node, as handed out by
/// `create_ns_resolver`.
#[derive(Debug, Clone)]
pub struct NodeResolver<N: XPathNode> {
    node: N,
}

pub fn create_ns_resolver<N: XPathNode>(node: &N) -> NodeResolver<N> {
    NodeResolver { node: node.clone() }
}

impl<N: XPathNode> NamespaceResolver for NodeResolver<N> {
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<String> {
        match prefix {
            "xml" => return Some(XML_NS.to_string()),
            "xmlns" => return Some(XMLNS_NS.to_string()),
            _ => {}
        }
        // A document reference starts at its document element; any other
        // non-element ascends to the nearest element.
        let mut start: Option<N> = None;
        let mut cur = Some(self.node.clone());
        while let Some(n) = cur {
            match n.kind() {
                NodeKind::Element => {
                    start = Some(n);
                    break;
                }
                NodeKind::Document => {
                    start = n
                        .children()
                        .into_iter()
                        .find(|c| c.kind() == NodeKind::Element);
                    break;
                }
                _ => cur = n.parent(),
            }
        }
        let wanted_default = prefix.is_empty();
        let declaration = format!("xmlns:{}", prefix);
        let mut cursor = start;
        while let Some(n) = cursor {
            for a in n.attributes() {
                let Some(name) = a.name() else { continue };
                if (wanted_default && name == "xmlns") || (!wanted_default && name == declaration)
                {
                    return Some(a.data());
                }
            }
            cursor = n.parent().filter(|p| p.kind() == NodeKind::Element);
        }
        None
    }
}
