use crate::engine::runtime::Error;

pub mod simple;

use core::cmp::Ordering;
use core::fmt;

/// Node kinds the engine recognises. Host trees never produce `Namespace`
/// nodes; the engine synthesises them from `xmlns` declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// Uniform adapter over a host XML/HTML tree.
///
/// Implementations are cheap handles (reference-counted pointers or
/// index-into-arena pairs); the engine clones them freely. Equality must be
/// node identity within one tree.
///
/// `attributes` returns the *specified* attributes in document order and
/// must include namespace declarations (`xmlns`, `xmlns:p`); the engine
/// filters those out of the attribute axis and feeds them to namespace-node
/// synthesis instead.
pub trait XPathNode: Clone + Eq + core::hash::Hash + fmt::Debug + 'static {
    fn kind(&self) -> NodeKind;

    /// Raw qualified name as written in the source: element/attribute name
    /// (possibly `prefix:local`), processing-instruction target. `None` for
    /// unnamed kinds.
    fn name(&self) -> Option<String>;

    /// Raw character data: attribute value, text/CDATA/comment data,
    /// processing-instruction data. Empty for element and document nodes
    /// (their string-value is derived by the engine).
    fn data(&self) -> String;

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn attributes(&self) -> Vec<Self>;

    /// Native document-order comparison, when the host can provide one.
    /// Returning `None` selects the ancestry-based fallback.
    fn compare_document_order(&self, other: &Self) -> Option<Ordering> {
        let _ = other;
        None
    }
}

/// Document-order fallback for adapters without a native comparison.
///
/// Lifts both nodes to a shared parent: an ancestor precedes everything
/// beneath it, and two nodes hanging off the same parent order as
/// attributes-then-children in adapter order. Nodes under different roots
/// have no defined order here; adapters holding several trees must
/// override `XPathNode::compare_document_order` with a total order.
pub fn compare_by_ancestry<N: XPathNode>(a: &N, b: &N) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    let mut x = a.clone();
    let mut y = b.clone();
    let mut depth_x = node_depth(&x);
    let mut depth_y = node_depth(&y);
    // Raise the deeper side first. Stepping onto the other node proves an
    // ancestor relation, and an ancestor sorts before its descendants.
    while depth_x > depth_y {
        let Some(up) = x.parent() else { break };
        if up == y {
            return Ok(Ordering::Greater);
        }
        x = up;
        depth_x -= 1;
    }
    while depth_y > depth_x {
        let Some(up) = y.parent() else { break };
        if up == x {
            return Ok(Ordering::Less);
        }
        y = up;
        depth_y -= 1;
    }
    // Climb in lockstep until both sides meet under one parent.
    loop {
        match (x.parent(), y.parent()) {
            (Some(px), Some(py)) if px == py => return sibling_order(&px, &x, &y),
            (Some(px), Some(py)) => {
                x = px;
                y = py;
            }
            _ => {
                return Err(Error::internal(
                    "document order undefined for nodes from different trees",
                ));
            }
        }
    }
}

fn node_depth<N: XPathNode>(n: &N) -> usize {
    let mut depth = 0;
    let mut cursor = n.parent();
    while let Some(up) = cursor {
        depth += 1;
        cursor = up.parent();
    }
    depth
}

/// Order two distinct members of one parent. Attributes sort before child
/// nodes, and each group keeps the order the adapter reports.
fn sibling_order<N: XPathNode>(parent: &N, x: &N, y: &N) -> Result<Ordering, Error> {
    let rank = |n: &N| {
        parent
            .attributes()
            .iter()
            .position(|s| s == n)
            .map(|i| (0usize, i))
            .or_else(|| {
                parent
                    .children()
                    .iter()
                    .position(|s| s == n)
                    .map(|i| (1usize, i))
            })
    };
    match (rank(x), rank(y)) {
        (Some(rx), Some(ry)) => Ok(rx.cmp(&ry)),
        _ => Err(Error::internal(
            "node not reported among its parent's attributes or children",
        )),
    }
}
