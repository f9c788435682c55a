//! Doc-order-tagged node sets: lazy sorting, duplicate-free merge-union,
//! per-node string values with date promotion.

use std::cmp::Ordering;

use crate::engine::node::{compare_order, Node};
use crate::engine::runtime::Error;
use crate::model::XPathNode;
use crate::temporal;
use crate::value::Value;

/// What is known about a set's ordering. `Document` implies sorted and
/// duplicate-free; `ReverseDocument` is its exact reverse; `Unsorted` makes
/// no claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOrder {
    Unsorted,
    Document,
    ReverseDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSet<N: XPathNode> {
    nodes: Vec<Node<N>>,
    order: DocOrder,
}

impl<N: XPathNode> NodeSet<N> {
    pub fn new(order: DocOrder) -> Self {
        NodeSet {
            nodes: Vec::new(),
            order,
        }
    }

    pub fn from_nodes(nodes: Vec<Node<N>>, order: DocOrder) -> Self {
        NodeSet { nodes, order }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn order(&self) -> DocOrder {
        self.order
    }

    pub fn nodes(&self) -> &[Node<N>] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node<N>> {
        self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<N>> {
        self.nodes.iter()
    }

    pub fn push(&mut self, node: Node<N>) {
        self.nodes.push(node);
    }

    /// Sort into document order. Lazy: only an `Unsorted` tag triggers a
    /// comparison sort; a reverse-tagged set is flipped in place. Sorting
    /// also drops duplicates, upholding the document-order invariant.
    pub fn sort_document_order(&mut self) -> Result<(), Error> {
        match self.order {
            DocOrder::Document => Ok(()),
            DocOrder::ReverseDocument => {
                self.nodes.reverse();
                self.order = DocOrder::Document;
                Ok(())
            }
            DocOrder::Unsorted => {
                self.comparison_sort()?;
                self.order = DocOrder::Document;
                Ok(())
            }
        }
    }

    pub fn sort_reverse_document_order(&mut self) -> Result<(), Error> {
        match self.order {
            DocOrder::ReverseDocument => Ok(()),
            DocOrder::Document => {
                self.nodes.reverse();
                self.order = DocOrder::ReverseDocument;
                Ok(())
            }
            DocOrder::Unsorted => {
                self.comparison_sort()?;
                self.nodes.reverse();
                self.order = DocOrder::ReverseDocument;
                Ok(())
            }
        }
    }

    fn comparison_sort(&mut self) -> Result<(), Error> {
        let mut failure: Option<Error> = None;
        self.nodes.sort_by(|a, b| match compare_order(a, b) {
            Ok(ord) => ord,
            Err(e) => {
                failure.get_or_insert(e);
                Ordering::Equal
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        self.nodes.dedup();
        Ok(())
    }

    /// Duplicate-eliminating merge of two document-ordered sets. Both sides
    /// must already be in document order.
    pub fn append(&mut self, other: NodeSet<N>) -> Result<(), Error> {
        if self.nodes.is_empty() {
            self.nodes = other.nodes;
            self.order = DocOrder::Document;
            return Ok(());
        }
        if other.nodes.is_empty() {
            return Ok(());
        }
        let left = std::mem::take(&mut self.nodes);
        let mut merged = Vec::with_capacity(left.len() + other.nodes.len());
        let mut li = left.into_iter().peekable();
        let mut ri = other.nodes.into_iter().peekable();
        loop {
            let take_left = match (li.peek(), ri.peek()) {
                (Some(l), Some(r)) => match compare_order(l, r)? {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => {
                        ri.next();
                        true
                    }
                },
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { li.next() } else { ri.next() };
            if let Some(n) = next {
                merged.push(n);
            }
        }
        self.nodes = merged;
        self.order = DocOrder::Document;
        Ok(())
    }

    /// Per-node string values in stored order, each promoted to a date
    /// value when its text is a date string. This is what makes node-set ×
    /// date comparisons work.
    pub fn string_values(&self) -> Vec<Value<N>> {
        self.nodes
            .iter()
            .map(|n| {
                let s = n.string_value();
                if temporal::is_date_string(&s) {
                    Value::Date(temporal::parse_date(&s))
                } else {
                    Value::String(s)
                }
            })
            .collect()
    }

    /// First member in document order without re-sorting the set. For an
    /// unsorted set this is a linear scan; comparison failures (multi-root
    /// adapters without a native order) degrade to the stored order.
    pub fn first_in_document_order(&self) -> Option<&Node<N>> {
        match self.order {
            DocOrder::Document => self.nodes.first(),
            DocOrder::ReverseDocument => self.nodes.last(),
            DocOrder::Unsorted => self.nodes.iter().reduce(|best, n| {
                match compare_order(n, best) {
                    Ok(Ordering::Less) => n,
                    _ => best,
                }
            }),
        }
    }
}
