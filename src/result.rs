//! The result facade: ten result kinds over a typed value, with iterator,
//! snapshot and single-node access. Impermissible conversions and
//! wrong-kind accessors raise `TYPE_ERR`.

use crate::engine::node::Node;
use crate::engine::runtime::Error;
use crate::model::XPathNode;
use crate::value::Value;

/// DOM result-kind codes 0–9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Any,
    Number,
    String,
    Boolean,
    UnorderedNodeIterator,
    OrderedNodeIterator,
    UnorderedNodeSnapshot,
    OrderedNodeSnapshot,
    AnyUnorderedNode,
    FirstOrderedNode,
}

impl ResultKind {
    pub fn code(self) -> u16 {
        match self {
            ResultKind::Any => 0,
            ResultKind::Number => 1,
            ResultKind::String => 2,
            ResultKind::Boolean => 3,
            ResultKind::UnorderedNodeIterator => 4,
            ResultKind::OrderedNodeIterator => 5,
            ResultKind::UnorderedNodeSnapshot => 6,
            ResultKind::OrderedNodeSnapshot => 7,
            ResultKind::AnyUnorderedNode => 8,
            ResultKind::FirstOrderedNode => 9,
        }
    }

    pub fn from_code(code: u16) -> Option<ResultKind> {
        Some(match code {
            0 => ResultKind::Any,
            1 => ResultKind::Number,
            2 => ResultKind::String,
            3 => ResultKind::Boolean,
            4 => ResultKind::UnorderedNodeIterator,
            5 => ResultKind::OrderedNodeIterator,
            6 => ResultKind::UnorderedNodeSnapshot,
            7 => ResultKind::OrderedNodeSnapshot,
            8 => ResultKind::AnyUnorderedNode,
            9 => ResultKind::FirstOrderedNode,
            _ => return None,
        })
    }

    fn is_node_kind(self) -> bool {
        matches!(
            self,
            ResultKind::UnorderedNodeIterator
                | ResultKind::OrderedNodeIterator
                | ResultKind::UnorderedNodeSnapshot
                | ResultKind::OrderedNodeSnapshot
                | ResultKind::AnyUnorderedNode
                | ResultKind::FirstOrderedNode
        )
    }

    fn is_iterator(self) -> bool {
        matches!(
            self,
            ResultKind::UnorderedNodeIterator | ResultKind::OrderedNodeIterator
        )
    }

    fn is_snapshot(self) -> bool {
        matches!(
            self,
            ResultKind::UnorderedNodeSnapshot | ResultKind::OrderedNodeSnapshot
        )
    }

    fn is_single(self) -> bool {
        matches!(self, ResultKind::AnyUnorderedNode | ResultKind::FirstOrderedNode)
    }

    fn wants_document_order(self) -> bool {
        matches!(
            self,
            ResultKind::OrderedNodeIterator
                | ResultKind::OrderedNodeSnapshot
                | ResultKind::FirstOrderedNode
        )
    }
}

#[derive(Debug, Clone)]
enum ResultValue<N: XPathNode> {
    Number(f64),
    String(String),
    Boolean(bool),
    Nodes(Vec<Node<N>>),
}

#[derive(Debug, Clone)]
pub struct XPathResult<N: XPathNode> {
    kind: ResultKind,
    value: ResultValue<N>,
    cursor: usize,
}

impl<N: XPathNode> XPathResult<N> {
    pub(crate) fn new(value: Value<N>, requested: ResultKind) -> Result<Self, Error> {
        let kind = match requested {
            ResultKind::Any => match &value {
                Value::NodeSet(_) => ResultKind::UnorderedNodeIterator,
                Value::Number(_) => ResultKind::Number,
                Value::Boolean(_) => ResultKind::Boolean,
                Value::String(_) | Value::Date(_) => ResultKind::String,
            },
            other => other,
        };
        let value = match kind {
            ResultKind::Number => ResultValue::Number(value.to_number()),
            ResultKind::String => ResultValue::String(value.to_xpath_string()),
            ResultKind::Boolean => ResultValue::Boolean(value.to_boolean()),
            _ => {
                let mut set = value.to_node_set().map_err(|_| {
                    Error::type_err("result cannot be converted to the requested node kind")
                })?;
                if kind.wants_document_order() {
                    set.sort_document_order()?;
                }
                ResultValue::Nodes(set.into_nodes())
            }
        };
        Ok(XPathResult {
            kind,
            value,
            cursor: 0,
        })
    }

    pub fn result_type(&self) -> ResultKind {
        self.kind
    }

    pub fn number_value(&self) -> Result<f64, Error> {
        match &self.value {
            ResultValue::Number(n) if self.kind == ResultKind::Number => Ok(*n),
            _ => Err(Error::type_err("result is not a number")),
        }
    }

    pub fn string_value(&self) -> Result<&str, Error> {
        match &self.value {
            ResultValue::String(s) if self.kind == ResultKind::String => Ok(s),
            _ => Err(Error::type_err("result is not a string")),
        }
    }

    pub fn boolean_value(&self) -> Result<bool, Error> {
        match &self.value {
            ResultValue::Boolean(b) if self.kind == ResultKind::Boolean => Ok(*b),
            _ => Err(Error::type_err("result is not a boolean")),
        }
    }

    /// Advance the iterator cursor; `None` at the end.
    pub fn iterate_next(&mut self) -> Result<Option<&Node<N>>, Error> {
        if !self.kind.is_iterator() {
            return Err(Error::type_err("result is not a node iterator"));
        }
        let ResultValue::Nodes(nodes) = &self.value else {
            return Err(Error::internal("iterator result without nodes"));
        };
        let item = nodes.get(self.cursor);
        if item.is_some() {
            self.cursor += 1;
        }
        Ok(item)
    }

    pub fn snapshot_length(&self) -> Result<usize, Error> {
        if !self.kind.is_snapshot() {
            return Err(Error::type_err("result is not a node snapshot"));
        }
        match &self.value {
            ResultValue::Nodes(nodes) => Ok(nodes.len()),
            _ => Err(Error::internal("snapshot result without nodes")),
        }
    }

    pub fn snapshot_item(&self, index: usize) -> Result<Option<&Node<N>>, Error> {
        if !self.kind.is_snapshot() {
            return Err(Error::type_err("result is not a node snapshot"));
        }
        match &self.value {
            ResultValue::Nodes(nodes) => Ok(nodes.get(index)),
            _ => Err(Error::internal("snapshot result without nodes")),
        }
    }

    /// The single node of a single-node result, `None` when empty.
    pub fn single_node_value(&self) -> Result<Option<&Node<N>>, Error> {
        if !self.kind.is_single() {
            return Err(Error::type_err("result is not a single node"));
        }
        match &self.value {
            ResultValue::Nodes(nodes) => Ok(nodes.first()),
            _ => Err(Error::internal("single-node result without nodes")),
        }
    }

    /// All nodes of a node-kind result, in stored order.
    pub fn nodes(&self) -> Result<&[Node<N>], Error> {
        if !self.kind.is_node_kind() {
            return Err(Error::type_err("result holds no nodes"));
        }
        match &self.value {
            ResultValue::Nodes(nodes) => Ok(nodes),
            _ => Err(Error::internal("node result without nodes")),
        }
    }

    /// Mutation detection is the adapter's contract; the engine never
    /// invalidates a live iterator on its own.
    pub fn invalid_iterator_state(&self) -> bool {
        false
    }
}
