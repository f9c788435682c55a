//! XPath 1.0 evaluation over pluggable node trees, extended with the
//! XForms/OpenRosa/ODK function library and date-aware comparison
//! semantics.
//!
//! The engine is generic over [`model::XPathNode`], a uniform adapter for
//! host trees; [`model::simple::SimpleNode`] is a ready-made in-memory
//! implementation.
//!
//! ```
//! use openrosa_xpath::{XPathEvaluator, ResultKind};
//! use openrosa_xpath::model::simple::{elem, text};
//!
//! let root = elem("r")
//!     .child(elem("a").child(text("1")))
//!     .child(elem("a").child(text("2")))
//!     .build();
//! let engine = XPathEvaluator::new();
//! let result = engine
//!     .evaluate("sum(a)", &root, None, ResultKind::Number)
//!     .unwrap();
//! assert_eq!(result.number_value().unwrap(), 3.0);
//! ```

pub mod consts;
pub mod engine;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod result;
pub mod temporal;
pub mod value;

pub use engine::node::{ExpandedName, NamespaceNode, Node};
pub use engine::node_set::{DocOrder, NodeSet};
pub use engine::runtime::{
    CallCtx, Error, ErrorCode, FuncDef, FunctionRegistry, Options, Param,
};
pub use engine::{XPathEvaluator, XPathExpression};
pub use model::{NodeKind, XPathNode};
pub use parser::{parse, ParseError};
pub use resolver::{create_ns_resolver, NamespaceResolver, NodeResolver};
pub use result::{ResultKind, XPathResult};
pub use temporal::Locale;
pub use value::{Kind, Value};
