//! Public evaluation surface: [`XPathEvaluator`] owns the function
//! registry, variable bindings and options; [`XPathExpression`] holds a
//! parsed AST with its pre-resolved prefix map.

pub mod compare;
pub mod evaluator;
pub mod functions;
pub mod node;
pub mod node_set;
pub mod runtime;

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::consts::{XML_NS, XMLNS_NS};
use crate::engine::evaluator::{Context, Environment};
use crate::engine::node::Node;
use crate::engine::runtime::{Error, FuncDef, FunctionKey, FunctionRegistry, Options};
use crate::model::XPathNode;
use crate::parser;
use crate::parser::ast::Expr;
use crate::resolver::NamespaceResolver;
use crate::result::{ResultKind, XPathResult};
use crate::value::Value;

/// A compiled expression: AST plus the prefix → URI map resolved at
/// creation time. Independent of any particular tree.
#[derive(Debug, Clone)]
pub struct XPathExpression {
    pub(crate) ast: Expr,
    pub(crate) namespaces: HashMap<String, String>,
}

impl XPathExpression {
    pub fn evaluate<N: XPathNode>(
        &self,
        evaluator: &XPathEvaluator<N>,
        context: &N,
        kind: ResultKind,
    ) -> Result<XPathResult<N>, Error> {
        evaluator.evaluate_expression(self, context, kind)
    }
}

/// The engine: function registry (standard library pre-installed),
/// variable bindings and options.
pub struct XPathEvaluator<N: XPathNode> {
    functions: FunctionRegistry<N>,
    variables: HashMap<String, Value<N>>,
    options: Options,
}

impl<N: XPathNode> Default for XPathEvaluator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: XPathNode> XPathEvaluator<N> {
    pub fn new() -> Self {
        XPathEvaluator {
            functions: FunctionRegistry::standard(),
            variables: HashMap::new(),
            options: Options::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Register a custom function in the default namespace, replacing any
    /// standard function of the same name.
    pub fn register_function(&mut self, name: &str, def: FuncDef<N>) {
        debug!(name, "registering custom xpath function");
        self.functions.register(FunctionKey::local(name), def);
    }

    pub fn unregister_function(&mut self, name: &str) -> bool {
        debug!(name, "removing custom xpath function");
        self.functions.unregister(&FunctionKey::local(name))
    }

    /// Bind `$name`. Prefixed variable names use their lexical form.
    pub fn set_variable(&mut self, name: &str, value: Value<N>) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value<N>> {
        self.variables.remove(name)
    }

    /// Parse `source` and pre-resolve every namespace prefix it mentions.
    /// An unresolvable prefix fails with `NAMESPACE_ERR`; a syntax error
    /// with `INVALID_EXPRESSION_ERR` carrying line and column.
    pub fn create_expression(
        &self,
        source: &str,
        resolver: Option<&dyn NamespaceResolver>,
    ) -> Result<XPathExpression, Error> {
        trace!(source, "parsing xpath expression");
        let ast = parser::parse(source).map_err(|e| Error::invalid_expression(e.to_string()))?;
        let mut prefixes = BTreeSet::new();
        ast.collect_prefixes(&mut prefixes);
        let mut namespaces = HashMap::new();
        for prefix in prefixes {
            let uri = match prefix.as_str() {
                "xml" => Some(XML_NS.to_string()),
                "xmlns" => Some(XMLNS_NS.to_string()),
                _ => resolver.and_then(|r| r.lookup_namespace_uri(&prefix)),
            };
            let uri = uri.ok_or_else(|| {
                Error::namespace(format!("unresolvable namespace prefix '{}'", prefix))
            })?;
            namespaces.insert(prefix, uri);
        }
        Ok(XPathExpression { ast, namespaces })
    }

    /// Parse and evaluate in one step.
    pub fn evaluate(
        &self,
        source: &str,
        context: &N,
        resolver: Option<&dyn NamespaceResolver>,
        kind: ResultKind,
    ) -> Result<XPathResult<N>, Error> {
        let expression = self.create_expression(source, resolver)?;
        self.evaluate_expression(&expression, context, kind)
    }

    pub fn evaluate_expression(
        &self,
        expression: &XPathExpression,
        context: &N,
        kind: ResultKind,
    ) -> Result<XPathResult<N>, Error> {
        trace!("evaluating xpath expression");
        let env = Environment {
            functions: &self.functions,
            variables: &self.variables,
            namespaces: &expression.namespaces,
            options: &self.options,
        };
        let ctx = Context {
            node: Node::Tree(context.clone()),
            position: 1,
            size: 1,
            env: &env,
        };
        let value = evaluator::eval(&ctx, &expression.ast)?;
        XPathResult::new(value, kind)
    }
}
