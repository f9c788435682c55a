//! Errors, options and the function registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::consts::{XHTML_NS, XML_NS};
use crate::engine::node::Node;
use crate::model::XPathNode;
use crate::temporal::Locale;
use crate::value::{Kind, Value};

/// Error categories. The DOM-defined conditions expose their numeric
/// exception codes; `Evaluation` and `Internal` are engine-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Context node of an unsupported kind (DOM code 9).
    NotSupported,
    /// Unresolvable namespace prefix at expression creation (DOM code 14).
    Namespace,
    /// Expression failed to parse (DOM code 51).
    InvalidExpression,
    /// Impermissible value or result conversion (DOM code 52).
    Type,
    /// Unknown function, arity violation, missing variable binding.
    Evaluation,
    /// A violated engine invariant.
    Internal,
}

impl ErrorCode {
    /// DOM exception code, for the conditions that have one.
    pub fn dom_code(self) -> Option<u16> {
        match self {
            ErrorCode::NotSupported => Some(9),
            ErrorCode::Namespace => Some(14),
            ErrorCode::InvalidExpression => Some(51),
            ErrorCode::Type => Some(52),
            ErrorCode::Evaluation | ErrorCode::Internal => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::NotSupported => "NOT_SUPPORTED_ERR",
            ErrorCode::Namespace => "NAMESPACE_ERR",
            ErrorCode::InvalidExpression => "INVALID_EXPRESSION_ERR",
            ErrorCode::Type => "TYPE_ERR",
            ErrorCode::Evaluation => "EVALUATION_ERR",
            ErrorCode::Internal => "INTERNAL_ERR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::NotSupported, message)
    }

    pub fn namespace(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::Namespace, message)
    }

    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InvalidExpression, message)
    }

    pub fn type_err(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::Type, message)
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::Evaluation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::Internal, message)
    }
}

/// The fixed option set.
#[derive(Debug, Clone)]
pub struct Options {
    /// When false (the default) names are compared after lower-casing.
    pub case_sensitive: bool,
    /// Namespace URI → attribute local name recognised by `id()`.
    pub unique_ids: HashMap<String, String>,
    /// Month/weekday names for `format-date`.
    pub locale: Locale,
}

impl Default for Options {
    fn default() -> Self {
        let mut unique_ids = HashMap::new();
        unique_ids.insert(XML_NS.to_string(), "id".to_string());
        unique_ids.insert(XHTML_NS.to_string(), "id".to_string());
        Options {
            case_sensitive: false,
            unique_ids,
            locale: Locale::default(),
        }
    }
}

impl Options {
    /// Case-fold a name per the `case_sensitive` option.
    pub fn fold_name(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }
}

/// A declared function parameter.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub kind: Kind,
    pub required: bool,
    /// A variadic parameter must be last and absorbs all further arguments.
    pub variadic: bool,
}

impl Param {
    pub const fn required(kind: Kind) -> Param {
        Param {
            kind,
            required: true,
            variadic: false,
        }
    }

    pub const fn optional(kind: Kind) -> Param {
        Param {
            kind,
            required: false,
            variadic: false,
        }
    }

    /// One-or-more trailing arguments of `kind`.
    pub const fn variadic(kind: Kind) -> Param {
        Param {
            kind,
            required: true,
            variadic: true,
        }
    }

    /// Zero-or-more trailing arguments of `kind`.
    pub const fn variadic_optional(kind: Kind) -> Param {
        Param {
            kind,
            required: false,
            variadic: true,
        }
    }
}

/// Call-time view handed to function implementations.
pub struct CallCtx<'a, N: XPathNode> {
    pub node: &'a Node<N>,
    pub position: usize,
    pub size: usize,
    pub options: &'a Options,
}

pub type FuncImpl<N> =
    Arc<dyn Fn(&CallCtx<'_, N>, &[Value<N>]) -> Result<Value<N>, Error>>;

/// A function entry: declarative signature plus implementation. Arity and
/// argument/return convertibility are enforced by the evaluator, once, from
/// this metadata.
#[derive(Clone)]
pub struct FuncDef<N: XPathNode> {
    pub params: Vec<Param>,
    pub ret: Kind,
    pub call: FuncImpl<N>,
}

impl<N: XPathNode> FuncDef<N> {
    pub fn new(
        params: Vec<Param>,
        ret: Kind,
        call: impl Fn(&CallCtx<'_, N>, &[Value<N>]) -> Result<Value<N>, Error> + 'static,
    ) -> Self {
        FuncDef {
            params,
            ret,
            call: Arc::new(call),
        }
    }

    pub fn min_arity(&self) -> usize {
        self.params.iter().filter(|p| p.required).count()
    }

    pub fn max_arity(&self) -> Option<usize> {
        match self.params.last() {
            Some(p) if p.variadic => None,
            _ => Some(self.params.len()),
        }
    }

    /// The declared kind for the argument at `index`.
    pub fn param_kind(&self, index: usize) -> Kind {
        if index < self.params.len() {
            self.params[index].kind
        } else {
            match self.params.last() {
                Some(p) if p.variadic => p.kind,
                _ => Kind::Any,
            }
        }
    }
}

impl<N: XPathNode> fmt::Debug for FuncDef<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncDef")
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish()
    }
}

/// Function lookup key: expanded name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl FunctionKey {
    pub fn local(name: &str) -> FunctionKey {
        FunctionKey {
            ns_uri: None,
            local: name.to_string(),
        }
    }
}

/// Registry of callable functions, keyed by expanded name.
pub struct FunctionRegistry<N: XPathNode> {
    fns: HashMap<FunctionKey, FuncDef<N>>,
}

impl<N: XPathNode> Default for FunctionRegistry<N> {
    fn default() -> Self {
        FunctionRegistry {
            fns: HashMap::new(),
        }
    }
}

impl<N: XPathNode> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry pre-populated with the XPath 1.0 core and the
    /// ODK/XForms extension library.
    pub fn standard() -> Self {
        let mut r = Self::new();
        crate::engine::functions::register_all(&mut r);
        r
    }

    pub fn register(&mut self, key: FunctionKey, def: FuncDef<N>) {
        self.fns.insert(key, def);
    }

    pub fn unregister(&mut self, key: &FunctionKey) -> bool {
        self.fns.remove(key).is_some()
    }

    pub fn get(&self, key: &FunctionKey) -> Option<&FuncDef<N>> {
        self.fns.get(key)
    }
}
