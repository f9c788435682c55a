//! Abstract syntax tree for XPath 1.0 expressions.

use std::collections::BTreeSet;

/// The thirteen XPath 1.0 axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Axis> {
        Some(match name {
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "attribute" => Axis::Attribute,
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "following" => Axis::Following,
            "following-sibling" => Axis::FollowingSibling,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "preceding" => Axis::Preceding,
            "preceding-sibling" => Axis::PrecedingSibling,
            "self" => Axis::SelfAxis,
            _ => return None,
        })
    }

    /// Reverse axes emit candidates nearest-first (reverse document order).
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

/// A name test: `*`, `local`, `p:local` or `p:*`. `local == None` is the
/// wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTest {
    pub prefix: Option<String>,
    pub local: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `node()`
    AnyNode,
    /// `text()` — matches text and CDATA nodes.
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction(target?)`
    ProcessingInstruction(Option<String>),
    Name(NameTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The operator with its operands swapped (`a op b` ⇔ `b op.flip() a`).
    pub fn flip(self) -> CompareOp {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// A lexical qualified name, prefix unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQName {
    pub prefix: Option<String>,
    pub local: String,
}

impl RawQName {
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Literal(String),
    VarRef(RawQName),
    FunctionCall {
        name: RawQName,
        args: Vec<Expr>,
    },
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Neg(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    /// `/` with no steps: the document root.
    Root,
    /// One `/` composition: evaluate `left` to a node set, then `right`
    /// once per member, union-merging the results.
    Path {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Step {
        axis: Axis,
        test: NodeTest,
        predicates: Vec<Expr>,
    },
    /// A primary expression filtered by predicates.
    Filter {
        base: Box<Expr>,
        predicates: Vec<Expr>,
    },
}

impl Expr {
    /// Collect every namespace prefix appearing in the expression, for
    /// pre-resolution at expression-creation time.
    pub fn collect_prefixes(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Literal(_) | Expr::Root => {}
            Expr::VarRef(q) => {
                if let Some(p) = &q.prefix {
                    out.insert(p.clone());
                }
            }
            Expr::FunctionCall { name, args } => {
                if let Some(p) = &name.prefix {
                    out.insert(p.clone());
                }
                for a in args {
                    a.collect_prefixes(out);
                }
            }
            Expr::Or(l, r)
            | Expr::And(l, r)
            | Expr::Union(l, r)
            | Expr::Compare { left: l, right: r, .. }
            | Expr::Arith { left: l, right: r, .. }
            | Expr::Path { left: l, right: r } => {
                l.collect_prefixes(out);
                r.collect_prefixes(out);
            }
            Expr::Neg(e) => e.collect_prefixes(out),
            Expr::Step {
                test, predicates, ..
            } => {
                if let NodeTest::Name(NameTest {
                    prefix: Some(p), ..
                }) = test
                {
                    out.insert(p.clone());
                }
                for p in predicates {
                    p.collect_prefixes(out);
                }
            }
            Expr::Filter { base, predicates } => {
                base.collect_prefixes(out);
                for p in predicates {
                    p.collect_prefixes(out);
                }
            }
        }
    }
}
