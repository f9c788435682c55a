//! Recursive-descent parser for XPath 1.0.
//!
//! Precedence, lowest to highest: `or`, `and`, equality (`=` `!=`),
//! relational (`<` `<=` `>` `>=`), additive, multiplicative
//! (`*` `div` `mod`), unary `-`, union `|`, path. `//` desugars to
//! `/descendant-or-self::node()/`.

pub mod ast;
pub mod lexer;

use ast::{ArithOp, Axis, CompareOp, Expr, NameTest, NodeTest, RawQName};
use lexer::{describe, Tok, Token};

/// Syntax error with source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse an expression string into an AST.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, off: usize) -> &Tok {
        let i = (self.pos + off).min(self.tokens.len() - 1);
        &self.tokens[i].kind
    }

    fn bump(&mut self) -> Tok {
        let t = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let t = &self.tokens[self.pos];
        ParseError {
            message: message.into(),
            line: t.line,
            column: t.column,
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<(), ParseError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {}, found {}", what, describe(self.peek()))))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek(), Tok::Eof) {
            Ok(())
        } else {
            Err(self.error_here(format!("unexpected {}", describe(self.peek()))))
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(self.error_here("expression nests too deeply"))
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let r = self.parse_or();
        self.leave();
        r
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(&Tok::OpOr) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(&Tok::OpAnd) {
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Tok::Eq => CompareOp::Eq,
                Tok::Ne => CompareOp::Ne,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_relational()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Tok::Lt => CompareOp::Lt,
                Tok::Le => CompareOp::Le,
                Tok::Gt => CompareOp::Gt,
                Tok::Ge => CompareOp::Ge,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_additive()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => ArithOp::Add,
                Tok::Minus => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_multiplicative()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Tok::OpMul => ArithOp::Mul,
                Tok::OpDiv => ArithOp::Div,
                Tok::OpMod => ArithOp::Mod,
                _ => return Ok(left),
            };
            self.bump();
            let right = self.parse_unary()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Tok::Minus) {
            self.enter()?;
            let inner = self.parse_unary()?;
            self.leave();
            Ok(Expr::Neg(Box::new(inner)))
        } else {
            self.parse_union()
        }
    }

    fn parse_union(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_path()?;
        while self.eat(&Tok::Pipe) {
            let right = self.parse_path()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// Step for the `//` abbreviation.
    fn descendant_or_self_step() -> Expr {
        Expr::Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::AnyNode,
            predicates: Vec::new(),
        }
    }

    fn parse_path(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Tok::Slash => {
                self.bump();
                if self.starts_step() {
                    let rel = self.parse_relative_path(Expr::Root)?;
                    Ok(rel)
                } else {
                    Ok(Expr::Root)
                }
            }
            Tok::DoubleSlash => {
                self.bump();
                if !self.starts_step() {
                    return Err(self.error_here("expected a step after '//'"));
                }
                let left = Expr::Path {
                    left: Box::new(Expr::Root),
                    right: Box::new(Self::descendant_or_self_step()),
                };
                self.parse_relative_path(left)
            }
            _ if self.starts_step() => {
                let first = self.parse_step()?;
                self.parse_path_tail(first)
            }
            _ => {
                let primary = self.parse_primary()?;
                let mut predicates = Vec::new();
                while self.eat(&Tok::LBracket) {
                    predicates.push(self.parse_expr()?);
                    self.expect(&Tok::RBracket, "']'")?;
                }
                let base = if predicates.is_empty() {
                    primary
                } else {
                    Expr::Filter {
                        base: Box::new(primary),
                        predicates,
                    }
                };
                self.parse_path_tail(base)
            }
        }
    }

    /// Continue a completed path operand over `('/' | '//') step` pairs,
    /// left-associatively.
    fn parse_path_tail(&mut self, mut left: Expr) -> Result<Expr, ParseError> {
        loop {
            let double = if self.eat(&Tok::Slash) {
                false
            } else if self.eat(&Tok::DoubleSlash) {
                true
            } else {
                return Ok(left);
            };
            if double {
                left = Expr::Path {
                    left: Box::new(left),
                    right: Box::new(Self::descendant_or_self_step()),
                };
            }
            let step = self.parse_step()?;
            left = Expr::Path {
                left: Box::new(left),
                right: Box::new(step),
            };
        }
    }

    /// A step is pending with no separator (the leading `/` or `//` was
    /// already consumed).
    fn parse_relative_path(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let step = self.parse_step()?;
        self.parse_path_tail(Expr::Path {
            left: Box::new(left),
            right: Box::new(step),
        })
    }

    /// Whether the upcoming tokens begin a location-path step.
    fn starts_step(&self) -> bool {
        match self.peek() {
            Tok::Dot | Tok::DotDot | Tok::At | Tok::Wildcard { .. } => true,
            Tok::QName { prefix: None, local } => {
                if matches!(self.peek_at(1), Tok::ColonColon) {
                    return true;
                }
                if matches!(self.peek_at(1), Tok::LParen) {
                    // Node-type tests are steps; anything else is a call.
                    return matches!(
                        local.as_str(),
                        "node" | "text" | "comment" | "processing-instruction"
                    );
                }
                true
            }
            Tok::QName { .. } => !matches!(self.peek_at(1), Tok::LParen),
            _ => false,
        }
    }

    fn parse_step(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Tok::Dot => {
                self.bump();
                return Ok(Expr::Step {
                    axis: Axis::SelfAxis,
                    test: NodeTest::AnyNode,
                    predicates: Vec::new(),
                });
            }
            Tok::DotDot => {
                self.bump();
                return Ok(Expr::Step {
                    axis: Axis::Parent,
                    test: NodeTest::AnyNode,
                    predicates: Vec::new(),
                });
            }
            _ => {}
        }

        let axis = if self.eat(&Tok::At) {
            Axis::Attribute
        } else if matches!(self.peek(), Tok::QName { prefix: None, .. })
            && matches!(self.peek_at(1), Tok::ColonColon)
        {
            let Tok::QName { local, .. } = self.bump() else {
                unreachable!("peeked a QName");
            };
            self.bump(); // '::'
            Axis::from_name(&local)
                .ok_or_else(|| self.error_here(format!("unknown axis '{}'", local)))?
        } else {
            Axis::Child
        };

        let test = self.parse_node_test()?;
        let mut predicates = Vec::new();
        while self.eat(&Tok::LBracket) {
            predicates.push(self.parse_expr()?);
            self.expect(&Tok::RBracket, "']'")?;
        }
        Ok(Expr::Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, ParseError> {
        match self.peek().clone() {
            Tok::Wildcard { prefix } => {
                self.bump();
                Ok(NodeTest::Name(NameTest {
                    prefix,
                    local: None,
                }))
            }
            Tok::QName { prefix, local } => {
                self.bump();
                if prefix.is_none() && self.eat(&Tok::LParen) {
                    match local.as_str() {
                        "node" => {
                            self.expect(&Tok::RParen, "')'")?;
                            Ok(NodeTest::AnyNode)
                        }
                        "text" => {
                            self.expect(&Tok::RParen, "')'")?;
                            Ok(NodeTest::Text)
                        }
                        "comment" => {
                            self.expect(&Tok::RParen, "')'")?;
                            Ok(NodeTest::Comment)
                        }
                        "processing-instruction" => {
                            let target = if let Tok::Literal(s) = self.peek().clone() {
                                self.bump();
                                Some(s)
                            } else {
                                None
                            };
                            self.expect(&Tok::RParen, "')'")?;
                            Ok(NodeTest::ProcessingInstruction(target))
                        }
                        other => Err(self.error_here(format!("unknown node type '{}'", other))),
                    }
                } else {
                    Ok(NodeTest::Name(NameTest {
                        prefix,
                        local: Some(local),
                    }))
                }
            }
            other => Err(self.error_here(format!(
                "expected a node test, found {}",
                describe(&other)
            ))),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Tok::Dollar => {
                self.bump();
                match self.bump() {
                    Tok::QName { prefix, local } => Ok(Expr::VarRef(RawQName { prefix, local })),
                    other => Err(self.error_here(format!(
                        "expected a variable name after '$', found {}",
                        describe(&other)
                    ))),
                }
            }
            Tok::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(inner)
            }
            Tok::Literal(s) => {
                self.bump();
                Ok(Expr::Literal(s))
            }
            Tok::Number(n) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            Tok::QName { prefix, local } => {
                self.bump();
                self.expect(&Tok::LParen, "'('")?;
                let mut args = Vec::new();
                if !matches!(self.peek(), Tok::RParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.eat(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RParen, "')'")?;
                Ok(Expr::FunctionCall {
                    name: RawQName { prefix, local },
                    args,
                })
            }
            other => Err(self.error_here(format!(
                "expected an expression, found {}",
                describe(&other)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relative_path_chain() {
        let e = parse("a/b").unwrap();
        match e {
            Expr::Path { left, right } => {
                assert!(matches!(*left, Expr::Step { axis: Axis::Child, .. }));
                assert!(matches!(*right, Expr::Step { axis: Axis::Child, .. }));
            }
            other => panic!("unexpected ast: {:?}", other),
        }
    }

    #[test]
    fn double_slash_desugars() {
        let e = parse("//a").unwrap();
        // /descendant-or-self::node()/child::a
        let Expr::Path { left, right } = e else {
            panic!("expected path");
        };
        assert!(matches!(*right, Expr::Step { axis: Axis::Child, .. }));
        let Expr::Path { left, right } = *left else {
            panic!("expected inner path");
        };
        assert!(matches!(*left, Expr::Root));
        assert!(matches!(
            *right,
            Expr::Step {
                axis: Axis::DescendantOrSelf,
                ..
            }
        ));
    }

    #[test]
    fn node_type_vs_function_call() {
        assert!(matches!(
            parse("text()").unwrap(),
            Expr::Step {
                test: NodeTest::Text,
                ..
            }
        ));
        assert!(matches!(
            parse("true()").unwrap(),
            Expr::FunctionCall { .. }
        ));
    }

    #[test]
    fn dangling_bracket_reports_position() {
        let err = parse("a[").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn filter_with_trailing_path() {
        let e = parse("id('x')/child::a").unwrap();
        assert!(matches!(e, Expr::Path { .. }));
    }

    #[test]
    fn union_of_paths() {
        assert!(matches!(parse("a | b").unwrap(), Expr::Union(..)));
    }

    #[test]
    fn unary_minus_binds_tighter_than_subtraction() {
        let e = parse("1 - -2").unwrap();
        let Expr::Arith {
            op: ArithOp::Sub,
            right,
            ..
        } = e
        else {
            panic!("expected subtraction");
        };
        assert!(matches!(*right, Expr::Neg(_)));
    }
}
