//! Hand-written lexer for XPath 1.0 with line/column tracking.
//!
//! Applies the lexical disambiguation rule of the XPath grammar: after an
//! operand token, `*` is the multiply operator and the names `and`, `or`,
//! `div`, `mod` are operators; anywhere else `*` is a wildcard and those
//! names are ordinary NCNames.

use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Number(f64),
    Literal(String),
    /// `local` or `prefix:local`.
    QName {
        prefix: Option<String>,
        local: String,
    },
    /// `*` or `prefix:*` in name-test position.
    Wildcard {
        prefix: Option<String>,
    },
    OpMul,
    OpDiv,
    OpMod,
    OpAnd,
    OpOr,
    Slash,
    DoubleSlash,
    Pipe,
    Plus,
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    DotDot,
    At,
    Comma,
    ColonColon,
    Dollar,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: Tok,
    pub line: u32,
    pub column: u32,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(input).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    /// True when the previous token can end an operand, which flips `*`
    /// and the operator names into operator mode.
    after_operand: bool,
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c == '-' || c == '.' || c.is_alphanumeric()
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            after_operand: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, off: usize) -> Option<char> {
        self.chars.get(self.pos + off).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            let line = self.line;
            let column = self.column;
            let Some(c) = self.peek() else {
                out.push(Token {
                    kind: Tok::Eof,
                    line,
                    column,
                });
                return Ok(out);
            };
            let kind = self.next_kind(c)?;
            self.after_operand = matches!(
                kind,
                Tok::Number(_)
                    | Tok::Literal(_)
                    | Tok::QName { .. }
                    | Tok::Wildcard { .. }
                    | Tok::RParen
                    | Tok::RBracket
                    | Tok::Dot
                    | Tok::DotDot
            );
            out.push(Token { kind, line, column });
        }
    }

    fn next_kind(&mut self, c: char) -> Result<Tok, ParseError> {
        match c {
            '(' => {
                self.bump();
                Ok(Tok::LParen)
            }
            ')' => {
                self.bump();
                Ok(Tok::RParen)
            }
            '[' => {
                self.bump();
                Ok(Tok::LBracket)
            }
            ']' => {
                self.bump();
                Ok(Tok::RBracket)
            }
            '@' => {
                self.bump();
                Ok(Tok::At)
            }
            ',' => {
                self.bump();
                Ok(Tok::Comma)
            }
            '$' => {
                self.bump();
                Ok(Tok::Dollar)
            }
            '|' => {
                self.bump();
                Ok(Tok::Pipe)
            }
            '+' => {
                self.bump();
                Ok(Tok::Plus)
            }
            '-' => {
                self.bump();
                Ok(Tok::Minus)
            }
            '=' => {
                self.bump();
                Ok(Tok::Eq)
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    Ok(Tok::Ne)
                } else {
                    Err(self.error("expected '=' after '!'"))
                }
            }
            '<' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    Ok(Tok::Le)
                } else {
                    Ok(Tok::Lt)
                }
            }
            '>' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    Ok(Tok::Ge)
                } else {
                    Ok(Tok::Gt)
                }
            }
            '/' => {
                self.bump();
                if self.peek() == Some('/') {
                    self.bump();
                    Ok(Tok::DoubleSlash)
                } else {
                    Ok(Tok::Slash)
                }
            }
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    Ok(Tok::ColonColon)
                } else {
                    Err(self.error("unexpected ':'"))
                }
            }
            '.' => {
                if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
                    self.number()
                } else {
                    self.bump();
                    if self.peek() == Some('.') {
                        self.bump();
                        Ok(Tok::DotDot)
                    } else {
                        Ok(Tok::Dot)
                    }
                }
            }
            '*' => {
                self.bump();
                if self.after_operand {
                    Ok(Tok::OpMul)
                } else {
                    Ok(Tok::Wildcard { prefix: None })
                }
            }
            '"' | '\'' => self.literal(c),
            c if c.is_ascii_digit() => self.number(),
            c if is_name_start(c) => self.name(),
            other => Err(self.error(format!("unexpected character '{}'", other))),
        }
    }

    fn literal(&mut self, quote: char) -> Result<Tok, ParseError> {
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Tok::Literal(s)),
                Some(c) => s.push(c),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn number(&mut self) -> Result<Tok, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Tok::Number)
            .map_err(|_| self.error(format!("malformed number '{}'", text)))
    }

    fn ncname(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn name(&mut self) -> Result<Tok, ParseError> {
        let first = self.ncname();
        if self.after_operand {
            match first.as_str() {
                "and" => return Ok(Tok::OpAnd),
                "or" => return Ok(Tok::OpOr),
                "div" => return Ok(Tok::OpDiv),
                "mod" => return Ok(Tok::OpMod),
                _ => {}
            }
        }
        // "p:l" / "p:*" are single tokens; "p::" leaves the axis name alone.
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            match self.peek_at(1) {
                Some('*') => {
                    self.bump();
                    self.bump();
                    return Ok(Tok::Wildcard {
                        prefix: Some(first),
                    });
                }
                Some(c) if is_name_start(c) => {
                    self.bump();
                    let local = self.ncname();
                    return Ok(Tok::QName {
                        prefix: Some(first),
                        local,
                    });
                }
                _ => return Err(self.error("expected name after ':'")),
            }
        }
        Ok(Tok::QName {
            prefix: None,
            local: first,
        })
    }
}

/// Human-readable token name for error messages.
pub fn describe(t: &Tok) -> String {
    match t {
        Tok::Number(n) => format!("number {}", n),
        Tok::Literal(s) => format!("string '{}'", s),
        Tok::QName { prefix, local } => match prefix {
            Some(p) => format!("name {}:{}", p, local),
            None => format!("name {}", local),
        },
        Tok::Wildcard { .. } => "'*'".to_string(),
        Tok::OpMul => "'*'".to_string(),
        Tok::OpDiv => "'div'".to_string(),
        Tok::OpMod => "'mod'".to_string(),
        Tok::OpAnd => "'and'".to_string(),
        Tok::OpOr => "'or'".to_string(),
        Tok::Slash => "'/'".to_string(),
        Tok::DoubleSlash => "'//'".to_string(),
        Tok::Pipe => "'|'".to_string(),
        Tok::Plus => "'+'".to_string(),
        Tok::Minus => "'-'".to_string(),
        Tok::Eq => "'='".to_string(),
        Tok::Ne => "'!='".to_string(),
        Tok::Lt => "'<'".to_string(),
        Tok::Le => "'<='".to_string(),
        Tok::Gt => "'>'".to_string(),
        Tok::Ge => "'>='".to_string(),
        Tok::LParen => "'('".to_string(),
        Tok::RParen => "')'".to_string(),
        Tok::LBracket => "'['".to_string(),
        Tok::RBracket => "']'".to_string(),
        Tok::Dot => "'.'".to_string(),
        Tok::DotDot => "'..'".to_string(),
        Tok::At => "'@'".to_string(),
        Tok::Comma => "','".to_string(),
        Tok::ColonColon => "'::'".to_string(),
        Tok::Dollar => "'$'".to_string(),
        Tok::Eof => "end of expression".to_string(),
    }
}
