//! Token model shared by the lexer and parser.

use std::fmt;

/// A byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span from start and end byte offsets.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text (unescaped value for strings)
    pub literal: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte range in the source
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(
        kind: TokenKind,
        literal: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
            span,
        }
    }

    /// Check the token's kind.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Human-readable description used in "expected X, got Y" messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident => format!("identifier '{}'", self.literal),
            TokenKind::Int | TokenKind::Float => format!("number '{}'", self.literal),
            TokenKind::Quantity => format!("quantity '{}'", self.literal),
            TokenKind::String => format!("string \"{}\"", self.literal),
            TokenKind::Illegal => format!("illegal character '{}'", self.literal),
            _ => self.kind.to_string(),
        }
    }
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character the lexer does not recognise
    Illegal,
    /// End of input
    Eof,

    // Identifiers and literals
    /// Identifier (names, type names, contextual words like `params`)
    Ident,
    /// Integer literal
    Int,
    /// Floating point literal
    Float,
    /// Number glued to a unit suffix, e.g. `60hz`
    Quantity,
    /// String literal, single or double quoted
    String,

    // Operators
    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    Bang,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `+=`
    PlusAssign,
    /// `&&`
    And,
    /// `||`
    Or,

    // Delimiters
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `.`
    Dot,
    /// `@`
    At,
    /// `?`
    Question,

    // Keywords
    /// `component`
    Component,
    /// `system`
    System,
    /// `relationship`
    Relationship,
    /// `query`
    Query,
    /// `frequency`
    Frequency,
    /// `priority`
    Priority,
    /// `table`
    Table,
    /// `pair`
    Pair,
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,
}

impl TokenKind {
    /// Source text of fixed-spelling kinds, `None` for literal kinds.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            Self::Illegal | Self::Eof => return None,
            Self::Ident | Self::Int | Self::Float | Self::Quantity | Self::String => return None,
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::PlusAssign => "+=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Dot => ".",
            Self::At => "@",
            Self::Question => "?",
            Self::Component => "component",
            Self::System => "system",
            Self::Relationship => "relationship",
            Self::Query => "query",
            Self::Frequency => "frequency",
            Self::Priority => "priority",
            Self::Table => "table",
            Self::Pair => "pair",
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Illegal => f.write_str("illegal character"),
            Self::Eof => f.write_str("end of input"),
            Self::Ident => f.write_str("identifier"),
            Self::Int => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Quantity => f.write_str("quantity"),
            Self::String => f.write_str("string"),
            other => match other.symbol() {
                Some(s) => write!(f, "'{s}'"),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

/// Look up a word in the keyword table.
///
/// Words that are not reserved, including domain type names such as
/// `Vector3` or `number`, are plain identifiers.
pub fn lookup_ident(word: &str) -> TokenKind {
    match word {
        "component" => TokenKind::Component,
        "system" => TokenKind::System,
        "relationship" => TokenKind::Relationship,
        "query" => TokenKind::Query,
        "frequency" => TokenKind::Frequency,
        "priority" => TokenKind::Priority,
        "table" => TokenKind::Table,
        "pair" => TokenKind::Pair,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        _ => TokenKind::Ident,
    }
}
