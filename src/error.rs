//! Error types for the ECSDL front end.
//!
//! Two layers live here:
//!
//! - [`ParseError`] is a single line/column tagged diagnostic produced while
//!   parsing. Its `Display` form, `line <L>, column <C>: <message>`, is a
//!   stable contract other tools match on.
//! - [`EcsdlError`] is the crate-level error returned by the convenience
//!   entry points and the CLI, wrapping a batch of diagnostics or an I/O
//!   failure.

use thiserror::Error;

/// Result type alias using [`EcsdlError`].
pub type Result<T> = std::result::Result<T, EcsdlError>;

/// Unified error type for all ECSDL operations.
#[derive(Error, Debug)]
pub enum EcsdlError {
    // ============ Parsing Errors ============
    /// One or more syntax errors, in source order
    #[error("{}", render_diagnostics(.0))]
    Syntax(Vec<ParseError>),

    // ============ I/O Errors ============
    /// Error reading a schema file
    #[error("Failed to read schema file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the rendered output
    #[error("Failed to write output file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EcsdlError {
    /// The diagnostics carried by a syntax error, empty for I/O errors.
    pub fn diagnostics(&self) -> &[ParseError] {
        match self {
            Self::Syntax(errors) => errors,
            _ => &[],
        }
    }
}

fn render_diagnostics(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A syntax diagnostic anchored at a 1-based line and column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {kind}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl ParseError {
    /// Create a diagnostic at the given position.
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// Create an "expected X, got Y" diagnostic.
    pub fn unexpected(
        expected: impl Into<String>,
        found: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            },
            line,
            column,
        )
    }

    /// The message without its position prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// The closed set of things the parser can complain about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token was missing
    #[error("expected {expected}, got {found}")]
    UnexpectedToken { expected: String, found: String },

    /// An expression started with a token that cannot begin one
    #[error("unexpected {found} at start of expression")]
    NoPrefixParse { found: String },

    /// The lexer could not classify a character
    #[error("illegal character '{character}'")]
    IllegalCharacter { character: String },

    /// A system block appeared twice
    #[error("duplicate {block} block in system '{system}'")]
    DuplicateBlock { block: &'static str, system: String },

    /// A system declared no code block
    #[error("system '{system}' has no code block")]
    MissingCodeBlock { system: String },

    /// End of input reached before a closing delimiter
    #[error("unterminated {construct}: reached end of input before '}}'")]
    Unterminated { construct: &'static str },

    /// A default value scan ran off the end of the input
    #[error("missing ';' after default value of '{field}'")]
    MissingSemicolon { field: String },

    /// A relationship was given more than one `@` tag
    #[error("relationship '{name}' takes a single @tag, got {count}")]
    TooManyRelationshipTags { name: String, count: usize },

    /// A system parameter was marked with `?`
    #[error("parameter '{name}' cannot be optional")]
    OptionalParameter { name: String },

    /// Expressions nested beyond the parser's depth limit
    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}
