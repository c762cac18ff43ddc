//! Parser for the schema DSL.
//!
//! Declarations are parsed by recursive descent (`declarations.rs`) and
//! expressions by precedence climbing (`expressions.rs`). The parser keeps
//! exactly two tokens of lookahead, `current` and `peek`, as plain fields
//! moved forward by [`Parser::advance`].
//!
//! # Error policy
//!
//! | Layer | On error |
//! |-------|----------|
//! | top level, declaration headers, relationship bodies, system blocks | record and stop the parse |
//! | component fields, `params` entries | record, skip to the next `;` or `}`, continue |
//! | default values | keep the raw text up to `;` as [`Expression::Unparsed`](crate::dsl::Expression::Unparsed); a `}` or end of input first is a missing `;` |

mod declarations;
mod expressions;

pub use expressions::{Precedence, MAX_NESTING_DEPTH};

use tracing::{debug, trace};

use super::ast::{Declaration, Program};
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::error::{ParseError, ParseErrorKind};

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parser for schema DSL source.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// The token under the cursor.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// The token after the cursor.
    pub fn peek_token(&self) -> &Token {
        &self.peek
    }

    /// Diagnostics recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consume the parser, returning its diagnostics.
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parse declarations until end of input or the first fatal error.
    ///
    /// Declarations parsed before a fatal error are kept in the result.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current.is(TokenKind::Eof) {
            match self.parse_declaration() {
                Ok(declaration) => {
                    trace!(
                        kind = declaration.keyword(),
                        name = declaration.name(),
                        "parsed declaration"
                    );
                    program.declarations.push(declaration);
                }
                Err(err) => {
                    self.errors.push(err);
                    break;
                }
            }
        }

        debug!(
            declarations = program.declarations.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        program
    }

    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        match self.current.kind {
            TokenKind::Component => self
                .parse_component(Vec::new())
                .map(Declaration::Component),
            TokenKind::Relationship => self
                .parse_relationship(Vec::new())
                .map(Declaration::Relationship),
            TokenKind::System => self.parse_system().map(Declaration::System),
            TokenKind::At => self.parse_tagged_declaration(),
            _ => Err(self.unexpected("'component', 'relationship', 'system' or '@'")),
        }
    }

    /// Move the lookahead window forward, returning the consumed token.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let peek = std::mem::replace(&mut self.peek, next);
        std::mem::replace(&mut self.current, peek)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current.is(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.current.is(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        if self.current.is(TokenKind::Ident) {
            Ok(self.advance().literal)
        } else {
            Err(self.unexpected(what))
        }
    }

    /// "expected X, got <current>", or an illegal-character error.
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        if self.current.is(TokenKind::Illegal) {
            return self.error_here(ParseErrorKind::IllegalCharacter {
                character: self.current.literal.clone(),
            });
        }
        ParseError::unexpected(
            expected,
            self.current.describe(),
            self.current.line,
            self.current.column,
        )
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current.line, self.current.column)
    }

    /// Skip to the end of the broken list entry.
    ///
    /// Stops after the next `;`, or before a `}` or end of input.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

fn error_at(token: &Token, kind: ParseErrorKind) -> ParseError {
    ParseError::new(kind, token.line, token.column)
}
