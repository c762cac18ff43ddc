//! Lexer (tokenizer) for the schema DSL.
//!
//! The lexer never fails: characters it cannot classify become
//! [`TokenKind::Illegal`] tokens and the parser decides whether that is fatal.

use super::token::{lookup_ident, Span, Token, TokenKind};

/// Lexer for tokenizing schema DSL input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// The full source text being tokenized.
    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Move the cursor to byte offset `target`, counting lines and columns
    /// from `anchor`, a token that starts at or before `target`.
    pub fn seek(&mut self, anchor: &Token, target: usize) {
        self.pos = anchor.span.start;
        self.line = anchor.line;
        self.column = anchor.column;
        while self.pos < target && self.advance().is_some() {}
    }

    /// Get the next token.
    ///
    /// Once the input is exhausted every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let line = self.line;
        let column = self.column;

        let Some(ch) = self.peek_char() else {
            return Token::new(TokenKind::Eof, "", line, column, Span::new(start, start));
        };

        let kind = match ch {
            '"' | '\'' => return self.read_string(ch, line, column),
            '0'..='9' => return self.read_number(line, column),
            '.' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                return self.read_number(line, column)
            }
            _ if is_ident_start(ch) => {
                let word = self.read_identifier();
                return Token::new(lookup_ident(word), word, line, column, Span::new(start, self.pos));
            }
            '=' => self.one_or_two('=', TokenKind::Assign, TokenKind::Eq),
            '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::NotEq),
            '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::GtEq),
            '+' => self.one_or_two('=', TokenKind::Plus, TokenKind::PlusAssign),
            '&' => self.one_or_two('&', TokenKind::Illegal, TokenKind::And),
            '|' => self.one_or_two('|', TokenKind::Illegal, TokenKind::Or),
            _ => {
                self.advance();
                match ch {
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Asterisk,
                    '/' => TokenKind::Slash,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    ':' => TokenKind::Colon,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '.' => TokenKind::Dot,
                    '@' => TokenKind::At,
                    '?' => TokenKind::Question,
                    _ => TokenKind::Illegal,
                }
            }
        };

        Token::new(
            kind,
            &self.input[start..self.pos],
            line,
            column,
            Span::new(start, self.pos),
        )
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume the current char, plus `second` if it follows immediately.
    fn one_or_two(&mut self, second: char, single: TokenKind, double: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek_char() {
            if matches!(ch, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else if ch == '/' && self.peek_second() == Some('/') {
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek_char().is_some_and(is_ident_continue) {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn eat_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_number(&mut self, line: usize, column: usize) -> Token {
        let start = self.pos;
        let mut kind = TokenKind::Int;

        // Integer part (empty for `.5`)
        self.eat_digits();

        // Decimal part, only when a digit follows the dot
        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.eat_digits();
            kind = TokenKind::Float;
        }

        // Unit suffix turns the whole run into a quantity, e.g. `60hz`
        if self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            while self.peek_char().is_some_and(is_ident_continue) {
                self.advance();
            }
            kind = TokenKind::Quantity;
        }

        Token::new(
            kind,
            &self.input[start..self.pos],
            line,
            column,
            Span::new(start, self.pos),
        )
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Token {
        let start = self.pos;
        self.advance();

        let mut value = String::new();
        while let Some(ch) = self.advance() {
            if ch == quote {
                break;
            }
            if ch != '\\' {
                value.push(ch);
                continue;
            }
            match self.advance() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(c @ ('"' | '\'' | '\\')) => value.push(c),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => value.push('\\'),
            }
        }

        Token::new(TokenKind::String, value, line, column, Span::new(start, self.pos))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is(TokenKind::Eof)).then_some(token)
    }
}

/// Tokenize a whole input, including the trailing `Eof` token.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
