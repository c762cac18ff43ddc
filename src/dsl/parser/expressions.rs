//! Expression parsing by precedence climbing.

use super::{ParseResult, Parser};
use crate::dsl::ast::{
    CallExpression, Expression, InfixExpression, InfixOperator, MemberAccessExpression,
    NumberLiteral, PrefixExpression, PrefixOperator, QuantityLiteral, TableConstructor, TableField,
    TableKey,
};
use crate::dsl::token::TokenKind;
use crate::error::ParseErrorKind;

/// Deepest expression nesting the parser accepts.
///
/// Counts parentheses, prefix operators, call arguments and table values.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Binding strength of infix and postfix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `==` `!=`
    Equality,
    /// `<` `>` `<=` `>=`
    Relational,
    /// `+` `-`
    Additive,
    /// `*` `/`
    Multiplicative,
    /// unary `-` `!`
    Prefix,
    /// `f(...)`
    Call,
    /// `a.b`
    Member,
}

impl Precedence {
    /// Precedence of a token in infix position.
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Or => Self::LogicalOr,
            TokenKind::And => Self::LogicalAnd,
            TokenKind::Eq | TokenKind::NotEq => Self::Equality,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Self::Relational,
            TokenKind::Plus | TokenKind::Minus => Self::Additive,
            TokenKind::Asterisk | TokenKind::Slash => Self::Multiplicative,
            TokenKind::LParen => Self::Call,
            TokenKind::Dot => Self::Member,
            _ => Self::Lowest,
        }
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    let op = match kind {
        TokenKind::Plus => InfixOperator::Add,
        TokenKind::Minus => InfixOperator::Subtract,
        TokenKind::Asterisk => InfixOperator::Multiply,
        TokenKind::Slash => InfixOperator::Divide,
        TokenKind::Eq => InfixOperator::Equal,
        TokenKind::NotEq => InfixOperator::NotEqual,
        TokenKind::Lt => InfixOperator::Less,
        TokenKind::LtEq => InfixOperator::LessEqual,
        TokenKind::Gt => InfixOperator::Greater,
        TokenKind::GtEq => InfixOperator::GreaterEqual,
        TokenKind::And => InfixOperator::And,
        TokenKind::Or => InfixOperator::Or,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse an expression whose operators all bind tighter than `min`.
    ///
    /// Stops before the first token that cannot continue the expression,
    /// leaving it as the current token.
    pub fn parse_expression(&mut self, min: Precedence) -> ParseResult<Expression> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here(ParseErrorKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            }));
        }

        self.depth += 1;
        let result = self.parse_operators(min);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, min: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;
        while min < Precedence::of(self.current.kind) {
            left = self.parse_infix(left)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let expr = match self.current.kind {
            TokenKind::Ident => Expression::Identifier(self.advance().literal),
            TokenKind::Int | TokenKind::Float => {
                Expression::Number(NumberLiteral::new(self.advance().literal))
            }
            TokenKind::Quantity => {
                Expression::Quantity(QuantityLiteral::from_text(&self.advance().literal))
            }
            TokenKind::String => Expression::String(self.advance().literal),
            TokenKind::True | TokenKind::False => {
                Expression::Boolean(self.advance().is(TokenKind::True))
            }
            TokenKind::Nil => {
                self.advance();
                Expression::Nil
            }
            TokenKind::Minus | TokenKind::Bang => {
                let operator = if self.advance().is(TokenKind::Minus) {
                    PrefixOperator::Negate
                } else {
                    PrefixOperator::Not
                };
                let operand = self.parse_expression(Precedence::Prefix)?;
                Expression::Prefix(PrefixExpression {
                    operator,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            TokenKind::LBrace => Expression::Table(self.parse_table_constructor()?),
            TokenKind::Illegal => return Err(self.unexpected("expression")),
            _ => {
                return Err(self.error_here(ParseErrorKind::NoPrefixParse {
                    found: self.current.describe(),
                }))
            }
        };
        Ok(expr)
    }

    fn parse_infix(&mut self, left: Expression) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::LParen => {
                self.advance();
                let arguments = self.parse_expression_list(TokenKind::RParen)?;
                Ok(Expression::Call(CallExpression {
                    callee: Box::new(left),
                    arguments,
                }))
            }
            TokenKind::Dot => {
                self.advance();
                let member = self.expect_ident("member name after '.'")?;
                Ok(Expression::MemberAccess(MemberAccessExpression {
                    object: Box::new(left),
                    member,
                }))
            }
            kind => {
                let Some(operator) = infix_operator(kind) else {
                    return Err(self.unexpected("operator"));
                };
                self.advance();
                let right = self.parse_expression(Precedence::of(kind))?;
                Ok(Expression::Infix(InfixExpression {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                }))
            }
        }
    }

    /// Comma-separated expressions up to and including `end`.
    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut items = Vec::new();
        if self.eat(end) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(end)?;
        Ok(items)
    }

    /// `{ a = 1, [key] = v; positional }`
    ///
    /// Entries are separated by `,` or `;`; a trailing separator is allowed.
    fn parse_table_constructor(&mut self) -> ParseResult<TableConstructor> {
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            fields.push(self.parse_table_field()?);
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semicolon) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }

        Ok(TableConstructor { fields })
    }

    fn parse_table_field(&mut self) -> ParseResult<TableField> {
        let key = match self.current.kind {
            TokenKind::LBracket => {
                self.advance();
                let key = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Assign)?;
                TableKey::Computed(key)
            }
            TokenKind::Ident if self.peek.is(TokenKind::Assign) => {
                let name = self.advance().literal;
                self.advance();
                TableKey::Named(name)
            }
            _ => TableKey::Positional,
        };
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(TableField { key, value })
    }
}
