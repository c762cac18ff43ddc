//! Front end for the ECS schema definition language.
//!
//! A schema file declares the components, relationships and systems of an
//! entity-component-system game. System bodies are opaque code that is
//! carried through verbatim for a later code generator.
//!
//! # Grammar Overview
//!
//! ```text
//! program      = { declaration } EOF
//! declaration  = component | relationship | system
//!
//! component    = { '@' IDENT } 'component' IDENT '{' { field } '}'
//! field        = ( IDENT ':' type ['?'] | type ['?'] IDENT ) ['=' expression] ';'
//! type         = 'table' '<' IDENT ',' IDENT '>' | IDENT
//!
//! relationship = ['@' IDENT] 'relationship' IDENT '{'
//!                    'child' ':' IDENT 'parent' ':' IDENT '}'
//!
//! system       = 'system' IDENT '{' { system_block } '}'
//! system_block = 'query' '(' [ term { ',' term } ] ')' [';']
//!              | 'params' '{' { param } '}'
//!              | 'frequency' ':' expression [';']
//!              | 'priority' ':' expression [';']
//!              | '{' raw code '}'
//! term         = IDENT | IDENT '(' IDENT ')' | 'pair' '(' IDENT ',' ( IDENT | '*' ) ')'
//! param        = ( IDENT ':' type | type IDENT ) ['=' expression] ';'
//! ```
//!
//! Every system has exactly one code block; each other block kind may appear
//! at most once, in any order.
//!
//! # Expressions
//!
//! | Precedence | Operators |
//! |------------|-----------|
//! | lowest | `\|\|` |
//! | | `&&` |
//! | | `==` `!=` |
//! | | `<` `>` `<=` `>=` |
//! | | `+` `-` |
//! | | `*` `/` |
//! | | unary `-` `!` |
//! | | call `f(...)` |
//! | highest | member `a.b` |
//!
//! Primaries are identifiers, numbers, quantities (`60hz`), strings,
//! `true`, `false`, `nil`, parenthesised expressions and table constructors
//! (`{ a = 1, [k] = v, 3 }`).
//!
//! # Example
//!
//! ```text
//! // Spatial data
//! component Position { x: number; y: number = 10.5; }
//!
//! @parent relationship ChildOf {
//!     child: Entity
//!     parent: Entity
//! }
//!
//! system Movement {
//!     query(Position, Velocity)
//!     priority: 10
//!     {
//!         pos.x = pos.x + vel.x
//!     }
//! }
//! ```

mod ast;
mod display;
mod lexer;
mod parser;
mod token;


pub use ast::*;
pub use lexer::{tokenize, Lexer};
pub use parser::{Parser, Precedence, MAX_NESTING_DEPTH};
pub use token::{lookup_ident, Span, Token, TokenKind};

use crate::error::{EcsdlError, ParseError, Result};

/// Parse schema source, returning the tree together with all diagnostics.
///
/// The tree holds every declaration parsed before the first fatal error, so
/// it is meaningful even when diagnostics are present.
pub fn parse_program(input: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Parse schema source, failing if any diagnostic was produced.
pub fn parse(input: &str) -> Result<Program> {
    let (program, errors) = parse_program(input);
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(EcsdlError::Syntax(errors))
    }
}

/// Parse a schema file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<Program> {
    let content = std::fs::read_to_string(path).map_err(|e| EcsdlError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
