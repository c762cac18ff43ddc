//! # ECSDL Core
//!
//! Front end for an ECS (entity-component-system) schema definition language.
//!
//! This library provides:
//! - A lexer producing line/column tagged tokens
//! - A recursive-descent parser for component, relationship and system
//!   declarations, with a precedence-climbing expression parser
//! - A closed AST with a canonical text rendering that re-parses to an
//!   equal tree
//! - Line/column diagnostics that keep going where recovery is safe
//!
//! ## Architecture
//!
//! - [`dsl`] - Tokens, lexer, AST, parser and rendering
//! - [`error`] - Diagnostics and the crate error type
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ecsdl --input game.ecs --output build/game.canonical.ecs
//! ecsdl --input game.ecs --check -vv
//! ```
//!
//! ### Library
//!
//! ```
//! let (program, errors) = ecsdl_core::dsl::parse_program(
//!     "component Position { x: number; y: number = 10.5; }",
//! );
//! assert!(errors.is_empty());
//! assert_eq!(program.components().count(), 1);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmSchema, check_schema } from 'ecsdl_core';
//!
//! const problems = check_schema(source);
//! const schema = new WasmSchema(source);
//! console.log(schema.component_names());
//! ```

pub mod dsl;
pub mod error;

// Re-export main types for convenience
pub use dsl::{parse, parse_program, Program};
pub use error::{EcsdlError, ParseError, ParseErrorKind, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{check_schema, WasmSchema};
