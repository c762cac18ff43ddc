//! WASM bindings for ECSDL Core.
//!
//! Lets an in-browser schema editor check and inspect schema source.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmSchema, check_schema } from 'ecsdl_core';
//!
//! await init();
//!
//! const problems = check_schema(source);
//! if (problems === '') {
//!   const schema = new WasmSchema(source);
//!   editor.setValue(schema.canonical());
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl::{self, Program};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// A successfully parsed schema.
#[wasm_bindgen]
pub struct WasmSchema {
    program: Program,
}

#[wasm_bindgen]
impl WasmSchema {
    /// Parse schema source.
    ///
    /// Throws a string holding every diagnostic, one per line, if the source
    /// has errors.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmSchema, JsValue> {
        let program = dsl::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmSchema { program })
    }

    /// Canonical rendering of the schema.
    #[wasm_bindgen]
    pub fn canonical(&self) -> String {
        self.program.to_string()
    }

    /// Component names in declaration order.
    #[wasm_bindgen]
    pub fn component_names(&self) -> Vec<String> {
        self.program.components().map(|c| c.name.clone()).collect()
    }

    /// System names in declaration order.
    #[wasm_bindgen]
    pub fn system_names(&self) -> Vec<String> {
        self.program.systems().map(|s| s.name.clone()).collect()
    }

    /// Relationship names in declaration order.
    #[wasm_bindgen]
    pub fn relationship_names(&self) -> Vec<String> {
        self.program.relationships().map(|r| r.name.clone()).collect()
    }
}

/// Diagnostics for `source`, one per line; empty when the schema is valid.
#[wasm_bindgen]
pub fn check_schema(source: &str) -> String {
    let (_, errors) = dsl::parse_program(source);
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
