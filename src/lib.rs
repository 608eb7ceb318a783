//! Tern — recipe-to-IR compiler for capability and information-flow solving.
//!
//! Translates hierarchical recipes (named stores plus named particles wired
//! together by typed, capability-tagged bindings) into the flat
//! node/edge/claim/check graph an external solver reasons over.

pub mod cli;
pub mod core;
pub mod solver;

use crate::core::error::ConvertError;
use crate::core::ir::IrDocument;

/// Parse and compile one named recipe in a single step.
pub fn compile(recipe_name: &str, json: &str) -> Result<IrDocument, ConvertError> {
    let recipe = crate::core::recipe::parse_recipe(json)?;
    Ok(crate::core::emit::recipe_to_ir(recipe_name, &recipe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_smoke() {
        let doc = compile(
            "R",
            r#"{ "stores": { "s": { "type": "T" } }, "p": { "kind": "k", "inputs": ["s"] } }"#,
        )
        .unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_compile_failure_yields_no_ir() {
        let result = compile("R", r#"{ "p": { "bindings": { "a": "b" } } }"#);
        assert!(result.is_err());
    }
}
