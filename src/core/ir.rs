//! The flat graph IR handed to the information-flow solver.
//!
//! Wire shape is arrays-of-arrays JSON: `nodes: [[owner, id, label], ...]`,
//! `edges: [[from, to], ...]`, and so on. Tuple structs keep that shape while
//! giving the rest of the crate named types to work with.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One graph node: `(owner_id, node_id, type_label)`.
///
/// The label is `"<capability> <type>"`, e.g. `"read List(Image)"`. Owners
/// are store ids for port nodes and particle ids for handle nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node(pub String, pub String, pub String);

/// A directed flow edge: `(from_id, to_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge(pub String, pub String);

/// Assertion that a node carries a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim(pub String, pub String);

/// Requirement that a node must not carry a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check(pub String, pub String);

/// A document-scoped relation pair (subtyping, capability order, privacy).
pub type Relation = (String, String);

/// The aggregate IR document built by one conversion call.
///
/// Read-only once handed to the solver. Every sequence field is
/// append-only during emission; merging documents concatenates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub edges: Vec<Edge>,

    #[serde(default)]
    pub claims: Vec<Claim>,

    #[serde(default)]
    pub checks: Vec<Check>,

    /// `(subtype, supertype)` pairs.
    #[serde(default)]
    pub subtypes: Vec<Relation>,

    /// `(stronger, weaker)` capability pairs.
    #[serde(default)]
    pub capabilities: Vec<Relation>,

    /// `(less_private, more_private)` label pairs.
    #[serde(default)]
    pub less_private_than: Vec<Relation>,

    /// `(node_id, tag)` pairs the solver may launder. Always emitted, even
    /// when empty, because the solver expects the field.
    #[serde(default)]
    pub trusted_to_remove_tag: Vec<Relation>,

    /// Solver flags, e.g. `planning`.
    #[serde(default)]
    pub flags: IndexMap<String, Value>,
}

impl Default for IrDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IrDocument {
    /// An empty document with no relations and no flags.
    pub fn new() -> Self {
        IrDocument {
            nodes: Vec::new(),
            edges: Vec::new(),
            claims: Vec::new(),
            checks: Vec::new(),
            subtypes: Vec::new(),
            capabilities: Vec::new(),
            less_private_than: Vec::new(),
            trusted_to_remove_tag: Vec::new(),
            flags: IndexMap::new(),
        }
    }

    /// A document seeded with the standard relations every conversion
    /// starts from: `any` under both capabilities, write implies read,
    /// public less private than private, planning off.
    pub fn with_prelude() -> Self {
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
        IrDocument {
            subtypes: vec![pair("any", "read"), pair("any", "write")],
            capabilities: vec![pair("write", "read")],
            less_private_than: vec![pair("public", "private")],
            flags: IndexMap::from([("planning".to_string(), Value::Bool(false))]),
            ..Self::new()
        }
    }

    /// Parse an IR document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, super::error::ConvertError> {
        serde_json::from_str(json)
            .map_err(|e| super::error::ConvertError::Parse(format!("bad IR document: {}", e)))
    }

    /// Serialize to the solver's wire format.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Serialize with indentation for humans.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Structural diagnostics: duplicate node ids and references to ids
    /// that were never emitted.
    ///
    /// These are diagnostics, not compile errors — a binding naming an
    /// undeclared store deliberately compiles to a dangling port edge and
    /// is left for the solver's type-error reporting.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for Node(_, id, _) in &self.nodes {
            *counts.entry(id).or_insert(0) += 1;
        }
        let mut reported: HashSet<&str> = HashSet::new();
        for Node(_, id, _) in &self.nodes {
            if counts[id.as_str()] > 1 && reported.insert(id.as_str()) {
                errors.push(ValidationError {
                    message: format!("node id '{}' emitted {} times", id, counts[id.as_str()]),
                });
            }
        }

        let mut require = |id: &str, role: &str| {
            if !counts.contains_key(id) {
                errors.push(ValidationError {
                    message: format!("{} references unknown node '{}'", role, id),
                });
            }
        };
        for Edge(from, to) in &self.edges {
            require(from, "edge");
            require(to, "edge");
        }
        for Claim(id, _) in &self.claims {
            require(id, "claim");
        }
        for Check(id, _) in &self.checks {
            require(id, "check");
        }

        errors
    }
}

/// A structural finding from [`IrDocument::validate`].
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(owner: &str, id: &str, label: &str) -> Node {
        Node(owner.to_string(), id.to_string(), label.to_string())
    }

    #[test]
    fn test_wire_shape() {
        let mut doc = IrDocument::with_prelude();
        doc.nodes.push(node("store_a", "store_a_in", "read A"));
        doc.edges
            .push(Edge("store_a_out".to_string(), "h".to_string()));
        doc.claims
            .push(Claim("store_a_out".to_string(), "private".to_string()));

        let json: Value = serde_json::from_str(&doc.to_json()).unwrap();
        assert_eq!(
            json["nodes"][0],
            serde_json::json!(["store_a", "store_a_in", "read A"])
        );
        assert_eq!(json["edges"][0], serde_json::json!(["store_a_out", "h"]));
        assert_eq!(
            json["claims"][0],
            serde_json::json!(["store_a_out", "private"])
        );
        assert_eq!(json["capabilities"][0], serde_json::json!(["write", "read"]));
        assert_eq!(json["flags"]["planning"], serde_json::json!(false));
        // Present even when empty.
        assert_eq!(json["trusted_to_remove_tag"], serde_json::json!([]));
    }

    #[test]
    fn test_prelude_relations() {
        let doc = IrDocument::with_prelude();
        assert_eq!(doc.subtypes.len(), 2);
        assert_eq!(
            doc.capabilities,
            vec![("write".to_string(), "read".to_string())]
        );
        assert_eq!(
            doc.less_private_than,
            vec![("public".to_string(), "private".to_string())]
        );
    }

    #[test]
    fn test_roundtrip() {
        let mut doc = IrDocument::with_prelude();
        doc.nodes.push(node("p", "p_h", "write *"));
        let back = IrDocument::from_json(&doc.to_json()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_validate_clean() {
        let mut doc = IrDocument::new();
        doc.nodes.push(node("store_a", "store_a_out", "write A"));
        doc.nodes.push(node("p", "p_h", "read A"));
        doc.edges
            .push(Edge("store_a_out".to_string(), "p_h".to_string()));
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_validate_duplicate_node() {
        let mut doc = IrDocument::new();
        doc.nodes.push(node("a", "x", "read A"));
        doc.nodes.push(node("b", "x", "write B"));
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'x'"));
    }

    #[test]
    fn test_validate_dangling_edge() {
        let mut doc = IrDocument::new();
        doc.nodes.push(node("p", "p_h", "read A"));
        doc.edges
            .push(Edge("store_ghost_out".to_string(), "p_h".to_string()));
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("store_ghost_out"));
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = IrDocument::from_json(r#"{ "nodes": [["a", "b", "c"]] }"#).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert!(doc.edges.is_empty());
        assert!(doc.flags.is_empty());
    }
}
