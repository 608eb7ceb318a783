//! Recipe data model and JSON parsing.
//!
//! A recipe is a JSON mapping with two reserved keys — `meta` (free-form,
//! ignored by compilation) and `stores` — where every other key declares a
//! particle. Binding values come in two shapes (bare string, or mapping of
//! handle name to store name) and are resolved into tagged variants here, at
//! parse time, so the emitters never see raw JSON.

use super::error::ConvertError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const META_KEY: &str = "meta";
const STORES_KEY: &str = "stores";

/// A parsed recipe: stores plus particles, declaration order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Free-form metadata. Compilation ignores it; the CLI reads
    /// `meta.name` as the default recipe name.
    pub meta: Value,
    pub stores: IndexMap<String, Store>,
    pub particles: IndexMap<String, Particle>,
}

/// A named data container with a declared type and optional tags.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Store {
    /// Declared type; `None` compiles to the wildcard `*`. List sugar
    /// (`[T]`) is kept verbatim here and expanded at emission.
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// A named computational unit with read/write connections to stores.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Particle {
    /// Opaque implementation reference; uninterpreted by the compiler.
    pub kind: Option<String>,

    pub inputs: Vec<Binding>,
    pub outputs: Vec<Binding>,

    /// Extension points: slot name → (particle name → nested particle).
    pub slots: IndexMap<String, IndexMap<String, Particle>>,
}

/// A handle-to-store binding, resolved from its JSON shapes at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Bare-string form: handle name and store name coincide.
    ByName(String),

    /// Object form: `{handle: store}`. An empty store name defaults to the
    /// handle name at resolution.
    Explicit { handle: String, store: String },
}

impl Binding {
    /// Resolve to `(handle_name, store_name)`.
    pub fn resolve(&self) -> (&str, &str) {
        match self {
            Self::ByName(name) => (name, name),
            Self::Explicit { handle, store } => {
                if store.is_empty() {
                    (handle, handle)
                } else {
                    (handle, store)
                }
            }
        }
    }
}

/// Raw particle declaration as authored. Bindings stay as JSON values until
/// [`parse_particle`] resolves them; the legacy `bindings` field is captured
/// so it can be rejected with a useful error.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawParticle {
    #[serde(default)]
    kind: Option<String>,

    #[serde(default)]
    inputs: Vec<Value>,

    #[serde(default)]
    outputs: Vec<Value>,

    #[serde(default)]
    slots: IndexMap<String, IndexMap<String, Value>>,

    /// Legacy combined-binding field. Its presence aborts the conversion.
    #[serde(default)]
    bindings: Option<Value>,
}

/// Parse a recipe from a JSON file on disk.
pub fn load_recipe(path: &Path) -> Result<Recipe, ConvertError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConvertError::Parse(format!("cannot read {}: {}", path.display(), e)))?;
    parse_recipe(&content)
}

/// Parse a recipe from a JSON string.
pub fn parse_recipe(json: &str) -> Result<Recipe, ConvertError> {
    let root: IndexMap<String, Value> = serde_json::from_str(json)
        .map_err(|e| ConvertError::Parse(format!("recipe is not a JSON mapping: {}", e)))?;
    recipe_from_entries(root)
}

/// Build a typed recipe from a top-level JSON mapping.
pub fn recipe_from_entries(root: IndexMap<String, Value>) -> Result<Recipe, ConvertError> {
    let mut meta = Value::Null;
    let mut stores = IndexMap::new();
    let mut particles = IndexMap::new();

    for (key, value) in root {
        match key.as_str() {
            META_KEY => meta = value,
            STORES_KEY => {
                stores = serde_json::from_value(value)
                    .map_err(|e| ConvertError::Parse(format!("bad stores section: {}", e)))?;
            }
            _ => {
                let particle = parse_particle(&key, value)?;
                particles.insert(key, particle);
            }
        }
    }

    Ok(Recipe {
        meta,
        stores,
        particles,
    })
}

/// Parse one particle declaration, rejecting the legacy binding shape and
/// resolving binding values into tagged variants.
fn parse_particle(name: &str, value: Value) -> Result<Particle, ConvertError> {
    let raw: RawParticle = serde_json::from_value(value)
        .map_err(|e| ConvertError::Parse(format!("bad particle '{}': {}", name, e)))?;

    if raw.bindings.is_some() {
        if !raw.slots.is_empty() {
            return Err(ConvertError::UnsupportedFeature(format!(
                "particle '{}' declares slots under the legacy 'bindings' field; \
                 slot expansion requires separate 'inputs' and 'outputs'",
                name
            )));
        }
        return Err(ConvertError::Configuration(format!(
            "particle '{}' uses the legacy 'bindings' field; \
             declare 'inputs' and 'outputs' instead",
            name
        )));
    }

    let mut inputs = Vec::new();
    for value in &raw.inputs {
        parse_binding(value, &mut inputs)?;
    }
    let mut outputs = Vec::new();
    for value in &raw.outputs {
        parse_binding(value, &mut outputs)?;
    }

    let mut slots = IndexMap::new();
    for (slot_name, children) in raw.slots {
        let mut nested = IndexMap::new();
        for (child_name, child_value) in children {
            let child = parse_particle(&child_name, child_value)?;
            nested.insert(child_name, child);
        }
        slots.insert(slot_name, nested);
    }

    Ok(Particle {
        kind: raw.kind,
        inputs,
        outputs,
        slots,
    })
}

/// Resolve one binding value. A mapping with several pairs expands into that
/// many independent bindings.
fn parse_binding(value: &Value, out: &mut Vec<Binding>) -> Result<(), ConvertError> {
    match value {
        Value::String(name) => {
            out.push(Binding::ByName(name.clone()));
            Ok(())
        }
        Value::Object(map) => {
            for (handle, store) in map {
                let store = store.as_str().ok_or_else(|| {
                    ConvertError::MalformedBinding(format!(
                        "store name for handle '{}' must be a string, got {}",
                        handle, store
                    ))
                })?;
                out.push(Binding::Explicit {
                    handle: handle.clone(),
                    store: store.to_string(),
                });
            }
            Ok(())
        }
        other => Err(ConvertError::MalformedBinding(format!(
            "expected a string or a mapping, got {}",
            other
        ))),
    }
}
