//! Store and particle emission — the recipe-to-IR walk.
//!
//! One conversion call owns one [`Context`] (the store-type table) and one
//! [`IrDocument`] under construction. Stores are emitted before any particle
//! because handle labels consult the store-type table; emission only ever
//! appends to the document's sequences.

use super::ids::{self, Scope};
use super::ir::{Check, Claim, Edge, IrDocument, Node};
use super::recipe::{Particle, Recipe, Store};
use indexmap::IndexMap;

/// Wildcard type used when a store declares no type, or when a binding
/// names a store the recipe never declared. The latter is deliberate: the
/// compiler defers undeclared-store inconsistencies to the solver's own
/// type-error reporting instead of failing locally.
const WILDCARD: &str = "*";

/// Per-conversion state threaded through the walk.
#[derive(Debug, Default)]
struct Context {
    /// Store name → expanded declared type.
    store_types: IndexMap<String, String>,
}

impl Context {
    fn store_type(&self, store_name: &str) -> &str {
        self.store_types
            .get(store_name)
            .map(String::as_str)
            .unwrap_or(WILDCARD)
    }
}

/// Expand the list sugar `[T]` to `List(T)`. Anything else passes through
/// verbatim, including the wildcard.
fn expand_type_sugar(ty: &str) -> String {
    match ty.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => format!("List({})", inner),
        None => ty.to_string(),
    }
}

/// Emit one store: its two port nodes and one claim per tag.
fn emit_store(doc: &mut IrDocument, ctx: &mut Context, store_name: &str, store: &Store) {
    let ty = expand_type_sugar(store.ty.as_deref().unwrap_or(WILDCARD));
    let store_id = ids::store_id(store_name);
    let in_port = ids::store_in_port(store_name);
    let out_port = ids::store_out_port(store_name);

    doc.nodes
        .push(Node(store_id.clone(), in_port, format!("read {}", ty)));
    doc.nodes
        .push(Node(store_id, out_port.clone(), format!("write {}", ty)));
    for tag in &store.tags {
        doc.claims.push(Claim(out_port.clone(), tag.clone()));
    }

    ctx.store_types.insert(store_name.to_string(), ty);
}

/// Emit one particle: handle nodes, flow edges, the leak-tracking claim and
/// check per handle, then recurse into its slots.
fn emit_particle(
    doc: &mut IrDocument,
    ctx: &Context,
    scope: &Scope,
    particle_name: &str,
    particle: &Particle,
) {
    let particle_id = scope.particle_id(particle_name);
    let downstream = ids::downstream_tag(&particle_id);

    for binding in &particle.inputs {
        let (handle_name, store_name) = binding.resolve();
        let handle = ids::handle_id(&particle_id, handle_name);
        let ty = ctx.store_type(store_name);
        doc.nodes
            .push(Node(particle_id.clone(), handle.clone(), format!("read {}", ty)));
        doc.edges
            .push(Edge(ids::store_out_port(store_name), handle.clone()));
        // A particle must not read data it produced itself through a store.
        doc.checks.push(Check(handle, downstream.clone()));
    }

    for binding in &particle.outputs {
        let (handle_name, store_name) = binding.resolve();
        let handle = ids::handle_id(&particle_id, handle_name);
        let ty = ctx.store_type(store_name);
        doc.nodes
            .push(Node(particle_id.clone(), handle.clone(), format!("write {}", ty)));
        doc.edges
            .push(Edge(handle.clone(), ids::store_in_port(store_name)));
        doc.claims.push(Claim(handle, downstream.clone()));
    }

    for (slot_name, children) in &particle.slots {
        let nested = Scope::slot(&particle_id, slot_name);
        for (child_name, child) in children {
            emit_particle(doc, ctx, &nested, child_name, child);
        }
    }
}

/// Walk one recipe into an existing document: all stores first, then each
/// particle (particle order carries no dependency between particles).
fn walk_recipe(doc: &mut IrDocument, ctx: &mut Context, recipe_name: &str, recipe: &Recipe) {
    for (store_name, store) in &recipe.stores {
        emit_store(doc, ctx, store_name, store);
    }

    let scope = Scope::recipe(recipe_name);
    for (particle_name, particle) in &recipe.particles {
        emit_particle(doc, ctx, &scope, particle_name, particle);
    }
}

/// Compile one named recipe into a fresh IR document with the standard
/// prelude relations.
pub fn recipe_to_ir(recipe_name: &str, recipe: &Recipe) -> IrDocument {
    let mut doc = IrDocument::with_prelude();
    let mut ctx = Context::default();
    walk_recipe(&mut doc, &mut ctx, recipe_name, recipe);
    doc
}

/// Compile a set of named recipes into one IR document sharing a single
/// store-type table and one prelude.
pub fn recipes_to_ir(recipes: &IndexMap<String, Recipe>) -> IrDocument {
    let mut doc = IrDocument::with_prelude();
    let mut ctx = Context::default();
    // Stores of every recipe land in the shared table before its own
    // particles; a later recipe may bind stores of an earlier one.
    for (recipe_name, recipe) in recipes {
        walk_recipe(&mut doc, &mut ctx, recipe_name, recipe);
    }
    doc
}
