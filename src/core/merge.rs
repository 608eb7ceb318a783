//! Merging recipe fragments and IR fragments.
//!
//! Both merges are typed over their fixed schemas: sequence fields
//! concatenate in first-seen order, mappings merge key by key, and a key
//! present on both sides with conflicting shapes or values is rejected
//! instead of silently resolved.

use super::error::ConvertError;
use super::ir::IrDocument;
use super::recipe::{Particle, Recipe, Store};
use serde_json::Value;

/// Merge recipe fragments into one recipe. At least one fragment required.
pub fn merge_recipes(fragments: Vec<Recipe>) -> Result<Recipe, ConvertError> {
    let mut fragments = fragments.into_iter();
    let mut merged = fragments
        .next()
        .ok_or_else(|| ConvertError::Parse("no recipe fragments to merge".to_string()))?;
    for fragment in fragments {
        merge_recipe(&mut merged, fragment)?;
    }
    Ok(merged)
}

/// Merge one recipe fragment into another.
pub fn merge_recipe(dest: &mut Recipe, src: Recipe) -> Result<(), ConvertError> {
    merge_meta(&mut dest.meta, src.meta)?;

    for (name, store) in src.stores {
        match dest.stores.get_mut(&name) {
            Some(existing) => merge_store(&name, existing, store)?,
            None => {
                dest.stores.insert(name, store);
            }
        }
    }

    for (name, particle) in src.particles {
        match dest.particles.get_mut(&name) {
            Some(existing) => merge_particle(&name, existing, particle)?,
            None => {
                dest.particles.insert(name, particle);
            }
        }
    }

    Ok(())
}

fn merge_store(name: &str, dest: &mut Store, src: Store) -> Result<(), ConvertError> {
    if let Some(ty) = src.ty {
        match &dest.ty {
            Some(existing) if *existing != ty => {
                return Err(ConvertError::MergeConflict(format!(
                    "store '{}' declared with type '{}' and type '{}'",
                    name, existing, ty
                )));
            }
            Some(_) => {}
            None => dest.ty = Some(ty),
        }
    }
    dest.tags.extend(src.tags);
    Ok(())
}

fn merge_particle(name: &str, dest: &mut Particle, src: Particle) -> Result<(), ConvertError> {
    if let Some(kind) = src.kind {
        match &dest.kind {
            Some(existing) if *existing != kind => {
                return Err(ConvertError::MergeConflict(format!(
                    "particle '{}' declared with kind '{}' and kind '{}'",
                    name, existing, kind
                )));
            }
            Some(_) => {}
            None => dest.kind = Some(kind),
        }
    }

    dest.inputs.extend(src.inputs);
    dest.outputs.extend(src.outputs);

    for (slot_name, children) in src.slots {
        match dest.slots.get_mut(&slot_name) {
            Some(existing) => {
                for (child_name, child) in children {
                    match existing.get_mut(&child_name) {
                        Some(existing_child) => {
                            merge_particle(&child_name, existing_child, child)?
                        }
                        None => {
                            existing.insert(child_name, child);
                        }
                    }
                }
            }
            None => {
                dest.slots.insert(slot_name, children);
            }
        }
    }

    Ok(())
}

/// Merge free-form JSON (recipe `meta`, IR `flags` values): objects merge
/// recursively, arrays concatenate, equal scalars collapse, anything else
/// conflicts. `Null` merges with everything.
fn merge_value(path: &str, dest: &mut Value, src: Value) -> Result<(), ConvertError> {
    match (dest, src) {
        (_, Value::Null) => Ok(()),
        (dest @ Value::Null, src) => {
            *dest = src;
            Ok(())
        }
        (Value::Object(dest), Value::Object(src)) => {
            for (key, value) in src {
                match dest.get_mut(&key) {
                    Some(existing) => {
                        merge_value(&format!("{}.{}", path, key), existing, value)?
                    }
                    None => {
                        dest.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (Value::Array(dest), Value::Array(src)) => {
            dest.extend(src);
            Ok(())
        }
        (dest, src) => {
            if *dest == src {
                Ok(())
            } else {
                Err(ConvertError::MergeConflict(format!(
                    "'{}' holds both {} and {}",
                    path, dest, src
                )))
            }
        }
    }
}

fn merge_meta(dest: &mut Value, src: Value) -> Result<(), ConvertError> {
    merge_value("meta", dest, src)
}

/// Merge IR fragments into one document. At least one fragment required.
pub fn merge_ir_documents(fragments: Vec<IrDocument>) -> Result<IrDocument, ConvertError> {
    let mut fragments = fragments.into_iter();
    let mut merged = fragments
        .next()
        .ok_or_else(|| ConvertError::Parse("no IR fragments to merge".to_string()))?;
    for fragment in fragments {
        merge_ir(&mut merged, fragment)?;
    }
    Ok(merged)
}

/// Merge one IR fragment into another: field-wise concatenation of every
/// sequence, recursive merge of flags.
pub fn merge_ir(dest: &mut IrDocument, src: IrDocument) -> Result<(), ConvertError> {
    dest.nodes.extend(src.nodes);
    dest.edges.extend(src.edges);
    dest.claims.extend(src.claims);
    dest.checks.extend(src.checks);
    dest.subtypes.extend(src.subtypes);
    dest.capabilities.extend(src.capabilities);
    dest.less_private_than.extend(src.less_private_than);
    dest.trusted_to_remove_tag.extend(src.trusted_to_remove_tag);

    for (flag, value) in src.flags {
        match dest.flags.get_mut(&flag) {
            Some(existing) => merge_value(&format!("flags.{}", flag), existing, value)?,
            None => {
                dest.flags.insert(flag, value);
            }
        }
    }

    Ok(())
}
