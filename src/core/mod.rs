//! Core compiler logic — recipe parsing, id naming, IR emission, merging.

pub mod emit;
pub mod error;
pub mod ids;
pub mod ir;
pub mod merge;
pub mod recipe;
