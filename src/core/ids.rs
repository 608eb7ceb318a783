//! Deterministic id naming for stores, particles, handles, and store ports.
//!
//! Node emission and edge emission run as separate steps, so both must agree
//! on the id for the same logical identity. Everything here is a pure
//! function of the names involved.

/// Id of a store declaration.
pub fn store_id(store_name: &str) -> String {
    format!("store_{}", store_name)
}

/// Inbound port of a store; write handles point at it.
pub fn store_in_port(store_name: &str) -> String {
    format!("{}_in", store_id(store_name))
}

/// Outbound port of a store; it points at read handles.
pub fn store_out_port(store_name: &str) -> String {
    format!("{}_out", store_id(store_name))
}

/// Id of a handle owned by a particle.
pub fn handle_id(particle_id: &str, handle_name: &str) -> String {
    format!("{}_{}", particle_id, handle_name)
}

/// Tag claimed on every write handle of a particle and checked on every
/// read handle of the same particle — the self-leak guard.
pub fn downstream_tag(particle_id: &str) -> String {
    format!("downstream_of_{}", particle_id)
}

/// Namespacing context threaded down the recipe/particle/slot tree.
///
/// At the top level the scope is the recipe; inside a slot it is the
/// enclosing particle plus the slot name, so a particle name that recurs at
/// different nesting levels still gets a globally unique id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope(String);

impl Scope {
    /// Scope for a recipe's top-level particles.
    pub fn recipe(recipe_name: &str) -> Self {
        Scope(format!("particle_{}", recipe_name))
    }

    /// Scope for particles nested in a slot of an already-named particle.
    pub fn slot(enclosing_particle_id: &str, slot_name: &str) -> Self {
        Scope(format!("{}_{}", enclosing_particle_id, slot_name))
    }

    /// Id of a particle declared in this scope.
    pub fn particle_id(&self, particle_name: &str) -> String {
        format!("{}_{}", self.0, particle_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_ids() {
        assert_eq!(store_id("image"), "store_image");
        assert_eq!(store_in_port("image"), "store_image_in");
        assert_eq!(store_out_port("image"), "store_image_out");
    }

    #[test]
    fn test_particle_and_handle_ids() {
        let scope = Scope::recipe("Pipeline");
        let pid = scope.particle_id("camera");
        assert_eq!(pid, "particle_Pipeline_camera");
        assert_eq!(handle_id(&pid, "image"), "particle_Pipeline_camera_image");
    }

    #[test]
    fn test_slot_scope_namespacing() {
        let top = Scope::recipe("R");
        let parent = top.particle_id("ui");
        let inner = Scope::slot(&parent, "toolbar");
        assert_eq!(inner.particle_id("button"), "particle_R_ui_toolbar_button");

        // Same child name under a different slot must not collide.
        let other = Scope::slot(&parent, "footer");
        assert_ne!(inner.particle_id("button"), other.particle_id("button"));
    }

    #[test]
    fn test_downstream_tag() {
        assert_eq!(
            downstream_tag("particle_R_camera"),
            "downstream_of_particle_R_camera"
        );
    }
}
