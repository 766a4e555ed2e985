//! Scene graph core
//!
//! Game objects live in a [`World`] arena and carry a [`Transform`] plus an
//! insertion-ordered set of [`Component`]s, at most one per concrete type.

pub mod transform;
pub mod component;
pub mod game_object;
pub mod world;
pub mod registry;
pub mod components;

#[cfg(test)]
mod tests;

pub use transform::{Transform, TransformData};
pub use component::{
    from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError,
    ComponentType, TYPE_KEY,
};
pub use game_object::{ComponentQuery, GameObject, ObjectState};
pub use world::{HierarchyError, ObjectId, TransformMut, World};
pub use registry::ComponentRegistry;
