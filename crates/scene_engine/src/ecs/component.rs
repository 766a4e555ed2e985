//! Component trait and lifecycle context
//!
//! A component is a polymorphic unit of behaviour attached to exactly one
//! game object. The owning [`World`] drives its lifecycle:
//!
//! ```text
//! attached -> on_init -> on_enabled -> on_update* -> on_disabled -> on_destroy
//!                            ^                            |
//!                            +----------------------------+
//! ```
//!
//! Hooks receive a [`ComponentContext`] giving access to the owner, the rest
//! of the world and the engine services. While a hook runs, the component is
//! checked out of its slot, so looking up its own type on the owner yields
//! `None` for the duration of the call.

use super::world::{ObjectId, TransformMut, World};
use crate::foundation::math::{Mat4, Vec3};
use crate::services::Services;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use thiserror::Error;

/// Type-specific fields of a component description
pub type ComponentData = Map<String, Value>;

/// Key holding the component type identifier inside a description
pub const TYPE_KEY: &str = "Name";

/// Errors reported by component operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// A component of this type is already attached
    #[error("Component '{0}' is already attached")]
    AlreadyAttached(&'static str),

    /// No component of this type is attached
    #[error("Component '{0}' is not attached")]
    NotAttached(&'static str),

    /// The component is already enabled or disabled
    #[error("Component '{component}' is already {}", state_name(.enabled))]
    AlreadyInState {
        /// Component type
        component: &'static str,
        /// The state that was requested
        enabled: bool,
    },

    /// The component is running one of its own hooks
    #[error("Component '{0}' is busy running a lifecycle hook")]
    Busy(&'static str),

    /// The object does not exist (never existed or already despawned)
    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// No factory is registered for this type identifier
    #[error("Unknown component type '{0}'")]
    UnknownType(String),

    /// A description field could not be decoded
    #[error("Invalid data for component '{component}': {reason}")]
    InvalidData {
        /// Component type
        component: &'static str,
        /// Decoder message
        reason: String,
    },
}

fn state_name(enabled: &bool) -> &'static str {
    if *enabled {
        "enabled"
    } else {
        "disabled"
    }
}

/// Component interface.
///
/// `on_init`, `on_update`, `on_destroy` and `clone_box` are required;
/// `on_enabled`/`on_disabled` are only ever invoked on an actual state
/// transition.
pub trait Component: 'static {
    /// Stable type identifier, used as the registry and description key
    fn type_name(&self) -> &'static str;

    /// Called once after the component is attached and its owner initialized
    fn on_init(&mut self, ctx: &mut ComponentContext<'_>);

    /// Called once per frame while enabled
    fn on_update(&mut self, ctx: &mut ComponentContext<'_>);

    /// Called once before the component is released
    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>);

    /// Called on a disabled -> enabled transition
    fn on_enabled(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called on an enabled -> disabled transition
    fn on_disabled(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Deep copy for prefab instantiation. Runtime handles (cameras, voices)
    /// must not be shared with the original.
    fn clone_box(&self) -> Box<dyn Component>;

    /// Encode the type-specific fields (without the type key)
    fn serialize(&self) -> ComponentData;

    /// Decode the type-specific fields; unknown keys are ignored
    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError>;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Component types constructible by name from a description
pub trait ComponentType: Component + Default {
    /// Stable type identifier
    const TYPE_NAME: &'static str;
}

/// Encode a serde settings struct as component data
pub fn to_component_data<T: Serialize>(settings: &T) -> ComponentData {
    match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!("Component settings serialized to a non-object value: {}", other);
            ComponentData::new()
        }
        Err(e) => {
            log::warn!("Failed to serialize component settings: {}", e);
            ComponentData::new()
        }
    }
}

/// Decode component data into a serde settings struct
pub fn from_component_data<T: DeserializeOwned>(
    component: &'static str,
    data: &ComponentData,
) -> Result<T, ComponentError> {
    let mut fields = data.clone();
    fields.remove(TYPE_KEY);
    serde_json::from_value(Value::Object(fields)).map_err(|e| ComponentError::InvalidData {
        component,
        reason: e.to_string(),
    })
}

/// Context handed to every lifecycle hook
pub struct ComponentContext<'a> {
    owner: ObjectId,
    world: &'a mut World,
    services: &'a mut Services,
    disable_requested: bool,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(owner: ObjectId, world: &'a mut World, services: &'a mut Services) -> Self {
        Self {
            owner,
            world,
            services,
            disable_requested: false,
        }
    }

    pub(crate) fn disable_requested(&self) -> bool {
        self.disable_requested
    }

    /// The object this component is attached to
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Read access to the world
    pub fn world(&self) -> &World {
        self.world
    }

    /// Write access to the world
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Engine services
    pub fn services(&mut self) -> &mut Services {
        self.services
    }

    /// World and services together, for world operations that run hooks
    pub fn parts(&mut self) -> (&mut World, &mut Services) {
        (&mut *self.world, &mut *self.services)
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.services.time.delta_time()
    }

    /// Mutable access to the owner's transform
    pub fn transform(&mut self) -> TransformMut<'_> {
        self.world.transform_mut(self.owner)
    }

    /// Owner's world matrix (identity if the owner vanished)
    pub fn world_matrix(&mut self) -> Mat4 {
        self.world.world_matrix(self.owner).unwrap_or_else(Mat4::identity)
    }

    /// Owner's world position
    pub fn position(&mut self) -> Vec3 {
        self.world.position(self.owner).unwrap_or_else(Vec3::zeros)
    }

    /// Owner's world forward axis
    pub fn forward(&mut self) -> Vec3 {
        self.world.forward(self.owner).unwrap_or_else(Vec3::z)
    }

    /// Owner's world up axis
    pub fn up(&mut self) -> Vec3 {
        self.world.up(self.owner).unwrap_or_else(Vec3::y)
    }

    /// Owner's world right axis
    pub fn right(&mut self) -> Vec3 {
        self.world.right(self.owner).unwrap_or_else(Vec3::x)
    }

    /// Flag the owner for destruction at the end of the frame
    pub fn destroy_owner(&mut self) {
        self.world.mark_for_destroy(self.owner);
    }

    /// Disable this component once the current hook returns.
    ///
    /// Components that fail internally use this instead of propagating the
    /// failure into the traversal.
    pub fn disable_self(&mut self) {
        self.disable_requested = true;
    }
}
