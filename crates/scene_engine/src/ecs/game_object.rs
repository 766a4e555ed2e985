//! Game object: a scene graph node owning a transform and components
//!
//! Components are stored once per concrete type, in attachment order, with a
//! type-keyed index for constant-time lookup. Everything here is pure storage;
//! operations that run lifecycle hooks live on [`World`](super::World) because
//! hooks need access to the rest of the scene and the engine services.

use super::component::{Component, ComponentData, TYPE_KEY};
use super::transform::Transform;
use super::world::ObjectId;
use crate::foundation::guid::Guid;
use serde_json::{json, Value};
use slotmap::{new_key_type, SlotMap};
use std::any::TypeId;
use std::collections::HashMap;

new_key_type! {
    /// Storage slot of a component inside its owner
    pub(crate) struct ComponentKey;
}

/// Coarse lifecycle state of a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Created, components attached but not yet initialized
    Constructed,
    /// Components initialized, object not yet enabled
    Initialized,
    /// Live and enabled
    Enabled,
    /// Live and disabled
    Disabled,
    /// Torn down; terminal
    Destroyed,
}

pub(crate) struct ComponentSlot {
    pub(crate) type_name: &'static str,
    pub(crate) enabled: bool,
    pub(crate) initialized: bool,
    /// `None` while the component is checked out to run one of its hooks
    pub(crate) component: Option<Box<dyn Component>>,
}

/// Scene graph node
pub struct GameObject {
    guid: Guid,
    name: String,
    pub(crate) state: ObjectState,
    pub(crate) enable_on_start: bool,
    pub(crate) pending_destroy: bool,
    pub(crate) transform: Transform,
    pub(crate) slots: SlotMap<ComponentKey, ComponentSlot>,
    pub(crate) order: Vec<ComponentKey>,
    by_type: HashMap<TypeId, ComponentKey>,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
}

impl GameObject {
    /// Create a detached object with a fresh Guid
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_guid(Guid::new(), name)
    }

    /// Create a detached object with a known Guid
    pub fn with_guid(guid: Guid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            state: ObjectState::Constructed,
            enable_on_start: true,
            pending_destroy: false,
            transform: Transform::identity(),
            slots: SlotMap::with_key(),
            order: Vec::new(),
            by_type: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder: initial local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: whether scene start enables this object
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enable_on_start = enabled;
        self
    }

    /// Builder: attach a component before the object goes live
    pub fn with_component<T: Component>(mut self, component: T) -> Self {
        if let Err(e) = self.attach(Box::new(component)) {
            log::warn!("GameObject '{}': {}", self.name, e);
        }
        self
    }

    /// Store a component without running any hook.
    pub(crate) fn attach(
        &mut self,
        component: Box<dyn Component>,
    ) -> Result<ComponentKey, super::ComponentError> {
        let type_id = component.as_any().type_id();
        let type_name = component.type_name();
        if self.by_type.contains_key(&type_id) {
            return Err(super::ComponentError::AlreadyAttached(type_name));
        }
        let key = self.slots.insert(ComponentSlot {
            type_name,
            enabled: false,
            initialized: false,
            component: Some(component),
        });
        self.by_type.insert(type_id, key);
        self.order.push(key);
        Ok(key)
    }

    /// Remove a slot from storage, returning its component if it was present
    pub(crate) fn detach(&mut self, key: ComponentKey) -> Option<ComponentSlot> {
        let slot = self.slots.remove(key)?;
        self.by_type.retain(|_, k| *k != key);
        self.order.retain(|k| *k != key);
        Some(slot)
    }

    /// Move every stored component out, in attachment order
    pub(crate) fn take_components(&mut self) -> Vec<Box<dyn Component>> {
        let order = std::mem::take(&mut self.order);
        self.by_type.clear();
        order
            .into_iter()
            .filter_map(|key| self.slots.remove(key))
            .filter_map(|slot| slot.component)
            .collect()
    }

    pub(crate) fn key_of<T: Component>(&self) -> Option<ComponentKey> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    // ------------------------------------------------------------------
    // Identity and state
    // ------------------------------------------------------------------

    /// Globally unique identifier
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Lifecycle state
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Whether the object is live and enabled
    pub fn is_enabled(&self) -> bool {
        self.state == ObjectState::Enabled
    }

    /// Whether the object is flagged for deferred destruction
    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy
    }

    /// Read-only transform. Mutate through
    /// [`World::transform_mut`](super::World::transform_mut) so children are
    /// notified.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Parent object, if any
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Child objects in attachment order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Child at `index`
    pub fn child_at(&self, index: usize) -> Option<ObjectId> {
        self.children.get(index).copied()
    }

    // ------------------------------------------------------------------
    // Component queries
    // ------------------------------------------------------------------

    /// Whether a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Whether every component type in the tuple `Q` is attached
    pub fn has_components<Q: ComponentQuery>(&self) -> bool {
        Q::all_present(self)
    }

    /// Borrow the component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        let key = self.key_of::<T>()?;
        self.slots
            .get(key)?
            .component
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutably borrow the component of type `T`
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let key = self.key_of::<T>()?;
        self.slots
            .get_mut(key)?
            .component
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Borrow several components at once; each entry may be `None`
    pub fn get_components<Q: ComponentQuery>(&self) -> Q::Refs<'_> {
        Q::fetch(self)
    }

    /// Whether the component of type `T` is attached and enabled
    pub fn is_component_enabled<T: Component>(&self) -> bool {
        self.key_of::<T>()
            .and_then(|key| self.slots.get(key))
            .is_some_and(|slot| slot.enabled)
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.order.len()
    }

    /// Type identifiers of attached components in attachment order
    pub fn component_names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|key| self.slots.get(*key))
            .map(|slot| slot.type_name)
            .collect()
    }

    /// Encode this object in the scene description format.
    ///
    /// The parent is written as a Guid, resolved by the caller since only the
    /// world knows it.
    pub fn serialize(&self, parent: Option<Guid>) -> Value {
        let data = self.transform.data();
        let enabled = match self.state {
            ObjectState::Enabled => true,
            ObjectState::Disabled => false,
            _ => self.enable_on_start,
        };
        let components: Vec<Value> = self
            .order
            .iter()
            .filter_map(|key| self.slots.get(*key))
            .filter_map(|slot| slot.component.as_deref())
            .map(|component| {
                let mut fields: ComponentData = component.serialize();
                fields.insert(TYPE_KEY.to_string(), Value::from(component.type_name()));
                Value::Object(fields)
            })
            .collect();

        let mut object = json!({
            "GUID": self.guid.to_string(),
            "Name": self.name,
            "Enabled": enabled,
            "Transform": {
                "Position": [data.position.x, data.position.y, data.position.z],
                "Rotation": [data.rotation.x, data.rotation.y, data.rotation.z],
                "Scale": [data.scale.x, data.scale.y, data.scale.z],
            },
            "Components": components,
        });
        if let (Some(parent), Some(map)) = (parent, object.as_object_mut()) {
            map.insert("Parent".to_string(), Value::from(parent.to_string()));
        }
        object
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("guid", &self.guid)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("components", &self.component_names())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Tuple of component types queried together
pub trait ComponentQuery {
    /// One `Option<&T>` per queried type
    type Refs<'a>;

    /// Look every type up
    fn fetch(object: &GameObject) -> Self::Refs<'_>;

    /// Whether every type is attached
    fn all_present(object: &GameObject) -> bool;
}

macro_rules! impl_component_query {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentQuery for ($($name,)+) {
            type Refs<'a> = ($(Option<&'a $name>,)+);

            fn fetch(object: &GameObject) -> Self::Refs<'_> {
                ($(object.get_component::<$name>(),)+)
            }

            fn all_present(object: &GameObject) -> bool {
                true $(&& object.has_component::<$name>())+
            }
        }
    };
}

impl_component_query!(A);
impl_component_query!(A, B);
impl_component_query!(A, B, C);
impl_component_query!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Camera, MeshRenderer, Spin};
    use crate::ecs::ComponentError;

    #[test]
    fn test_attach_is_unique_per_type() {
        let mut object = GameObject::new("ship");
        assert!(object.attach(Box::new(Spin::default())).is_ok());
        let err = object.attach(Box::new(Spin::default())).unwrap_err();
        assert_eq!(err, ComponentError::AlreadyAttached("Spin"));
        assert_eq!(object.component_count(), 1);
    }

    #[test]
    fn test_insertion_order_survives_detach() {
        let mut object = GameObject::new("ship")
            .with_component(Spin::default())
            .with_component(Camera::default())
            .with_component(MeshRenderer::default());
        assert_eq!(object.component_names(), vec!["Spin", "Camera", "MeshRenderer"]);

        let key = object.key_of::<Camera>().expect("camera");
        assert!(object.detach(key).is_some());
        assert_eq!(object.component_names(), vec!["Spin", "MeshRenderer"]);
        assert!(!object.has_component::<Camera>());
        assert!(object.get_component::<MeshRenderer>().is_some());
    }

    #[test]
    fn test_tuple_queries() {
        let object = GameObject::new("ship")
            .with_component(Spin::default())
            .with_component(Camera::default());

        assert!(object.has_components::<(Spin, Camera)>());
        assert!(!object.has_components::<(Spin, MeshRenderer)>());

        let (spin, mesh, camera) = object.get_components::<(Spin, MeshRenderer, Camera)>();
        assert!(spin.is_some());
        assert!(mesh.is_none());
        assert!(camera.is_some());
    }

    #[test]
    fn test_new_object_state() {
        let object = GameObject::new("idle");
        assert_eq!(object.state(), ObjectState::Constructed);
        assert!(!object.is_enabled());
        assert!(object.children().is_empty());
        assert!(object.child_at(0).is_none());
        assert!(!object.is_component_enabled::<Spin>());
    }

    #[test]
    fn test_serialize_shape() {
        let parent = Guid::new();
        let object = GameObject::new("lamp").with_component(Spin::default());
        let value = object.serialize(Some(parent));
        assert_eq!(value["Name"], "lamp");
        assert_eq!(value["Parent"], parent.to_string());
        assert_eq!(value["Transform"]["Scale"], json!([1.0, 1.0, 1.0]));
        assert_eq!(value["Components"][0]["Name"], "Spin");
    }
}
