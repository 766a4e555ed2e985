//! Component factory keyed by type identifier
//!
//! Scene descriptions name components by string. The registry turns such a
//! name plus its description fields into a boxed component without the
//! loader knowing any concrete type.

use super::component::{Component, ComponentData, ComponentError, ComponentType};
use super::components::{
    AudioListener, AudioSource, Camera, Light, MeshRenderer, SelfDestruct, Spin, TweenPosition, TweenRotation,
    TweenScale,
};
use std::collections::BTreeMap;

/// Constructor producing a default-initialised component
pub type ComponentFactory = fn() -> Box<dyn Component>;

/// Name -> constructor table
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

fn construct<T: ComponentType>() -> Box<dyn Component> {
    Box::new(T::default())
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every component type shipped with the engine
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Camera>();
        registry.register::<MeshRenderer>();
        registry.register::<Light>();
        registry.register::<AudioSource>();
        registry.register::<AudioListener>();
        registry.register::<TweenPosition>();
        registry.register::<TweenRotation>();
        registry.register::<TweenScale>();
        registry.register::<Spin>();
        registry.register::<SelfDestruct>();
        registry
    }

    /// Register `T` under its type identifier. Returns `false` (and keeps
    /// the existing entry) if the name is already taken.
    pub fn register<T: ComponentType>(&mut self) -> bool {
        self.register_with(T::TYPE_NAME, construct::<T>)
    }

    /// Register a custom constructor under `name`
    pub fn register_with(&mut self, name: impl Into<String>, factory: ComponentFactory) -> bool {
        let name = name.into();
        if self.factories.contains_key(&name) {
            log::warn!("Component type '{}' is already registered", name);
            return false;
        }
        log::trace!("Registered component type '{}'", name);
        self.factories.insert(name, factory);
        true
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Default-construct a component by name
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>, ComponentError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ComponentError::UnknownType(name.to_string()))
    }

    /// Construct a component by name and apply its description fields
    pub fn create_from(&self, name: &str, data: &ComponentData) -> Result<Box<dyn Component>, ComponentError> {
        let mut component = self.create(name)?;
        component.deserialize(data)?;
        Ok(component)
    }
}
