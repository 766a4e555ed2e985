//! Prefab templates
//!
//! A prefab is a detached object tree kept by a scene. Instantiating it deep
//! copies every component through [`Component::clone_box`] and gives each new
//! object a fresh Guid.

use super::description::{parse_components, parse_transform, required_str};
use super::SceneError;
use crate::ecs::{Component, ComponentRegistry, GameObject, ObjectId, Transform, TransformData, World, TYPE_KEY};
use serde_json::{json, Value};
use std::fmt;

/// Object tree template
pub struct Prefab {
    name: String,
    transform: TransformData,
    enabled: bool,
    components: Vec<Box<dyn Component>>,
    children: Vec<Prefab>,
}

impl Prefab {
    /// Empty template named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: TransformData::default(),
            enabled: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: local transform of the root object
    pub fn with_transform(mut self, transform: TransformData) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: add a component to the root object
    pub fn with_component<T: Component>(mut self, component: T) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Builder: add a child template
    pub fn with_child(mut self, child: Prefab) -> Self {
        self.children.push(child);
        self
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of objects an instance creates
    pub fn object_count(&self) -> usize {
        1 + self.children.iter().map(Prefab::object_count).sum::<usize>()
    }

    /// Parse a `Prefabs` entry: `Name`, optional `Transform`, `Enabled`,
    /// `Components` and nested `Children`
    pub(crate) fn parse(desc: &Value, registry: &ComponentRegistry) -> Result<Self, SceneError> {
        let name = required_str(desc, "Name", "Prefab")?;
        let context = format!("Prefab {}", name);

        // Components are decoded once into a scratch object to reuse the
        // description rules, then moved into the template.
        let mut scratch = GameObject::new(name);
        parse_components(desc.get("Components"), registry, &mut scratch, &context);
        let components = scratch.take_components();

        let children: Vec<Prefab> = desc
            .get("Children")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| Prefab::parse(entry, registry))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            transform: match desc.get("Transform") {
                Some(t) => parse_transform(Some(t), &context).data(),
                None => TransformData::default(),
            },
            enabled: desc.get("Enabled").and_then(Value::as_bool).unwrap_or(true),
            components,
            children,
        })
    }

    /// Create a fresh, not yet initialized copy in `world` and return its root
    pub(crate) fn build(&self, world: &mut World) -> ObjectId {
        let mut object = GameObject::new(self.name.clone())
            .with_transform(Transform::from_data(self.transform.clone()))
            .with_enabled(self.enabled);
        for component in &self.components {
            if let Err(e) = object.attach(component.clone_box()) {
                log::warn!("Prefab {}: {}", self.name, e);
            }
        }
        let id = world.insert(object);
        for child in &self.children {
            let child_id = child.build(world);
            if let Err(e) = world.add_child(id, child_id) {
                log::warn!("Prefab {}: {}", self.name, e);
            }
        }
        id
    }

    /// Encode back to the `Prefabs` entry format
    pub fn serialize(&self) -> Value {
        let components: Vec<Value> = self
            .components
            .iter()
            .map(|component| {
                let mut data = component.serialize();
                data.insert(TYPE_KEY.to_string(), Value::from(component.type_name()));
                Value::Object(data)
            })
            .collect();
        let children: Vec<Value> = self.children.iter().map(Prefab::serialize).collect();
        json!({
            "Name": self.name,
            "Enabled": self.enabled,
            "Transform": {
                "Position": [self.transform.position.x, self.transform.position.y, self.transform.position.z],
                "Rotation": [self.transform.rotation.x, self.transform.rotation.y, self.transform.rotation.z],
                "Scale": [self.transform.scale.x, self.transform.scale.y, self.transform.scale.z],
            },
            "Components": components,
            "Children": children,
        })
    }
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<&str> = self.components.iter().map(|c| c.type_name()).collect();
        f.debug_struct("Prefab")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("components", &components)
            .field("children", &self.children)
            .finish()
    }
}
