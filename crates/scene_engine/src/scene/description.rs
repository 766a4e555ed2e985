//! Reading scene descriptions
//!
//! Identity fields (names, Guids, roster membership) are fatal when wrong.
//! Spatial fields and components degrade to defaults with a warning.

use super::SceneError;
use crate::ecs::{ComponentData, ComponentError, ComponentRegistry, GameObject, Transform, TransformData, TYPE_KEY};
use crate::foundation::guid::Guid;
use crate::foundation::math::{vec3_from_json, Vec3};
use serde_json::Value;
use std::collections::HashSet;

/// One parsed object plus its unresolved parent reference
pub(crate) struct ObjectDescription {
    pub(crate) object: GameObject,
    pub(crate) parent: Option<Guid>,
}

pub(crate) fn required_str<'a>(desc: &'a Value, field: &'static str, context: &str) -> Result<&'a str, SceneError> {
    desc.get(field).and_then(Value::as_str).ok_or_else(|| SceneError::MissingField {
        context: context.to_string(),
        field,
    })
}

pub(crate) fn required_guid(desc: &Value, field: &'static str, context: &str) -> Result<Guid, SceneError> {
    let text = required_str(desc, field, context)?;
    Guid::parse(text).ok_or_else(|| SceneError::InvalidGuid {
        context: context.to_string(),
        value: text.to_string(),
    })
}

/// The `GUIDs` roster. An absent roster is read as empty, which makes any
/// object in the description fail the membership check.
pub(crate) fn parse_roster(desc: &Value, context: &str) -> Result<HashSet<Guid>, SceneError> {
    let Some(entries) = desc.get("GUIDs").and_then(Value::as_array) else {
        log::warn!("{}: no GUIDs roster", context);
        return Ok(HashSet::new());
    };
    entries
        .iter()
        .map(|entry| {
            entry.as_str().and_then(Guid::parse).ok_or_else(|| SceneError::InvalidGuid {
                context: format!("{} GUIDs", context),
                value: entry.to_string(),
            })
        })
        .collect()
}

fn vec3_field(transform: Option<&Value>, field: &str, default: Vec3, context: &str) -> Vec3 {
    match transform.and_then(|t| t.get(field)) {
        Some(value) => vec3_from_json(value).unwrap_or_else(|| {
            log::warn!("{}: malformed Transform.{} {}; using {:?}", context, field, value, default.as_slice());
            default
        }),
        None => {
            log::warn!("{}: missing Transform.{}; using {:?}", context, field, default.as_slice());
            default
        }
    }
}

/// Local transform from a `Transform` block, defaulting each channel
pub(crate) fn parse_transform(desc: Option<&Value>, context: &str) -> Transform {
    let defaults = TransformData::default();
    Transform::from_data(TransformData {
        position: vec3_field(desc, "Position", defaults.position, context),
        rotation: vec3_field(desc, "Rotation", defaults.rotation, context),
        scale: vec3_field(desc, "Scale", defaults.scale, context),
    })
}

/// Attach every decodable component of a `Components` array to `object`.
/// Returns how many were attached.
pub(crate) fn parse_components(
    desc: Option<&Value>,
    registry: &ComponentRegistry,
    object: &mut GameObject,
    context: &str,
) -> usize {
    let Some(entries) = desc.and_then(Value::as_array) else {
        return 0;
    };

    let mut attached = 0;
    for entry in entries {
        let Some(data) = entry.as_object() else {
            log::warn!("{}: component entry is not an object: {}", context, entry);
            continue;
        };
        match parse_component(data, registry) {
            Ok(component) => match object.attach(component) {
                Ok(_) => attached += 1,
                Err(e) => log::warn!("{}: {}", context, e),
            },
            Err(e) => log::warn!("{}: skipping component: {}", context, e),
        }
    }
    attached
}

fn parse_component(
    data: &ComponentData,
    registry: &ComponentRegistry,
) -> Result<Box<dyn crate::ecs::Component>, ComponentError> {
    let name = data
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ComponentError::UnknownType(String::from("<unnamed>")))?;
    registry.create_from(name, data)
}

/// Parse one `GameObjects` entry, checking it against the roster
pub(crate) fn parse_object(
    desc: &Value,
    registry: &ComponentRegistry,
    roster: &HashSet<Guid>,
    scene: &str,
) -> Result<ObjectDescription, SceneError> {
    let guid = required_guid(desc, "GUID", &format!("{} GameObject", scene))?;
    let name = required_str(desc, "Name", &format!("{} GameObject {}", scene, guid))?;
    if !roster.contains(&guid) {
        return Err(SceneError::NotInRoster {
            name: name.to_string(),
            guid,
        });
    }

    let context = format!("{}/{}", scene, name);
    let enabled = match desc.get("Enabled") {
        None => true,
        Some(Value::Bool(enabled)) => *enabled,
        Some(other) => {
            log::warn!("{}: Enabled must be a bool, got {}; assuming true", context, other);
            true
        }
    };
    let parent = match desc.get("Parent") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_str().and_then(Guid::parse);
            if parsed.is_none() {
                log::warn!("{}: unreadable Parent {}; keeping at root", context, value);
            }
            parsed
        }
    };

    let mut object = GameObject::with_guid(guid, name)
        .with_transform(parse_transform(desc.get("Transform"), &context))
        .with_enabled(enabled);
    parse_components(desc.get("Components"), registry, &mut object, &context);

    Ok(ObjectDescription { object, parent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Camera, Spin};
    use approx::assert_relative_eq;
    use serde_json::json;

    const A: &str = "6c1f3d52-8f0e-4c1a-9a53-0d2f8c6b7e11";

    fn roster() -> HashSet<Guid> {
        [Guid::parse(A).expect("guid")].into_iter().collect()
    }

    #[test]
    fn test_transform_defaults_per_channel() {
        let transform = parse_transform(Some(&json!({ "Position": [1, 2, 3], "Scale": "big" })), "test");
        assert_relative_eq!(transform.local_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(transform.local_rotation(), Vec3::zeros());
        assert_relative_eq!(transform.local_scale(), Vec3::new(1.0, 1.0, 1.0));

        let missing = parse_transform(None, "test");
        assert_relative_eq!(missing.local_scale(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_bad_components_are_skipped() {
        let registry = ComponentRegistry::with_builtin();
        let mut object = GameObject::new("mixed");
        let components = json!([
            { "Name": "Spin", "Speed": [0, 3, 0] },
            { "Name": "Teleporter" },
            { "Speed": 1 },
            { "Name": "Camera", "Fov": "wide" },
            "Camera",
            { "Name": "Spin" },
            { "Name": "Camera", "Fov": 75.0 }
        ]);
        let attached = parse_components(Some(&components), &registry, &mut object, "test");
        assert_eq!(attached, 2);
        assert_eq!(object.component_names(), vec!["Spin", "Camera"]);
        assert_relative_eq!(object.get_component::<Spin>().expect("spin").speed.y, 3.0);
        assert_relative_eq!(object.get_component::<Camera>().expect("camera").settings.fov, 75.0);
    }

    #[test]
    fn test_object_identity_is_fatal() {
        let registry = ComponentRegistry::with_builtin();
        let no_guid = json!({ "Name": "ghost" });
        assert!(matches!(
            parse_object(&no_guid, &registry, &roster(), "s"),
            Err(SceneError::MissingField { field: "GUID", .. })
        ));

        let no_name = json!({ "GUID": A });
        assert!(matches!(
            parse_object(&no_name, &registry, &roster(), "s"),
            Err(SceneError::MissingField { field: "Name", .. })
        ));

        let bad_guid = json!({ "GUID": "nope", "Name": "x" });
        assert!(matches!(
            parse_object(&bad_guid, &registry, &roster(), "s"),
            Err(SceneError::InvalidGuid { .. })
        ));

        let unlisted = json!({ "GUID": A, "Name": "x" });
        assert!(matches!(
            parse_object(&unlisted, &registry, &HashSet::new(), "s"),
            Err(SceneError::NotInRoster { .. })
        ));
    }

    #[test]
    fn test_object_optional_fields() {
        let registry = ComponentRegistry::with_builtin();
        let desc = json!({ "GUID": A, "Name": "lamp", "Enabled": false, "Parent": 42 });
        let parsed = parse_object(&desc, &registry, &roster(), "s").expect("object");
        assert_eq!(parsed.object.name(), "lamp");
        assert_eq!(parsed.object.guid().to_string(), A);
        assert!(parsed.parent.is_none());
        assert!(!parsed.object.enable_on_start);
    }
}
