//! Light component

use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::foundation::math::Vec3;
use crate::render::{LightKind, LightSubmission};
use serde::{Deserialize, Serialize};

/// Light parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LightSettings {
    /// Light kind
    pub kind: LightKind,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Attenuation range for point and spot lights
    pub range: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 10.0,
        }
    }
}

/// Submits a light every frame from the owner's world position and forward axis
#[derive(Debug, Clone, Default)]
pub struct Light {
    /// Light parameters
    pub settings: LightSettings,
}

impl Light {
    /// Directional light with the given color and intensity
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            settings: LightSettings {
                kind: LightKind::Directional,
                color,
                intensity,
                ..LightSettings::default()
            },
        }
    }

    /// Point light with the given color, intensity and range
    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            settings: LightSettings {
                kind: LightKind::Point,
                color,
                intensity,
                range,
            },
        }
    }
}

impl Component for Light {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        let light = LightSubmission {
            owner: ctx.owner(),
            kind: self.settings.kind,
            position: ctx.position(),
            direction: ctx.forward(),
            color: self.settings.color,
            intensity: self.settings.intensity,
            range: self.settings.range,
        };
        ctx.services().renderer.submit_light(light);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(&self.settings)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        self.settings = from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    any_casts!();
}

impl ComponentType for Light {
    const TYPE_NAME: &'static str = "Light";
}
