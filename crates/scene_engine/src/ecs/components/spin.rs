//! Small behaviour components: constant rotation and timed self-destruction

use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Rotates its owner at a constant angular velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Spin {
    /// Radians per second around each local axis
    pub speed: Vec3,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            speed: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl Spin {
    /// Spin with the given angular velocity
    pub fn new(speed: Vec3) -> Self {
        Self { speed }
    }
}

impl Component for Spin {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        let delta = self.speed * ctx.delta_time();
        ctx.transform().rotate(delta);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(self)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        *self = from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    any_casts!();
}

impl ComponentType for Spin {
    const TYPE_NAME: &'static str = "Spin";
}

/// Marks its owner for destruction once `Lifetime` seconds have passed.
///
/// A lifetime of zero or less never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SelfDestruct {
    /// Seconds to live
    pub lifetime: f32,
    #[serde(skip)]
    age: f32,
    #[serde(skip)]
    fired: bool,
}

impl Default for SelfDestruct {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SelfDestruct {
    /// Expire after `lifetime` seconds
    pub fn new(lifetime: f32) -> Self {
        Self {
            lifetime,
            age: 0.0,
            fired: false,
        }
    }

    /// Check if the lifetime has run out
    pub fn is_expired(&self) -> bool {
        self.lifetime > 0.0 && self.age >= self.lifetime
    }

    /// Seconds left before expiry
    pub fn remaining(&self) -> f32 {
        if self.lifetime <= 0.0 {
            f32::INFINITY
        } else {
            (self.lifetime - self.age).max(0.0)
        }
    }
}

impl Component for SelfDestruct {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.age += ctx.delta_time();
        if self.is_expired() && !self.fired {
            self.fired = true;
            log::debug!("SelfDestruct expired on {:?}", ctx.owner());
            ctx.destroy_owner();
        }
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.lifetime))
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(self)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        *self = from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    any_casts!();
}

impl ComponentType for SelfDestruct {
    const TYPE_NAME: &'static str = "SelfDestruct";
}
