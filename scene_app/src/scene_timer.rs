//! Switches to another scene after a delay

use scene_engine::ecs::{from_component_data, to_component_data};
use scene_engine::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Requests `Scene` once `Seconds` of scene time have passed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SceneTimer {
    /// Scene to switch to
    pub scene: String,
    /// Delay in seconds
    pub seconds: f32,
    #[serde(skip)]
    elapsed: f32,
    #[serde(skip)]
    requested: bool,
}

impl Default for SceneTimer {
    fn default() -> Self {
        Self {
            scene: String::new(),
            seconds: 5.0,
            elapsed: 0.0,
            requested: false,
        }
    }
}

impl Component for SceneTimer {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.elapsed = 0.0;
        self.requested = false;
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.requested {
            return;
        }
        self.elapsed += ctx.delta_time();
        if self.elapsed >= self.seconds {
            log::info!("{:.1}s elapsed, moving on to '{}'", self.elapsed, self.scene);
            ctx.services().request_scene_change(self.scene.clone());
            self.requested = true;
        }
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self {
            scene: self.scene.clone(),
            seconds: self.seconds,
            ..Self::default()
        })
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(self)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        *self = from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for SceneTimer {
    const TYPE_NAME: &'static str = "SceneTimer";
}
