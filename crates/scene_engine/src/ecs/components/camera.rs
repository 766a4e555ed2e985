//! Camera component
//!
//! Registers a view with the renderer while enabled and pushes the owner's
//! world matrix to it every frame.

use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::foundation::math::{utils, Mat4};
use crate::render::{CameraHandle, CameraView};
use serde::{Deserialize, Serialize};

/// Projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Width / height
    pub aspect: f32,
    /// Whether this camera drives the main view
    pub primary: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            primary: true,
        }
    }
}

/// Perspective camera
#[derive(Debug, Default)]
pub struct Camera {
    /// Projection parameters
    pub settings: CameraSettings,
    handle: Option<CameraHandle>,
}

impl Camera {
    /// Camera with the given settings
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings, handle: None }
    }

    /// Renderer registration, present while enabled
    pub fn handle(&self) -> Option<CameraHandle> {
        self.handle
    }

    fn view(&self, world: Mat4) -> CameraView {
        CameraView {
            world,
            fov: utils::deg_to_rad(self.settings.fov),
            aspect: self.settings.aspect,
            near: self.settings.near,
            far: self.settings.far,
            primary: self.settings.primary,
        }
    }

    fn unregister(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(handle) = self.handle.take() {
            ctx.services().renderer.unregister_camera(handle);
        }
    }
}

impl Component for Camera {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_enabled(&mut self, ctx: &mut ComponentContext<'_>) {
        let view = self.view(ctx.world_matrix());
        let owner = ctx.owner();
        self.handle = Some(ctx.services().renderer.register_camera(owner, view));
        log::debug!("Camera registered for {:?}", owner);
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(handle) = self.handle {
            let view = self.view(ctx.world_matrix());
            ctx.services().renderer.update_camera(handle, view);
        }
    }

    fn on_disabled(&mut self, ctx: &mut ComponentContext<'_>) {
        self.unregister(ctx);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        self.unregister(ctx);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.settings.clone()))
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

impl ComponentType for Camera {
    const TYPE_NAME: &'static str = "Camera";
}
