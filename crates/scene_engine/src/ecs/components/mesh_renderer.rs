//! Mesh renderer component

use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::render::MeshDraw;
use serde::{Deserialize, Serialize};

/// Mesh and material names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MeshSettings {
    /// Mesh resource name
    pub mesh: String,
    /// Material resource name
    pub material: String,
    /// Whether the mesh casts shadows
    pub cast_shadows: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            mesh: String::new(),
            material: "default".to_string(),
            cast_shadows: true,
        }
    }
}

/// Submits one mesh draw per frame with the owner's world matrix
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    /// Draw parameters
    pub settings: MeshSettings,
}

impl MeshRenderer {
    /// Renderer for `mesh` drawn with `material`
    pub fn new(mesh: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            settings: MeshSettings {
                mesh: mesh.into(),
                material: material.into(),
                ..MeshSettings::default()
            },
        }
    }
}

impl Component for MeshRenderer {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.settings.mesh.is_empty() {
            log::warn!("MeshRenderer on {:?} has no mesh; nothing will be drawn", ctx.owner());
        }
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.settings.mesh.is_empty() {
            return;
        }
        let draw = MeshDraw {
            owner: ctx.owner(),
            mesh: self.settings.mesh.clone(),
            material: self.settings.material.clone(),
            transform: ctx.world_matrix(),
            cast_shadows: self.settings.cast_shadows,
        };
        ctx.services().renderer.submit_mesh(draw);
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

impl ComponentType for MeshRenderer {
    const TYPE_NAME: &'static str = "MeshRenderer";
}
