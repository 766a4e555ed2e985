//! Renderer service contract
//!
//! The scene layer never talks to a GPU. Render-capable components register
//! cameras and submit mesh and light records through [`RenderBackend`]; a real
//! backend turns those into draw calls, while [`RenderQueue`] simply records
//! them for headless runs and tests.

mod render_queue;

pub use render_queue::{RenderQueue, FrameStats};

use crate::ecs::ObjectId;
use crate::foundation::math::{Mat4, Vec3};

/// Handle returned by [`RenderBackend::register_camera`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub u32);

/// Camera parameters pushed to the renderer each frame
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    /// World matrix of the owning object
    pub world: Mat4,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Whether this camera drives the main view
    pub primary: bool,
}

/// One mesh draw request
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    /// Object that submitted the draw
    pub owner: ObjectId,
    /// Mesh resource name
    pub mesh: String,
    /// Material resource name
    pub material: String,
    /// World matrix at submission time
    pub transform: Mat4,
    /// Whether the mesh casts shadows
    pub cast_shadows: bool,
}

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LightKind {
    /// Infinitely distant light along the owner's forward axis
    Directional,
    /// Omnidirectional light at the owner's position
    Point,
    /// Cone light at the owner's position along its forward axis
    Spot,
}

/// One light submission
#[derive(Debug, Clone, PartialEq)]
pub struct LightSubmission {
    /// Object that submitted the light
    pub owner: ObjectId,
    /// Light kind
    pub kind: LightKind,
    /// World position
    pub position: Vec3,
    /// World forward direction
    pub direction: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Attenuation range for point and spot lights
    pub range: f32,
}

/// Renderer service consumed by render-capable components
pub trait RenderBackend {
    /// Start collecting a new frame
    fn begin_frame(&mut self);

    /// Finish the frame and hand it to the GPU (or wherever)
    fn end_frame(&mut self);

    /// Register a camera; the handle stays valid until unregistered
    fn register_camera(&mut self, owner: ObjectId, view: CameraView) -> CameraHandle;

    /// Update a registered camera
    fn update_camera(&mut self, handle: CameraHandle, view: CameraView);

    /// Remove a camera registration
    fn unregister_camera(&mut self, handle: CameraHandle);

    /// Submit a mesh for this frame
    fn submit_mesh(&mut self, draw: MeshDraw);

    /// Submit a light for this frame
    fn submit_light(&mut self, light: LightSubmission);

    /// Downcast support for callers that know the concrete backend
    fn as_any(&self) -> &dyn std::any::Any;
}
