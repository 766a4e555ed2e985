//! # Render Queue
//!
//! Recording implementation of [`RenderBackend`]. It keeps the camera
//! registrations and everything submitted during the current frame, and
//! summarises finished frames in [`FrameStats`].

use super::{CameraHandle, CameraView, LightSubmission, MeshDraw, RenderBackend};
use crate::ecs::ObjectId;
use std::collections::HashMap;

/// Summary of one finished frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of mesh draws submitted
    pub mesh_count: usize,
    /// Number of lights submitted
    pub light_count: usize,
    /// Number of registered cameras at end of frame
    pub camera_count: usize,
}

/// Headless renderer that records submissions
#[derive(Debug, Default)]
pub struct RenderQueue {
    next_camera: u32,
    cameras: HashMap<CameraHandle, (ObjectId, CameraView)>,
    meshes: Vec<MeshDraw>,
    lights: Vec<LightSubmission>,
    frames_finished: u64,
    last_frame: FrameStats,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh draws submitted since the last `begin_frame`
    pub fn meshes(&self) -> &[MeshDraw] {
        &self.meshes
    }

    /// Lights submitted since the last `begin_frame`
    pub fn lights(&self) -> &[LightSubmission] {
        &self.lights
    }

    /// Currently registered cameras
    pub fn cameras(&self) -> impl Iterator<Item = (&CameraHandle, &(ObjectId, CameraView))> {
        self.cameras.iter()
    }

    /// Number of currently registered cameras
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// The primary camera, if one is registered
    pub fn primary_camera(&self) -> Option<&CameraView> {
        self.cameras.values().map(|(_, view)| view).find(|view| view.primary)
    }

    /// Number of frames finished so far
    pub fn frames_finished(&self) -> u64 {
        self.frames_finished
    }

    /// Stats of the most recently finished frame
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }
}

impl RenderBackend for RenderQueue {
    fn begin_frame(&mut self) {
        self.meshes.clear();
        self.lights.clear();
    }

    fn end_frame(&mut self) {
        self.frames_finished += 1;
        self.last_frame = FrameStats {
            mesh_count: self.meshes.len(),
            light_count: self.lights.len(),
            camera_count: self.cameras.len(),
        };
        log::trace!(
            "Frame {} recorded: {} meshes, {} lights, {} cameras",
            self.frames_finished,
            self.last_frame.mesh_count,
            self.last_frame.light_count,
            self.last_frame.camera_count
        );
    }

    fn register_camera(&mut self, owner: ObjectId, view: CameraView) -> CameraHandle {
        let handle = CameraHandle(self.next_camera);
        self.next_camera += 1;
        self.cameras.insert(handle, (owner, view));
        handle
    }

    fn update_camera(&mut self, handle: CameraHandle, view: CameraView) {
        if let Some(entry) = self.cameras.get_mut(&handle) {
            entry.1 = view;
        } else {
            log::warn!("update_camera: unknown camera handle {:?}", handle);
        }
    }

    fn unregister_camera(&mut self, handle: CameraHandle) {
        self.cameras.remove(&handle);
    }

    fn submit_mesh(&mut self, draw: MeshDraw) {
        self.meshes.push(draw);
    }

    fn submit_light(&mut self, light: LightSubmission) {
        self.lights.push(light);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;

    fn view(primary: bool) -> CameraView {
        CameraView {
            world: Mat4::identity(),
            fov: 1.0,
            aspect: 1.5,
            near: 0.1,
            far: 100.0,
            primary,
        }
    }

    #[test]
    fn test_camera_registration() {
        let mut queue = RenderQueue::new();
        let owner = ObjectId::default();
        let a = queue.register_camera(owner, view(false));
        let b = queue.register_camera(owner, view(true));
        assert_ne!(a, b);
        assert_eq!(queue.camera_count(), 2);
        assert!(queue.primary_camera().is_some());

        queue.unregister_camera(b);
        assert_eq!(queue.camera_count(), 1);
        assert!(queue.primary_camera().is_none());
    }

    #[test]
    fn test_frame_stats() {
        let mut queue = RenderQueue::new();
        queue.begin_frame();
        queue.submit_mesh(MeshDraw {
            owner: ObjectId::default(),
            mesh: "cube".to_string(),
            material: "default".to_string(),
            transform: Mat4::identity(),
            cast_shadows: true,
        });
        queue.end_frame();
        assert_eq!(queue.last_frame().mesh_count, 1);
        assert_eq!(queue.frames_finished(), 1);

        queue.begin_frame();
        assert!(queue.meshes().is_empty());
    }
}
