//! Engine services handed to component hooks
//!
//! Time, input, rendering and audio are owned by one explicitly constructed
//! [`Services`] value that the engine threads through every frame, instead of
//! being reachable as globals.

use crate::audio::{AudioBackend, NullAudioBackend};
use crate::foundation::time::Timer;
use crate::input::InputManager;
use crate::render::{RenderBackend, RenderQueue};

/// Collaborator services consumed by components
pub struct Services {
    /// Frame timing
    pub time: Timer,

    /// Keyboard and mouse state
    pub input: InputManager,

    /// Renderer accepting camera, mesh and light submissions
    pub renderer: Box<dyn RenderBackend>,

    /// Audio playback
    pub audio: Box<dyn AudioBackend>,

    scene_request: Option<String>,
}

impl Services {
    /// Create services around the given backends
    pub fn new(renderer: Box<dyn RenderBackend>, audio: Box<dyn AudioBackend>) -> Self {
        Self {
            time: Timer::new(),
            input: InputManager::new(),
            renderer,
            audio,
            scene_request: None,
        }
    }

    /// Services with a recording renderer and silent audio
    pub fn headless() -> Self {
        Self::new(Box::new(RenderQueue::new()), Box::new(NullAudioBackend::new()))
    }

    /// Ask for a scene switch once the current frame has finished.
    ///
    /// Switching scenes while the active one is iterating is not allowed, so
    /// components request it and the engine performs it between frames. A later
    /// request in the same frame replaces an earlier one.
    pub fn request_scene_change(&mut self, scene: impl Into<String>) {
        self.scene_request = Some(scene.into());
    }

    /// Take the pending scene switch request, if any
    pub fn take_scene_request(&mut self) -> Option<String> {
        self.scene_request.take()
    }

    /// The renderer as a concrete type
    pub fn renderer_as<T: 'static>(&self) -> Option<&T> {
        self.renderer.as_any().downcast_ref::<T>()
    }

    /// The audio backend as a concrete type
    pub fn audio_as<T: 'static>(&self) -> Option<&T> {
        self.audio.as_any().downcast_ref::<T>()
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::headless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_backends_downcast() {
        let services = Services::headless();
        assert!(services.renderer_as::<RenderQueue>().is_some());
        assert!(services.audio_as::<NullAudioBackend>().is_some());
        assert!(services.audio_as::<RenderQueue>().is_none());
    }

    #[test]
    fn test_scene_request_is_taken_once() {
        let mut services = Services::headless();
        services.request_scene_change("a");
        services.request_scene_change("b");
        assert_eq!(services.take_scene_request().as_deref(), Some("b"));
        assert!(services.take_scene_request().is_none());
    }
}
