//! Engine component set
//!
//! Every type here implements [`Component`](crate::ecs::Component) and, except
//! for the [`Probe`] test double, is registered by
//! [`ComponentRegistry::with_builtin`](crate::ecs::ComponentRegistry::with_builtin).

/// Implements the `Any` upcasts every component needs
macro_rules! any_casts {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

pub mod camera;
pub mod mesh_renderer;
pub mod light;
pub mod audio;
pub mod tween;
pub mod spin;
pub mod probe;

pub use camera::{Camera, CameraSettings};
pub use mesh_renderer::{MeshRenderer, MeshSettings};
pub use light::{Light, LightSettings};
pub use audio::{AudioListener, AudioSource, AudioSourceSettings};
pub use tween::{Easing, Tween, TweenMode, TweenPosition, TweenRotation, TweenScale, TweenSettings, TweenTarget};
pub use spin::{SelfDestruct, Spin};
pub use probe::{journal, Journal, Probe, ProbeAction};
