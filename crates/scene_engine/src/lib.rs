//! # Scene Engine
//!
//! The entity/scene layer of a real-time game engine: a hierarchical object
//! graph, polymorphic components with lifecycle hooks, cached hierarchical
//! transforms and a per-frame scene update/render pass with deferred
//! destruction.
//!
//! ## Features
//!
//! - **Arena scene graph**: game objects addressed by generation-checked ids
//! - **Component lifecycle**: init, enable, update, disable and destroy hooks
//! - **Lazy transforms**: dirty flags propagated down the hierarchy
//! - **Data-driven scenes**: JSON descriptions with a component registry
//! - **Explicit services**: time, input, renderer and audio passed by context
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load_from_file("assets/engine.toml")?;
//!     let mut engine = Engine::headless(config)?;
//!     engine.run()?;
//!     engine.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod input;
pub mod render;
pub mod audio;
pub mod ecs;
pub mod scene;

mod engine;
mod services;

pub use engine::{Engine, EngineError};
pub use services::Services;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError, Services,
        config::{Config, EngineConfig},
        foundation::{
            guid::Guid,
            math::{Vec3, Mat4},
            time::{Timer, Stopwatch},
        },
        ecs::{
            Component, ComponentContext, ComponentData, ComponentError, ComponentRegistry, ComponentType,
            GameObject, ObjectId, Transform, World,
        },
        scene::{Prefab, Scene, SceneError, SceneManager},
        assets::{ResourceHandle, ResourceManager},
        render::{RenderBackend, RenderQueue},
        audio::{AudioBackend, NullAudioBackend},
        input::{InputManager, KeyCode, MouseButton},
    };
}
