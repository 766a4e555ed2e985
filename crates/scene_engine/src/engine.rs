//! Core engine implementation
//!
//! The engine owns the services, the resource manager, the component registry
//! and the scene manager, and drives one frame at a time:
//! time step, scene update, scene render, input roll-over, then any scene
//! switch requested during the frame.

use crate::assets::{ResourceError, ResourceManager};
use crate::audio::{AudioBackend, NullAudioBackend};
use crate::config::{ConfigError, EngineConfig};
use crate::ecs::ComponentRegistry;
use crate::render::{RenderBackend, RenderQueue};
use crate::scene::{SceneError, SceneManager};
use crate::services::Services;
use thiserror::Error;

/// Main engine struct
pub struct Engine {
    config: EngineConfig,
    services: Services,
    resources: ResourceManager,
    registry: ComponentRegistry,
    scenes: SceneManager,
    frames: u64,
    running: bool,
}

impl Engine {
    /// Create an engine around the given backends, read the scene list and
    /// load the start scene
    pub fn new(
        config: EngineConfig,
        renderer: Box<dyn RenderBackend>,
        audio: Box<dyn AudioBackend>,
    ) -> Result<Self, EngineError> {
        Self::with_registry(config, ComponentRegistry::with_builtin(), renderer, audio)
    }

    /// Like [`Engine::new`] with a caller-supplied component registry
    pub fn with_registry(
        config: EngineConfig,
        registry: ComponentRegistry,
        renderer: Box<dyn RenderBackend>,
        audio: Box<dyn AudioBackend>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine (assets at '{}')...", config.asset_root.display());

        let mut resources = ResourceManager::new(config.asset_root.clone());
        let mut scenes = SceneManager::new();
        scenes.init(&mut resources, &config.scene_list)?;

        let mut engine = Self {
            services: Services::new(renderer, audio),
            resources,
            registry,
            scenes,
            frames: 0,
            running: true,
            config,
        };

        let start = engine
            .config
            .start_scene
            .clone()
            .or_else(|| engine.scenes.scene_names().next().map(str::to_string));
        match start {
            Some(name) => engine.load_scene(&name)?,
            None => log::warn!("No scenes registered; running empty"),
        }
        Ok(engine)
    }

    /// Engine with a recording renderer and silent audio
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, Box::new(RenderQueue::new()), Box::new(NullAudioBackend::new()))
    }

    /// Unload the active scene and load `name`
    pub fn load_scene(&mut self, name: &str) -> Result<(), EngineError> {
        self.scenes
            .load_scene(name, &self.resources, &self.registry, &mut self.services)
            .map_err(|e| {
                log::error!("Failed to load scene '{}': {}", name, e);
                EngineError::from(e)
            })
    }

    /// Run one frame
    pub fn frame(&mut self) -> Result<(), EngineError> {
        match self.config.fixed_delta {
            Some(dt) => self.services.time.advance(dt),
            None => self.services.time.tick(),
        }

        self.services.renderer.begin_frame();
        self.scenes.update(&mut self.services);
        self.scenes.render(&mut self.services);
        self.services.renderer.end_frame();
        self.services.input.begin_frame();
        self.frames += 1;

        if let Some(next) = self.services.take_scene_request() {
            log::info!("Switching to scene '{}'", next);
            self.load_scene(&next)?;
        }
        Ok(())
    }

    /// Run frames until the frame limit is reached or [`Engine::request_exit`]
    /// is called. Returns the number of frames run.
    pub fn run(&mut self) -> Result<u64, EngineError> {
        log::info!("Starting main loop...");
        let start = self.frames;
        while self.running {
            if self.config.frame_limit > 0 && self.frames >= self.config.frame_limit {
                break;
            }
            self.frame()?;
        }
        let ran = self.frames - start;
        log::info!(
            "Main loop finished after {} frames ({:.1} fps average)",
            ran,
            self.services.time.average_fps()
        );
        Ok(ran)
    }

    /// Stop [`Engine::run`] after the current frame
    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Unload the active scene
    pub fn shutdown(&mut self) {
        log::info!("Shutting down engine...");
        self.scenes.shutdown(&mut self.services);
        self.running = false;
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine services
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Engine services, mutably
    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    /// Loaded descriptions
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Component registry
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Scene manager
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Scene manager together with the services its operations need
    pub fn scenes_mut(&mut self) -> (&mut SceneManager, &mut Services) {
        (&mut self.scenes, &mut self.services)
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scene failed to load
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// A description could not be loaded
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}
