//! Scene demo application
//!
//! Loads the demo configuration, plays the main menu until its timer hands
//! over to the level, and keeps spawning asteroid prefabs while the level is
//! active. Runs headless against the recording renderer.

mod scene_timer;

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_timer::SceneTimer;
use std::path::{Path, PathBuf};

const ASTEROID_PREFAB: &str = "Asteroid";
const SPAWN_INTERVAL: u64 = 45;

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join("engine.toml"))
}

fn load_config(path: &Path) -> EngineConfig {
    let mut config = match EngineConfig::load_from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not read '{}' ({}), using defaults", path.display(), e);
            EngineConfig::default()
        }
    };
    if config.asset_root.is_relative() {
        if let Some(dir) = path.parent() {
            config.asset_root = dir.join(&config.asset_root);
        }
    }
    config
}

pub struct SceneApp {
    engine: Engine,
    spawned: usize,
}

impl SceneApp {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Creating scene demo application...");
        let mut registry = ComponentRegistry::with_builtin();
        registry.register::<SceneTimer>();
        log::info!("{} component types registered", registry.len());

        let engine = Engine::with_registry(
            config,
            registry,
            Box::new(RenderQueue::new()),
            Box::new(NullAudioBackend::new()),
        )?;
        Ok(Self { engine, spawned: 0 })
    }

    pub fn run(&mut self) -> Result<(), EngineError> {
        log::info!("Starting main loop...");
        let limit = self.engine.config().frame_limit;
        while self.engine.is_running() && (limit == 0 || self.engine.frame_count() < limit) {
            self.engine.frame()?;
            if self.engine.frame_count() % SPAWN_INTERVAL == 0 {
                self.spawn_asteroid();
            }
            if self.engine.frame_count() % 120 == 0 {
                self.report();
            }
        }
        log::info!("Main loop finished after {} frames", self.engine.frame_count());
        Ok(())
    }

    fn spawn_asteroid(&mut self) {
        let (scenes, services) = self.engine.scenes_mut();
        let Some(scene) = scenes.active_scene_mut() else {
            return;
        };
        if !scene.prefab_names().any(|name| name == ASTEROID_PREFAB) {
            return;
        }
        match scene.instantiate_prefab(ASTEROID_PREFAB, services) {
            Ok(_) => {
                self.spawned += 1;
                log::debug!("Asteroid #{} spawned", self.spawned);
            }
            Err(e) => log::warn!("Could not spawn asteroid: {}", e),
        }
    }

    fn report(&self) {
        let Some(scene) = self.engine.scenes().active_scene() else {
            log::info!("Frame {}: no active scene", self.engine.frame_count());
            return;
        };
        let stats = scene.stats();
        let drawn = self
            .engine
            .services()
            .renderer_as::<RenderQueue>()
            .map(|queue| queue.last_frame())
            .unwrap_or_default();
        log::info!(
            "Frame {} [{}]: {} objects ({} roots), {} meshes, {} lights, {} cameras, update {:.3}ms",
            self.engine.frame_count(),
            scene.name(),
            stats.object_count,
            stats.root_count,
            drawn.mesh_count,
            drawn.light_count,
            drawn.camera_count,
            stats.update_time_ms
        );
    }

    pub fn shutdown(&mut self) {
        log::info!("Shutting down ({} asteroids spawned)", self.spawned);
        self.engine.shutdown();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let config = load_config(&path);
    logging::init_with_level(&config.log_level);
    log::info!("Configuration loaded from '{}'", path.display());

    let mut app = SceneApp::new(config)?;
    let result = app.run();
    app.shutdown();
    result?;
    Ok(())
}
