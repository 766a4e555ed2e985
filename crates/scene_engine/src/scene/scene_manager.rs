//! # Scene Manager
//!
//! Keeps the roster of loadable scene descriptions and the single active
//! scene. Switching always unloads the current scene first, so a failed load
//! leaves no scene active.

use super::{Scene, SceneError};
use crate::assets::{ResourceHandle, ResourceManager};
use crate::ecs::ComponentRegistry;
use crate::foundation::time::Stopwatch;
use crate::services::Services;
use serde_json::Value;
use std::path::Path;

/// Scene roster plus the active scene
#[derive(Default)]
pub struct SceneManager {
    roster: Vec<(String, ResourceHandle)>,
    active: Option<Scene>,
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the master scene list (a JSON array of description paths) and
    /// register each scene under its `Name`. Entries that fail to load are
    /// logged and skipped. Returns how many scenes were registered.
    pub fn init(&mut self, resources: &mut ResourceManager, master_list: &str) -> Result<usize, SceneError> {
        let list = resources.load_description(master_list)?;
        let files: Vec<String> = match resources.get(list)? {
            Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| {
                    let file = entry.as_str().map(str::to_string);
                    if file.is_none() {
                        log::warn!("Scene list {}: ignoring non-string entry {}", master_list, entry);
                    }
                    file
                })
                .collect(),
            other => {
                return Err(SceneError::InvalidSceneList(format!(
                    "{} must be an array of file names, found {}",
                    master_list, other
                )))
            }
        };

        let mut registered = 0;
        for file in &files {
            let handle = match resources.load_description(file) {
                Ok(handle) => handle,
                Err(e) => {
                    log::warn!("Skipping scene '{}': {}", file, e);
                    continue;
                }
            };
            let name = match resources.get(handle)?.get("Name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => {
                    let stem = Path::new(file).file_stem().and_then(|s| s.to_str()).unwrap_or(file.as_str());
                    log::warn!("Scene file '{}' has no Name; registering as '{}'", file, stem);
                    stem.to_string()
                }
            };
            if self.register_scene(name, handle) {
                registered += 1;
            }
        }
        log::info!("Registered {} of {} scenes from {}", registered, files.len(), master_list);
        Ok(registered)
    }

    /// Register a description under `name`. Returns `false` if the name is taken.
    pub fn register_scene(&mut self, name: impl Into<String>, handle: ResourceHandle) -> bool {
        let name = name.into();
        if self.handle_of(&name).is_some() {
            log::warn!("Scene '{}' is already registered", name);
            return false;
        }
        self.roster.push((name, handle));
        true
    }

    /// Registered scene names in registration order
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.roster.iter().map(|(name, _)| name.as_str())
    }

    /// Whether `name` is registered
    pub fn has_scene(&self, name: &str) -> bool {
        self.handle_of(name).is_some()
    }

    fn handle_of(&self, name: &str) -> Option<ResourceHandle> {
        self.roster.iter().find(|(n, _)| n == name).map(|(_, handle)| *handle)
    }

    /// The running scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    /// The running scene, mutably
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut()
    }

    /// Unload the active scene, then parse and start `name`.
    ///
    /// On error no scene is active.
    pub fn load_scene(
        &mut self,
        name: &str,
        resources: &ResourceManager,
        registry: &ComponentRegistry,
        services: &mut Services,
    ) -> Result<(), SceneError> {
        self.unload_active(services);

        let timer = Stopwatch::start_new();
        let handle = self.handle_of(name).ok_or_else(|| SceneError::UnknownScene(name.to_string()))?;
        let description = resources.get(handle)?;
        let mut scene = Scene::parse(description, registry)?;
        scene.init(services);
        log::info!(
            "Loaded scene '{}' ({} objects) in {:.2} ms",
            scene.name(),
            scene.object_count(),
            timer.elapsed_millis()
        );
        self.active = Some(scene);
        Ok(())
    }

    /// Make an already built scene active, unloading the current one
    pub fn set_active(&mut self, mut scene: Scene, services: &mut Services) {
        self.unload_active(services);
        if !scene.is_initialized() {
            scene.init(services);
        }
        log::info!("Activated scene '{}'", scene.name());
        self.active = Some(scene);
    }

    fn unload_active(&mut self, services: &mut Services) {
        if let Some(mut scene) = self.active.take() {
            log::info!("Unloading scene '{}'", scene.name());
            scene.unload(services);
        }
    }

    /// Update the active scene
    pub fn update(&mut self, services: &mut Services) {
        if let Some(scene) = self.active.as_mut() {
            scene.update(services);
        }
    }

    /// Render the active scene
    pub fn render(&mut self, services: &mut Services) {
        if let Some(scene) = self.active.as_mut() {
            scene.render(services);
        }
    }

    /// Unload the active scene and forget the roster
    pub fn shutdown(&mut self, services: &mut Services) {
        self.unload_active(services);
        self.roster.clear();
    }
}
