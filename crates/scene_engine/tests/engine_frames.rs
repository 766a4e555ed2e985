//! End-to-end tests: scene files on disk driven through the engine

use scene_engine::audio::NullAudioBackend;
use scene_engine::ecs::{Component, ComponentContext, ComponentData, ComponentError, ComponentRegistry, ComponentType};
use scene_engine::prelude::*;
use scene_engine::render::RenderQueue;
use scene_engine::scene::SceneError;
use serde_json::{json, Value};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Temporary asset tree removed on drop
struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    fn new(name: &str) -> Self {
        let unique = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!("scene_engine_{}_{}_{}", name, std::process::id(), unique));
        fs::create_dir_all(root.join("scenes")).expect("create asset dir");
        Self { root }
    }

    fn write(&self, relative: &str, value: &Value) {
        let path = self.root.join(relative);
        fs::write(&path, serde_json::to_string_pretty(value).expect("json")).expect("write asset");
    }

    fn path(&self) -> &Path {
        &self.root
    }

    fn config(&self) -> EngineConfig {
        EngineConfig {
            asset_root: self.root.clone(),
            scene_list: "scenes/scenes.json".to_string(),
            fixed_delta: Some(0.1),
            frame_limit: 3,
            ..EngineConfig::default()
        }
    }
}

impl Drop for AssetDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

const MENU: &str = "11111111-1111-4111-8111-111111111111";
const LEVEL: &str = "22222222-2222-4222-8222-222222222222";
const CAMERA: &str = "33333333-3333-4333-8333-333333333333";
const SHIP: &str = "44444444-4444-4444-8444-444444444444";
const FLARE: &str = "55555555-5555-4555-8555-555555555555";
const PORTAL: &str = "66666666-6666-4666-8666-666666666666";

fn menu_scene() -> Value {
    json!({
        "Name": "Menu", "GUID": MENU,
        "GUIDs": [CAMERA, PORTAL],
        "GameObjects": [
            { "GUID": CAMERA, "Name": "Camera",
              "Transform": { "Position": [0, 0, -5], "Rotation": [0, 0, 0], "Scale": [1, 1, 1] },
              "Components": [{ "Name": "Camera", "Fov": 70.0 }] },
            { "GUID": PORTAL, "Name": "Portal",
              "Components": [{ "Name": "GoTo", "Scene": "Level", "After": 2 }] }
        ]
    })
}

fn level_scene() -> Value {
    json!({
        "Name": "Level", "GUID": LEVEL,
        "GUIDs": [SHIP, FLARE],
        "GameObjects": [
            { "GUID": SHIP, "Name": "Ship",
              "Transform": { "Position": [0, 1, 0] },
              "Components": [
                  { "Name": "MeshRenderer", "Mesh": "ship.obj", "Material": "hull" },
                  { "Name": "Light", "Kind": "Point", "Intensity": 2.0 },
                  { "Name": "Warp" }
              ] },
            { "GUID": FLARE, "Name": "Flare", "Parent": SHIP,
              "Components": [{ "Name": "SelfDestruct", "Lifetime": 0.25 }] }
        ]
    })
}

fn write_assets(dir: &AssetDir) {
    dir.write("scenes/scenes.json", &json!(["scenes/menu.json", "scenes/level.json", "scenes/missing.json"]));
    dir.write("scenes/menu.json", &menu_scene());
    dir.write("scenes/level.json", &level_scene());
}

/// Requests a scene switch after a number of updates
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GoTo {
    scene: String,
    after: u32,
    #[serde(skip)]
    seen: u32,
}

impl Component for GoTo {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.seen += 1;
        if self.seen == self.after {
            ctx.services().request_scene_change(self.scene.clone());
        }
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn serialize(&self) -> ComponentData {
        scene_engine::ecs::to_component_data(self)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        *self = scene_engine::ecs::from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ComponentType for GoTo {
    const TYPE_NAME: &'static str = "GoTo";
}

fn engine_with_goto(config: EngineConfig) -> Result<Engine, EngineError> {
    let mut registry = ComponentRegistry::with_builtin();
    registry.register::<GoTo>();
    Engine::with_registry(config, registry, Box::new(RenderQueue::new()), Box::new(NullAudioBackend::new()))
}

fn queue(engine: &Engine) -> &RenderQueue {
    engine.services().renderer_as::<RenderQueue>().expect("render queue")
}

#[test]
fn test_engine_loads_first_scene_and_skips_missing_files() {
    let dir = AssetDir::new("first_scene");
    write_assets(&dir);

    let engine = engine_with_goto(dir.config()).expect("engine");
    assert_eq!(engine.scenes().scene_names().collect::<Vec<_>>(), vec!["Menu", "Level"]);
    let scene = engine.scenes().active_scene().expect("active");
    assert_eq!(scene.name(), "Menu");
    assert_eq!(scene.object_count(), 2);
    assert_eq!(queue(&engine).camera_count(), 1);
}

#[test]
fn test_scene_switch_happens_between_frames() {
    let dir = AssetDir::new("switch");
    write_assets(&dir);

    let mut engine = engine_with_goto(dir.config()).expect("engine");
    engine.frame().expect("frame 1");
    assert_eq!(engine.scenes().active_scene().map(Scene::name), Some("Menu"));

    engine.frame().expect("frame 2");
    let scene = engine.scenes().active_scene().expect("active");
    assert_eq!(scene.name(), "Level");
    // The menu camera was unregistered with its scene
    assert_eq!(queue(&engine).camera_count(), 0);

    engine.frame().expect("frame 3");
    let stats = queue(&engine).last_frame();
    assert_eq!(stats.mesh_count, 1);
    assert_eq!(stats.light_count, 1);
    assert_eq!(queue(&engine).meshes()[0].mesh, "ship.obj");
}

#[test]
fn test_unknown_component_does_not_abort_load() {
    let dir = AssetDir::new("unknown_component");
    write_assets(&dir);

    let mut config = dir.config();
    config.start_scene = Some("Level".to_string());
    let engine = engine_with_goto(config).expect("engine");
    let scene = engine.scenes().active_scene().expect("active");
    let ship = scene.find_by_name("Ship").expect("ship");
    assert_eq!(
        scene.get(ship).map(GameObject::component_names),
        Some(vec!["MeshRenderer", "Light"])
    );
}

#[test]
fn test_self_destructing_child_is_swept() {
    let dir = AssetDir::new("self_destruct");
    write_assets(&dir);

    let mut config = dir.config();
    config.start_scene = Some("Level".to_string());
    let mut engine = engine_with_goto(config).expect("engine");
    assert_eq!(engine.run().expect("run"), 3);

    let scene = engine.scenes().active_scene().expect("active");
    assert_eq!(scene.object_count(), 1);
    assert!(scene.find_by_name("Flare").is_none());
    let ship = scene.find_by_name("Ship").expect("ship");
    assert!(scene.get(ship).is_some_and(|o| o.children().is_empty()));
}

#[test]
fn test_missing_start_scene_is_an_error() {
    let dir = AssetDir::new("missing_start");
    write_assets(&dir);

    let mut config = dir.config();
    config.start_scene = Some("Credits".to_string());
    let result = engine_with_goto(config);
    assert!(matches!(result, Err(EngineError::Scene(SceneError::UnknownScene(ref name))) if name == "Credits"));
}

#[test]
fn test_corrupt_roster_fails_load_and_leaves_no_scene() {
    let dir = AssetDir::new("corrupt");
    write_assets(&dir);
    let mut level = level_scene();
    level["GUIDs"] = json!([SHIP]);
    dir.write("scenes/level.json", &level);

    let mut engine = engine_with_goto(dir.config()).expect("engine");
    let err = engine.load_scene("Level");
    assert!(matches!(err, Err(EngineError::Scene(SceneError::NotInRoster { .. }))));
    assert!(engine.scenes().active_scene().is_none());

    // Frames still run without an active scene
    engine.frame().expect("empty frame");
    engine.shutdown();
    assert!(!engine.is_running());
}

#[test]
fn test_config_file_drives_engine() {
    let dir = AssetDir::new("config");
    write_assets(&dir);
    let config_path = dir.path().join("engine.toml");
    let mut config = dir.config();
    config.frame_limit = 5;
    config.save_to_file(&config_path).expect("save");

    let loaded = EngineConfig::load_from_file(&config_path).expect("load");
    assert_eq!(loaded, config);

    let mut engine = engine_with_goto(loaded).expect("engine");
    engine.run().expect("run");
    assert_eq!(engine.frame_count(), 5);
    assert_eq!(queue(&engine).frames_finished(), 5);
}
