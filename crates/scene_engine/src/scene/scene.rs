//! Scene: an owned forest of game objects driven once per frame

use super::description::{parse_object, parse_roster, required_guid, required_str};
use super::prefab::Prefab;
use super::SceneError;
use crate::ecs::{ComponentRegistry, GameObject, ObjectId, World};
use crate::foundation::guid::Guid;
use crate::foundation::time::Stopwatch;
use crate::services::Services;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-frame scene statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneStats {
    /// Live objects, descendants included
    pub object_count: usize,
    /// Root objects
    pub root_count: usize,
    /// Objects freed by the last update's sweep
    pub destroyed_last_frame: usize,
    /// Time spent in the last update (milliseconds)
    pub update_time_ms: f32,
    /// Time spent in the last render pass (milliseconds)
    pub render_time_ms: f32,
}

/// A loaded scene
pub struct Scene {
    name: String,
    guid: Guid,
    world: World,
    prefabs: BTreeMap<String, Prefab>,
    initialized: bool,
    stats: SceneStats,
}

impl Scene {
    /// Empty scene with a fresh Guid
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_guid(Guid::new(), name)
    }

    /// Empty scene with a known Guid
    pub fn with_guid(guid: Guid, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid,
            world: World::new(),
            prefabs: BTreeMap::new(),
            initialized: false,
            stats: SceneStats::default(),
        }
    }

    /// Build a scene from its description.
    ///
    /// The scene `Name` and `GUID`, every object's `GUID` and `Name`, and
    /// roster membership are required; any failure there aborts the whole
    /// parse and nothing is kept. Objects whose `Parent` resolves within the
    /// description are attached under it; everything else stays at the root.
    pub fn parse(description: &Value, registry: &ComponentRegistry) -> Result<Self, SceneError> {
        let name = required_str(description, "Name", "Scene").map_err(log_fatal)?;
        let guid = required_guid(description, "GUID", &format!("Scene {}", name)).map_err(log_fatal)?;
        let roster = parse_roster(description, name).map_err(log_fatal)?;

        let entries: &[Value] = match description.get("GameObjects") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(log_fatal(SceneError::MissingField {
                    context: format!("Scene {}", name),
                    field: "GameObjects",
                }))
            }
            None => &[],
        };

        // Parse the whole batch before touching the world
        let mut parsed = Vec::with_capacity(entries.len());
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            let object = parse_object(entry, registry, &roster, name).map_err(log_fatal)?;
            let object_guid = object.object.guid();
            if !seen.insert(object_guid) {
                return Err(log_fatal(SceneError::DuplicateGuid(object_guid)));
            }
            parsed.push(object);
        }

        let mut scene = Self::with_guid(guid, name);
        let mut ids = HashMap::with_capacity(parsed.len());
        let mut links = Vec::new();
        for entry in parsed {
            let object_guid = entry.object.guid();
            let id = scene.world.insert(entry.object);
            ids.insert(object_guid, id);
            if let Some(parent) = entry.parent {
                links.push((id, parent));
            }
        }

        for (child, parent_guid) in links {
            let Some(parent) = ids.get(&parent_guid).copied() else {
                log::warn!("Scene {}: Parent {} not found; object stays at root", name, parent_guid);
                continue;
            };
            if let Err(e) = scene.world.add_child(parent, child) {
                log::warn!("Scene {}: {}; object stays at root", name, e);
            }
        }

        if let Some(prefabs) = description.get("Prefabs").and_then(Value::as_array) {
            for entry in prefabs {
                match Prefab::parse(entry, registry) {
                    Ok(prefab) => scene.add_prefab(prefab),
                    Err(e) => log::warn!("Scene {}: skipping prefab: {}", name, e),
                }
            }
        }

        scene.refresh_stats();
        log::debug!(
            "Parsed scene '{}' ({} objects, {} roots, {} prefabs)",
            scene.name,
            scene.world.len(),
            scene.world.roots().len(),
            scene.prefabs.len()
        );
        Ok(scene)
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scene Guid
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Whether [`Scene::init`] has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The object arena
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable object arena
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Root objects in order
    pub fn root_objects(&self) -> &[ObjectId] {
        self.world.roots()
    }

    /// Live objects, descendants included
    pub fn object_count(&self) -> usize {
        self.world.len()
    }

    /// Statistics from the last frame
    pub fn stats(&self) -> &SceneStats {
        &self.stats
    }

    /// Look up an object by Guid
    pub fn find_by_guid(&self, guid: Guid) -> Option<ObjectId> {
        self.world.find_by_guid(guid)
    }

    /// Look up the first object with `name`
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.world.find_by_name(name)
    }

    /// Borrow an object
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.world.get(id)
    }

    /// Register a prefab, replacing any with the same name
    pub fn add_prefab(&mut self, prefab: Prefab) {
        if self.prefabs.insert(prefab.name().to_string(), prefab).is_some() {
            log::warn!("Scene {}: prefab replaced", self.name);
        }
    }

    /// Registered prefab names
    pub fn prefab_names(&self) -> impl Iterator<Item = &str> {
        self.prefabs.keys().map(String::as_str)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Run `on_init` across every root (recursively), then enable the objects
    /// that start enabled
    pub fn init(&mut self, services: &mut Services) {
        let roots = self.world.roots().to_vec();
        for root in &roots {
            self.world.init_object(*root, services);
        }
        for root in &roots {
            self.world.start_object(*root, services);
        }
        self.initialized = true;
        self.refresh_stats();
        log::debug!("Scene '{}' initialized", self.name);
    }

    /// Update every live root (children recursively), then free whatever was
    /// marked for destruction during the pass. Objects that hooks created
    /// during the frame are initialized and started last.
    pub fn update(&mut self, services: &mut Services) {
        let timer = Stopwatch::start_new();
        self.world.update_all(services);
        self.stats.destroyed_last_frame = self.world.sweep_destroyed(services);
        if self.initialized {
            let started = self.world.start_pending(services);
            if started > 0 {
                log::trace!("Scene {}: started {} objects created this frame", self.name, started);
            }
        }
        self.refresh_stats();
        self.stats.update_time_ms = timer.elapsed_millis();
    }

    /// Bring every world matrix up to date
    pub fn render(&mut self, _services: &mut Services) {
        let timer = Stopwatch::start_new();
        let roots = self.world.roots().to_vec();
        for root in roots {
            self.world.refresh_world_matrices(root);
        }
        self.stats.render_time_ms = timer.elapsed_millis();
    }

    /// Destroy every object now
    pub fn unload(&mut self, services: &mut Services) {
        let count = self.world.len();
        self.world.clear(services);
        self.initialized = false;
        self.refresh_stats();
        log::debug!("Scene '{}' unloaded ({} objects freed)", self.name, count);
    }

    // ------------------------------------------------------------------
    // Runtime creation
    // ------------------------------------------------------------------

    /// Add an object at the root. In a running scene it is initialized and
    /// started immediately.
    pub fn spawn_object(&mut self, object: GameObject, services: &mut Services) -> ObjectId {
        let id = self.world.insert(object);
        self.start_if_running(id, services);
        id
    }

    /// Add an empty object named `name`
    pub fn spawn(&mut self, name: impl Into<String>, services: &mut Services) -> ObjectId {
        self.spawn_object(GameObject::new(name), services)
    }

    /// Create a deep copy of a prefab with fresh Guids
    pub fn instantiate_prefab(&mut self, name: &str, services: &mut Services) -> Result<ObjectId, SceneError> {
        let prefab = self
            .prefabs
            .get(name)
            .ok_or_else(|| SceneError::UnknownPrefab(name.to_string()))?;
        let id = prefab.build(&mut self.world);
        self.start_if_running(id, services);
        log::trace!("Scene {}: instantiated prefab '{}'", self.name, name);
        Ok(id)
    }

    fn start_if_running(&mut self, id: ObjectId, services: &mut Services) {
        if self.initialized {
            self.world.init_object(id, services);
            self.world.start_object(id, services);
        }
        self.refresh_stats();
    }

    fn refresh_stats(&mut self) {
        self.stats.object_count = self.world.len();
        self.stats.root_count = self.world.roots().len();
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Encode the scene in the description format accepted by
    /// [`Scene::parse`]. Objects are written parents first.
    pub fn serialize(&self) -> Value {
        let mut guids = Vec::with_capacity(self.world.len());
        let mut objects = Vec::with_capacity(self.world.len());
        for root in self.world.roots() {
            for id in self.world.subtree(*root) {
                let Some(object) = self.world.get(id) else {
                    continue;
                };
                let parent = object.parent().and_then(|p| self.world.get(p)).map(GameObject::guid);
                guids.push(Value::from(object.guid().to_string()));
                objects.push(object.serialize(parent));
            }
        }
        let prefabs: Vec<Value> = self.prefabs.values().map(Prefab::serialize).collect();

        json!({
            "Name": self.name,
            "GUID": self.guid.to_string(),
            "GUIDs": guids,
            "GameObjects": objects,
            "Prefabs": prefabs,
        })
    }
}

fn log_fatal(error: SceneError) -> SceneError {
    log::error!("Scene parse failed: {}", error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{journal, Probe, ProbeAction, Spin};
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    const SCENE: &str = "0b6a4a3e-5d1c-4a8e-9f0e-3b2c1d0e9f8a";
    const A: &str = "1a1a1a1a-0000-4000-8000-000000000001";
    const B: &str = "2b2b2b2b-0000-4000-8000-000000000002";
    const C: &str = "3c3c3c3c-0000-4000-8000-000000000003";

    fn guid(text: &str) -> Guid {
        Guid::parse(text).expect("guid")
    }

    fn two_objects() -> Value {
        json!({
            "Name": "Test", "GUID": SCENE,
            "GUIDs": [A, B],
            "GameObjects": [
                { "GUID": A, "Name": "A", "Transform": { "Position": [1, 0, 0] } },
                { "GUID": B, "Name": "B", "Parent": A, "Transform": { "Position": [0, 2, 0] },
                  "Components": [{ "Name": "Spin", "Speed": [0, 1, 0] }] }
            ]
        })
    }

    #[test]
    fn test_parent_in_batch_is_attached() {
        let registry = ComponentRegistry::with_builtin();
        let scene = Scene::parse(&two_objects(), &registry).expect("scene");
        let a = scene.find_by_guid(guid(A)).expect("A");
        let b = scene.find_by_guid(guid(B)).expect("B");
        assert_eq!(scene.root_objects(), &[a]);
        assert_eq!(scene.get(a).map(|o| o.children().to_vec()), Some(vec![b]));
        assert_eq!(scene.name(), "Test");
        assert_eq!(scene.guid(), guid(SCENE));
    }

    #[test]
    fn test_child_listed_before_parent_still_attaches() {
        let registry = ComponentRegistry::with_builtin();
        let desc = json!({
            "Name": "Order", "GUID": SCENE, "GUIDs": [A, B],
            "GameObjects": [
                { "GUID": B, "Name": "B", "Parent": A },
                { "GUID": A, "Name": "A" }
            ]
        });
        let scene = Scene::parse(&desc, &registry).expect("scene");
        let a = scene.find_by_guid(guid(A)).expect("A");
        assert_eq!(scene.root_objects(), &[a]);
        assert_eq!(scene.get(a).map(|o| o.children().len()), Some(1));
    }

    #[test]
    fn test_unresolved_parent_stays_root() {
        let registry = ComponentRegistry::with_builtin();
        let desc = json!({
            "Name": "Orphans", "GUID": SCENE, "GUIDs": [A],
            "GameObjects": [{ "GUID": A, "Name": "A", "Parent": C }]
        });
        let scene = Scene::parse(&desc, &registry).expect("scene");
        assert_eq!(scene.root_objects().len(), 1);
    }

    #[test]
    fn test_parent_cycle_is_broken() {
        let registry = ComponentRegistry::with_builtin();
        let desc = json!({
            "Name": "Loop", "GUID": SCENE, "GUIDs": [A, B],
            "GameObjects": [
                { "GUID": A, "Name": "A", "Parent": B },
                { "GUID": B, "Name": "B", "Parent": A }
            ]
        });
        let scene = Scene::parse(&desc, &registry).expect("scene");
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.root_objects().len(), 1);
    }

    #[test]
    fn test_roster_violation_keeps_nothing() {
        let registry = ComponentRegistry::with_builtin();
        let mut desc = two_objects();
        desc["GUIDs"] = json!([A]);
        let err = Scene::parse(&desc, &registry).err();
        assert!(matches!(err, Some(SceneError::NotInRoster { ref name, .. }) if name == "B"));
    }

    #[test]
    fn test_malformed_roster_entry_is_fatal() {
        let registry = ComponentRegistry::with_builtin();
        let mut desc = two_objects();
        desc["GUIDs"] = json!([A, B, "not-a-guid"]);
        assert!(matches!(
            Scene::parse(&desc, &registry),
            Err(SceneError::InvalidGuid { ref value, .. }) if value.contains("not-a-guid")
        ));

        desc["GUIDs"] = json!([A, 7]);
        assert!(matches!(Scene::parse(&desc, &registry), Err(SceneError::InvalidGuid { .. })));
    }

    #[test]
    fn test_scene_identity_is_fatal() {
        let registry = ComponentRegistry::with_builtin();
        let mut no_name = two_objects();
        no_name.as_object_mut().expect("object").remove("Name");
        assert!(matches!(Scene::parse(&no_name, &registry), Err(SceneError::MissingField { field: "Name", .. })));

        let mut no_guid = two_objects();
        no_guid.as_object_mut().expect("object").remove("GUID");
        assert!(matches!(Scene::parse(&no_guid, &registry), Err(SceneError::MissingField { field: "GUID", .. })));

        let mut duplicate = two_objects();
        duplicate["GameObjects"][1]["GUID"] = json!(A);
        duplicate["GameObjects"][1]["Parent"] = Value::Null;
        assert!(matches!(Scene::parse(&duplicate, &registry), Err(SceneError::DuplicateGuid(_))));
    }

    #[test]
    fn test_world_positions_after_init() {
        let registry = ComponentRegistry::with_builtin();
        let mut services = Services::headless();
        let mut scene = Scene::parse(&two_objects(), &registry).expect("scene");
        scene.init(&mut services);
        let b = scene.find_by_name("B").expect("B");
        scene.render(&mut services);
        assert_relative_eq!(scene.world_mut().position(b).expect("B"), Vec3::new(1.0, 2.0, 0.0));
        assert!(scene.get(b).is_some_and(|o| o.is_component_enabled::<Spin>()));
    }

    #[test]
    fn test_destroy_during_update_is_deferred() {
        let mut services = Services::headless();
        let log = journal();
        let mut scene = Scene::new("Frame");
        scene.init(&mut services);

        let first = scene.spawn("first", &mut services);
        let victim = scene.spawn("victim", &mut services);
        let last = scene.spawn("last", &mut services);
        let world = scene.world_mut();
        let killer = Probe::<0>::new("first", &log).on_update(ProbeAction::Destroy(victim));
        world.add_component(first, killer, &mut services).expect("probe");
        world.add_component(victim, Probe::<0>::new("victim", &log), &mut services).expect("probe");
        let suicidal = Probe::<0>::new("last", &log).on_update(ProbeAction::DestroyOwner);
        world.add_component(last, suicidal, &mut services).expect("probe");
        log.borrow_mut().clear();

        scene.update(&mut services);
        assert_eq!(
            *log.borrow(),
            vec!["first:update", "last:update", "victim:disabled", "victim:destroy", "last:disabled", "last:destroy"]
        );
        assert_eq!(scene.root_objects(), &[first]);
        assert_eq!(scene.stats().destroyed_last_frame, 2);
        assert_eq!(scene.stats().object_count, 1);
    }

    #[test]
    fn test_reparenting_during_update_keeps_one_update_per_object() {
        let mut services = Services::headless();
        let log = journal();
        let mut scene = Scene::new("Adoption");
        scene.init(&mut services);

        let a = scene.spawn("a", &mut services);
        let b = scene.spawn("b", &mut services);
        let world = scene.world_mut();
        world.add_component(a, Probe::<0>::new("a", &log).on_update(ProbeAction::Adopt(b)), &mut services).expect("a");
        world.add_component(b, Probe::<0>::new("b", &log), &mut services).expect("b");
        log.borrow_mut().clear();

        scene.update(&mut services);
        assert_eq!(*log.borrow(), vec!["a:update", "b:update"]);
        assert_eq!(scene.root_objects(), &[a]);
        assert_eq!(scene.stats().root_count, 1);
    }

    #[test]
    fn test_unload_is_eager() {
        let registry = ComponentRegistry::with_builtin();
        let mut services = Services::headless();
        let mut scene = Scene::parse(&two_objects(), &registry).expect("scene");
        scene.init(&mut services);
        scene.unload(&mut services);
        assert_eq!(scene.object_count(), 0);
        assert!(scene.root_objects().is_empty());
        assert!(!scene.is_initialized());
    }

    #[test]
    fn test_serialize_round_trips_structure() {
        let registry = ComponentRegistry::with_builtin();
        let mut scene = Scene::parse(&two_objects(), &registry).expect("scene");
        scene.add_prefab(Prefab::new("pickup").with_component(Spin::default()));

        let reparsed = Scene::parse(&scene.serialize(), &registry).expect("reparse");
        assert_eq!(reparsed.object_count(), 2);
        assert_eq!(reparsed.root_objects().len(), 1);
        assert_eq!(reparsed.prefab_names().collect::<Vec<_>>(), vec!["pickup"]);
        assert_eq!(reparsed.serialize(), scene.serialize());
    }

    #[test]
    fn test_instantiate_prefab_in_running_scene() {
        let mut services = Services::headless();
        let log = journal();
        let mut scene = Scene::new("Runtime");
        scene.add_prefab(Prefab::new("probe").with_component(Probe::<0>::new("p", &log)));
        scene.init(&mut services);

        let first = scene.instantiate_prefab("probe", &mut services).expect("first");
        let second = scene.instantiate_prefab("probe", &mut services).expect("second");
        assert_ne!(first, second);
        assert_eq!(*log.borrow(), vec!["p:init", "p:enabled", "p:init", "p:enabled"]);
        assert!(matches!(
            scene.instantiate_prefab("nothing", &mut services),
            Err(SceneError::UnknownPrefab(_))
        ));
    }
}
