//! Update order, enable cascades and recursive destruction

use crate::ecs::components::{journal, Journal, Probe, ProbeAction, SelfDestruct, Spin};
use crate::ecs::{GameObject, ObjectId, World};
use crate::foundation::math::Vec3;
use crate::services::Services;
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    /// parent(a, b) -> child(c)
    fn family(world: &mut World, services: &mut Services, log: &Journal) -> (ObjectId, ObjectId) {
        let parent = world.insert(
            GameObject::new("parent")
                .with_component(Probe::<0>::new("a", log))
                .with_component(Probe::<1>::new("b", log)),
        );
        let child = world.insert(GameObject::new("child").with_component(Probe::<0>::new("c", log)));
        world.add_child(parent, child).expect("child");
        world.init_object(parent, services);
        world.start_object(parent, services);
        log.borrow_mut().clear();
        (parent, child)
    }

    #[test]
    fn test_parent_components_update_before_children() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let (parent, _) = family(&mut world, &mut services, &log);

        world.update(parent, &mut services);
        assert_eq!(*log.borrow(), vec!["a:update", "b:update", "c:update"]);
    }

    #[test]
    fn test_init_runs_parents_first() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let parent = world.insert(GameObject::new("parent").with_component(Probe::<0>::new("p", &log)));
        let child = world.insert(GameObject::new("child").with_component(Probe::<0>::new("c", &log)));
        world.add_child(parent, child).expect("child");
        world.init_object(parent, &mut services);
        world.start_object(parent, &mut services);
        assert_eq!(*log.borrow(), vec!["p:init", "c:init", "p:enabled", "c:enabled"]);
    }

    #[test]
    fn test_disabling_parent_does_not_cascade() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let (parent, child) = family(&mut world, &mut services, &log);

        world.set_enabled(parent, false, &mut services);
        assert_eq!(*log.borrow(), vec!["a:disabled", "b:disabled"]);
        assert!(world.get(child).is_some_and(GameObject::is_enabled));

        log.borrow_mut().clear();
        world.update(parent, &mut services);
        assert_eq!(*log.borrow(), vec!["c:update"]);
    }

    #[test]
    fn test_recursive_enable_is_explicit() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let (parent, child) = family(&mut world, &mut services, &log);

        world.set_enabled_recursive(parent, false, &mut services);
        assert_eq!(*log.borrow(), vec!["a:disabled", "b:disabled", "c:disabled"]);
        assert!(world.get(child).is_some_and(|o| !o.is_enabled()));

        log.borrow_mut().clear();
        world.update(parent, &mut services);
        assert!(log.borrow().is_empty());

        world.set_enabled_recursive(parent, true, &mut services);
        assert_eq!(*log.borrow(), vec!["a:enabled", "b:enabled", "c:enabled"]);
    }

    #[test]
    fn test_destroying_parent_destroys_children_after_own_components() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let (parent, child) = family(&mut world, &mut services, &log);

        assert!(world.mark_for_destroy(parent));
        assert!(world.contains(parent));
        assert_eq!(world.sweep_destroyed(&mut services), 2);
        assert_eq!(
            *log.borrow(),
            vec!["a:disabled", "a:destroy", "b:disabled", "b:destroy", "c:disabled", "c:destroy"]
        );
        assert!(!world.contains(parent));
        assert!(!world.contains(child));
        assert!(world.roots().is_empty());
    }

    #[test]
    fn test_destroying_child_unlinks_it() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let (parent, child) = family(&mut world, &mut services, &log);

        world.mark_for_destroy(child);
        world.sweep_destroyed(&mut services);
        assert!(world.get(parent).is_some_and(|o| o.children().is_empty()));
        assert_eq!(world.roots(), &[parent]);
    }

    #[test]
    fn test_spin_rotates_with_delta_time() {
        let mut world = World::new();
        let mut services = Services::headless();
        let id = world.insert(GameObject::new("top").with_component(Spin::new(Vec3::new(0.0, 2.0, 0.0))));
        world.init_object(id, &mut services);
        world.start_object(id, &mut services);

        services.time.advance(0.5);
        world.update(id, &mut services);
        assert_relative_eq!(world.get(id).expect("top").transform().rot_y(), 1.0);
    }

    #[test]
    fn test_self_destruct_marks_owner_once_expired() {
        let mut world = World::new();
        let mut services = Services::headless();
        let id = world.insert(GameObject::new("flare").with_component(SelfDestruct::new(1.0)));
        world.init_object(id, &mut services);
        world.start_object(id, &mut services);

        services.time.advance(0.6);
        world.update(id, &mut services);
        assert!(!world.is_pending_destroy(id));
        world.update(id, &mut services);
        assert!(world.is_pending_destroy(id));
        world.sweep_destroyed(&mut services);
        assert!(world.is_empty());
    }

    fn started(world: &mut World, services: &mut Services, object: GameObject) -> ObjectId {
        let id = world.insert(object);
        world.init_object(id, services);
        world.start_object(id, services);
        id
    }

    #[test]
    fn test_root_adopted_mid_pass_updates_once() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let a = started(&mut world, &mut services, GameObject::new("a"));
        let b = started(&mut world, &mut services, GameObject::new("b").with_component(Probe::<0>::new("b", &log)));
        let adopter = Probe::<0>::new("a", &log).on_update(ProbeAction::Adopt(b));
        world.add_component(a, adopter, &mut services).expect("adopter");
        log.borrow_mut().clear();

        world.update_all(&mut services);
        assert_eq!(*log.borrow(), vec!["a:update", "b:update"]);
        assert_eq!(world.roots(), &[a]);
        assert_eq!(world.get(b).and_then(GameObject::parent), Some(a));

        log.borrow_mut().clear();
        world.update_all(&mut services);
        assert_eq!(*log.borrow(), vec!["a:update", "b:update"]);
    }

    #[test]
    fn test_already_updated_root_is_not_revisited_by_new_parent() {
        let mut world = World::new();
        let mut services = Services::headless();
        let log = journal();
        let b = started(&mut world, &mut services, GameObject::new("b").with_component(Probe::<0>::new("b", &log)));
        let c = started(&mut world, &mut services, GameObject::new("c"));
        let adopter = Probe::<0>::new("c", &log).on_update(ProbeAction::Adopt(b));
        world.add_component(c, adopter, &mut services).expect("adopter");
        log.borrow_mut().clear();

        world.update_all(&mut services);
        assert_eq!(*log.borrow(), vec!["b:update", "c:update"]);
        assert_eq!(world.roots(), &[c]);
    }
}
