//! World: arena of game objects
//!
//! Objects are addressed by generation-checked [`ObjectId`]s, so a handle to a
//! destroyed object resolves to `None` instead of dangling. Ownership is a
//! forest: each object is either a root (listed in insertion order) or owned by
//! exactly one parent; the parent/child links are ids, never references.
//!
//! Every operation that can run a component hook takes `&mut Services`. Hooks
//! may mark objects for destruction at any time; nothing is freed until
//! [`World::sweep_destroyed`] runs after the frame's traversal.

use super::component::{Component, ComponentContext, ComponentError, ComponentType};
use super::game_object::{ComponentKey, GameObject, ObjectState};
use crate::foundation::guid::Guid;
use crate::foundation::math::{Mat4, Vec3};
use crate::services::Services;
use slotmap::{new_key_type, SlotMap};
use std::collections::HashSet;
use thiserror::Error;

new_key_type! {
    /// Handle to a game object in a [`World`]
    pub struct ObjectId;
}

/// Errors from structural hierarchy operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The object does not exist
    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// The child is the parent itself or one of its ancestors
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Requested parent
        parent: ObjectId,
        /// Requested child
        child: ObjectId,
    },

    /// Index past the end of the child list
    #[error("Object {parent:?} has no child at index {index}")]
    IndexOutOfRange {
        /// Parent queried
        parent: ObjectId,
        /// Requested index
        index: usize,
    },

    /// The object is not a child of the given parent
    #[error("Object {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Parent queried
        parent: ObjectId,
        /// Object that was expected in its child list
        child: ObjectId,
    },
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Init,
    Update,
    Enabled,
    Disabled,
    Destroy,
}

/// Arena owning every game object of a scene
#[derive(Default)]
pub struct World {
    objects: SlotMap<ObjectId, GameObject>,
    roots: Vec<ObjectId>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects (roots and descendants)
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the world holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether the handle refers to a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Borrow an object
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Mutably borrow an object
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Root objects in insertion order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Iterate every live object
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.objects.iter()
    }

    /// Find an object by Guid
    pub fn find_by_guid(&self, guid: Guid) -> Option<ObjectId> {
        self.objects.iter().find(|(_, o)| o.guid() == guid).map(|(id, _)| id)
    }

    /// Find the first object with the given name, searching roots depth-first
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.roots.iter().find_map(|root| self.find_in_subtree(*root, name))
    }

    /// Find a direct child of `parent` by name
    pub fn find_child_by_name(&self, parent: ObjectId, name: &str) -> Option<ObjectId> {
        self.objects
            .get(parent)?
            .children
            .iter()
            .copied()
            .find(|child| self.objects.get(*child).is_some_and(|o| o.name() == name))
    }

    fn find_in_subtree(&self, id: ObjectId, name: &str) -> Option<ObjectId> {
        let object = self.objects.get(id)?;
        if object.name() == name {
            return Some(id);
        }
        object.children.iter().find_map(|child| self.find_in_subtree(*child, name))
    }

    /// Ids of `id` and all its descendants, pre-order
    pub fn subtree(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.get(current) {
                out.push(current);
                stack.extend(object.children.iter().rev().copied());
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Add a detached object as a new root. Its components stay uninitialized
    /// until [`World::init_object`] runs.
    pub fn insert(&mut self, mut object: GameObject) -> ObjectId {
        object.parent = None;
        object.children.clear();
        let id = self.objects.insert(object);
        self.roots.push(id);
        id
    }

    /// Make `child` the last child of `parent`, detaching it from its previous
    /// parent or from the root list.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<(), HierarchyError> {
        if !self.objects.contains_key(parent) {
            return Err(HierarchyError::UnknownObject(parent));
        }
        if !self.objects.contains_key(child) {
            return Err(HierarchyError::UnknownObject(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(HierarchyError::WouldCycle { parent, child });
        }

        self.unlink(child);
        self.objects[parent].children.push(child);
        self.objects[child].parent = Some(parent);
        // The child's world matrix now depends on a different chain
        self.force_dirty_subtree(child);
        Ok(())
    }

    /// Detach `child` from `parent`; it becomes a root. Returns the detached id.
    pub fn remove_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<ObjectId, HierarchyError> {
        let is_child = self
            .objects
            .get(parent)
            .ok_or(HierarchyError::UnknownObject(parent))?
            .children
            .contains(&child);
        if !is_child {
            return Err(HierarchyError::NotAChild { parent, child });
        }
        self.unlink(child);
        self.roots.push(child);
        self.force_dirty_subtree(child);
        Ok(child)
    }

    /// Detach the child at `index` of `parent`; it becomes a root.
    pub fn remove_child_at(&mut self, parent: ObjectId, index: usize) -> Result<ObjectId, HierarchyError> {
        let child = self
            .objects
            .get(parent)
            .ok_or(HierarchyError::UnknownObject(parent))?
            .child_at(index)
            .ok_or(HierarchyError::IndexOutOfRange { parent, index })?;
        self.remove_child(parent, child)
    }

    /// Move `child` under `parent`, or to the root list when `parent` is `None`
    pub fn reparent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> Result<(), HierarchyError> {
        match parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                let current = self.objects.get(child).ok_or(HierarchyError::UnknownObject(child))?.parent;
                if let Some(current) = current {
                    self.remove_child(current, child)?;
                }
                Ok(())
            }
        }
    }

    /// Child of `parent` at `index`
    pub fn child_at(&self, parent: ObjectId, index: usize) -> Option<ObjectId> {
        self.objects.get(parent)?.child_at(index)
    }

    fn is_ancestor_or_self(&self, candidate: ObjectId, mut id: ObjectId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.objects.get(id).and_then(|o| o.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Remove `id` from its parent's child list or from the root list
    fn unlink(&mut self, id: ObjectId) {
        match self.objects.get_mut(id).and_then(|o| o.parent.take()) {
            Some(parent) => {
                if let Some(p) = self.objects.get_mut(parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Mutable transform access that keeps descendants' caches honest
    pub fn transform_mut(&mut self, id: ObjectId) -> TransformMut<'_> {
        TransformMut { world: self, id }
    }

    /// Mark `id` dirty and walk down until an already-dirty child is found
    pub fn set_dirty(&mut self, id: ObjectId) {
        let walk = self.objects.get_mut(id).is_some_and(|o| o.transform.set_dirty());
        if walk {
            self.propagate_dirty(id);
        }
    }

    fn propagate_dirty(&mut self, id: ObjectId) {
        let mut stack: Vec<ObjectId> = self.objects.get(id).map(|o| o.children.clone()).unwrap_or_default();
        while let Some(child) = stack.pop() {
            if let Some(object) = self.objects.get_mut(child) {
                if object.transform.set_dirty() {
                    stack.extend(object.children.iter().copied());
                }
            }
        }
    }

    fn force_dirty_subtree(&mut self, id: ObjectId) {
        for node in self.subtree(id) {
            if let Some(object) = self.objects.get_mut(node) {
                object.transform.set_dirty();
            }
        }
    }

    /// World matrix, resolving stale ancestors first
    pub fn world_matrix(&mut self, id: ObjectId) -> Option<Mat4> {
        let (dirty, parent) = {
            let object = self.objects.get(id)?;
            (object.transform.is_world_dirty() || object.transform.is_local_dirty(), object.parent)
        };
        if !dirty {
            return self.objects.get_mut(id).map(|o| o.transform.world_matrix(None));
        }
        let parent_world = parent.and_then(|p| self.world_matrix(p));
        self.objects
            .get_mut(id)
            .map(|o| o.transform.world_matrix(parent_world.as_ref()))
    }

    /// World-space position
    pub fn position(&mut self, id: ObjectId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.objects.get(id).map(|o| o.transform.cached_position())
    }

    /// World-space forward axis (normalized)
    pub fn forward(&mut self, id: ObjectId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.objects.get(id).map(|o| o.transform.cached_forward())
    }

    /// World-space up axis (normalized)
    pub fn up(&mut self, id: ObjectId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.objects.get(id).map(|o| o.transform.cached_up())
    }

    /// World-space right axis, `up x forward`
    pub fn right(&mut self, id: ObjectId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.objects.get(id).map(|o| o.transform.cached_right())
    }

    /// Bring every world matrix in the subtree of `id` up to date
    pub fn refresh_world_matrices(&mut self, id: ObjectId) {
        for node in self.subtree(id) {
            self.world_matrix(node);
        }
    }

    // ------------------------------------------------------------------
    // Hook dispatch
    // ------------------------------------------------------------------

    /// Run one hook with the component checked out of its slot.
    ///
    /// Returns whether the component asked to be disabled. If it did and it is
    /// currently enabled, the disable transition runs here.
    fn run_hook(&mut self, id: ObjectId, key: ComponentKey, hook: Hook, services: &mut Services) -> bool {
        let Some(mut component) = self
            .objects
            .get_mut(id)
            .and_then(|o| o.slots.get_mut(key))
            .and_then(|slot| slot.component.take())
        else {
            return false;
        };

        let disable = {
            let mut ctx = ComponentContext::new(id, self, services);
            match hook {
                Hook::Init => component.on_init(&mut ctx),
                Hook::Update => component.on_update(&mut ctx),
                Hook::Enabled => component.on_enabled(&mut ctx),
                Hook::Disabled => component.on_disabled(&mut ctx),
                Hook::Destroy => component.on_destroy(&mut ctx),
            }
            ctx.disable_requested()
        };

        match self.objects.get_mut(id).and_then(|o| o.slots.get_mut(key)) {
            Some(slot) => slot.component = Some(component),
            None => {
                log::warn!("Component '{}' lost its slot during {:?}; dropping it", component.type_name(), hook);
                return false;
            }
        }

        if disable {
            log::debug!("Component requested self-disable during {:?}", hook);
            let _ = self.transition(id, key, false, services);
        }
        disable
    }

    fn init_slot(&mut self, id: ObjectId, key: ComponentKey, services: &mut Services) -> bool {
        let needs_init = self
            .objects
            .get_mut(id)
            .and_then(|o| o.slots.get_mut(key))
            .is_some_and(|slot| {
                let pending = !slot.initialized;
                slot.initialized = true;
                pending
            });
        needs_init && self.run_hook(id, key, Hook::Init, services)
    }

    /// Flip a slot's enabled flag and run the matching hook
    fn transition(
        &mut self,
        id: ObjectId,
        key: ComponentKey,
        enabled: bool,
        services: &mut Services,
    ) -> Result<(), ComponentError> {
        let object = self.objects.get_mut(id).ok_or(ComponentError::UnknownObject(id))?;
        let slot = object.slots.get_mut(key).ok_or(ComponentError::NotAttached("component"))?;
        if slot.component.is_none() {
            return Err(ComponentError::Busy(slot.type_name));
        }
        if slot.enabled == enabled {
            return Err(ComponentError::AlreadyInState { component: slot.type_name, enabled });
        }
        let initialized = slot.initialized;
        if enabled && !initialized {
            // Never enabled before on_init has run
            if self.init_slot(id, key, services) {
                return Ok(());
            }
        }
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.slots.get_mut(key)) else {
            return Ok(());
        };
        slot.enabled = enabled;
        log::trace!("Component '{}' on {:?} -> enabled={}", slot.type_name, id, enabled);
        self.run_hook(id, key, if enabled { Hook::Enabled } else { Hook::Disabled }, services);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Component operations
    // ------------------------------------------------------------------

    /// Attach a component.
    ///
    /// On a live object the component is initialized immediately and enabled
    /// if the object is enabled. On an object that has not started yet the
    /// hooks are deferred to [`World::init_object`].
    pub fn add_component<T: Component>(
        &mut self,
        id: ObjectId,
        component: T,
        services: &mut Services,
    ) -> Result<(), ComponentError> {
        self.add_boxed_component(id, Box::new(component), services)
    }

    /// Attach a boxed component, e.g. one built by the registry
    pub fn add_boxed_component(
        &mut self,
        id: ObjectId,
        component: Box<dyn Component>,
        services: &mut Services,
    ) -> Result<(), ComponentError> {
        let object = self.objects.get_mut(id).ok_or(ComponentError::UnknownObject(id))?;
        let state = object.state;
        let key = object.attach(component)?;

        match state {
            ObjectState::Constructed | ObjectState::Destroyed => {}
            ObjectState::Initialized | ObjectState::Disabled => {
                self.init_slot(id, key, services);
            }
            ObjectState::Enabled => {
                if !self.init_slot(id, key, services) {
                    let _ = self.transition(id, key, true, services);
                }
            }
        }
        Ok(())
    }

    /// Detach a component: disable if enabled, destroy, release
    pub fn remove_component<T: ComponentType>(
        &mut self,
        id: ObjectId,
        services: &mut Services,
    ) -> Result<(), ComponentError> {
        let object = self.objects.get(id).ok_or(ComponentError::UnknownObject(id))?;
        let key = object
            .key_of::<T>()
            .ok_or(ComponentError::NotAttached(T::TYPE_NAME))?;
        self.destroy_slot(id, key, services)
    }

    fn destroy_slot(&mut self, id: ObjectId, key: ComponentKey, services: &mut Services) -> Result<(), ComponentError> {
        let (enabled, initialized) = {
            let slot = self
                .objects
                .get(id)
                .and_then(|o| o.slots.get(key))
                .ok_or(ComponentError::NotAttached("component"))?;
            if slot.component.is_none() {
                return Err(ComponentError::Busy(slot.type_name));
            }
            (slot.enabled, slot.initialized)
        };

        if enabled {
            let _ = self.transition(id, key, false, services);
        }
        if initialized {
            self.run_hook(id, key, Hook::Destroy, services);
        }
        if let Some(slot) = self.objects.get_mut(id).and_then(|o| o.detach(key)) {
            log::trace!("Component '{}' removed from {:?}", slot.type_name, id);
        }
        Ok(())
    }

    /// Enable a component; fails if absent or already enabled
    pub fn enable_component<T: ComponentType>(&mut self, id: ObjectId, services: &mut Services) -> Result<(), ComponentError> {
        let key = self.component_key::<T>(id)?;
        self.transition(id, key, true, services)
    }

    /// Disable a component; fails if absent or already disabled
    pub fn disable_component<T: ComponentType>(&mut self, id: ObjectId, services: &mut Services) -> Result<(), ComponentError> {
        let key = self.component_key::<T>(id)?;
        self.transition(id, key, false, services)
    }

    fn component_key<T: ComponentType>(&self, id: ObjectId) -> Result<ComponentKey, ComponentError> {
        self.objects
            .get(id)
            .ok_or(ComponentError::UnknownObject(id))?
            .key_of::<T>()
            .ok_or(ComponentError::NotAttached(T::TYPE_NAME))
    }

    // ------------------------------------------------------------------
    // Object lifecycle
    // ------------------------------------------------------------------

    /// Run `on_init` for every not-yet-initialized component of `id` and its
    /// descendants, in attachment order, parents first.
    pub fn init_object(&mut self, id: ObjectId, services: &mut Services) {
        for node in self.subtree(id) {
            let keys = match self.objects.get(node) {
                Some(object) if object.state == ObjectState::Constructed => object.order.clone(),
                _ => continue,
            };
            for key in keys {
                self.init_slot(node, key, services);
            }
            if let Some(object) = self.objects.get_mut(node) {
                object.state = ObjectState::Initialized;
            }
        }
    }

    /// Enable every object in the subtree that is marked to start enabled
    pub fn start_object(&mut self, id: ObjectId, services: &mut Services) {
        for node in self.subtree(id) {
            let start = self
                .objects
                .get(node)
                .is_some_and(|o| o.state == ObjectState::Initialized && o.enable_on_start);
            if start {
                self.set_enabled(node, true, services);
            }
        }
    }

    /// Enable or disable one object.
    ///
    /// The object's own components follow it; children are left alone, use
    /// [`World::set_enabled_recursive`] for an explicit cascade. Returns
    /// `false` if the object is unknown, destroyed, or already in that state.
    pub fn set_enabled(&mut self, id: ObjectId, enabled: bool, services: &mut Services) -> bool {
        let state = match self.objects.get(id) {
            Some(object) => object.state,
            None => return false,
        };
        match (state, enabled) {
            (ObjectState::Destroyed, _) | (ObjectState::Enabled, true) | (ObjectState::Disabled, false) => {
                return false
            }
            (ObjectState::Constructed, true) => self.init_single(id, services),
            (ObjectState::Constructed | ObjectState::Initialized, false) => {
                self.init_single(id, services);
                if let Some(object) = self.objects.get_mut(id) {
                    object.state = ObjectState::Disabled;
                }
                return true;
            }
            _ => {}
        }

        if let Some(object) = self.objects.get_mut(id) {
            object.state = if enabled { ObjectState::Enabled } else { ObjectState::Disabled };
        }
        let keys = self.objects.get(id).map(|o| o.order.clone()).unwrap_or_default();
        for key in keys {
            let differs = self
                .objects
                .get(id)
                .and_then(|o| o.slots.get(key))
                .is_some_and(|slot| slot.enabled != enabled);
            if differs {
                let _ = self.transition(id, key, enabled, services);
            }
        }
        log::debug!("GameObject {:?} -> enabled={}", id, enabled);
        true
    }

    fn init_single(&mut self, id: ObjectId, services: &mut Services) {
        let keys = self.objects.get(id).map(|o| o.order.clone()).unwrap_or_default();
        for key in keys {
            self.init_slot(id, key, services);
        }
        if let Some(object) = self.objects.get_mut(id) {
            if object.state == ObjectState::Constructed {
                object.state = ObjectState::Initialized;
            }
        }
    }

    /// Enable or disable `id` and every descendant
    pub fn set_enabled_recursive(&mut self, id: ObjectId, enabled: bool, services: &mut Services) {
        for node in self.subtree(id) {
            self.set_enabled(node, enabled, services);
        }
    }

    /// Run `on_update` on every enabled component of `id` in attachment
    /// order, then recurse into children that are not pending destruction.
    pub fn update(&mut self, id: ObjectId, services: &mut Services) {
        let mut visited = HashSet::new();
        self.update_visit(id, &mut visited, services);
    }

    /// Update every root in its order at the start of the call, children
    /// recursively.
    ///
    /// Each object is updated at most once per call, even when hooks reparent
    /// objects mid-pass. Roots added during the pass wait for the next call.
    pub fn update_all(&mut self, services: &mut Services) {
        let mut visited = HashSet::new();
        let roots = self.roots.clone();
        for root in roots {
            if self.objects.get(root).is_some_and(|o| !o.pending_destroy) {
                self.update_visit(root, &mut visited, services);
            }
        }
    }

    fn update_visit(&mut self, id: ObjectId, visited: &mut HashSet<ObjectId>, services: &mut Services) {
        if !visited.insert(id) {
            return;
        }
        let keys = match self.objects.get(id) {
            Some(object) => object.order.clone(),
            None => return,
        };
        for key in keys {
            let ready = self
                .objects
                .get(id)
                .and_then(|o| o.slots.get(key))
                .is_some_and(|slot| slot.enabled && slot.initialized && slot.component.is_some());
            if ready {
                self.run_hook(id, key, Hook::Update, services);
            }
        }

        let children = self.objects.get(id).map(|o| o.children.clone()).unwrap_or_default();
        for child in children {
            if self.objects.get(child).is_some_and(|o| !o.pending_destroy) {
                self.update_visit(child, visited, services);
            }
        }
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Flag an object for destruction at the next sweep. Safe during
    /// iteration; returns `false` for unknown ids.
    pub fn mark_for_destroy(&mut self, id: ObjectId) -> bool {
        match self.objects.get_mut(id) {
            Some(object) => {
                object.pending_destroy = true;
                true
            }
            None => false,
        }
    }

    /// Whether the object is flagged for destruction
    pub fn is_pending_destroy(&self, id: ObjectId) -> bool {
        self.objects.get(id).is_some_and(|o| o.pending_destroy)
    }

    /// Free every flagged object (with its subtree), compacting the root list
    /// in place so survivors keep their relative order. Returns how many
    /// objects were freed, descendants included.
    ///
    /// Objects that destroy hooks insert are kept; they stay unstarted until
    /// [`World::start_pending`] runs.
    pub fn sweep_destroyed(&mut self, services: &mut Services) -> usize {
        let flagged: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, o)| o.pending_destroy)
            .map(|(id, _)| id)
            .collect();
        flagged.into_iter().map(|id| self.despawn(id, services)).sum()
    }

    /// Initialize and start every object still in the constructed state, e.g.
    /// ones inserted by hooks through [`ComponentContext::world_mut`].
    /// Returns how many objects were initialized.
    pub fn start_pending(&mut self, services: &mut Services) -> usize {
        let mut pending = Vec::new();
        for root in &self.roots {
            for id in self.subtree(*root) {
                let Some(object) = self.objects.get(id) else { continue };
                let parent_constructed = object
                    .parent
                    .and_then(|p| self.objects.get(p))
                    .is_some_and(|p| p.state == ObjectState::Constructed);
                if object.state == ObjectState::Constructed && !object.pending_destroy && !parent_constructed {
                    pending.push(id);
                }
            }
        }
        let mut started = 0;
        for id in pending {
            started += self
                .subtree(id)
                .iter()
                .filter(|node| self.objects.get(**node).is_some_and(|o| o.state == ObjectState::Constructed))
                .count();
            self.init_object(id, services);
            self.start_object(id, services);
        }
        started
    }

    /// Destroy an object immediately: its components are disabled and
    /// destroyed, then its children recursively, then it is unlinked and freed.
    /// Returns how many objects were freed; `0` for an unknown id.
    pub(crate) fn despawn(&mut self, id: ObjectId, services: &mut Services) -> usize {
        let keys = match self.objects.get(id) {
            Some(object) => object.order.clone(),
            None => return 0,
        };
        for key in keys {
            if let Err(e) = self.destroy_slot(id, key, services) {
                log::warn!("Destroying {:?}: {}", id, e);
            }
        }
        if let Some(object) = self.objects.get_mut(id) {
            object.state = ObjectState::Destroyed;
        }

        let children = self.objects.get(id).map(|o| o.children.clone()).unwrap_or_default();
        let mut freed: usize = children.into_iter().map(|child| self.despawn(child, services)).sum();

        self.unlink(id);
        if let Some(object) = self.objects.remove(id) {
            log::trace!("GameObject '{}' ({}) destroyed", object.name(), object.guid());
            freed += 1;
        }
        freed
    }

    /// Destroy every object eagerly, including objects that destroy hooks
    /// insert along the way
    pub(crate) fn clear(&mut self, services: &mut Services) {
        while !self.roots.is_empty() {
            let roots = self.roots.clone();
            for root in &roots {
                self.mark_for_destroy(*root);
            }
            for root in roots {
                self.despawn(root, services);
            }
        }
        if !self.objects.is_empty() {
            log::warn!("{} unreachable objects dropped during clear", self.objects.len());
            self.objects.clear();
        }
    }
}

/// Mutable view of one object's transform.
///
/// Every setter marks the object dirty and forwards the flag to descendants
/// that are not already dirty. Calls on a despawned object are no-ops.
pub struct TransformMut<'w> {
    world: &'w mut World,
    id: ObjectId,
}

impl TransformMut<'_> {
    fn apply(&mut self, f: impl FnOnce(&mut super::Transform) -> bool) -> &mut Self {
        let walk = self.world.objects.get_mut(self.id).is_some_and(|o| f(&mut o.transform));
        if walk {
            self.world.propagate_dirty(self.id);
        }
        self
    }

    /// Move by `delta` in local space
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.apply(|t| t.translate(delta))
    }

    /// Move along X
    pub fn translate_x(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.translate_x(delta))
    }

    /// Move along Y
    pub fn translate_y(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.translate_y(delta))
    }

    /// Move along Z
    pub fn translate_z(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.translate_z(delta))
    }

    /// Add Euler angles (radians)
    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.apply(|t| t.rotate(delta))
    }

    /// Rotate around X (radians)
    pub fn rotate_x(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.rotate_x(delta))
    }

    /// Rotate around Y (radians)
    pub fn rotate_y(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.rotate_y(delta))
    }

    /// Rotate around Z (radians)
    pub fn rotate_z(&mut self, delta: f32) -> &mut Self {
        self.apply(|t| t.rotate_z(delta))
    }

    /// Replace the local position
    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.apply(|t| t.set_position(position))
    }

    /// Replace the local rotation (radians)
    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.apply(|t| t.set_rotation(rotation))
    }

    /// Replace the local rotation, given in degrees
    pub fn set_rotation_degrees(&mut self, degrees: Vec3) -> &mut Self {
        self.apply(|t| t.set_rotation_degrees(degrees))
    }

    /// Replace the local scale
    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.apply(|t| t.set_scale(scale))
    }

    /// Rotate so the forward (+Z) axis points at `target`, keeping world up
    /// as +Y. Only exact for root objects; for children the target is taken
    /// in the parent's space.
    pub fn look_at(&mut self, target: Vec3) -> &mut Self {
        let position = self
            .world
            .objects
            .get(self.id)
            .map_or_else(Vec3::zeros, |o| o.transform.local_position());
        let direction = target - position;
        if direction.norm_squared() <= f32::EPSILON {
            return self;
        }
        let direction = direction.normalize();
        let yaw = direction.x.atan2(direction.z);
        let pitch = -direction.y.clamp(-1.0, 1.0).asin();
        self.set_rotation(Vec3::new(pitch, yaw, 0.0))
    }

    /// Local state, read without forcing a recompute
    pub fn local(&self) -> Option<&super::Transform> {
        self.world.objects.get(self.id).map(|o| &o.transform)
    }
}
