//! Journaling test double
//!
//! `Probe` records every hook it receives into a shared [`Journal`] and can be
//! told to misbehave (disable itself, destroy objects) at chosen points.
//! The const parameter makes distinct types so several probes can sit on
//! one object.

use crate::ecs::component::{Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::ecs::ObjectId;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared hook log, entries read `"<label>:<hook>"`
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Something a probe does during `on_update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAction {
    /// Flag the owner for destruction
    DestroyOwner,
    /// Flag another object for destruction
    Destroy(ObjectId),
    /// Disable this component
    DisableSelf,
    /// Request a switch to the scene named by the label
    RequestScene,
    /// Make another object a child of the owner
    Adopt(ObjectId),
}

/// Component recording its lifecycle
#[derive(Debug, Clone, Default)]
pub struct Probe<const SLOT: usize = 0> {
    label: String,
    journal: Journal,
    disable_on_init: bool,
    on_update: Option<ProbeAction>,
    updates: u32,
}

impl<const SLOT: usize> Probe<SLOT> {
    /// Probe writing into `journal` under `label`
    pub fn new(label: impl Into<String>, journal: &Journal) -> Self {
        Self {
            label: label.into(),
            journal: Rc::clone(journal),
            ..Self::default()
        }
    }

    /// Builder: request disable from `on_init`
    pub fn disabling_on_init(mut self) -> Self {
        self.disable_on_init = true;
        self
    }

    /// Builder: perform `action` on every update
    pub fn on_update(mut self, action: ProbeAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Label used in journal entries
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of `on_update` calls received
    pub fn updates(&self) -> u32 {
        self.updates
    }

    fn record(&self, hook: &str) {
        self.journal.borrow_mut().push(format!("{}:{}", self.label, hook));
    }
}

/// Create an empty journal
pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

impl<const SLOT: usize> Component for Probe<SLOT> {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) {
        self.record("init");
        if self.disable_on_init {
            ctx.disable_self();
        }
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.updates += 1;
        self.record("update");
        match self.on_update {
            Some(ProbeAction::DestroyOwner) => ctx.destroy_owner(),
            Some(ProbeAction::Destroy(target)) => {
                ctx.world_mut().mark_for_destroy(target);
            }
            Some(ProbeAction::DisableSelf) => ctx.disable_self(),
            Some(ProbeAction::RequestScene) => ctx.services().request_scene_change(self.label.clone()),
            Some(ProbeAction::Adopt(child)) => {
                let owner = ctx.owner();
                if let Err(e) = ctx.world_mut().add_child(owner, child) {
                    log::debug!("Probe '{}' could not adopt: {}", self.label, e);
                }
            }
            None => {}
        }
    }

    fn on_enabled(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("enabled");
    }

    fn on_disabled(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("disabled");
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("destroy");
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self {
            label: self.label.clone(),
            journal: Rc::clone(&self.journal),
            disable_on_init: self.disable_on_init,
            on_update: self.on_update,
            updates: 0,
        })
    }

    fn serialize(&self) -> ComponentData {
        let mut data = ComponentData::new();
        data.insert("Label".to_string(), Value::from(self.label.clone()));
        data
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        match data.get("Label") {
            None => Ok(()),
            Some(Value::String(label)) => {
                self.label = label.clone();
                Ok(())
            }
            Some(other) => Err(ComponentError::InvalidData {
                component: Self::TYPE_NAME,
                reason: format!("Label must be a string, got {}", other),
            }),
        }
    }

    any_casts!();
}

impl<const SLOT: usize> ComponentType for Probe<SLOT> {
    const TYPE_NAME: &'static str = match SLOT {
        0 => "Probe",
        1 => "Probe1",
        2 => "Probe2",
        _ => "ProbeN",
    };
}
