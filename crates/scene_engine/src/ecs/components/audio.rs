//! Audio source and listener components
//!
//! A source that fails to start its clip disables itself; the failure is
//! logged and never reaches the scene traversal.

use crate::audio::{ListenerPose, PlayRequest, VoiceHandle};
use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use serde::{Deserialize, Serialize};

/// Playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AudioSourceSettings {
    /// Clip resource name
    pub clip: String,
    /// Linear volume
    pub volume: f32,
    /// Restart when finished
    pub looping: bool,
    /// Start playing whenever the component is enabled
    pub play_on_enable: bool,
    /// Position the voice at the owner instead of playing it flat
    pub spatial: bool,
}

impl Default for AudioSourceSettings {
    fn default() -> Self {
        Self {
            clip: String::new(),
            volume: 1.0,
            looping: false,
            play_on_enable: true,
            spatial: true,
        }
    }
}

/// Plays one clip through the audio service
#[derive(Debug, Default)]
pub struct AudioSource {
    /// Playback parameters
    pub settings: AudioSourceSettings,
    voice: Option<VoiceHandle>,
}

impl AudioSource {
    /// Source for `clip`
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            settings: AudioSourceSettings {
                clip: clip.into(),
                ..AudioSourceSettings::default()
            },
            voice: None,
        }
    }

    /// Builder: loop the clip
    pub fn looping(mut self, looping: bool) -> Self {
        self.settings.looping = looping;
        self
    }

    /// Current voice, if playing
    pub fn voice(&self) -> Option<VoiceHandle> {
        self.voice
    }

    /// Start the clip, restarting it if it is already playing
    pub fn play(&mut self, ctx: &mut ComponentContext<'_>) {
        self.stop(ctx);
        if self.settings.clip.is_empty() {
            return;
        }
        let position = if self.settings.spatial { Some(ctx.position()) } else { None };
        let request = PlayRequest {
            clip: self.settings.clip.clone(),
            volume: self.settings.volume,
            looping: self.settings.looping,
            position,
        };
        match ctx.services().audio.play(request) {
            Ok(voice) => self.voice = Some(voice),
            Err(e) => {
                log::warn!("AudioSource on {:?} failed to play '{}': {}", ctx.owner(), self.settings.clip, e);
                ctx.disable_self();
            }
        }
    }

    /// Stop the clip if playing
    pub fn stop(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(voice) = self.voice.take() {
            if let Err(e) = ctx.services().audio.stop(voice) {
                log::debug!("Stopping voice {:?}: {}", voice, e);
            }
        }
    }
}

impl Component for AudioSource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_enabled(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.settings.play_on_enable {
            self.play(ctx);
        }
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        // Drop the handle once a one-shot clip has finished
        if let Some(voice) = self.voice {
            if !ctx.services().audio.is_playing(voice) {
                self.voice = None;
            }
        }
    }

    fn on_disabled(&mut self, ctx: &mut ComponentContext<'_>) {
        self.stop(ctx);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        self.stop(ctx);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self {
            settings: self.settings.clone(),
            voice: None,
        })
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(&self.settings)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        self.settings = from_component_data(Self::TYPE_NAME, data)?;
        Ok(())
    }

    any_casts!();
}

impl ComponentType for AudioSource {
    const TYPE_NAME: &'static str = "AudioSource";
}

/// Feeds the owner's pose to the audio service every frame
#[derive(Debug, Clone, Default)]
pub struct AudioListener;

impl Component for AudioListener {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        let pose = ListenerPose {
            position: ctx.position(),
            forward: ctx.forward(),
            up: ctx.up(),
        };
        ctx.services().audio.set_listener(pose);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self)
    }

    fn serialize(&self) -> ComponentData {
        ComponentData::new()
    }

    fn deserialize(&mut self, _data: &ComponentData) -> Result<(), ComponentError> {
        Ok(())
    }

    any_casts!();
}

impl ComponentType for AudioListener {
    const TYPE_NAME: &'static str = "AudioListener";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudioBackend;
    use crate::ecs::{GameObject, World};
    use crate::render::RenderQueue;
    use crate::services::Services;

    fn services_missing(clip: &str) -> Services {
        Services::new(
            Box::new(RenderQueue::new()),
            Box::new(NullAudioBackend::new().with_missing_clip(clip)),
        )
    }

    #[test]
    fn test_failed_play_disables_source() {
        let mut world = World::new();
        let mut services = services_missing("ghost");
        let id = world.insert(GameObject::new("speaker"));
        world.init_object(id, &mut services);
        world.start_object(id, &mut services);

        world.add_component(id, AudioSource::new("ghost"), &mut services).expect("add");
        let object = world.get(id).expect("speaker");
        assert!(object.has_component::<AudioSource>());
        assert!(!object.is_component_enabled::<AudioSource>());
        assert_eq!(object.get_component::<AudioSource>().and_then(AudioSource::voice), None);
        assert_eq!(services.audio_as::<NullAudioBackend>().map(NullAudioBackend::playing_count), Some(0));

        // A stale handle survives the update only if on_update is skipped
        if let Some(source) = world.get_mut(id).and_then(|o| o.get_component_mut::<AudioSource>()) {
            source.voice = Some(VoiceHandle(99));
        }
        world.update(id, &mut services);
        assert_eq!(
            world.get(id).and_then(|o| o.get_component::<AudioSource>()).and_then(AudioSource::voice),
            Some(VoiceHandle(99))
        );
    }

    #[test]
    fn test_source_plays_while_enabled() {
        let mut world = World::new();
        let mut services = services_missing("ghost");
        let id = world.insert(GameObject::new("speaker").with_component(AudioSource::new("theme").looping(true)));
        world.init_object(id, &mut services);
        world.start_object(id, &mut services);
        assert!(services.audio_as::<NullAudioBackend>().is_some_and(|a| a.is_clip_playing("theme")));

        world.disable_component::<AudioSource>(id, &mut services).expect("disable");
        assert_eq!(services.audio_as::<NullAudioBackend>().map(NullAudioBackend::playing_count), Some(0));
        assert_eq!(world.get(id).and_then(|o| o.get_component::<AudioSource>()).and_then(AudioSource::voice), None);
    }
}
