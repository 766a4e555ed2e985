//! Audio service contract
//!
//! Decoding and streaming live behind [`AudioBackend`]. The scene layer only
//! starts and stops clips and reports the listener pose.

use crate::foundation::math::Vec3;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Handle to a playing voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u32);

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// The clip could not be found or opened
    #[error("Clip not available: {0}")]
    ClipUnavailable(String),

    /// The voice handle does not refer to a playing voice
    #[error("Invalid voice handle: {0:?}")]
    InvalidVoice(VoiceHandle),

    /// Backend-specific failure
    #[error("Audio backend error: {0}")]
    Backend(String),
}

/// Playback request
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    /// Clip resource name
    pub clip: String,
    /// Linear volume
    pub volume: f32,
    /// Restart when finished
    pub looping: bool,
    /// World position for spatialisation, `None` for 2D playback
    pub position: Option<Vec3>,
}

/// Listener pose used for spatial audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPose {
    /// World position
    pub position: Vec3,
    /// World forward direction
    pub forward: Vec3,
    /// World up direction
    pub up: Vec3,
}

/// Audio service consumed by audio components
pub trait AudioBackend {
    /// Start playing a clip
    fn play(&mut self, request: PlayRequest) -> Result<VoiceHandle, AudioError>;

    /// Stop a voice
    fn stop(&mut self, voice: VoiceHandle) -> Result<(), AudioError>;

    /// Whether a voice is still playing
    fn is_playing(&self, voice: VoiceHandle) -> bool;

    /// Update the listener pose
    fn set_listener(&mut self, pose: ListenerPose);

    /// Downcast support for callers that know the concrete backend
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Backend that plays nothing but tracks voices.
///
/// Clips listed in `missing` fail to open, which lets callers exercise the
/// failure path without real assets.
#[derive(Debug, Default)]
pub struct NullAudioBackend {
    next_voice: u32,
    playing: HashMap<VoiceHandle, PlayRequest>,
    missing: HashSet<String>,
    listener: Option<ListenerPose>,
}

impl NullAudioBackend {
    /// Create a backend where every clip opens
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `clip` fail to open
    pub fn with_missing_clip(mut self, clip: impl Into<String>) -> Self {
        self.missing.insert(clip.into());
        self
    }

    /// Number of voices currently playing
    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Whether any voice is playing `clip`
    pub fn is_clip_playing(&self, clip: &str) -> bool {
        self.playing.values().any(|request| request.clip == clip)
    }

    /// Last listener pose reported
    pub fn listener(&self) -> Option<ListenerPose> {
        self.listener
    }
}

impl AudioBackend for NullAudioBackend {
    fn play(&mut self, request: PlayRequest) -> Result<VoiceHandle, AudioError> {
        if self.missing.contains(&request.clip) {
            return Err(AudioError::ClipUnavailable(request.clip));
        }
        let voice = VoiceHandle(self.next_voice);
        self.next_voice += 1;
        self.playing.insert(voice, request);
        Ok(voice)
    }

    fn stop(&mut self, voice: VoiceHandle) -> Result<(), AudioError> {
        self.playing
            .remove(&voice)
            .map(|_| ())
            .ok_or(AudioError::InvalidVoice(voice))
    }

    fn is_playing(&self, voice: VoiceHandle) -> bool {
        self.playing.contains_key(&voice)
    }

    fn set_listener(&mut self, pose: ListenerPose) {
        self.listener = Some(pose);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
