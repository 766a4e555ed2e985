//! Tween animators
//!
//! A tween interpolates one local transform channel (position, rotation or
//! scale) from `From` to `To` over `Duration` seconds. The three component
//! types share [`Tween`] and differ only in their [`TweenTarget`].

use crate::ecs::component::{from_component_data, to_component_data, Component, ComponentContext, ComponentData, ComponentError, ComponentType};
use crate::ecs::TransformMut;
use crate::foundation::math::{utils, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Easing curve applied to normalised progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Quadratic acceleration
    EaseIn,
    /// Quadratic deceleration
    EaseOut,
    /// Accelerate then decelerate
    EaseInOut,
}

impl Easing {
    /// Map `t` in `[0, 1]` onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * 0.5
                }
            }
        }
    }
}

/// What happens when the end is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenMode {
    /// Stop at `To`
    #[default]
    Once,
    /// Jump back to `From` and repeat
    Loop,
    /// Reverse direction at each end
    PingPong,
}

/// Tween parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TweenSettings {
    /// Start value
    pub from: Vec3,
    /// End value
    pub to: Vec3,
    /// Seconds from `From` to `To`
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
    /// End behaviour
    pub mode: TweenMode,
}

impl Default for TweenSettings {
    fn default() -> Self {
        Self {
            from: Vec3::zeros(),
            to: Vec3::zeros(),
            duration: 1.0,
            easing: Easing::Linear,
            mode: TweenMode::Once,
        }
    }
}

/// Transform channel driven by a tween
pub trait TweenTarget: 'static {
    /// Component type identifier
    const TYPE_NAME: &'static str;

    /// Write the interpolated value
    fn write(transform: &mut TransformMut<'_>, value: Vec3);
}

/// Local position channel
pub struct PositionChannel;

/// Local rotation channel (radians)
pub struct RotationChannel;

/// Local scale channel
pub struct ScaleChannel;

impl TweenTarget for PositionChannel {
    const TYPE_NAME: &'static str = "TweenPosition";

    fn write(transform: &mut TransformMut<'_>, value: Vec3) {
        transform.set_position(value);
    }
}

impl TweenTarget for RotationChannel {
    const TYPE_NAME: &'static str = "TweenRotation";

    fn write(transform: &mut TransformMut<'_>, value: Vec3) {
        transform.set_rotation(value);
    }
}

impl TweenTarget for ScaleChannel {
    const TYPE_NAME: &'static str = "TweenScale";

    fn write(transform: &mut TransformMut<'_>, value: Vec3) {
        transform.set_scale(value);
    }
}

/// Animates a position
pub type TweenPosition = Tween<PositionChannel>;
/// Animates a rotation
pub type TweenRotation = Tween<RotationChannel>;
/// Animates a scale
pub type TweenScale = Tween<ScaleChannel>;

/// Tween over one transform channel
pub struct Tween<C: TweenTarget> {
    /// Tween parameters
    pub settings: TweenSettings,
    elapsed: f32,
    finished: bool,
    _channel: PhantomData<fn() -> C>,
}

impl<C: TweenTarget> Tween<C> {
    /// Tween from `from` to `to` over `duration` seconds
    pub fn new(from: Vec3, to: Vec3, duration: f32) -> Self {
        Self::with_settings(TweenSettings {
            from,
            to,
            duration,
            ..TweenSettings::default()
        })
    }

    /// Tween with explicit settings
    pub fn with_settings(settings: TweenSettings) -> Self {
        Self {
            settings,
            elapsed: 0.0,
            finished: false,
            _channel: PhantomData,
        }
    }

    /// Builder: easing curve
    pub fn easing(mut self, easing: Easing) -> Self {
        self.settings.easing = easing;
        self
    }

    /// Builder: end behaviour
    pub fn mode(mut self, mode: TweenMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Whether a `Once` tween has reached its end
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds played so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Rewind to the start
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.finished = false;
    }

    /// Normalised progress in `[0, 1]` before easing, honouring the mode
    pub fn progress(&self) -> f32 {
        let duration = self.settings.duration;
        if duration <= 0.0 {
            return 1.0;
        }
        let cycles = self.elapsed / duration;
        match self.settings.mode {
            TweenMode::Once => cycles.min(1.0),
            TweenMode::Loop => cycles.fract(),
            TweenMode::PingPong => {
                let leg = cycles.floor() as u64;
                if leg % 2 == 0 {
                    cycles.fract()
                } else {
                    1.0 - cycles.fract()
                }
            }
        }
    }

    /// Interpolated value at the current progress
    pub fn value(&self) -> Vec3 {
        let t = self.settings.easing.apply(self.progress());
        utils::lerp_vec3(&self.settings.from, &self.settings.to, t)
    }

    fn advance(&mut self, dt: f32) {
        if self.finished {
            return;
        }
        self.elapsed += dt.max(0.0);
        if self.settings.mode == TweenMode::Once && self.elapsed >= self.settings.duration {
            self.elapsed = self.settings.duration.max(0.0);
            self.finished = true;
        }
    }
}

impl<C: TweenTarget> Default for Tween<C> {
    fn default() -> Self {
        Self::with_settings(TweenSettings::default())
    }
}

impl<C: TweenTarget> Clone for Tween<C> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            elapsed: self.elapsed,
            finished: self.finished,
            _channel: PhantomData,
        }
    }
}

impl<C: TweenTarget> fmt::Debug for Tween<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(C::TYPE_NAME)
            .field("settings", &self.settings)
            .field("elapsed", &self.elapsed)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<C: TweenTarget> Component for Tween<C> {
    fn type_name(&self) -> &'static str {
        C::TYPE_NAME
    }

    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) {
        let start = self.value();
        C::write(&mut ctx.transform(), start);
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.finished {
            return;
        }
        self.advance(ctx.delta_time());
        let value = self.value();
        C::write(&mut ctx.transform(), value);
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    fn clone_box(&self) -> Box<dyn Component> {
        // Instances start from the beginning
        Box::new(Self::with_settings(self.settings.clone()))
    }

    fn serialize(&self) -> ComponentData {
        to_component_data(&self.settings)
    }

    fn deserialize(&mut self, data: &ComponentData) -> Result<(), ComponentError> {
        self.settings = from_component_data(C::TYPE_NAME, data)?;
        self.restart();
        Ok(())
    }

    any_casts!();
}

impl<C: TweenTarget> ComponentType for Tween<C> {
    const TYPE_NAME: &'static str = C::TYPE_NAME;
}
