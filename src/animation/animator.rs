//! Per-frame animation update.
//!
//! One tick runs three phases in a fixed order:
//!
//! 1. every node gets its `animated_transform`: the sampled `T · R · S` when
//!    the clip animates it, its `local_bind_transform` otherwise;
//! 2. world transforms are recomputed top-down from the roots;
//! 3. every skin recomputes its joint palette from the new world transforms.
//!
//! All three write scratch fields owned by the [`Model`]; nothing else
//! mutates them, and the renderer reads them only after the tick returns.

use serde::{Deserialize, Serialize};

use crate::scene::model::Model;
use crate::settings::AnimatorSettings;

/// How elapsed time maps onto a track's `[0, duration]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play once; sampling clamps to the last keyframe afterwards.
    Once,
    /// Wrap into `[0, duration)`.
    #[default]
    Loop,
    /// Alternate forwards and backwards.
    PingPong,
}

impl LoopMode {
    /// Maps `elapsed` into the time domain of a track lasting `duration`.
    /// Tracks with no positive duration are left unwrapped.
    #[must_use]
    pub fn wrap(self, elapsed: f32, duration: f32) -> f32 {
        if duration <= 0.0 {
            return elapsed;
        }
        match self {
            Self::Once => elapsed,
            Self::Loop => {
                // rem_euclid of a tiny negative value rounds up to `duration`.
                let t = elapsed.rem_euclid(duration);
                if t >= duration { 0.0 } else { t }
            }
            Self::PingPong => {
                let period = duration * 2.0;
                let t = elapsed.rem_euclid(period);
                if t > duration { period - t } else { t }
            }
        }
    }
}

/// Applies the model's clip at `elapsed` seconds, looping each track.
pub fn tick(model: &mut Model, elapsed: f32) {
    tick_with_mode(model, elapsed, LoopMode::Loop);
}

/// Applies the model's clip at `elapsed` seconds using `mode`.
pub fn tick_with_mode(model: &mut Model, elapsed: f32, mode: LoopMode) {
    let clip = model.clip.as_ref();
    for node in &mut model.nodes {
        node.animated_transform = match clip.and_then(|c| c.channels_for(node.id)) {
            Some(channels) => channels.sample(elapsed, mode).to_matrix(),
            None => node.local_bind_transform,
        };
    }

    model.propagate_transforms();
}

/// Playback state for one model: accumulated time and how it advances.
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    /// Accumulated playback time in seconds.
    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::from_settings(&AnimatorSettings::default())
    }
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_settings(settings: &AnimatorSettings) -> Self {
        Self {
            time: settings.start_time,
            time_scale: settings.time_scale,
            loop_mode: settings.loop_mode,
            paused: !settings.autoplay,
        }
    }

    /// Advances time by `dt` (unless paused) and ticks the model.
    ///
    /// A paused animator still ticks, so the model keeps showing the pose at
    /// the current time.
    pub fn advance(&mut self, model: &mut Model, dt: f32) {
        if !self.paused {
            self.time += dt * self.time_scale;
        }
        tick_with_mode(model, self.time, self.loop_mode);
    }

    /// Rewinds to zero without touching the model.
    pub fn rewind(&mut self) {
        self.time = 0.0;
    }
}
