use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::animator::LoopMode;
use crate::animation::tracks::KeyframeTrack;
use crate::scene::transform::Transform;

/// The three property tracks of one animated node. A property nobody
/// animates has an empty track.
#[derive(Debug, Clone, Default)]
pub struct NodeChannels {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl NodeChannels {
    pub fn sort_by_time(&mut self) {
        self.translation.sort_by_time();
        self.rotation.sort_by_time();
        self.scale.sort_by_time();
    }

    /// Longest of the three track durations.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.translation
            .duration()
            .max(self.rotation.duration())
            .max(self.scale.duration())
    }

    /// Local transform at `elapsed`.
    ///
    /// Each track wraps `elapsed` over its own duration according to `mode`
    /// before sampling. Empty tracks contribute identity.
    #[must_use]
    pub fn sample(&self, elapsed: f32, mode: LoopMode) -> Transform {
        let translation = self
            .translation
            .sample(mode.wrap(elapsed, self.translation.duration()))
            .unwrap_or(Vec3::ZERO);
        let rotation = self
            .rotation
            .sample(mode.wrap(elapsed, self.rotation.duration()))
            .unwrap_or(Quat::IDENTITY);
        let scale = self
            .scale
            .sample(mode.wrap(elapsed, self.scale.duration()))
            .unwrap_or(Vec3::ONE);

        Transform::new(translation, rotation, scale)
    }
}

/// Node id → property tracks. Built once at load, read-only afterwards.
pub type ChannelTable = FxHashMap<usize, NodeChannels>;

/// The single compiled animation clip of a model.
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    pub name: Option<String>,
    pub channels: ChannelTable,
    /// Longest track duration, in seconds.
    pub duration: f32,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: Option<String>, channels: ChannelTable) -> Self {
        let duration = channels
            .values()
            .map(NodeChannels::duration)
            .fold(0.0_f32, f32::max);

        Self { name, channels, duration }
    }

    #[inline]
    #[must_use]
    pub fn channels_for(&self, node: usize) -> Option<&NodeChannels> {
        self.channels.get(&node)
    }
}
