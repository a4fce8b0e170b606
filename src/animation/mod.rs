//! Keyframe animation: compiled clips, sampling and the per-frame tick.
//!
//! - [`compiler`]: sampler accessors → per-node keyframe tracks
//! - [`tracks`]: clamp-only sampling of a single property track
//! - [`clip`]: per-node channels and the loaded clip
//! - [`animator`]: elapsed time → animated, world and joint transforms

mod values;
pub mod animator;
pub mod binding;
pub mod clip;
pub mod compiler;
pub mod tracks;

pub use animator::{Animator, LoopMode, tick, tick_with_mode};
pub use binding::TargetPath;
pub use clip::{AnimationClip, ChannelTable, NodeChannels};
pub use tracks::{CubicTangents, InterpolationMode, KeyFrame, KeyframeTrack};
pub use values::Interpolatable;
