//! Animation Compiler
//!
//! Turns glTF animation samplers into per-node, per-property keyframe
//! tracks. Only the first clip of an asset is compiled.

use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, ChannelTable};
use crate::animation::tracks::{CubicTangents, InterpolationMode, KeyFrame};
use crate::assets::accessor::{AccessorReader, AccessorType, ComponentType};
use crate::assets::manifest::{AnimationDesc, SamplerDesc};
use crate::errors::{Error, Result};

/// How sampler outputs are laid out and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SamplerLayout {
    /// One output element per input time.
    Plain(InterpolationMode),
    /// Three output elements per input time (in-tangent, value, out-tangent).
    CubicSpline,
}

impl SamplerLayout {
    fn parse(sampler: &SamplerDesc) -> Result<Self> {
        match sampler.interpolation.as_deref() {
            None | Some("LINEAR") => Ok(Self::Plain(InterpolationMode::Linear)),
            Some("STEP") => Ok(Self::Plain(InterpolationMode::Step)),
            Some("CUBICSPLINE") => Ok(Self::CubicSpline),
            Some(other) => Err(Error::malformed(format!("unknown sampler interpolation '{other}'"))),
        }
    }

    fn mode(self) -> InterpolationMode {
        match self {
            Self::Plain(mode) => mode,
            Self::CubicSpline => InterpolationMode::CubicSpline,
        }
    }

    fn elements_per_key(self) -> usize {
        match self {
            Self::Plain(_) => 1,
            Self::CubicSpline => 3,
        }
    }

    /// Output element holding the value for input `i`.
    fn value_index(self, i: usize) -> usize {
        match self {
            Self::Plain(_) => i,
            Self::CubicSpline => i * 3 + 1,
        }
    }
}

/// Compiles one animation into a channel table.
///
/// Keyframes are appended to their track in read order. With `sort`, each
/// track is then stably sorted by time, so out-of-order sampler input is
/// tolerated; without it the input must already be ascending.
pub fn compile(animation: &AnimationDesc, reader: &AccessorReader<'_>, sort: bool) -> Result<ChannelTable> {
    let node_count = reader.manifest().nodes.len();
    let mut table = ChannelTable::default();

    for (channel_index, channel) in animation.channels.iter().enumerate() {
        let Some(node) = channel.target.node else {
            log::debug!("channel {channel_index} has no target node; skipping");
            continue;
        };
        let Some(property) = TargetPath::from_path(&channel.target.path) else {
            log::debug!(
                "channel {channel_index} targets unsupported path '{}'; skipping",
                channel.target.path
            );
            continue;
        };
        if node >= node_count {
            return Err(Error::malformed(format!(
                "channel {channel_index} targets missing node {node}"
            )));
        }

        let sampler = animation.samplers.get(channel.sampler).ok_or_else(|| {
            Error::malformed(format!(
                "channel {channel_index} references missing sampler {}",
                channel.sampler
            ))
        })?;
        let layout = SamplerLayout::parse(sampler)?;
        let input = reader.read(sampler.input)?;
        if input.accessor_type != AccessorType::Scalar || input.component_type != ComponentType::Float {
            return Err(Error::malformed(format!(
                "sampler input {} must be a float SCALAR accessor",
                sampler.input
            )));
        }
        let times = input.to_f32_vec();

        let output = reader.read(sampler.output)?;
        let arity = property.arity();
        if output.arity() != arity {
            return Err(Error::malformed(format!(
                "{property:?} output {} has {} components per element, expected {arity}",
                sampler.output,
                output.arity()
            )));
        }
        let values = output.to_f32_vec();

        let needed = times.len() * layout.elements_per_key() * arity;
        if values.len() < needed {
            return Err(Error::malformed(format!(
                "sampler output {} has {} components, {needed} needed for {} keyframes",
                sampler.output,
                values.len(),
                times.len()
            )));
        }

        let entry = table.entry(node).or_default();
        for (i, &time) in times.iter().enumerate() {
            let element = |index: usize| &values[index * arity..(index + 1) * arity];
            let value_index = layout.value_index(i);
            let cubic = layout == SamplerLayout::CubicSpline;
            match property {
                TargetPath::Translation | TargetPath::Scale => {
                    let track = if property == TargetPath::Translation {
                        &mut entry.translation
                    } else {
                        &mut entry.scale
                    };
                    track.interpolation = layout.mode();
                    track.keyframes.push(KeyFrame {
                        time,
                        value: Vec3::from_slice(element(value_index)),
                        joint_id: node,
                        property,
                        tangents: cubic.then(|| CubicTangents {
                            in_tangent: Vec3::from_slice(element(value_index - 1)),
                            out_tangent: Vec3::from_slice(element(value_index + 1)),
                        }),
                    });
                }
                TargetPath::Rotation => {
                    let quat = |v: &[f32]| Quat::from_xyzw(v[0], v[1], v[2], v[3]);
                    entry.rotation.interpolation = layout.mode();
                    entry.rotation.keyframes.push(KeyFrame {
                        time,
                        value: quat(element(value_index)),
                        joint_id: node,
                        property,
                        tangents: cubic.then(|| CubicTangents {
                            in_tangent: quat(element(value_index - 1)),
                            out_tangent: quat(element(value_index + 1)),
                        }),
                    });
                }
            }
        }
    }

    for channels in table.values_mut() {
        if sort {
            channels.sort_by_time();
        } else if !(channels.translation.is_sorted() && channels.rotation.is_sorted() && channels.scale.is_sorted()) {
            log::warn!("animation keyframes are not in ascending time order and sorting is disabled");
        }
    }

    Ok(table)
}

/// Compiles the first animation of the manifest, if any.
pub fn compile_first_clip(reader: &AccessorReader<'_>, sort: bool) -> Result<Option<AnimationClip>> {
    let animations = &reader.manifest().animations;
    let Some(first) = animations.first() else {
        return Ok(None);
    };
    if animations.len() > 1 {
        log::info!("asset has {} animations; only the first is loaded", animations.len());
    }

    let channels = compile(first, reader, sort)?;
    Ok(Some(AnimationClip::new(first.name.clone(), channels)))
}
