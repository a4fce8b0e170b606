use crate::animation::binding::TargetPath;
use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// Hermite spline through the keyframe values, shaped by their tangents.
    CubicSpline,
}

/// Tangents of a cubic spline keyframe, in units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicTangents<T> {
    pub in_tangent: T,
    pub out_tangent: T,
}

/// One sampled value of one property of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame<T> {
    /// Seconds from clip start.
    pub time: f32,
    pub value: T,
    /// Node the value belongs to.
    pub joint_id: usize,
    pub property: TargetPath,
    /// Present on keyframes read from a cubic spline sampler.
    pub tangents: Option<CubicTangents<T>>,
}

/// Time-ordered keyframes for a single property of a single node.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub keyframes: Vec<KeyFrame<T>>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::new(Vec::new(), InterpolationMode::Linear)
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(keyframes: Vec<KeyFrame<T>>, interpolation: InterpolationMode) -> Self {
        Self { keyframes, interpolation }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Time of the last keyframe, the period this track loops over.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Stable sort by time; keyframes sharing a time keep their read order.
    pub fn sort_by_time(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].time <= w[1].time)
    }

    /// Samples the track at `time` without wrapping.
    ///
    /// - before the first keyframe: the first value
    /// - at or after the last keyframe: the last value
    /// - exactly on a keyframe: that keyframe's value, unblended
    /// - otherwise: the two bounding keyframes blended by the fractional
    ///   position of `time` in the segment (or the earlier one for `Step`)
    ///
    /// A `CubicSpline` segment missing tangents on either end is blended
    /// linearly.
    ///
    /// Returns `None` only for an empty track.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn sample(&self, time: f32) -> Option<T> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        // First keyframe strictly after `time`; the segment starts one before.
        let next_idx = self.keyframes.partition_point(|k| k.time <= time);
        let k0 = &self.keyframes[next_idx - 1];
        let k1 = &self.keyframes[next_idx];

        if time == k0.time {
            return Some(k0.value);
        }

        let dt = k1.time - k0.time;
        let t = if dt > 1e-6 { ((time - k0.time) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match (self.interpolation, k0.tangents, k1.tangents) {
            (InterpolationMode::Step, ..) => Some(k0.value),
            (InterpolationMode::CubicSpline, Some(from), Some(to)) => Some(T::interpolate_cubic(
                k0.value,
                from.out_tangent,
                to.in_tangent,
                k1.value,
                t,
                dt,
            )),
            _ => Some(T::interpolate_linear(k0.value, k1.value, t)),
        }
    }
}
