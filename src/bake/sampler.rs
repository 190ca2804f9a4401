//! Sampler
//!
//! Walks `point_count` evenly spaced parameters across a source's domain,
//! inclusive at both ends, and turns each into a positioned, oriented
//! [`Sample`].

use glam::{Quat, Vec3};

use crate::bake::frame::{RelativeFrame, look_rotation};
use crate::bake::source::CurveSource;

const DEGENERATE_EPSILON: f32 = 1e-12;

/// One baked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: usize,
    /// Domain parameter the sample was evaluated at.
    pub t: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub auxiliary: f32,
}

/// Parameter of sample `index` out of `point_count` over `[0, extent]`.
///
/// The last sample lands exactly on `extent`.
#[must_use]
pub fn parameter_at(index: usize, point_count: usize, extent: f32) -> f32 {
    if point_count < 2 {
        return 0.0;
    }
    if index + 1 >= point_count {
        return extent;
    }
    let step = extent / (point_count - 1) as f32;
    index as f32 * step
}

#[derive(Debug, Clone, Copy)]
struct RawSample {
    t: f32,
    position: Vec3,
    tangent: Vec3,
    up: Vec3,
    auxiliary: f32,
}

/// Reusable sampling scratch space.
///
/// Storage grows to the largest point count seen and is reused afterwards.
#[derive(Debug, Default)]
pub struct Sampler {
    raw: Vec<RawSample>,
    samples: Vec<Sample>,
}

impl Sampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the last call produced.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.samples.clear();
    }

    /// Produces exactly `point_count` samples of `source`, mapped through
    /// `frame`.
    ///
    /// A zero tangent is replaced by the secant to the next sample (the
    /// previous one for the last sample). If that is zero too, the previous
    /// sample's direction is reused, or +Z for the first sample.
    pub fn sample<S: CurveSource + ?Sized>(
        &mut self,
        source: &S,
        point_count: usize,
        frame: &RelativeFrame,
    ) -> &[Sample] {
        let extent = source.domain_extent();

        self.raw.clear();
        self.raw.extend((0..point_count).map(|index| {
            let t = parameter_at(index, point_count, extent);
            let point = source.evaluate(t);
            RawSample {
                t,
                position: point.position,
                tangent: point.tangent,
                up: point.up,
                auxiliary: source.auxiliary(t),
            }
        }));

        self.samples.clear();
        let mut previous_forward = Vec3::Z;
        for (index, raw) in self.raw.iter().enumerate() {
            let forward = resolve_forward(&self.raw, index).unwrap_or(previous_forward);
            previous_forward = forward;

            let (position, rotation) = frame.apply(raw.position, look_rotation(forward, raw.up));
            self.samples.push(Sample {
                index,
                t: raw.t,
                position,
                rotation,
                auxiliary: raw.auxiliary,
            });
        }

        &self.samples
    }
}

/// Normalized forward direction of sample `index`, or `None` if both the
/// tangent and the secant are degenerate.
fn resolve_forward(raw: &[RawSample], index: usize) -> Option<Vec3> {
    let current = &raw[index];
    if current.tangent.length_squared() > DEGENERATE_EPSILON {
        return Some(current.tangent.normalize());
    }

    let secant = if index + 1 < raw.len() {
        raw[index + 1].position - current.position
    } else if index > 0 {
        current.position - raw[index - 1].position
    } else {
        Vec3::ZERO
    };
    (secant.length_squared() > DEGENERATE_EPSILON).then(|| secant.normalize())
}
