//! Weighted accumulation of poses into one output pose.

use crate::math::{dot_quat, normalize_quat, Quat, Vec3};
use crate::transform::LocalTransform;

use super::skeleton::PoseStream;

/// Weighted TRS sums for one bone. Rotations are summed in the hemisphere of the
/// first contribution and normalized at finalize.
#[derive(Clone, Debug)]
struct BoneAccum {
    t_sum: Vec3,
    r_sum: Quat,
    s_sum: Vec3,
    w: f32,
}

impl BoneAccum {
    fn empty() -> Self {
        Self {
            t_sum: [0.0; 3],
            r_sum: [0.0; 4],
            s_sum: [0.0; 3],
            w: 0.0,
        }
    }

    fn add(&mut self, t: &LocalTransform, w: f32) {
        let mut r = t.rotation;
        if self.w > 0.0 && dot_quat(self.r_sum, r) < 0.0 {
            r = [-r[0], -r[1], -r[2], -r[3]];
        }
        for i in 0..3 {
            self.t_sum[i] += t.translation[i] * w;
            self.s_sum[i] += t.scale[i] * w;
        }
        for i in 0..4 {
            self.r_sum[i] += r[i] * w;
        }
        self.w += w;
    }

    fn finalize(&self) -> Option<LocalTransform> {
        if self.w <= 0.0 {
            return None;
        }
        let w = self.w;
        Some(LocalTransform {
            translation: [self.t_sum[0] / w, self.t_sum[1] / w, self.t_sum[2] / w],
            rotation: normalize_quat(self.r_sum),
            scale: [self.s_sum[0] / w, self.s_sum[1] / w, self.s_sum[2] / w],
        })
    }
}

/// Accumulates weighted poses bone by bone.
pub struct PoseAccumulator {
    bones: Vec<BoneAccum>,
    total_weight: f32,
}

impl PoseAccumulator {
    pub fn new(bone_count: usize) -> Self {
        Self {
            bones: vec![BoneAccum::empty(); bone_count],
            total_weight: 0.0,
        }
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Non-positive weights are ignored.
    pub fn add(&mut self, pose: &PoseStream, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        for (acc, t) in self.bones.iter_mut().zip(pose.transforms.iter()) {
            acc.add(t, weight);
        }
        self.total_weight += weight;
    }

    /// Finalize into a pose. Bones with no contribution take `fallback`'s transform.
    pub fn finalize(self, fallback: &PoseStream) -> PoseStream {
        let transforms = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, acc)| {
                acc.finalize()
                    .or_else(|| fallback.transforms.get(i).copied())
                    .unwrap_or_default()
            })
            .collect();
        PoseStream { transforms }
    }
}

/// Blend weighted inputs over `base`. Weight missing from a total of 1.0 is filled
/// by `base`; totals above 1.0 are normalized.
pub fn mix_poses(inputs: &[(&PoseStream, f32)], base: &PoseStream) -> PoseStream {
    let mut acc = PoseAccumulator::new(base.len());
    for (pose, w) in inputs {
        acc.add(pose, *w);
    }
    let remainder = 1.0 - acc.total_weight();
    if remainder > 0.0 {
        acc.add(base, remainder);
    }
    acc.finalize(base)
}
