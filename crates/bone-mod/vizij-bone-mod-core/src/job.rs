//! The per-frame bone modification job.

use crate::error::{BoneModError, Result};
use crate::math::{euler_to_quat, lerp_vec3, slerp_quat};
use crate::params::{BoneParams, ModifyMode, SharedParams};
use crate::transform::{LocalTransform, TransformHandle};

/// A procedural job evaluated by a graph engine once per frame.
///
/// Engines may invoke jobs from any thread, one invocation at a time.
pub trait AnimationJob<S>: Send + Sync {
    fn process_root_motion(&self, _stream: &mut S) {}

    fn process_animation(&self, stream: &mut S);

    /// Whether the job is ready to be placed in a graph.
    fn is_bound(&self) -> bool {
        true
    }
}

/// Compute the new local transform for `params`. Only the channel selected by
/// `params.mode` differs from `current`.
pub fn apply(current: LocalTransform, params: &BoneParams) -> LocalTransform {
    let mut out = current;
    match params.mode {
        ModifyMode::None => {}
        ModifyMode::Scale => {
            out.scale = lerp_vec3(current.scale, params.target, params.alpha);
        }
        ModifyMode::Rotation => {
            out.rotation = slerp_quat(
                current.rotation,
                euler_to_quat(params.target),
                params.alpha,
            );
        }
        ModifyMode::Position => {
            out.translation = lerp_vec3(current.translation, params.target, params.alpha);
        }
    }
    out
}

/// Reads the shared parameters and rewrites one bone channel through a transform handle.
#[derive(Debug, Clone)]
pub struct BoneModifyJob<H> {
    handle: H,
    params: SharedParams,
}

impl<H: TransformHandle> BoneModifyJob<H> {
    pub fn new(handle: H, params: SharedParams) -> Result<Self> {
        if !handle.is_bound() {
            return Err(BoneModError::GraphConstruction(
                "transform handle is not bound to a bone".into(),
            ));
        }
        Ok(Self { handle, params })
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn params(&self) -> &SharedParams {
        &self.params
    }
}

impl<H: TransformHandle> AnimationJob<H::Stream> for BoneModifyJob<H> {
    fn process_animation(&self, stream: &mut H::Stream) {
        // Fresh snapshot every frame; never cached across invocations.
        let params = self.params.get();
        let h = &self.handle;
        match params.mode {
            ModifyMode::None => {}
            ModifyMode::Scale => {
                let current = LocalTransform {
                    scale: h.local_scale(stream),
                    ..LocalTransform::IDENTITY
                };
                h.set_local_scale(stream, apply(current, &params).scale);
            }
            ModifyMode::Rotation => {
                let current = LocalTransform {
                    rotation: h.local_rotation(stream),
                    ..LocalTransform::IDENTITY
                };
                h.set_local_rotation(stream, apply(current, &params).rotation);
            }
            ModifyMode::Position => {
                let current = LocalTransform {
                    translation: h.local_position(stream),
                    ..LocalTransform::IDENTITY
                };
                h.set_local_position(stream, apply(current, &params).translation);
            }
        }
    }

    fn is_bound(&self) -> bool {
        self.handle.is_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{quat_angle_between, QUAT_IDENTITY};

    fn current() -> LocalTransform {
        LocalTransform {
            translation: [1.0, 2.0, 3.0],
            rotation: euler_to_quat([0.0, 30.0, 0.0]),
            scale: [1.0, 1.0, 1.0],
        }
    }

    fn params(mode: ModifyMode, target: [f32; 3], alpha: f32) -> BoneParams {
        BoneParams {
            mode,
            target,
            alpha,
        }
    }

    fn close3(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn alpha_zero_leaves_every_channel_alone() {
        let cur = current();
        for mode in [ModifyMode::Scale, ModifyMode::Rotation, ModifyMode::Position] {
            let out = apply(cur, &params(mode, [9.0, -4.0, 70.0], 0.0));
            assert!(close3(out.translation, cur.translation), "{mode:?}");
            assert!(close3(out.scale, cur.scale), "{mode:?}");
            assert!(quat_angle_between(out.rotation, cur.rotation) < 1e-3, "{mode:?}");
        }
    }

    #[test]
    fn alpha_one_reaches_target() {
        let cur = current();
        let out = apply(cur, &params(ModifyMode::Scale, [2.0, 0.5, 3.0], 1.0));
        assert!(close3(out.scale, [2.0, 0.5, 3.0]));
        assert_eq!(out.translation, cur.translation);

        let out = apply(cur, &params(ModifyMode::Position, [0.0, 5.0, 0.0], 1.0));
        assert!(close3(out.translation, [0.0, 5.0, 0.0]));
        assert_eq!(out.scale, cur.scale);

        let out = apply(cur, &params(ModifyMode::Rotation, [45.0, 0.0, 90.0], 1.0));
        let target = euler_to_quat([45.0, 0.0, 90.0]);
        assert!(quat_angle_between(out.rotation, target) < 1e-3);
        assert_eq!(out.translation, cur.translation);
    }

    #[test]
    fn position_halfway() {
        let cur = LocalTransform::IDENTITY;
        let out = apply(cur, &params(ModifyMode::Position, [0.0, 1.0, 0.0], 0.5));
        assert!(close3(out.translation, [0.0, 0.5, 0.0]));
    }

    #[test]
    fn none_mode_is_identity_for_any_input() {
        let cur = current();
        for alpha in [0.0, 0.3, 1.0] {
            let out = apply(cur, &params(ModifyMode::None, [100.0, 100.0, 100.0], alpha));
            assert_eq!(out, cur);
        }
    }

    #[test]
    fn repeated_zero_alpha_is_stable() {
        let mut t = current();
        let p = params(ModifyMode::Rotation, [0.0, 180.0, 0.0], 0.0);
        for _ in 0..100 {
            t = apply(t, &p);
        }
        assert!(quat_angle_between(t.rotation, current().rotation) < 1e-3);
        assert_eq!(t.translation, current().translation);
    }

    #[test]
    fn rotation_from_identity_halfway() {
        let cur = LocalTransform::IDENTITY;
        let out = apply(cur, &params(ModifyMode::Rotation, [0.0, 90.0, 0.0], 0.5));
        assert!(quat_angle_between(out.rotation, euler_to_quat([0.0, 45.0, 0.0])) < 1e-3);
        assert!(quat_angle_between(QUAT_IDENTITY, out.rotation) > 0.1);
    }
}
