use bevy::prelude::*;
use vizij_bone_mod::{ControllerConfig, ModifyMode, PoseStream, Skeleton};

/// Inspector-style controls read every frame.
///
/// `single_layer_optimization` only affects newly built graphs; changing it on a
/// running app triggers a rebuild.
#[derive(Resource, Debug, Clone)]
pub struct BoneModControls {
    pub bone: String,
    pub mode: ModifyMode,
    /// Scale factors, Euler degrees, or local position depending on `mode`.
    pub target: Vec3,
    pub alpha: f32,
    pub single_layer_optimization: bool,
}

impl Default for BoneModControls {
    fn default() -> Self {
        Self::from(&ControllerConfig::default())
    }
}

impl From<&ControllerConfig> for BoneModControls {
    fn from(cfg: &ControllerConfig) -> Self {
        Self {
            bone: cfg.bone.clone(),
            mode: cfg.mode,
            target: Vec3::from_array(cfg.target),
            alpha: cfg.alpha,
            single_layer_optimization: cfg.mix.single_layer_optimization,
        }
    }
}

/// Skeleton captured from the entity hierarchy, with the entity for each bone index.
#[derive(Resource, Default)]
pub struct BoundSkeleton {
    pub skeleton: Skeleton,
    pub entities: Vec<Entity>,
}

impl BoundSkeleton {
    pub fn is_bound(&self) -> bool {
        !self.skeleton.is_empty()
    }
}

/// Pose produced by the graph this frame, applied in a separate system
/// (keeps ordering explicit: Compute -> Apply).
#[derive(Resource, Default)]
pub struct PendingPose {
    pub pose: Option<PoseStream>,
}
