//! Control-surface configuration for the frame controller.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::MixConfig;
use crate::math::Vec3;
use crate::params::{BoneParams, ModifyMode};

/// Externally settable controller parameters.
///
/// `bone`, `mode`, `target` and `alpha` may change at any frame boundary. `mix` is
/// only read when a graph is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Bone name or `/`-separated path understood by the host's resolver.
    pub bone: String,
    pub mode: ModifyMode,
    pub target: Vec3,
    /// Blend weight in [0, 1].
    pub alpha: f32,
    pub mix: MixConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let p = BoneParams::default();
        Self {
            bone: String::new(),
            mode: p.mode,
            target: p.target,
            alpha: p.alpha,
            mix: MixConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn for_bone(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn params(&self) -> BoneParams {
        BoneParams {
            mode: self.mode,
            target: self.target,
            alpha: clamp_alpha(self.alpha),
        }
    }
}

/// Clamp to [0, 1]. NaN maps to 0.
pub(crate) fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}
