//! Mode/target/alpha parameters and the cell that carries them from the control
//! layer to the job.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::BoneModError;
use crate::math::Vec3;

/// Which transform channel the job modifies this frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ModifyMode {
    None = 0,
    Scale = 1,
    #[default]
    Rotation = 2,
    Position = 3,
}

impl TryFrom<u8> for ModifyMode {
    type Error = BoneModError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ModifyMode::None),
            1 => Ok(ModifyMode::Scale),
            2 => Ok(ModifyMode::Rotation),
            3 => Ok(ModifyMode::Position),
            other => Err(BoneModError::InvalidMode(other)),
        }
    }
}

impl From<ModifyMode> for u8 {
    fn from(mode: ModifyMode) -> Self {
        mode as u8
    }
}

/// One frame's worth of job parameters.
///
/// `target` means scale factors, Euler degrees, or a local position depending on `mode`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneParams {
    pub mode: ModifyMode,
    pub target: Vec3,
    pub alpha: f32,
}

impl Default for BoneParams {
    fn default() -> Self {
        Self {
            mode: ModifyMode::default(),
            target: [0.0; 3],
            alpha: 1.0,
        }
    }
}

/// Single-value cell shared between the frame controller (writer) and the job (reader).
///
/// Clones share the same storage. Each `get` returns a consistent snapshot of all
/// three fields.
#[derive(Clone, Debug)]
pub struct SharedParams {
    inner: Arc<Mutex<BoneParams>>,
}

impl SharedParams {
    pub fn new(initial: BoneParams) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Overwrite all fields at once.
    pub fn set(&self, mode: ModifyMode, target: Vec3, alpha: f32) {
        self.store(BoneParams {
            mode,
            target,
            alpha,
        });
    }

    pub fn store(&self, params: BoneParams) {
        // Payload is plain data, so a poisoned lock still holds a valid value.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = params;
    }

    pub fn get(&self) -> BoneParams {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live handles to this cell (controller + jobs still held by a graph).
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
