//! Bone local transforms and the transform-handle capability supplied by a host engine.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3, QUAT_IDENTITY};

/// Local TRS of one bone.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub translation: Vec3,
    /// quat (x,y,z,w)
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        translation: [0.0; 3],
        rotation: QUAT_IDENTITY,
        scale: [1.0; 3],
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Read/write access to one bone's local transform inside a per-frame animation stream.
///
/// The stream type is owned by the host engine; the handle only knows how to find
/// its bone inside it. Handles are cheap to copy and may be used from whatever
/// thread the host evaluates jobs on.
pub trait TransformHandle: Send + Sync {
    type Stream;

    /// Whether this handle refers to a resolved bone.
    fn is_bound(&self) -> bool;

    fn local_scale(&self, stream: &Self::Stream) -> Vec3;
    fn local_rotation(&self, stream: &Self::Stream) -> Quat;
    fn local_position(&self, stream: &Self::Stream) -> Vec3;

    fn set_local_scale(&self, stream: &mut Self::Stream, value: Vec3);
    fn set_local_rotation(&self, stream: &mut Self::Stream, value: Quat);
    fn set_local_position(&self, stream: &mut Self::Stream, value: Vec3);

    /// Read all three channels at once.
    fn local_transform(&self, stream: &Self::Stream) -> LocalTransform {
        LocalTransform {
            translation: self.local_position(stream),
            rotation: self.local_rotation(stream),
            scale: self.local_scale(stream),
        }
    }
}

/// Resolves a bone reference (name or path) to a transform handle.
/// Hosts implement this and pass it to the frame controller at start.
pub trait BoneResolver {
    type Handle: TransformHandle;

    fn resolve(&mut self, bone: &str) -> Option<Self::Handle>;
}
