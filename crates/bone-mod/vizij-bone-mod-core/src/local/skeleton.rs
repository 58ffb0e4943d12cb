//! Named bone hierarchy with a bind pose, and the stream/handle pair jobs operate on.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};
use crate::transform::{BoneResolver, LocalTransform, TransformHandle};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub bind: LocalTransform,
}

/// Flat bone list in parent-before-child order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Skeleton {
    bones: Vec<Bone>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone. `parent` must already exist; an unknown parent makes the bone a root.
    pub fn add_bone(&mut self, name: &str, parent: Option<usize>, bind: LocalTransform) -> usize {
        let idx = self.bones.len();
        let parent = parent.filter(|p| *p < idx);
        self.bones.push(Bone {
            name: name.to_string(),
            parent,
            bind,
        });
        self.by_name.entry(name.to_string()).or_insert(idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// `/`-joined names from the root down to `idx`.
    pub fn path_of(&self, idx: usize) -> Option<String> {
        let mut segs = Vec::new();
        let mut cur = Some(idx);
        while let Some(i) = cur {
            let bone = self.bones.get(i)?;
            segs.push(bone.name.as_str());
            cur = bone.parent;
        }
        segs.reverse();
        Some(segs.join("/"))
    }

    /// Find a bone by exact name, falling back to a full `/`-separated path.
    pub fn find(&self, bone: &str) -> Option<usize> {
        if let Some(idx) = self.by_name.get(bone) {
            return Some(*idx);
        }
        if bone.contains('/') {
            let wanted = bone.trim_matches('/');
            return (0..self.bones.len()).find(|i| self.path_of(*i).as_deref() == Some(wanted));
        }
        // by_name is skipped by serde; fall back to a scan for deserialized skeletons.
        self.bones.iter().position(|b| b.name == bone)
    }

    pub fn bind_pose(&self) -> PoseStream {
        PoseStream {
            transforms: self.bones.iter().map(|b| b.bind).collect(),
        }
    }
}

impl BoneResolver for Skeleton {
    type Handle = StreamTransformHandle;

    fn resolve(&mut self, bone: &str) -> Option<StreamTransformHandle> {
        self.find(bone).map(StreamTransformHandle::bound)
    }
}

impl BoneResolver for &Skeleton {
    type Handle = StreamTransformHandle;

    fn resolve(&mut self, bone: &str) -> Option<StreamTransformHandle> {
        self.find(bone).map(StreamTransformHandle::bound)
    }
}

/// One frame's local transforms, indexed like the skeleton's bones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStream {
    pub transforms: Vec<LocalTransform>,
}

impl PoseStream {
    pub fn get(&self, idx: usize) -> Option<&LocalTransform> {
        self.transforms.get(idx)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Handle to one bone within a [`PoseStream`]. `Default` is unbound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamTransformHandle {
    bone: Option<usize>,
}

impl StreamTransformHandle {
    pub fn bound(bone: usize) -> Self {
        Self { bone: Some(bone) }
    }

    pub fn bone(&self) -> Option<usize> {
        self.bone
    }

    fn read(&self, stream: &PoseStream) -> LocalTransform {
        self.bone
            .and_then(|i| stream.transforms.get(i))
            .copied()
            .unwrap_or_default()
    }

    fn write(&self, stream: &mut PoseStream, f: impl FnOnce(&mut LocalTransform)) {
        if let Some(t) = self.bone.and_then(|i| stream.transforms.get_mut(i)) {
            f(t);
        }
    }
}

impl TransformHandle for StreamTransformHandle {
    type Stream = PoseStream;

    fn is_bound(&self) -> bool {
        self.bone.is_some()
    }

    fn local_scale(&self, stream: &PoseStream) -> Vec3 {
        self.read(stream).scale
    }

    fn local_rotation(&self, stream: &PoseStream) -> Quat {
        self.read(stream).rotation
    }

    fn local_position(&self, stream: &PoseStream) -> Vec3 {
        self.read(stream).translation
    }

    fn set_local_scale(&self, stream: &mut PoseStream, value: Vec3) {
        self.write(stream, |t| t.scale = value);
    }

    fn set_local_rotation(&self, stream: &mut PoseStream, value: Quat) {
        self.write(stream, |t| t.rotation = value);
    }

    fn set_local_position(&self, stream: &mut PoseStream, value: Vec3) {
        self.write(stream, |t| t.translation = value);
    }
}
