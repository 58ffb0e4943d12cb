//! Vizij Bone Modification Core (engine-agnostic)
//!
//! A per-frame job that rewrites one bone channel (scale, rotation or position)
//! toward a target, embedded in a fixed `job -> mixer -> output` graph and driven
//! by a frame controller. The host engine supplies the transform handles and the
//! graph executor through the traits in [`transform`] and [`graph`]; [`local`]
//! provides an in-process implementation of both.

pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod job;
pub mod local;
pub mod math;
pub mod params;
pub mod transform;

// Re-exports for consumers (adapters)
pub use config::ControllerConfig;
pub use controller::{ControllerState, FrameController};
pub use error::{BoneModError, GraphError, Result};
pub use graph::{build, teardown, GraphEngine, MixConfig, MixGraph, NodeId, ANIMATION_OUTPUT};
pub use job::{apply, AnimationJob, BoneModifyJob};
pub use local::{LocalGraph, PoseStream, Skeleton, StreamTransformHandle};
pub use params::{BoneParams, ModifyMode, SharedParams};
pub use transform::{BoneResolver, LocalTransform, TransformHandle};
