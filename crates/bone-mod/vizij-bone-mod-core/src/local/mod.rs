//! In-process reference engine: a skeleton, a pose stream, and a small graph
//! evaluator implementing [`GraphEngine`](crate::graph::GraphEngine).
//!
//! Hosts with their own animation runtime implement the traits directly; this
//! module backs the Bevy adapter, the demo, and the tests.

pub mod blend;
pub mod graph;
pub mod skeleton;

pub use graph::LocalGraph;
pub use skeleton::{Bone, PoseStream, Skeleton, StreamTransformHandle};
