//! Bevy plugin hosting a [`FrameController`] over the in-process [`LocalGraph`].
//!
//! Per frame: bind skeleton (until bound) -> drive controller -> evaluate -> apply.

use bevy::prelude::*;
use vizij_bone_mod::{ControllerConfig, FrameController, LocalGraph};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::BoneModRoot;
pub use resources::{BoneModControls, BoundSkeleton, PendingPose};

#[derive(Resource)]
pub struct BoneModEngine(pub FrameController<LocalGraph>);

impl Default for BoneModEngine {
    fn default() -> Self {
        Self(FrameController::new(
            ControllerConfig::default(),
            LocalGraph::new(),
        ))
    }
}

pub struct BoneModPlugin;

impl Plugin for BoneModPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BoneModEngine>()
            .init_resource::<BoneModControls>()
            .init_resource::<BoundSkeleton>()
            .init_resource::<PendingPose>()
            .add_systems(
                Update,
                (
                    systems::bind_skeleton_system,
                    systems::drive_controller_system,
                    systems::evaluate_graph_system,
                    systems::apply_pose_system,
                )
                    .chain(),
            );
    }
}
