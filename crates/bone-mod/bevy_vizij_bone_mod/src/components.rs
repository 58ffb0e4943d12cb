use bevy::prelude::*;

/// Marker for the entity whose named descendants form the skeleton.
/// Bones are bound by `Name`, or by `/`-joined names from the first bone below the root.
#[derive(Component)]
pub struct BoneModRoot;
