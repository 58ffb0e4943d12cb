use bevy::prelude::*;
use vizij_bone_mod::{ControllerState, LocalTransform, MixConfig, Skeleton};

use crate::components::BoneModRoot;
use crate::resources::{BoneModControls, BoundSkeleton, PendingPose};
use crate::BoneModEngine;

fn to_local(tf: &Transform) -> LocalTransform {
    LocalTransform {
        translation: tf.translation.to_array(),
        rotation: tf.rotation.to_array(),
        scale: tf.scale.to_array(),
    }
}

/// Captures the named descendants of each `BoneModRoot` as a skeleton, using their
/// current `Transform`s as the bind pose. Runs until a non-empty skeleton is bound.
pub fn bind_skeleton_system(
    roots: Query<Entity, With<BoneModRoot>>,
    children: Query<&Children>,
    bones: Query<(&Name, &Transform)>,
    mut bound: ResMut<BoundSkeleton>,
) {
    if bound.is_bound() {
        return;
    }

    fn walk(
        e: Entity,
        parent: Option<usize>,
        skeleton: &mut Skeleton,
        entities: &mut Vec<Entity>,
        bones: &Query<(&Name, &Transform)>,
        children: &Query<&Children>,
    ) {
        let mut this = parent;
        if let Ok((name, tf)) = bones.get(e) {
            this = Some(skeleton.add_bone(name.as_str(), parent, to_local(tf)));
            entities.push(e);
        }
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, this, skeleton, entities, bones, children);
            }
        }
    }

    let mut skeleton = Skeleton::new();
    let mut entities = Vec::new();
    for root in roots.iter() {
        if let Ok(cs) = children.get(root) {
            for &c in cs.iter() {
                walk(c, None, &mut skeleton, &mut entities, &bones, &children);
            }
        }
    }
    if !skeleton.is_empty() {
        info!("bone modifier: bound {} bones", skeleton.len());
        bound.skeleton = skeleton;
        bound.entities = entities;
    }
}

/// Starts the controller once a skeleton is bound, follows bone/mixer changes, and
/// pushes this frame's parameters.
pub fn drive_controller_system(
    mut eng: ResMut<BoneModEngine>,
    mut bound: ResMut<BoundSkeleton>,
    controls: Res<BoneModControls>,
    mut failed_bone: Local<Option<String>>,
) {
    if !bound.is_bound() || eng.0.state() == ControllerState::Destroyed {
        return;
    }
    let ctl = &mut eng.0;
    let mix = MixConfig {
        single_layer_optimization: controls.single_layer_optimization,
    };

    if !ctl.is_running() {
        if failed_bone.as_deref() == Some(controls.bone.as_str()) {
            return;
        }
        ctl.set_bone(&controls.bone);
        ctl.set_mix_config(mix);
        match ctl.start(&mut bound.skeleton) {
            Ok(()) => *failed_bone = None,
            Err(err) => {
                warn!("bone modifier failed to start: {err}");
                *failed_bone = Some(controls.bone.clone());
                return;
            }
        }
    } else {
        if ctl.config().bone != controls.bone && failed_bone.as_deref() != Some(controls.bone.as_str())
        {
            if let Err(err) = ctl.rebind(&mut bound.skeleton, &controls.bone) {
                warn!("bone modifier kept '{}': {err}", ctl.config().bone);
                *failed_bone = Some(controls.bone.clone());
            }
        }
        if ctl.config().mix != mix {
            if let Err(err) = ctl.rebuild(&mut bound.skeleton, mix) {
                warn!("bone modifier rebuild failed: {err}");
                return;
            }
        }
    }

    ctl.tick(controls.mode, controls.target.to_array(), controls.alpha);
}

/// Evaluates the graph from the bind pose and stashes the result in `PendingPose`.
pub fn evaluate_graph_system(
    mut eng: ResMut<BoneModEngine>,
    bound: Res<BoundSkeleton>,
    mut pending: ResMut<PendingPose>,
) {
    pending.pose = if eng.0.is_running() {
        eng.0.engine_mut().evaluate(&bound.skeleton.bind_pose())
    } else {
        None
    };
}

/// Writes the pending pose onto the bound bone entities.
pub fn apply_pose_system(
    bound: Res<BoundSkeleton>,
    mut pending: ResMut<PendingPose>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(pose) = pending.pose.take() else {
        return;
    };
    for (entity, t) in bound.entities.iter().zip(pose.transforms.iter()) {
        if let Ok(mut tf) = transforms.get_mut(*entity) {
            tf.translation = Vec3::from_array(t.translation);
            tf.rotation = Quat::from_array(t.rotation).normalize();
            tf.scale = Vec3::from_array(t.scale);
        }
    }
}
