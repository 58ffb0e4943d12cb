use anyhow::Result;
use vizij_bone_mod::{
    ControllerConfig, FrameController, LocalGraph, LocalTransform, ModifyMode, Skeleton,
};

fn main() -> Result<()> {
    let mut skeleton = Skeleton::new();
    let hips = skeleton.add_bone("Hips", None, LocalTransform::from_translation([0.0, 1.0, 0.0]));
    let spine = skeleton.add_bone("Spine", Some(hips), LocalTransform::from_translation([0.0, 0.3, 0.0]));
    let head = skeleton.add_bone("Head", Some(spine), LocalTransform::from_translation([0.0, 0.4, 0.0]));

    let cfg = ControllerConfig::from_json_str(
        r#"{
            "bone": "Hips/Spine/Head",
            "mode": "rotation",
            "target": [0.0, 60.0, 0.0],
            "alpha": 0.0,
            "mix": { "single_layer_optimization": false }
        }"#,
    )?;
    let mut controller = FrameController::new(cfg, LocalGraph::new());
    controller.start(&mut skeleton)?;

    let bind = skeleton.bind_pose();
    for frame in 0..=10 {
        let alpha = frame as f32 / 10.0;
        controller.tick(ModifyMode::Rotation, [0.0, 60.0, 0.0], alpha);
        if let Some(pose) = controller.engine_mut().evaluate(&bind) {
            let q = pose.transforms[head].rotation;
            println!(
                "frame {frame:2} alpha {alpha:.1} head rotation [{:.3}, {:.3}, {:.3}, {:.3}]",
                q[0], q[1], q[2], q[3]
            );
        }
    }

    controller.tick(ModifyMode::Position, [0.0, 0.8, 0.1], 0.5);
    if let Some(pose) = controller.engine_mut().evaluate(&bind) {
        println!("head position {:?}", pose.transforms[head].translation);
    }

    controller.stop();
    Ok(())
}
