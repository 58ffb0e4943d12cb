use std::sync::Mutex;

use vizij_bone_mod::math::{euler_to_quat, quat_angle_between, Quat, Vec3};
use vizij_bone_mod::{
    AnimationJob, BoneModError, BoneModifyJob, BoneParams, LocalTransform, ModifyMode,
    SharedParams, TransformHandle,
};

/// A host stream that records channel writes.
#[derive(Default)]
struct CountingStream {
    bone: LocalTransform,
    writes: Vec<&'static str>,
}

#[derive(Default, Debug)]
struct CountingHandle {
    bound: bool,
    /// Channel reads. Jobs may run on another thread, so this must be Sync.
    calls: Mutex<u32>,
}

impl TransformHandle for CountingHandle {
    type Stream = CountingStream;

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn local_scale(&self, _s: &CountingStream) -> Vec3 {
        *self.calls.lock().unwrap() += 1;
        [1.0, 1.0, 1.0]
    }

    fn local_rotation(&self, s: &CountingStream) -> Quat {
        *self.calls.lock().unwrap() += 1;
        s.bone.rotation
    }

    fn local_position(&self, _s: &CountingStream) -> Vec3 {
        *self.calls.lock().unwrap() += 1;
        [0.0, 0.0, 0.0]
    }

    fn set_local_scale(&self, s: &mut CountingStream, v: Vec3) {
        s.writes.push("scale");
        s.bone.scale = v;
    }

    fn set_local_rotation(&self, s: &mut CountingStream, v: Quat) {
        s.writes.push("rotation");
        s.bone.rotation = v;
    }

    fn set_local_position(&self, s: &mut CountingStream, v: Vec3) {
        s.writes.push("position");
        s.bone.translation = v;
    }
}

fn job(params: BoneParams) -> (BoneModifyJob<CountingHandle>, SharedParams) {
    let cell = SharedParams::new(params);
    let handle = CountingHandle {
        bound: true,
        ..Default::default()
    };
    (BoneModifyJob::new(handle, cell.clone()).expect("bound"), cell)
}

#[test]
fn unbound_handle_cannot_build_a_job() {
    let err = BoneModifyJob::new(CountingHandle::default(), SharedParams::new(BoneParams::default()))
        .unwrap_err();
    assert!(matches!(err, BoneModError::GraphConstruction(_)));
}

#[test]
fn only_the_selected_channel_is_written() {
    let (job, cell) = job(BoneParams {
        mode: ModifyMode::Position,
        target: [0.0, 1.0, 0.0],
        alpha: 0.5,
    });
    let mut stream = CountingStream::default();
    job.process_animation(&mut stream);
    assert_eq!(stream.writes, vec!["position"]);
    assert_eq!(stream.bone.translation, [0.0, 0.5, 0.0]);

    cell.set(ModifyMode::Rotation, [0.0, 90.0, 0.0], 1.0);
    job.process_animation(&mut stream);
    assert_eq!(stream.writes, vec!["position", "rotation"]);
    assert!(quat_angle_between(stream.bone.rotation, euler_to_quat([0.0, 90.0, 0.0])) < 1e-3);

    cell.set(ModifyMode::None, [5.0, 5.0, 5.0], 1.0);
    job.process_animation(&mut stream);
    assert_eq!(stream.writes.len(), 2);
    assert_eq!(*job.handle().calls.lock().unwrap(), 2);
}

#[test]
fn root_motion_pass_is_a_noop() {
    let (job, _cell) = job(BoneParams {
        mode: ModifyMode::Scale,
        target: [2.0, 2.0, 2.0],
        alpha: 1.0,
    });
    let mut stream = CountingStream::default();
    job.process_root_motion(&mut stream);
    assert!(stream.writes.is_empty());
}

#[test]
fn job_runs_on_another_thread() {
    let (job, cell) = job(BoneParams {
        mode: ModifyMode::Scale,
        target: [3.0, 3.0, 3.0],
        alpha: 1.0,
    });
    cell.set(ModifyMode::Scale, [4.0, 4.0, 4.0], 1.0);
    let stream = std::thread::spawn(move || {
        let mut stream = CountingStream::default();
        job.process_animation(&mut stream);
        stream.bone
    })
    .join()
    .expect("job thread");
    assert_eq!(stream.scale, [4.0, 4.0, 4.0]);
}

#[test]
fn half_alpha_rotation_lands_midway_from_any_start() {
    let start = euler_to_quat([20.0, -35.0, 10.0]);
    let target_euler = [-40.0, 70.0, 15.0];
    let target = euler_to_quat(target_euler);
    let (job, _cell) = job(BoneParams {
        mode: ModifyMode::Rotation,
        target: target_euler,
        alpha: 0.5,
    });
    let mut stream = CountingStream {
        bone: LocalTransform {
            rotation: start,
            ..LocalTransform::IDENTITY
        },
        ..Default::default()
    };
    job.process_animation(&mut stream);
    let out = stream.bone.rotation;
    let to_start = quat_angle_between(out, start);
    let to_end = quat_angle_between(out, target);
    assert!((to_start - to_end).abs() < 1e-3, "{to_start} vs {to_end}");
    assert!((to_start + to_end - quat_angle_between(start, target)).abs() < 1e-3);
}
