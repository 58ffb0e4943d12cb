use vizij_bone_mod::{
    build, teardown, AnimationJob, BoneModError, BoneModifyJob, BoneParams, GraphEngine,
    LocalGraph, LocalTransform, MixConfig, ModifyMode, NodeId, PoseStream, SharedParams, Skeleton,
    StreamTransformHandle, ANIMATION_OUTPUT,
};

fn skeleton() -> Skeleton {
    let mut s = Skeleton::new();
    let root = s.add_bone("Root", None, LocalTransform::IDENTITY);
    s.add_bone("Head", Some(root), LocalTransform::from_translation([0.0, 1.0, 0.0]));
    s
}

fn head_job(cell: &SharedParams) -> BoneModifyJob<StreamTransformHandle> {
    BoneModifyJob::new(StreamTransformHandle::bound(1), cell.clone()).expect("bound")
}

#[test]
fn build_wires_job_into_single_mixer_input() {
    let cell = SharedParams::new(BoneParams::default());
    let mut engine = LocalGraph::new();
    let mix = MixConfig {
        single_layer_optimization: true,
    };
    let graph = build(&mut engine, head_job(&cell), mix).expect("build");

    assert_eq!(engine.node_count(), 2);
    assert_eq!(engine.name(), "ModifyBone");
    assert_eq!(engine.input(graph.mixer_node(), 0), Some((graph.job_node(), 1.0)));
    assert_eq!(engine.input(graph.job_node(), 0), None);
    assert_eq!(engine.output_source(ANIMATION_OUTPUT), Some(graph.mixer_node()));
    assert_eq!(graph.output(), ANIMATION_OUTPUT);
    assert_eq!(engine.mixer_config(graph.mixer_node()), Some(mix));
    assert_eq!(graph.config(), mix);
    assert!(engine.is_playing());
}

struct Unbound;

impl AnimationJob<PoseStream> for Unbound {
    fn process_animation(&self, _stream: &mut PoseStream) {}

    fn is_bound(&self) -> bool {
        false
    }
}

#[test]
fn unbound_job_is_rejected_before_touching_the_engine() {
    let mut engine = LocalGraph::new();
    let err = build(&mut engine, Unbound, MixConfig::default()).unwrap_err();
    assert!(matches!(err, BoneModError::GraphConstruction(_)));
    assert!(!engine.is_valid());
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn single_input_output_matches_with_and_without_optimization() {
    let s = skeleton();
    let bind = s.bind_pose();
    let mut poses = Vec::new();
    for single_layer_optimization in [false, true] {
        let cell = SharedParams::new(BoneParams {
            mode: ModifyMode::Position,
            target: [0.0, 3.0, 0.0],
            alpha: 0.5,
        });
        let mut engine = LocalGraph::new();
        build(
            &mut engine,
            head_job(&cell),
            MixConfig {
                single_layer_optimization,
            },
        )
        .expect("build");
        let pose = engine.evaluate(&bind).expect("pose");
        assert_eq!(pose.transforms[1].translation, [0.0, 2.0, 0.0]);
        poses.push(pose);
    }
    assert_eq!(poses[0], poses[1]);
}

#[test]
fn teardown_drops_the_job_and_stops_evaluation() {
    let s = skeleton();
    let cell = SharedParams::new(BoneParams::default());
    let mut engine = LocalGraph::new();
    let graph = build(&mut engine, head_job(&cell), MixConfig::default()).expect("build");
    assert_eq!(cell.strong_count(), 2);

    teardown(&mut engine, graph);
    assert_eq!(cell.strong_count(), 1);
    assert!(!engine.is_valid());
    assert!(engine.evaluate(&s.bind_pose()).is_none());
    assert_eq!(engine.output_source(ANIMATION_OUTPUT), None);
    assert_eq!(engine.input(NodeId(1), 0), None);
}
