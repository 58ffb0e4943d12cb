//! Single-threaded graph evaluator for job and mixer nodes over [`PoseStream`]s.

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::{debug, trace};

use crate::error::GraphError;
use crate::graph::{GraphEngine, MixConfig, NodeId};
use crate::job::AnimationJob;

use super::blend::mix_poses;
use super::skeleton::PoseStream;

enum NodeKind {
    Job(Box<dyn AnimationJob<PoseStream>>),
    Mixer(MixConfig),
}

struct Node {
    kind: NodeKind,
    /// Per input port: connected source and weight.
    inputs: Vec<Option<(NodeId, f32)>>,
}

impl Node {
    fn connected(&self) -> impl Iterator<Item = (NodeId, f32)> + '_ {
        self.inputs.iter().flatten().copied()
    }
}

/// Reference [`GraphEngine`] used by the Bevy adapter, the demo and the tests.
#[derive(Default)]
pub struct LocalGraph {
    name: String,
    nodes: Vec<Node>,
    outputs: HashMap<String, NodeId>,
    valid: bool,
    playing: bool,
    frames: u64,
}

impl std::fmt::Debug for LocalGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("outputs", &self.outputs)
            .field("valid", &self.valid)
            .field("playing", &self.playing)
            .field("frames", &self.frames)
            .finish()
    }
}

impl LocalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_playing(&self) -> bool {
        self.valid && self.playing
    }

    /// Frames evaluated since the current graph was created.
    pub fn frames_evaluated(&self) -> u64 {
        self.frames
    }

    /// Config a mixer node was created with.
    pub fn mixer_config(&self, node: NodeId) -> Option<MixConfig> {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Mixer(cfg)) => Some(*cfg),
            _ => None,
        }
    }

    /// Source and weight connected to `port` of `node`.
    pub fn input(&self, node: NodeId, port: usize) -> Option<(NodeId, f32)> {
        self.nodes.get(node.0)?.inputs.get(port).copied().flatten()
    }

    pub fn output_source(&self, output: &str) -> Option<NodeId> {
        self.outputs.get(output).copied()
    }

    fn check_live(&self) -> Result<(), GraphError> {
        if self.valid {
            Ok(())
        } else {
            Err(GraphError::Destroyed)
        }
    }

    fn push(&mut self, kind: NodeKind, input_count: usize) -> Result<NodeId, GraphError> {
        self.check_live()?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            inputs: vec![None; input_count],
        });
        Ok(id)
    }

    /// Whether `to` is reachable from `from` following input → consumer edges.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(cur) = stack.pop() {
            if cur == to {
                return true;
            }
            if std::mem::replace(&mut seen[cur.0], true) {
                continue;
            }
            for (i, n) in self.nodes.iter().enumerate() {
                if n.connected().any(|(src, _)| src == cur) {
                    stack.push(NodeId(i));
                }
            }
        }
        false
    }

    /// Kahn's algorithm over connected edges.
    fn topo_order(&self) -> Vec<NodeId> {
        let mut indeg = vec![0usize; self.nodes.len()];
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (i, n) in self.nodes.iter().enumerate() {
            for (src, _) in n.connected() {
                adj[src.0].push(i);
                indeg[i] += 1;
            }
        }
        let mut q: VecDeque<usize> = (0..self.nodes.len()).filter(|i| indeg[*i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(u) = q.pop_front() {
            order.push(NodeId(u));
            for &v in &adj[u] {
                indeg[v] -= 1;
                if indeg[v] == 0 {
                    q.push_back(v);
                }
            }
        }
        order
    }

    /// Evaluate one frame starting from `bind_pose` and return the pose published on
    /// `output`. Returns `None` when the graph is not playing or nothing is published.
    pub fn evaluate_output(&mut self, output: &str, bind_pose: &PoseStream) -> Option<PoseStream> {
        if !self.is_playing() {
            return None;
        }
        let target = self.output_source(output)?;
        let mut results: Vec<Option<PoseStream>> = vec![None; self.nodes.len()];

        for id in self.topo_order() {
            let node = &self.nodes[id.0];
            let pose = match &node.kind {
                NodeKind::Job(job) => {
                    // A job streams its first connected input, or the bind pose.
                    let mut stream = node
                        .connected()
                        .next()
                        .and_then(|(src, _)| results[src.0].clone())
                        .unwrap_or_else(|| bind_pose.clone());
                    job.process_root_motion(&mut stream);
                    job.process_animation(&mut stream);
                    stream
                }
                NodeKind::Mixer(cfg) => {
                    let inputs: Vec<(&PoseStream, f32)> = node
                        .connected()
                        .filter_map(|(src, w)| results[src.0].as_ref().map(|p| (p, w)))
                        .collect();
                    match inputs.as_slice() {
                        [(only, w)] if cfg.single_layer_optimization && *w == 1.0 => {
                            (*only).clone()
                        }
                        _ => mix_poses(&inputs, bind_pose),
                    }
                }
            };
            results[id.0] = Some(pose);
        }

        self.frames += 1;
        trace!("{}: frame {} evaluated", self.name, self.frames);
        results.get_mut(target.0).and_then(Option::take)
    }

    /// Evaluate the `"Animation"` output.
    pub fn evaluate(&mut self, bind_pose: &PoseStream) -> Option<PoseStream> {
        self.evaluate_output(crate::graph::ANIMATION_OUTPUT, bind_pose)
    }
}

impl GraphEngine for LocalGraph {
    type Stream = PoseStream;

    fn create(&mut self, name: &str) {
        if self.valid {
            debug!("{}: replaced by new graph '{}'", self.name, name);
        }
        self.name = name.to_string();
        self.nodes.clear();
        self.outputs.clear();
        self.valid = true;
        self.playing = false;
        self.frames = 0;
    }

    fn create_job_node(
        &mut self,
        job: Box<dyn AnimationJob<PoseStream>>,
        input_count: usize,
    ) -> Result<NodeId, GraphError> {
        self.push(NodeKind::Job(job), input_count)
    }

    fn create_mixer_node(
        &mut self,
        input_count: usize,
        config: MixConfig,
    ) -> Result<NodeId, GraphError> {
        self.push(NodeKind::Mixer(config), input_count)
    }

    fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        port: usize,
        weight: f32,
    ) -> Result<(), GraphError> {
        self.check_live()?;
        if source.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode(source.0));
        }
        let count = match self.nodes.get(target.0) {
            Some(n) => n.inputs.len(),
            None => return Err(GraphError::UnknownNode(target.0)),
        };
        if port >= count {
            return Err(GraphError::PortOutOfRange {
                node: target.0,
                port,
                count,
            });
        }
        if self.reaches(target, source) {
            return Err(GraphError::Cycle {
                from: source.0,
                to: target.0,
            });
        }
        self.nodes[target.0].inputs[port] = Some((source, weight));
        Ok(())
    }

    fn set_output_source(&mut self, output: &str, node: NodeId) -> Result<(), GraphError> {
        self.check_live()?;
        if node.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode(node.0));
        }
        self.outputs.insert(output.to_string(), node);
        Ok(())
    }

    fn play(&mut self) -> Result<(), GraphError> {
        self.check_live()?;
        self.playing = true;
        Ok(())
    }

    fn destroy(&mut self) {
        // Dropping the nodes drops the jobs and their parameter handles.
        self.nodes.clear();
        self.outputs.clear();
        self.valid = false;
        self.playing = false;
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::skeleton::{Skeleton, StreamTransformHandle};
    use crate::transform::{LocalTransform, TransformHandle};

    struct Offset(StreamTransformHandle, f32);

    impl AnimationJob<PoseStream> for Offset {
        fn process_animation(&self, stream: &mut PoseStream) {
            let mut p = self.0.local_position(stream);
            p[0] += self.1;
            self.0.set_local_position(stream, p);
        }
    }

    fn skel() -> Skeleton {
        let mut s = Skeleton::new();
        s.add_bone("Root", None, LocalTransform::IDENTITY);
        s
    }

    #[test]
    fn rejects_cycles_and_bad_ports() {
        let mut g = LocalGraph::new();
        g.create("t");
        let a = g.create_mixer_node(1, MixConfig::default()).unwrap();
        let b = g.create_mixer_node(1, MixConfig::default()).unwrap();
        g.connect(a, b, 0, 1.0).unwrap();
        assert_eq!(
            g.connect(b, a, 0, 1.0),
            Err(GraphError::Cycle { from: 1, to: 0 })
        );
        assert!(matches!(
            g.connect(a, b, 3, 1.0),
            Err(GraphError::PortOutOfRange { port: 3, .. })
        ));
        assert_eq!(g.connect(a, a, 0, 1.0), Err(GraphError::Cycle { from: 0, to: 0 }));
        assert_eq!(g.connect(NodeId(9), a, 0, 1.0), Err(GraphError::UnknownNode(9)));
    }

    #[test]
    fn chained_jobs_run_in_dependency_order() {
        let s = skel();
        let mut g = LocalGraph::new();
        g.create("t");
        let mixer = g.create_mixer_node(1, MixConfig::default()).unwrap();
        let second = g
            .create_job_node(Box::new(Offset(StreamTransformHandle::bound(0), 10.0)), 1)
            .unwrap();
        let first = g
            .create_job_node(Box::new(Offset(StreamTransformHandle::bound(0), 1.0)), 1)
            .unwrap();
        g.connect(first, second, 0, 1.0).unwrap();
        g.connect(second, mixer, 0, 1.0).unwrap();
        g.set_output_source("Animation", mixer).unwrap();
        assert!(g.evaluate(&s.bind_pose()).is_none(), "not playing yet");
        g.play().unwrap();
        let out = g.evaluate(&s.bind_pose()).unwrap();
        assert_eq!(out.transforms[0].translation[0], 11.0);
        assert_eq!(g.frames_evaluated(), 1);
    }

    #[test]
    fn destroyed_graph_rejects_edits_and_evaluation() {
        let s = skel();
        let mut g = LocalGraph::new();
        g.create("t");
        let m = g.create_mixer_node(1, MixConfig::default()).unwrap();
        g.set_output_source("Animation", m).unwrap();
        g.play().unwrap();
        g.destroy();
        assert!(!g.is_valid());
        assert!(g.evaluate(&s.bind_pose()).is_none());
        assert_eq!(
            g.create_mixer_node(1, MixConfig::default()).err(),
            Some(GraphError::Destroyed)
        );
    }
}
