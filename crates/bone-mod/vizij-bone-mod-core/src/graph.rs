//! Mix graph assembly: one job node feeding one mixer node feeding the skeleton output.
//!
//! The graph engine itself is injected through [`GraphEngine`]. This module only
//! decides the topology and forwards the construction-time [`MixConfig`] untouched.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BoneModError, GraphError, Result};
use crate::job::AnimationJob;

/// Name of the output the mixer is published on.
pub const ANIMATION_OUTPUT: &str = "Animation";

/// Name given to graphs created by [`build`].
pub const GRAPH_NAME: &str = "ModifyBone";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Construction-time options for the mixer node.
///
/// The engine reads these once, when the mixer is created. Changing a config value
/// afterwards has no defined effect on a graph that already exists; build a new graph
/// instead.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixConfig {
    /// Let the engine special-case a mixer that has a single input.
    #[serde(default)]
    pub single_layer_optimization: bool,
}

/// Graph-execution engine supplied by the host.
pub trait GraphEngine {
    /// Per-frame pose stream jobs read and write.
    type Stream;

    /// Start a new, empty graph, discarding any previous one.
    fn create(&mut self, name: &str);

    fn create_job_node(
        &mut self,
        job: Box<dyn AnimationJob<Self::Stream>>,
        input_count: usize,
    ) -> std::result::Result<NodeId, GraphError>;

    fn create_mixer_node(
        &mut self,
        input_count: usize,
        config: MixConfig,
    ) -> std::result::Result<NodeId, GraphError>;

    fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        port: usize,
        weight: f32,
    ) -> std::result::Result<(), GraphError>;

    /// Publish `node` as the source of the named skeletal output.
    fn set_output_source(
        &mut self,
        output: &str,
        node: NodeId,
    ) -> std::result::Result<(), GraphError>;

    fn play(&mut self) -> std::result::Result<(), GraphError>;

    /// Destroy the current graph. No job is invoked after this returns.
    fn destroy(&mut self);

    fn is_valid(&self) -> bool;
}

/// Handle to a built mix graph.
#[derive(Debug, Clone, PartialEq)]
pub struct MixGraph {
    job_node: NodeId,
    mixer_node: NodeId,
    output: &'static str,
    config: MixConfig,
}

impl MixGraph {
    pub fn job_node(&self) -> NodeId {
        self.job_node
    }

    pub fn mixer_node(&self) -> NodeId {
        self.mixer_node
    }

    pub fn output(&self) -> &str {
        self.output
    }

    /// Config the mixer was created with. There is no setter.
    pub fn config(&self) -> MixConfig {
        self.config
    }
}

/// Build `job -> mixer(port 0, weight 1.0) -> output` and start playback.
///
/// Fails with `GraphConstruction` if the job is not bound to a bone. If the engine
/// rejects any step, the partial graph is destroyed before returning.
pub fn build<E, J>(engine: &mut E, job: J, config: MixConfig) -> Result<MixGraph>
where
    E: GraphEngine,
    J: AnimationJob<E::Stream> + 'static,
{
    if !job.is_bound() {
        return Err(BoneModError::GraphConstruction(
            "job transform handle is not bound".into(),
        ));
    }

    engine.create(GRAPH_NAME);
    match wire(engine, Box::new(job), config) {
        Ok(graph) => Ok(graph),
        Err(err) => {
            engine.destroy();
            Err(BoneModError::GraphConstruction(err.to_string()))
        }
    }
}

fn wire<E: GraphEngine>(
    engine: &mut E,
    job: Box<dyn AnimationJob<E::Stream>>,
    config: MixConfig,
) -> std::result::Result<MixGraph, GraphError> {
    let job_node = engine.create_job_node(job, 1)?;
    let mixer_node = engine.create_mixer_node(1, config)?;
    debug!(
        "mix graph: job {:?} -> mixer {:?} (single_layer_optimization={})",
        job_node, mixer_node, config.single_layer_optimization
    );
    engine.connect(job_node, mixer_node, 0, 1.0)?;
    engine.set_output_source(ANIMATION_OUTPUT, mixer_node)?;
    engine.play()?;
    Ok(MixGraph {
        job_node,
        mixer_node,
        output: ANIMATION_OUTPUT,
        config,
    })
}

/// Destroy the engine graph backing `graph`, if it is still alive.
pub fn teardown<E: GraphEngine>(engine: &mut E, graph: MixGraph) {
    if engine.is_valid() {
        debug!("destroying mix graph (mixer {:?})", graph.mixer_node);
        engine.destroy();
    }
}
