//! Frame controller: owns the shared parameters and the mix graph for one bone and
//! drives their lifecycle.
//!
//! Teardown order is fixed: the graph is destroyed first so no job can run, then the
//! shared parameter cell is released.

use log::{error, info, warn};

use crate::config::{clamp_alpha, ControllerConfig};
use crate::error::{BoneModError, Result};
use crate::graph::{self, GraphEngine, MixConfig, MixGraph};
use crate::job::BoneModifyJob;
use crate::math::Vec3;
use crate::params::{BoneParams, ModifyMode, SharedParams};
use crate::transform::{BoneResolver, TransformHandle};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Running,
    Destroyed,
}

#[derive(Debug)]
pub struct FrameController<E: GraphEngine> {
    engine: E,
    config: ControllerConfig,
    state: ControllerState,
    params: Option<SharedParams>,
    graph: Option<MixGraph>,
}

impl<E: GraphEngine> FrameController<E> {
    pub fn new(config: ControllerConfig, engine: E) -> Self {
        Self {
            engine,
            config,
            state: ControllerState::Uninitialized,
            params: None,
            graph: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn graph(&self) -> Option<&MixGraph> {
        self.graph.as_ref()
    }

    /// Snapshot of the parameters the job will read next frame.
    pub fn params(&self) -> Option<BoneParams> {
        self.params.as_ref().map(SharedParams::get)
    }

    pub fn shared_params(&self) -> Option<&SharedParams> {
        self.params.as_ref()
    }

    /// Change the mixer config used by the next `start`. Ignored once started; use
    /// [`rebuild`](Self::rebuild) on a running controller.
    pub fn set_mix_config(&mut self, mix: MixConfig) -> bool {
        if self.state != ControllerState::Uninitialized {
            warn!("mix config change ignored after start; rebuild the graph instead");
            return false;
        }
        self.config.mix = mix;
        true
    }

    /// Change the bone used by the next `start`. Ignored once started; use
    /// [`rebind`](Self::rebind) on a running controller.
    pub fn set_bone(&mut self, bone: &str) -> bool {
        if self.state != ControllerState::Uninitialized {
            warn!("bone change ignored after start; rebind instead");
            return false;
        }
        self.config.bone = bone.to_string();
        true
    }

    /// Bind the configured bone, allocate the parameter cell and build the graph.
    ///
    /// On failure the controller stays `Uninitialized` and no graph is left behind.
    pub fn start<R>(&mut self, resolver: &mut R) -> Result<()>
    where
        R: BoneResolver,
        R::Handle: TransformHandle<Stream = E::Stream> + 'static,
    {
        if self.state != ControllerState::Uninitialized {
            warn!("start ignored: controller is {:?}", self.state);
            return Ok(());
        }
        let handle = bind(resolver, &self.config.bone)?;
        let params = SharedParams::new(self.config.params());
        let job = BoneModifyJob::new(handle, params.clone())?;
        let graph = graph::build(&mut self.engine, job, self.config.mix)?;

        info!(
            "bone modifier started on '{}' (single_layer_optimization={})",
            self.config.bone, self.config.mix.single_layer_optimization
        );
        self.params = Some(params);
        self.graph = Some(graph);
        self.state = ControllerState::Running;
        Ok(())
    }

    /// Push this frame's parameters. No-op unless running.
    pub fn tick(&mut self, mode: ModifyMode, target: Vec3, alpha: f32) {
        if self.state != ControllerState::Running {
            return;
        }
        self.config.mode = mode;
        self.config.target = target;
        self.config.alpha = alpha;
        if let Some(params) = &self.params {
            params.set(mode, target, clamp_alpha(alpha));
        }
    }

    /// Like [`tick`](Self::tick) for an untyped mode value.
    pub fn tick_raw(&mut self, mode: u8, target: Vec3, alpha: f32) -> Result<()> {
        let mode = ModifyMode::try_from(mode)?;
        self.tick(mode, target, alpha);
        Ok(())
    }

    /// Replace the running graph with one built from `mix`. Before start this only
    /// records the config.
    pub fn rebuild<R>(&mut self, resolver: &mut R, mix: MixConfig) -> Result<()>
    where
        R: BoneResolver,
        R::Handle: TransformHandle<Stream = E::Stream> + 'static,
    {
        match self.state {
            ControllerState::Uninitialized => {
                self.config.mix = mix;
                Ok(())
            }
            ControllerState::Destroyed => {
                warn!("rebuild ignored: controller destroyed");
                Ok(())
            }
            ControllerState::Running => {
                let handle = bind(resolver, &self.config.bone)?;
                self.config.mix = mix;
                self.replace_graph(handle)
            }
        }
    }

    /// Point the job at another bone. A running graph is rebuilt; if the new bone
    /// does not resolve the current graph keeps running.
    pub fn rebind<R>(&mut self, resolver: &mut R, bone: &str) -> Result<()>
    where
        R: BoneResolver,
        R::Handle: TransformHandle<Stream = E::Stream> + 'static,
    {
        match self.state {
            ControllerState::Uninitialized => {
                self.set_bone(bone);
                Ok(())
            }
            ControllerState::Destroyed => {
                warn!("rebind ignored: controller destroyed");
                Ok(())
            }
            ControllerState::Running => {
                let handle = bind(resolver, bone)?;
                self.config.bone = bone.to_string();
                self.replace_graph(handle)
            }
        }
    }

    fn replace_graph<H>(&mut self, handle: H) -> Result<()>
    where
        H: TransformHandle<Stream = E::Stream> + 'static,
    {
        let Some(params) = self.params.clone() else {
            return Err(BoneModError::GraphConstruction(
                "parameter cell missing while running".into(),
            ));
        };
        let job = BoneModifyJob::new(handle, params)?;
        if let Some(old) = self.graph.take() {
            graph::teardown(&mut self.engine, old);
        }
        match graph::build(&mut self.engine, job, self.config.mix) {
            Ok(g) => {
                info!(
                    "mix graph rebuilt for '{}' (single_layer_optimization={})",
                    self.config.bone, self.config.mix.single_layer_optimization
                );
                self.graph = Some(g);
                Ok(())
            }
            Err(err) => {
                error!("rebuild failed, stopping controller: {err}");
                self.stop();
                Err(err)
            }
        }
    }

    /// Destroy the graph, then release the parameter cell. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state != ControllerState::Running {
            return;
        }
        if let Some(g) = self.graph.take() {
            graph::teardown(&mut self.engine, g);
        }
        self.params = None;
        self.state = ControllerState::Destroyed;
        info!("bone modifier stopped");
    }
}

impl<E: GraphEngine> Drop for FrameController<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bind<R: BoneResolver>(resolver: &mut R, bone: &str) -> Result<R::Handle> {
    resolver
        .resolve(bone)
        .filter(|h| h.is_bound())
        .ok_or_else(|| BoneModError::Bind(bone.to_string()))
}
