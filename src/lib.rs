//! Stochastic policy wrappers over dual-head actor-critic networks for reinforcement learning workloads.

pub mod checkpoint;
pub mod distribution;
pub mod error;
pub mod net;
pub mod policies;
pub mod policy;
pub mod spaces;
pub mod timing;
pub mod visualize;

pub use crate::checkpoint::{Checkpoint, CheckpointMetadata, ModelFile, NetKind};
pub use crate::distribution::{Categorical, Normal};
pub use crate::error::{CheckpointError, PolicyError};
pub use crate::net::{BoltzmannNet, GaussianNet, NetBuilder, mlp_net_boltzmann, mlp_net_gaussian};
pub use crate::policies::{BoltzmannPolicy, GaussianPolicy, PolicyKind, make_policy};
pub use crate::policy::{Policy, ShapeMode};
pub use crate::spaces::{ActionSpec, BoxSpec, DiscreteSpec, StateSpec};
pub use crate::timing::{FnTimer, time};
pub use crate::visualize::{LayerSummary, NetSummary, render_architecture, render_summary};
