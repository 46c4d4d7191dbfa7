use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

use crate::error::PolicyError;

/// How observation widths are checked before a forward pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeMode {
    /// Mismatched observations are rejected before reaching the network.
    Strict,
    /// Observations are forwarded as given; the numerical backend surfaces
    /// any true incompatibility.
    Lenient,
}

impl Default for ShapeMode {
    fn default() -> Self {
        ShapeMode::Lenient
    }
}

/// Interface for stochastic actor-critic policies.
pub trait Policy<B: Backend> {
    /// Sampled action for a single observation.
    type Action;
    /// Sampled actions for a batch of observations.
    type ActionBatch;
    /// Distribution object describing the action law.
    type Dist;

    /// Evaluates one observation: exactly one sampled action, the action
    /// distribution it was drawn from, and the critic's state value.
    fn call(
        &mut self,
        observation: Tensor<B, 1>,
    ) -> Result<(Self::Action, Self::Dist, f32), PolicyError>;

    /// Evaluates a batch of observations row by row. Values come back as a
    /// [batch, 1] tensor.
    fn call_batch(
        &mut self,
        observations: Tensor<B, 2>,
    ) -> Result<(Self::ActionBatch, Self::Dist, Tensor<B, 2>), PolicyError>;

    /// Persists the current weights; no-op when no model path is configured.
    fn save(&self) -> Result<(), PolicyError>;
}

pub(crate) fn check_features(
    mode: ShapeMode,
    expected: usize,
    got: usize,
) -> Result<(), PolicyError> {
    if mode == ShapeMode::Strict && got != expected {
        return Err(PolicyError::ShapeMismatch { expected, got });
    }
    Ok(())
}
