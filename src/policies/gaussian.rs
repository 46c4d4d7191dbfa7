use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use tracing::{info, warn};

use crate::checkpoint::{CheckpointMetadata, ModelFile, NetKind, restore_net, snapshot};
use crate::distribution::Normal;
use crate::error::PolicyError;
use crate::net::{GaussianNet, NetBuilder, mlp_net_gaussian};
use crate::policy::{Policy, ShapeMode, check_features};
use crate::spaces::{BoxSpec, StateSpec};
use crate::visualize::NetSummary;

/// Stochastic policy for continuous action spaces. Actions are drawn from
/// the diagonal Gaussian parameterized by the network's mean and scale
/// heads, then clamped into the box bounds supplied at construction.
pub struct GaussianPolicy<B: Backend> {
    state_spec: StateSpec,
    action_spec: BoxSpec,
    net: GaussianNet<B>,
    file: ModelFile,
    shape_mode: ShapeMode,
}

impl<B> GaussianPolicy<B>
where
    B: Backend,
    B::Device: Default,
{
    /// Resolves the network from a builder, a stored model, or both. Fails
    /// when neither is given, and when only a path is given but the stored
    /// model cannot be restored.
    pub fn new(
        state_spec: StateSpec,
        action_spec: BoxSpec,
        net: Option<NetBuilder<GaussianNet<B>>>,
        model_path: Option<PathBuf>,
    ) -> Result<Self, PolicyError> {
        match (net, model_path) {
            (None, None) => Err(PolicyError::MissingApproximator),
            (Some(builder), path) => Ok(Self::from_builder(state_spec, action_spec, builder, path)),
            (None, Some(path)) => {
                let metadata = metadata_for(&state_spec, &action_spec);
                let file = ModelFile::new(Some(path));
                let net = restore_net(&file, &metadata, mlp_net_gaussian)?;
                if let Some(path) = file.path() {
                    info!("loaded gaussian policy weights from {}", path.display());
                }
                Ok(Self::assemble(state_spec, action_spec, net, file))
            }
        }
    }

    /// Builds the policy infallibly: the stored model is used when it can be
    /// restored, the builder's fresh network otherwise.
    pub fn from_builder(
        state_spec: StateSpec,
        action_spec: BoxSpec,
        builder: NetBuilder<GaussianNet<B>>,
        model_path: Option<PathBuf>,
    ) -> Self {
        let metadata = metadata_for(&state_spec, &action_spec);
        let file = ModelFile::new(model_path);
        let net = match file.path() {
            None => builder(metadata.input_dim, metadata.n_outputs),
            Some(path) => match restore_net(&file, &metadata, builder) {
                Ok(net) => {
                    info!("loaded gaussian policy weights from {}", path.display());
                    net
                }
                Err(err) => {
                    warn!(
                        "could not restore {} ({}); starting from a fresh network",
                        path.display(),
                        err
                    );
                    builder(metadata.input_dim, metadata.n_outputs)
                }
            },
        };
        Self::assemble(state_spec, action_spec, net, file)
    }

    pub fn with_shape_mode(mut self, mode: ShapeMode) -> Self {
        self.shape_mode = mode;
        self
    }

    pub fn net(&self) -> &GaussianNet<B> {
        &self.net
    }

    pub fn state_spec(&self) -> &StateSpec {
        &self.state_spec
    }

    pub fn action_spec(&self) -> &BoxSpec {
        &self.action_spec
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }

    pub fn summary(&self) -> NetSummary {
        self.net.summary()
    }

    fn assemble(
        state_spec: StateSpec,
        action_spec: BoxSpec,
        net: GaussianNet<B>,
        file: ModelFile,
    ) -> Self {
        Self {
            state_spec,
            action_spec,
            net,
            file,
            shape_mode: ShapeMode::default(),
        }
    }

    fn evaluate(&self, observations: Tensor<B, 2>) -> (Tensor<B, 2>, Normal<B>, Tensor<B, 2>) {
        let (mean, std, values) = self.net.forward(observations);
        let dist = Normal::new(mean, std);
        let actions = self.clip(dist.sample());
        (actions, dist, values)
    }

    /// Clamps sampled actions into the box bounds, dimension by dimension.
    /// The distribution itself stays unclipped so its densities remain
    /// well-defined.
    fn clip(&self, actions: Tensor<B, 2>) -> Tensor<B, 2> {
        let [rows, dims] = actions.dims();
        let device = actions.device();
        let low = Tensor::<B, 2>::from_data(
            TensorData::new(self.action_spec.low().to_vec(), [1, dims]),
            &device,
        )
        .repeat_dim(0, rows);
        let high = Tensor::<B, 2>::from_data(
            TensorData::new(self.action_spec.high().to_vec(), [1, dims]),
            &device,
        )
        .repeat_dim(0, rows);
        actions.max_pair(low).min_pair(high)
    }
}

impl<B> Policy<B> for GaussianPolicy<B>
where
    B: Backend,
    B::Device: Default,
{
    type Action = Vec<f32>;
    type ActionBatch = Tensor<B, 2>;
    type Dist = Normal<B>;

    fn call(
        &mut self,
        observation: Tensor<B, 1>,
    ) -> Result<(Vec<f32>, Normal<B>, f32), PolicyError> {
        let [features] = observation.dims();
        check_features(self.shape_mode, self.state_spec.dim(), features)?;
        let (actions, dist, values) = self.evaluate(observation.reshape([1, features]));
        let action = actions
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        let value = values
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion")[0];
        Ok((action, dist, value))
    }

    fn call_batch(
        &mut self,
        observations: Tensor<B, 2>,
    ) -> Result<(Tensor<B, 2>, Normal<B>, Tensor<B, 2>), PolicyError> {
        let [_, features] = observations.dims();
        check_features(self.shape_mode, self.state_spec.dim(), features)?;
        Ok(self.evaluate(observations))
    }

    fn save(&self) -> Result<(), PolicyError> {
        if self.file.path().is_none() {
            return Ok(());
        }
        let metadata = metadata_for(&self.state_spec, &self.action_spec);
        let checkpoint = snapshot(&self.net, metadata)?;
        self.file.save(&checkpoint)?;
        Ok(())
    }
}

fn metadata_for(state_spec: &StateSpec, action_spec: &BoxSpec) -> CheckpointMetadata {
    CheckpointMetadata::new(NetKind::Gaussian, state_spec.dim(), action_spec.dim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn observation(values: &[f32]) -> Tensor<TestBackend, 1> {
        let device = <TestBackend as Backend>::Device::default();
        Tensor::from_data(TensorData::new(values.to_vec(), [values.len()]), &device)
    }

    fn policy(bounds: BoxSpec) -> GaussianPolicy<TestBackend> {
        GaussianPolicy::from_builder(StateSpec::vector(3), bounds, mlp_net_gaussian, None)
    }

    #[test]
    fn call_returns_one_action_per_dimension() {
        let mut policy = policy(BoxSpec::symmetric(2, 1.0));
        let (action, dist, value) = policy.call(observation(&[0.3, -0.2, 0.5])).expect("call");
        assert_eq!(action.len(), 2);
        assert_eq!(dist.mean().dims(), [1, 2]);
        assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn sampled_actions_stay_inside_the_box() {
        let bounds = BoxSpec::new(vec![-0.01, 0.0], vec![0.01, 0.02]);
        let mut policy = policy(bounds.clone());
        let device = <TestBackend as Backend>::Device::default();
        let batch = Tensor::from_data(TensorData::new(vec![0.4; 24], [8, 3]), &device);
        let (actions, _, _) = policy.call_batch(batch).expect("call_batch");
        let values: Vec<f32> = actions
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        for pair in values.chunks(2) {
            assert!(bounds.contains(pair), "action {pair:?} escaped the box");
        }
    }

    #[test]
    fn clipping_leaves_the_distribution_untouched() {
        let bounds = BoxSpec::symmetric(2, 1.0e-4);
        let mut policy = policy(bounds.clone());
        let device = <TestBackend as Backend>::Device::default();
        let batch = Tensor::from_data(TensorData::new(vec![0.2; 48], [16, 3]), &device);
        let (actions, dist, _) = policy.call_batch(batch).expect("call_batch");
        let clipped: Vec<f32> = actions
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        for pair in clipped.chunks(2) {
            assert!(bounds.contains(pair), "action {pair:?} escaped the box");
        }
        let scales: Vec<f32> = dist
            .std()
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        for scale in scales {
            assert!(scale > 1.0e-4, "scale {scale} was clamped into the box");
        }
    }

    #[test]
    fn missing_network_and_path_is_an_error() {
        let result = GaussianPolicy::<TestBackend>::new(
            StateSpec::vector(3),
            BoxSpec::symmetric(1, 1.0),
            None,
            None,
        );
        assert!(matches!(result, Err(PolicyError::MissingApproximator)));
    }

    #[test]
    fn strict_mode_rejects_wrong_observation_width() {
        let mut policy =
            policy(BoxSpec::symmetric(1, 1.0)).with_shape_mode(ShapeMode::Strict);
        let result = policy.call(observation(&[0.0, 1.0]));
        assert!(matches!(result, Err(PolicyError::ShapeMismatch { .. })));
    }

    #[test]
    fn summary_reports_both_policy_heads() {
        let policy = policy(BoxSpec::symmetric(2, 1.0));
        let summary = policy.summary();
        assert_eq!(summary.name, "mlp_net_gaussian");
        assert_eq!(summary.policy_heads.len(), 2);
        assert_eq!(summary.policy_heads[0].name, "mean");
        assert_eq!(summary.policy_heads[1].name, "std");
        assert_eq!(summary.policy_heads[0].output_dim, 2);
    }
}
