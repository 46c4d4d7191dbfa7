use std::path::{Path, PathBuf};

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::checkpoint::{CheckpointMetadata, ModelFile, NetKind, restore_net, snapshot};
use crate::distribution::Categorical;
use crate::error::PolicyError;
use crate::net::{BoltzmannNet, NetBuilder, mlp_net_boltzmann};
use crate::policy::{Policy, ShapeMode, check_features};
use crate::spaces::{DiscreteSpec, StateSpec};
use crate::visualize::NetSummary;

/// Stochastic policy for discrete action spaces. Actions are drawn from the
/// categorical distribution produced by the network's softmax head.
pub struct BoltzmannPolicy<B: Backend> {
    state_spec: StateSpec,
    action_spec: DiscreteSpec,
    net: BoltzmannNet<B>,
    file: ModelFile,
    shape_mode: ShapeMode,
    rng: StdRng,
}

impl<B> BoltzmannPolicy<B>
where
    B: Backend,
    B::Device: Default,
{
    /// Resolves the network from a builder, a stored model, or both. Fails
    /// when neither is given, and when only a path is given but the stored
    /// model cannot be restored.
    pub fn new(
        state_spec: StateSpec,
        action_spec: DiscreteSpec,
        net: Option<NetBuilder<BoltzmannNet<B>>>,
        model_path: Option<PathBuf>,
    ) -> Result<Self, PolicyError> {
        match (net, model_path) {
            (None, None) => Err(PolicyError::MissingApproximator),
            (Some(builder), path) => Ok(Self::from_builder(state_spec, action_spec, builder, path)),
            (None, Some(path)) => {
                let metadata = metadata_for(&state_spec, action_spec);
                let file = ModelFile::new(Some(path));
                let net = restore_net(&file, &metadata, mlp_net_boltzmann)?;
                if let Some(path) = file.path() {
                    info!("loaded boltzmann policy weights from {}", path.display());
                }
                Ok(Self::assemble(state_spec, action_spec, net, file))
            }
        }
    }

    /// Builds the policy infallibly: the stored model is used when it can be
    /// restored, the builder's fresh network otherwise.
    pub fn from_builder(
        state_spec: StateSpec,
        action_spec: DiscreteSpec,
        builder: NetBuilder<BoltzmannNet<B>>,
        model_path: Option<PathBuf>,
    ) -> Self {
        let metadata = metadata_for(&state_spec, action_spec);
        let file = ModelFile::new(model_path);
        let net = match file.path() {
            None => builder(metadata.input_dim, metadata.n_outputs),
            Some(path) => match restore_net(&file, &metadata, builder) {
                Ok(net) => {
                    info!("loaded boltzmann policy weights from {}", path.display());
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

    /// Replaces the sampling seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_shape_mode(mut self, mode: ShapeMode) -> Self {
        self.shape_mode = mode;
        self
    }

    pub fn net(&self) -> &BoltzmannNet<B> {
        &self.net
    }

    pub fn state_spec(&self) -> &StateSpec {
        &self.state_spec
    }

    pub fn action_spec(&self) -> DiscreteSpec {
        self.action_spec
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }

    pub fn summary(&self) -> NetSummary {
        self.net.summary()
    }

    fn assemble(
        state_spec: StateSpec,
        action_spec: DiscreteSpec,
        net: BoltzmannNet<B>,
        file: ModelFile,
    ) -> Self {
        Self {
            state_spec,
            action_spec,
            net,
            file,
            shape_mode: ShapeMode::default(),
            rng: StdRng::from_entropy(),
        }
    }

    fn evaluate(
        &mut self,
        observations: Tensor<B, 2>,
    ) -> (Vec<usize>, Categorical<B>, Tensor<B, 2>) {
        let (probs, values) = self.net.forward(observations);
        let dist = Categorical::new(probs);
        let actions = dist.sample(&mut self.rng);
        (actions, dist, values)
    }
}

impl<B> Policy<B> for BoltzmannPolicy<B>
where
    B: Backend,
    B::Device: Default,
{
    type Action = usize;
    type ActionBatch = Vec<usize>;
    type Dist = Categorical<B>;

    fn call(
        &mut self,
        observation: Tensor<B, 1>,
    ) -> Result<(usize, Categorical<B>, f32), PolicyError> {
        let [features] = observation.dims();
        check_features(self.shape_mode, self.state_spec.dim(), features)?;
        let (actions, dist, values) = self.evaluate(observation.reshape([1, features]));
        let value = values
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion")[0];
        Ok((actions[0], dist, value))
    }

    fn call_batch(
        &mut self,
        observations: Tensor<B, 2>,
    ) -> Result<(Vec<usize>, Categorical<B>, Tensor<B, 2>), PolicyError> {
        let [_, features] = observations.dims();
        check_features(self.shape_mode, self.state_spec.dim(), features)?;
        Ok(self.evaluate(observations))
    }

    fn save(&self) -> Result<(), PolicyError> {
        if self.file.path().is_none() {
            return Ok(());
        }
        let metadata = metadata_for(&self.state_spec, self.action_spec);
        let checkpoint = snapshot(&self.net, metadata)?;
        self.file.save(&checkpoint)?;
        Ok(())
    }
}

fn metadata_for(state_spec: &StateSpec, action_spec: DiscreteSpec) -> CheckpointMetadata {
    CheckpointMetadata::new(NetKind::Boltzmann, state_spec.dim(), action_spec.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn observation(values: &[f32]) -> Tensor<TestBackend, 1> {
        let device = <TestBackend as Backend>::Device::default();
        Tensor::from_data(TensorData::new(values.to_vec(), [values.len()]), &device)
    }

    fn policy(n_actions: usize) -> BoltzmannPolicy<TestBackend> {
        BoltzmannPolicy::from_builder(
            StateSpec::vector(4),
            DiscreteSpec::new(n_actions),
            mlp_net_boltzmann,
            None,
        )
        .with_seed(7)
    }

    #[test]
    fn call_returns_one_action_distribution_and_value() {
        let mut policy = policy(3);
        let (action, dist, value) = policy
            .call(observation(&[0.1, -0.4, 0.7, 0.0]))
            .expect("call");
        assert!(action < 3);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.n_categories(), 3);
        assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn call_batch_returns_one_action_per_row() {
        let mut policy = policy(5);
        let device = <TestBackend as Backend>::Device::default();
        let batch = Tensor::from_data(TensorData::new(vec![0.2; 12], [3, 4]), &device);
        let (actions, dist, values) = policy.call_batch(batch).expect("call_batch");
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|&action| action < 5));
        assert_eq!(dist.len(), 3);
        assert_eq!(values.dims(), [3, 1]);
    }

    #[test]
    fn missing_network_and_path_is_an_error() {
        let result = BoltzmannPolicy::<TestBackend>::new(
            StateSpec::vector(4),
            DiscreteSpec::new(2),
            None,
            None,
        );
        assert!(matches!(result, Err(PolicyError::MissingApproximator)));
    }

    #[test]
    fn strict_mode_rejects_wrong_observation_width() {
        let mut policy = policy(2).with_shape_mode(ShapeMode::Strict);
        let result = policy.call(observation(&[0.0, 1.0, 2.0]));
        assert!(matches!(
            result,
            Err(PolicyError::ShapeMismatch {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn save_without_path_succeeds() {
        let policy = policy(2);
        assert!(policy.path().is_none());
        assert!(policy.save().is_ok());
    }
}
