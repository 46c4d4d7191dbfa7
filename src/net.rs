use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::Tensor;
use burn::tensor::activation::{relu, softmax, softplus};
use burn::tensor::backend::Backend;

use crate::visualize::{LayerSummary, NetSummary};

pub const TRUNK_WIDTHS: &[usize] = &[64];
pub const BOLTZMANN_POLICY_WIDTHS: &[usize] = &[256];
pub const GAUSSIAN_POLICY_WIDTHS: &[usize] = &[128];
pub const VALUE_WIDTHS: &[usize] = &[128];

/// Builds a network from its input width and output count.
pub type NetBuilder<N> = fn(usize, usize) -> N;

/// Dual-head network for discrete action spaces: a softmax policy head over
/// the action choices and a tanh-bounded value head.
#[derive(Module, Debug)]
pub struct BoltzmannNet<B: Backend> {
    hidden: Vec<Linear<B>>,
    policy: Vec<Linear<B>>,
    policy_head: Linear<B>,
    value: Vec<Linear<B>>,
    value_head: Linear<B>,
}

impl<B> BoltzmannNet<B>
where
    B: Backend,
    B::Device: Default,
{
    pub fn new(input_dim: usize, n_outputs: usize) -> Self {
        assert!(input_dim > 0, "input dimension must be positive");
        assert!(n_outputs > 0, "output count must be positive");
        let device = B::Device::default();
        let (hidden, trunk_width) = stack(input_dim, TRUNK_WIDTHS, &device);
        let (policy, policy_width) = stack(trunk_width, BOLTZMANN_POLICY_WIDTHS, &device);
        let policy_head = LinearConfig::new(policy_width, n_outputs).init(&device);
        let (value, value_width) = stack(trunk_width, VALUE_WIDTHS, &device);
        let value_head = LinearConfig::new(value_width, 1).init(&device);
        Self {
            hidden,
            policy,
            policy_head,
            value,
            value_head,
        }
    }

    /// Runs the network; returns per-action probabilities and state values.
    pub fn forward(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let trunk = forward_stack(&self.hidden, input);
        let policy = forward_stack(&self.policy, trunk.clone());
        let probs = softmax(self.policy_head.forward(policy), 1);
        let value = forward_stack(&self.value, trunk);
        let value = self.value_head.forward(value).tanh();
        (probs, value)
    }

    pub fn summary(&self) -> NetSummary {
        NetSummary {
            name: "mlp_net_boltzmann",
            input_dim: linear_dims(&self.hidden[0]).0,
            trunk: stack_summaries("hidden_layers", &self.hidden, "relu"),
            policy_branch: stack_summaries("policy_layers", &self.policy, "relu"),
            policy_heads: vec![head_summary("policy_head", &self.policy_head, "softmax")],
            value_branch: stack_summaries("value_layers", &self.value, "relu"),
            value_head: head_summary("value_head", &self.value_head, "tanh"),
        }
    }
}

/// Dual-head network for continuous action spaces: per-dimension mean and
/// softplus scale heads and a tanh-bounded value head.
#[derive(Module, Debug)]
pub struct GaussianNet<B: Backend> {
    hidden: Vec<Linear<B>>,
    policy: Vec<Linear<B>>,
    mean_head: Linear<B>,
    std_head: Linear<B>,
    value: Vec<Linear<B>>,
    value_head: Linear<B>,
}

impl<B> GaussianNet<B>
where
    B: Backend,
    B::Device: Default,
{
    pub fn new(input_dim: usize, n_outputs: usize) -> Self {
        assert!(input_dim > 0, "input dimension must be positive");
        assert!(n_outputs > 0, "output count must be positive");
        let device = B::Device::default();
        let (hidden, trunk_width) = stack(input_dim, TRUNK_WIDTHS, &device);
        let (policy, policy_width) = stack(trunk_width, GAUSSIAN_POLICY_WIDTHS, &device);
        let mean_head = LinearConfig::new(policy_width, n_outputs).init(&device);
        let std_head = LinearConfig::new(policy_width, n_outputs).init(&device);
        let (value, value_width) = stack(trunk_width, VALUE_WIDTHS, &device);
        let value_head = LinearConfig::new(value_width, 1).init(&device);
        Self {
            hidden,
            policy,
            mean_head,
            std_head,
            value,
            value_head,
        }
    }

    /// Runs the network; returns means, scales, and state values. The scale
    /// tensor is strictly positive.
    pub fn forward(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
        let trunk = forward_stack(&self.hidden, input);
        let policy = forward_stack(&self.policy, trunk.clone());
        let mean = self.mean_head.forward(policy.clone());
        let std = softplus(self.std_head.forward(policy), 1.0);
        let value = forward_stack(&self.value, trunk);
        let value = self.value_head.forward(value).tanh();
        (mean, std, value)
    }

    pub fn summary(&self) -> NetSummary {
        NetSummary {
            name: "mlp_net_gaussian",
            input_dim: linear_dims(&self.hidden[0]).0,
            trunk: stack_summaries("hidden_layers", &self.hidden, "relu"),
            policy_branch: stack_summaries("policy_layers", &self.policy, "relu"),
            policy_heads: vec![
                head_summary("mean", &self.mean_head, "linear"),
                head_summary("std", &self.std_head, "softplus"),
            ],
            value_branch: stack_summaries("value_layers", &self.value, "relu"),
            value_head: head_summary("value_head", &self.value_head, "tanh"),
        }
    }
}

/// Default discrete architecture with freshly initialized weights.
pub fn mlp_net_boltzmann<B>(input_dim: usize, n_outputs: usize) -> BoltzmannNet<B>
where
    B: Backend,
    B::Device: Default,
{
    BoltzmannNet::new(input_dim, n_outputs)
}

/// Default continuous architecture with freshly initialized weights.
pub fn mlp_net_gaussian<B>(input_dim: usize, n_outputs: usize) -> GaussianNet<B>
where
    B: Backend,
    B::Device: Default,
{
    GaussianNet::new(input_dim, n_outputs)
}

fn stack<B: Backend>(
    input_dim: usize,
    widths: &[usize],
    device: &B::Device,
) -> (Vec<Linear<B>>, usize) {
    let mut layers = Vec::with_capacity(widths.len());
    let mut size = input_dim;
    for &width in widths {
        layers.push(LinearConfig::new(size, width).init(device));
        size = width;
    }
    (layers, size)
}

fn forward_stack<B: Backend>(layers: &[Linear<B>], input: Tensor<B, 2>) -> Tensor<B, 2> {
    let mut activations = input;
    for layer in layers {
        activations = layer.forward(activations);
        activations = relu(activations);
    }
    activations
}

fn linear_dims<B: Backend>(layer: &Linear<B>) -> (usize, usize) {
    let dims = layer.weight.val().dims();
    (dims[0], dims[1])
}

fn linear_params<B: Backend>(layer: &Linear<B>) -> usize {
    let (input, output) = linear_dims(layer);
    let bias = layer.bias.as_ref().map(|bias| bias.val().dims()[0]).unwrap_or(0);
    input * output + bias
}

fn stack_summaries<B: Backend>(
    name: &str,
    layers: &[Linear<B>],
    activation: &'static str,
) -> Vec<LayerSummary> {
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let label = if layers.len() == 1 {
                name.to_string()
            } else {
                format!("{name}_{index}")
            };
            LayerSummary {
                name: label,
                output_dim: linear_dims(layer).1,
                params: linear_params(layer),
                activation,
            }
        })
        .collect()
}

fn head_summary<B: Backend>(
    name: &str,
    layer: &Linear<B>,
    activation: &'static str,
) -> LayerSummary {
    LayerSummary {
        name: name.to_string(),
        output_dim: linear_dims(layer).1,
        params: linear_params(layer),
        activation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn batch(rows: usize, features: usize) -> Tensor<TestBackend, 2> {
        let values: Vec<f32> = (0..rows * features).map(|i| (i % 7) as f32 * 0.1).collect();
        let device = <TestBackend as Backend>::Device::default();
        Tensor::from_data(TensorData::new(values, [rows, features]), &device)
    }

    #[test]
    fn boltzmann_forward_produces_expected_shapes() {
        let network = BoltzmannNet::<TestBackend>::new(4, 3);
        let (probs, value) = network.forward(batch(5, 4));
        assert_eq!(probs.dims(), [5, 3]);
        assert_eq!(value.dims(), [5, 1]);
    }

    #[test]
    fn boltzmann_probabilities_sum_to_one() {
        let network = BoltzmannNet::<TestBackend>::new(6, 4);
        let (probs, _) = network.forward(batch(3, 6));
        let sums: Vec<f32> = probs
            .sum_dim(1)
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        for sum in sums {
            assert!((sum - 1.0).abs() < 1.0e-5, "row sums to {sum}");
        }
    }

    #[test]
    fn value_head_is_bounded() {
        let network = BoltzmannNet::<TestBackend>::new(4, 2);
        let (_, value) = network.forward(batch(8, 4));
        let values: Vec<f32> = value.into_data().to_vec::<f32>().expect("tensor conversion");
        for value in values {
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn gaussian_heads_match_action_dimensions() {
        let network = GaussianNet::<TestBackend>::new(4, 3);
        let (mean, std, value) = network.forward(batch(2, 4));
        assert_eq!(mean.dims(), [2, 3]);
        assert_eq!(std.dims(), [2, 3]);
        assert_eq!(value.dims(), [2, 1]);
    }

    #[test]
    fn gaussian_scale_is_positive() {
        let network = GaussianNet::<TestBackend>::new(5, 2);
        let (_, std, _) = network.forward(batch(4, 5));
        let scales: Vec<f32> = std.into_data().to_vec::<f32>().expect("tensor conversion");
        for scale in scales {
            assert!(scale > 0.0, "scale {scale} must be positive");
        }
    }

    #[test]
    fn summary_matches_module_parameter_count() {
        let boltzmann = BoltzmannNet::<TestBackend>::new(4, 2);
        assert_eq!(boltzmann.summary().total_params(), boltzmann.num_params());
        let gaussian = GaussianNet::<TestBackend>::new(4, 2);
        assert_eq!(gaussian.summary().total_params(), gaussian.num_params());
    }

    #[test]
    fn summary_reports_layer_names_and_widths() {
        let network = BoltzmannNet::<TestBackend>::new(4, 2);
        let summary = network.summary();
        assert_eq!(summary.input_dim, 4);
        assert_eq!(summary.trunk[0].name, "hidden_layers");
        assert_eq!(summary.trunk[0].output_dim, 64);
        assert_eq!(summary.policy_branch[0].output_dim, 256);
        assert_eq!(summary.policy_heads[0].output_dim, 2);
        assert_eq!(summary.value_head.output_dim, 1);
    }
}
