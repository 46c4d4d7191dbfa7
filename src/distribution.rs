use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Int, Tensor, TensorData};
use rand::Rng;
use rand::distributions::{Distribution as _, WeightedIndex};

/// Probabilities below this floor are clamped before taking logarithms.
const PROB_FLOOR: f32 = 1.0e-9;
/// 0.5 * ln(2 * pi).
const HALF_LN_TAU: f32 = 0.918_938_5;

/// Categorical distribution over a batch of probability rows.
#[derive(Clone, Debug)]
pub struct Categorical<B: Backend> {
    probs: Tensor<B, 2>,
}

impl<B: Backend> Categorical<B> {
    pub fn new(probs: Tensor<B, 2>) -> Self {
        Self { probs }
    }

    /// Number of rows (batch size).
    pub fn len(&self) -> usize {
        self.probs.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_categories(&self) -> usize {
        self.probs.dims()[1]
    }

    pub fn probs(&self) -> &Tensor<B, 2> {
        &self.probs
    }

    /// Draws one action index per row.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let [rows, cols] = self.probs.dims();
        let weights: Vec<f32> = self
            .probs
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("tensor conversion");
        let mut samples = Vec::with_capacity(rows);
        for row in weights.chunks(cols) {
            let index = WeightedIndex::new(row.iter().copied())
                .expect("action probabilities must be finite and non-negative");
            samples.push(index.sample(rng));
        }
        samples
    }

    /// Log-probability of the chosen action index, one entry per row.
    pub fn log_prob(&self, actions: &[usize]) -> Tensor<B, 1> {
        let [rows, _] = self.probs.dims();
        assert_eq!(actions.len(), rows, "one action per distribution row");
        let device = self.probs.device();
        let indices: Vec<i64> = actions.iter().map(|&action| action as i64).collect();
        let indices = Tensor::<B, 2, Int>::from_data(TensorData::new(indices, [rows, 1]), &device);
        self.probs
            .clone()
            .gather(1, indices)
            .clamp_min(PROB_FLOOR)
            .log()
            .reshape([rows])
    }

    /// Shannon entropy, one entry per row.
    pub fn entropy(&self) -> Tensor<B, 1> {
        let [rows, _] = self.probs.dims();
        let log_probs = self.probs.clone().clamp_min(PROB_FLOOR).log();
        let plogp = (self.probs.clone() * log_probs).sum_dim(1);
        (-plogp).reshape([rows])
    }
}

/// Diagonal Gaussian distribution parameterized by per-dimension mean and
/// scale tensors.
#[derive(Clone, Debug)]
pub struct Normal<B: Backend> {
    mean: Tensor<B, 2>,
    std: Tensor<B, 2>,
}

impl<B: Backend> Normal<B> {
    pub fn new(mean: Tensor<B, 2>, std: Tensor<B, 2>) -> Self {
        assert_eq!(mean.dims(), std.dims(), "mean and std shapes must match");
        Self { mean, std }
    }

    pub fn mean(&self) -> &Tensor<B, 2> {
        &self.mean
    }

    pub fn std(&self) -> &Tensor<B, 2> {
        &self.std
    }

    /// Reparameterized draw: mean + std * eps with eps ~ N(0, 1) from the
    /// backend's tensor sampler.
    pub fn sample(&self) -> Tensor<B, 2> {
        let eps = Tensor::random(
            self.mean.shape(),
            Distribution::Normal(0.0, 1.0),
            &self.mean.device(),
        );
        self.mean.clone() + self.std.clone() * eps
    }

    /// Per-dimension log-density of the given values.
    pub fn log_prob(&self, values: Tensor<B, 2>) -> Tensor<B, 2> {
        let std = self.std.clone().clamp_min(PROB_FLOOR);
        let z = (values - self.mean.clone()) / std.clone();
        ((z.clone() * z).mul_scalar(-0.5) - std.log()).sub_scalar(HALF_LN_TAU)
    }

    /// Per-dimension differential entropy: 0.5 + 0.5 ln(2 pi) + ln(std).
    pub fn entropy(&self) -> Tensor<B, 2> {
        self.std
            .clone()
            .clamp_min(PROB_FLOOR)
            .log()
            .add_scalar(0.5 + HALF_LN_TAU)
    }
}
