use serde::{Deserialize, Serialize};

/// Shape of the observations a policy consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpec {
    shape: Vec<usize>,
}

impl StateSpec {
    pub fn new(shape: Vec<usize>) -> Self {
        assert!(!shape.is_empty(), "state shape needs at least one axis");
        assert!(
            shape.iter().all(|&axis| axis > 0),
            "state shape axes must be positive"
        );
        Self { shape }
    }

    /// Flat feature-vector shape with the given length.
    pub fn vector(len: usize) -> Self {
        Self::new(vec![len])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flattened feature count.
    pub fn dim(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Discrete action space with a fixed number of choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpec {
    pub n: usize,
}

impl DiscreteSpec {
    pub fn new(n: usize) -> Self {
        assert!(n >= 1, "discrete spaces need at least one action");
        Self { n }
    }
}

/// Continuous action space bounded per dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpec {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert!(!low.is_empty(), "box spaces need at least one dimension");
        assert_eq!(
            low.len(),
            high.len(),
            "box bounds must have matching lengths"
        );
        for (lo, hi) in low.iter().zip(&high) {
            assert!(lo.is_finite() && hi.is_finite(), "box bounds must be finite");
            assert!(lo <= hi, "box lower bound exceeds upper bound");
        }
        Self { low, high }
    }

    /// Symmetric bounds of the form [-extent, extent] in every dimension.
    pub fn symmetric(dims: usize, extent: f32) -> Self {
        assert!(extent >= 0.0, "extent must be non-negative");
        Self::new(vec![-extent; dims], vec![extent; dims])
    }

    pub fn low(&self) -> &[f32] {
        &self.low
    }

    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Number of action dimensions.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn contains(&self, action: &[f32]) -> bool {
        action.len() == self.dim()
            && action
                .iter()
                .zip(&self.low)
                .zip(&self.high)
                .all(|((value, lo), hi)| *value >= *lo && *value <= *hi)
    }
}

/// Tagged description of an action space, used by the policy factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionSpec {
    Discrete(DiscreteSpec),
    Box(BoxSpec),
    MultiDiscrete(Vec<usize>),
}
