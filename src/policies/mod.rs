pub mod boltzmann;
pub mod factory;
pub mod gaussian;

pub use boltzmann::BoltzmannPolicy;
pub use factory::{PolicyKind, make_policy};
pub use gaussian::GaussianPolicy;
