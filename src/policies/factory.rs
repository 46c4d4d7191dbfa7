use std::path::PathBuf;

use burn::tensor::backend::Backend;

use crate::net::{mlp_net_boltzmann, mlp_net_gaussian};
use crate::policies::{BoltzmannPolicy, GaussianPolicy};
use crate::spaces::{ActionSpec, StateSpec};

/// A policy produced by [`make_policy`], tagged by action-space kind.
pub enum PolicyKind<B: Backend> {
    Boltzmann(BoltzmannPolicy<B>),
    Gaussian(GaussianPolicy<B>),
}

/// Builds the policy matching the action space with the default network for
/// that space: Boltzmann for discrete spaces, Gaussian for boxes. Returns
/// `None` for action-space kinds without a policy implementation.
pub fn make_policy<B>(
    state_spec: StateSpec,
    action_spec: ActionSpec,
    model_path: Option<PathBuf>,
) -> Option<PolicyKind<B>>
where
    B: Backend,
    B::Device: Default,
{
    match action_spec {
        ActionSpec::Discrete(spec) => Some(PolicyKind::Boltzmann(BoltzmannPolicy::from_builder(
            state_spec,
            spec,
            mlp_net_boltzmann,
            model_path,
        ))),
        ActionSpec::Box(spec) => Some(PolicyKind::Gaussian(GaussianPolicy::from_builder(
            state_spec,
            spec,
            mlp_net_gaussian,
            model_path,
        ))),
        ActionSpec::MultiDiscrete(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{BoxSpec, DiscreteSpec};
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn discrete_spaces_build_boltzmann_policies() {
        let policy = make_policy::<TestBackend>(
            StateSpec::vector(4),
            ActionSpec::Discrete(DiscreteSpec::new(3)),
            None,
        );
        assert!(matches!(policy, Some(PolicyKind::Boltzmann(_))));
    }

    #[test]
    fn box_spaces_build_gaussian_policies() {
        let policy = make_policy::<TestBackend>(
            StateSpec::vector(4),
            ActionSpec::Box(BoxSpec::symmetric(2, 1.0)),
            None,
        );
        assert!(matches!(policy, Some(PolicyKind::Gaussian(_))));
    }

    #[test]
    fn unhandled_spaces_build_nothing() {
        let policy = make_policy::<TestBackend>(
            StateSpec::vector(4),
            ActionSpec::MultiDiscrete(vec![2, 3]),
            None,
        );
        assert!(policy.is_none());
    }
}
