//! Fixed probabilities and stun length.
//!
//! These are game constants, not configuration.

use outpost_types::ResourceKind;

/// Depletion probability of a type A resource.
pub const DEPLETION_A: f64 = 0.30;

/// Depletion probability of a type B resource.
pub const DEPLETION_B: f64 = 0.50;

/// Depletion probability of a type C resource.
pub const DEPLETION_C: f64 = 0.70;

/// Probability that foraging next to a live hazard triggers an attack.
pub const ATTACK_PROBABILITY: f64 = 0.50;

/// Chebyshev radius around a live hazard center within which foraging can
/// trigger an attack.
pub const ATTACK_RADIUS: u32 = 1;

/// Stun turns applied by an attack.
pub const STUN_TURNS: u32 = 3;

/// Depletion probability for a resource kind.
///
/// Unclassified (or missing) kinds never deplete.
#[allow(clippy::match_same_arms)]
pub const fn depletion_probability(kind: Option<ResourceKind>) -> f64 {
    match kind {
        Some(ResourceKind::A) => DEPLETION_A,
        Some(ResourceKind::B) => DEPLETION_B,
        Some(ResourceKind::C) => DEPLETION_C,
        Some(ResourceKind::Unclassified) => 0.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn depletion_table() {
        assert_eq!(depletion_probability(Some(ResourceKind::A)), 0.30);
        assert_eq!(depletion_probability(Some(ResourceKind::B)), 0.50);
        assert_eq!(depletion_probability(Some(ResourceKind::C)), 0.70);
        assert_eq!(depletion_probability(Some(ResourceKind::Unclassified)), 0.0);
        assert_eq!(depletion_probability(None), 0.0);
    }
}
