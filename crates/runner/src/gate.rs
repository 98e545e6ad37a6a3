//! Decision gate - the per-tick random draw that admits agents to decide
//!
//! An agent decides on a decision tick when `draw() < trade_frequency`.
//! The source of randomness is injected so tests can script the draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait DecisionGate: Send {
    /// Next uniform value in [0, 1)
    fn draw(&mut self) -> f64;

    /// Whether an agent with this trade frequency decides this tick
    fn admits(&mut self, trade_frequency: f64) -> bool {
        self.draw() < trade_frequency
    }
}

/// Gate backed by a seedable PRNG
pub struct SeededGate {
    rng: StdRng,
}

impl SeededGate {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl DecisionGate for SeededGate {
    fn draw(&mut self) -> f64 {
        self.rng.r#gen()
    }
}

/// Gate replaying a fixed sequence of draws
///
/// After the script runs out every draw returns the fallback value.
pub struct ScriptedGate {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedGate {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback,
        }
    }

    /// Admits every agent with a non-zero trade frequency
    pub fn always() -> Self {
        Self::new([], 0.0)
    }

    /// Never admits anyone
    pub fn never() -> Self {
        Self::new([], 1.0)
    }
}

impl DecisionGate for ScriptedGate {
    fn draw(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_gate_replays_then_falls_back() {
        let mut gate = ScriptedGate::new([0.1, 0.9], 0.5);
        assert!(gate.admits(0.4));
        assert!(!gate.admits(0.4));
        assert_eq!(gate.draw(), 0.5);
    }

    #[test]
    fn test_always_and_never() {
        assert!(ScriptedGate::always().admits(0.01));
        assert!(!ScriptedGate::always().admits(0.0));
        assert!(!ScriptedGate::never().admits(1.0));
    }

    #[test]
    fn test_seeded_gate_is_reproducible() {
        let mut a = SeededGate::new(Some(11));
        let mut b = SeededGate::new(Some(11));
        for _ in 0..10 {
            let draw = a.draw();
            assert_eq!(draw, b.draw());
            assert!((0.0..1.0).contains(&draw));
        }
    }
}
