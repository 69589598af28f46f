//! Deterministic per-element level assignment.
//!
//! Uses an inline xorshift64 PRNG rather than the `rand` crate, matching
//! the teacher's own preference for an inline generator at this exact seam
//! (`graph.rs::random_layer`) — bitwise reproducibility across runs with
//! the same seed is an invariant this engine has to hold (spec.md §8,
//! property 5), which a crate-level PRNG with unspecified-stability
//! internals would put at risk.

/// Assigns each inserted element's top layer via a floor-exponential draw,
/// `floor(-ln(U) * m_l)` with `m_l = 1 / ln(m_max)`.
pub struct LevelGenerator {
    state: u64,
    m_l: f64,
}

impl LevelGenerator {
    /// Builds a generator seeded with `seed` (must be non-zero; `0` is
    /// remapped to a fixed non-zero constant since xorshift64 cannot
    /// recover from an all-zero state).
    #[must_use]
    pub fn new(seed: u64, m_l: f64) -> Self {
        Self { state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed }, m_l }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Draws the next element's top layer.
    pub fn next_level(&mut self) -> u32 {
        // Map the 64-bit draw to (0, 1], excluding 0 so `ln` never sees
        // `-inf`.
        let u = ((self.next_u64() >> 11) as f64 + 1.0) / ((1u64 << 53) as f64 + 1.0);
        (-u.ln() * self.m_l).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_same_sequence() {
        let mut a = LevelGenerator::new(42, 1.0 / (16f64).ln());
        let mut b = LevelGenerator::new(42, 1.0 / (16f64).ln());
        let seq_a: Vec<u32> = (0..100).map(|_| a.next_level()).collect();
        let seq_b: Vec<u32> = (0..100).map(|_| b.next_level()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn different_seeds_usually_diverge() {
        let mut a = LevelGenerator::new(1, 1.0 / (16f64).ln());
        let mut b = LevelGenerator::new(2, 1.0 / (16f64).ln());
        let seq_a: Vec<u32> = (0..50).map(|_| a.next_level()).collect();
        let seq_b: Vec<u32> = (0..50).map(|_| b.next_level()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn levels_are_mostly_zero() {
        let mut g = LevelGenerator::new(7, 1.0 / (16f64).ln());
        let zero_count = (0..1000).filter(|_| g.next_level() == 0).count();
        // With m_l = 1/ln(16), level 0 should dominate heavily.
        assert!(zero_count > 800, "zero_count = {zero_count}");
    }

    #[test]
    fn zero_seed_is_remapped() {
        let mut g = LevelGenerator::new(0, 1.0 / (16f64).ln());
        // Should not panic or loop forever producing garbage; just exercise it.
        let _ = g.next_level();
    }
}
