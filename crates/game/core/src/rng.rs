//! Deterministic random numbers for the stochastic sub-models.
//!
//! Given the same seed, every implementation must produce the same value.
//! Replaying a game from its initial snapshot and action log therefore
//! reproduces plague outcomes exactly.

use rust_decimal::Decimal;

/// RNG oracle for deterministic random number generation.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform draw in `[0, 1)` with four decimal places.
    fn unit(&self, seed: u64) -> Decimal {
        Decimal::new(i64::from(self.next_u32(seed) % 10_000), 4)
    }

    /// True with probability `chance` (clamped to `[0, 1]`).
    fn chance(&self, seed: u64, chance: Decimal) -> bool {
        self.unit(seed) < chance
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// - **Deterministic**: same seed always produces same output
/// - **Small state**: only 64 bits, no allocation
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a deterministic seed from game state components.
///
/// * `game_seed` - base seed fixed at game start
/// * `turn` - world turn counter
/// * `stream` - independent stream (e.g. team position)
/// * `context` - distinguishes draws within the same stream
pub fn compute_seed(game_seed: u64, turn: u64, stream: u32, context: u64) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = game_seed;
    hash ^= turn.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(stream).wrapping_mul(0x517cc1b727220a95);
    hash ^= context.wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
