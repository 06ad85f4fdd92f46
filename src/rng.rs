//! Per-battle RNG.
//!
//! SPEC_FULL.md §5 requires each `Battle` to own its RNG so a fixed seed
//! reproduces an entire combat deterministically. This is a deliberate
//! departure from the teacher's thread-local `RNG`/`FORCED_ROLLS` statics in
//! its own `rng.rs` — a process-wide thread-local can't give two concurrently
//! running battles independent, replayable streams. The `StdRng`/
//! `SeedableRng` choice and the forced-roll testing hook are kept; only the
//! storage (struct field vs. thread-local) changes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// A battle's own source of randomness, with an optional queue of forced
/// outcomes for deterministic tests (mirrors the teacher's `force_roll`).
#[derive(Debug, Clone)]
pub struct BattleRng {
    inner: StdRng,
    seed: u64,
    forced: VecDeque<f64>,
}

impl BattleRng {
    /// Seed explicitly — used by tests and replay tooling for reproducible
    /// combats.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
            forced: VecDeque::new(),
        }
    }

    /// Production default: a fresh, unpredictable per-battle seed drawn from
    /// the OS RNG, still recorded so the resulting combat can be replayed
    /// later from `seed()`.
    pub fn fresh() -> Self {
        let seed = rand::thread_rng().gen::<u64>();
        Self::seeded(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Force the next `roll_unit()` call to return `value` instead of
    /// drawing from the RNG. Consumed in FIFO order; for tests only.
    pub fn force_next(&mut self, value: f64) {
        self.forced.push_back(value);
    }

    /// Draw a uniform value in `[0, 1)`, respecting any forced value queued
    /// by `force_next`. This is the single primitive every probabilistic
    /// opcode and AI behavior draws from, so a forced sequence replays
    /// exactly regardless of which code path consumes it.
    pub fn roll_unit(&mut self) -> f64 {
        if let Some(forced) = self.forced.pop_front() {
            return forced;
        }
        self.inner.gen::<f64>()
    }

    /// Draw a uniform integer in `[low, high]` inclusive.
    pub fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        low + (self.roll_unit() * (high - low + 1) as f64).floor() as i32
    }
}
