//! The injected randomness provider.
//!
//! Synthesis owns no random state of its own; everything flows through
//! this trait so tests can script exact outcomes. There is deliberately
//! no seeding contract on the default provider: synthesized values may
//! differ between runs on identical input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default bounds for synthesized integers.
pub const DEFAULT_INT_RANGE: (i64, i64) = (-5, 5);

/// Default bounds for synthesized collection lengths.
pub const DEFAULT_COUNT_RANGE: (usize, usize) = (0, 5);

pub trait RandomSource {
    /// A random word of filler text.
    fn word(&mut self) -> &'static str;

    /// A random integer in `[lo, hi]`.
    fn int_in(&mut self, lo: i64, hi: i64) -> i64;

    fn boolean(&mut self) -> bool;

    /// A uniform choice among `n` alternatives: a value in `[0, n)`.
    /// `n` must be non-zero.
    fn pick(&mut self, n: usize) -> usize;

    /// A collection length in `[lo, hi]`.
    fn count(&mut self, lo: usize, hi: usize) -> usize;

    /// One or two words of filler text, for string-typed parameters.
    fn phrase(&mut self) -> String {
        let first = self.word();
        if self.boolean() {
            format!("{first} {}", self.word())
        } else {
            first.to_string()
        }
    }
}

/// Filler vocabulary for synthesized strings.
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "amet", "quartz", "ember", "willow", "harbor", "meadow", "summit",
    "cedar", "orchid", "falcon", "breeze", "canyon", "drift", "garnet", "hollow", "juniper",
    "lantern", "marble", "nectar", "onyx", "pebble", "quiver", "russet", "sable", "thicket",
    "umber", "violet", "wander", "zephyr",
];

/// The default provider: an OS-seeded [`StdRng`]. `seeded` pins the
/// stream for reproducible command-line runs.
pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        EntropyRandom {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        EntropyRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for EntropyRandom {
    fn word(&mut self) -> &'static str {
        WORDS[self.rng.gen_range(0..WORDS.len())]
    }

    fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.gen_range(lo..=hi)
    }

    fn boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn pick(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    fn count(&mut self, lo: usize, hi: usize) -> usize {
        self.rng.gen_range(lo..=hi)
    }
}

/// Deterministic provider for tests: pops scripted values, falling back
/// to fixed defaults when a queue runs dry (word `"foo"`, int `lo`,
/// boolean `false`, pick `0`, count clamped `1`).
#[derive(Default)]
pub struct ScriptedRandom {
    pub words: Vec<&'static str>,
    pub ints: Vec<i64>,
    pub booleans: Vec<bool>,
    pub picks: Vec<usize>,
    pub counts: Vec<usize>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        ScriptedRandom::default()
    }

    pub fn with_ints(ints: &[i64]) -> Self {
        ScriptedRandom {
            ints: ints.to_vec(),
            ..ScriptedRandom::default()
        }
    }
}

fn pop_front<T>(queue: &mut Vec<T>) -> Option<T> {
    if queue.is_empty() {
        None
    } else {
        Some(queue.remove(0))
    }
}

impl RandomSource for ScriptedRandom {
    fn word(&mut self) -> &'static str {
        pop_front(&mut self.words).unwrap_or("foo")
    }

    fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        pop_front(&mut self.ints).unwrap_or(lo).clamp(lo, hi)
    }

    fn boolean(&mut self) -> bool {
        pop_front(&mut self.booleans).unwrap_or(false)
    }

    fn pick(&mut self, n: usize) -> usize {
        pop_front(&mut self.picks).unwrap_or(0).min(n.saturating_sub(1))
    }

    fn count(&mut self, lo: usize, hi: usize) -> usize {
        pop_front(&mut self.counts).unwrap_or(1).clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_source_respects_bounds() {
        let mut random = EntropyRandom::seeded(7);
        for _ in 0..200 {
            let n = random.int_in(-5, 5);
            assert!((-5..=5).contains(&n));
            let c = random.count(0, 5);
            assert!(c <= 5);
            let p = random.pick(3);
            assert!(p < 3);
        }
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let mut a = EntropyRandom::seeded(42);
        let mut b = EntropyRandom::seeded(42);
        let left: Vec<i64> = (0..16).map(|_| a.int_in(-100, 100)).collect();
        let right: Vec<i64> = (0..16).map(|_| b.int_in(-100, 100)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn scripted_source_pops_then_defaults() {
        let mut random = ScriptedRandom::with_ints(&[3, -2]);
        assert_eq!(random.int_in(-5, 5), 3);
        assert_eq!(random.int_in(-5, 5), -2);
        assert_eq!(random.int_in(-5, 5), -5);
        assert_eq!(random.word(), "foo");
    }

    #[test]
    fn scripted_pick_stays_in_range() {
        let mut random = ScriptedRandom {
            picks: vec![9],
            ..ScriptedRandom::default()
        };
        assert_eq!(random.pick(2), 1);
    }
}
