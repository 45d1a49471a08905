/// Deterministic RNG helpers.
///
/// Small and dependency-free; **not** cryptographic. Agents draw their random
/// tie-breaks from here so a run can be replayed from its seed.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "next_index on an empty range");
        let len = len as u64;
        // Rejection sampling to avoid modulo bias.
        let zone = u64::MAX - (u64::MAX % len);
        loop {
            let x = self.next_u64();
            if x < zone {
                return (x % len) as usize;
            }
        }
    }

    /// Pick one element uniformly, `None` on an empty slice.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.next_index(items.len())])
    }

    /// Fisher-Yates in place.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.step()
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Independent stream per (run seed, agent, purpose).
pub fn derive_seed(global_seed: u64, agent_id: u64, stream: u64) -> u64 {
    let x = global_seed ^ mix64(agent_id.wrapping_add(0x9E3779B97F4A7C15)) ^ mix64(stream);
    mix64(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_index_stays_in_range() {
        let mut rng = SplitMix64::new(7);
        for len in 1..20 {
            for _ in 0..50 {
                assert!(rng.next_index(len) < len);
            }
        }
    }

    #[test]
    fn next_f64_is_half_open() {
        let mut rng = SplitMix64::new(99);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = SplitMix64::new(3);
        let mut items: Vec<u32> = (0..16).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn derived_streams_differ_per_agent() {
        assert_ne!(derive_seed(1, 1, 0), derive_seed(1, 2, 0));
        assert_eq!(derive_seed(1, 1, 0), derive_seed(1, 1, 0));
    }
}
