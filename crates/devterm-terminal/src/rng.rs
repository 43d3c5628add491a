//! Small non-cryptographic PRNG shared by the handlers.

/// 64-bit linear congruential generator (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the wall clock.
    pub fn from_time() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::new(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// High 32 bits of the next state; the low bits of an LCG are weak.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform-ish index in `0..n`. `n` must be non-zero.
    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u32() as usize) % n
    }

    /// Value in `min..=max`. Requires `min <= max`.
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let width = max.abs_diff(min);
        if width == u64::MAX {
            return self.next_u64() as i64;
        }
        min.wrapping_add(((self.next_u64() >> 11) % (width + 1)) as i64)
    }

    /// Value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Pick one element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn range_is_inclusive_and_bounded() {
        let mut rng = SimpleRng::new(1);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..1000 {
            let v = rng.range_inclusive(1, 3);
            assert!((1..=3).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn range_single_value() {
        let mut rng = SimpleRng::new(9);
        assert_eq!(rng.range_inclusive(5, 5), 5);
    }

    #[test]
    fn range_spanning_all_of_i64() {
        let mut rng = SimpleRng::new(17);
        for _ in 0..100 {
            rng.range_inclusive(i64::MIN, i64::MAX);
        }
        for _ in 0..100 {
            let v = rng.range_inclusive(i64::MIN, 0);
            assert!(v <= 0);
            let v = rng.range_inclusive(-1, i64::MAX);
            assert!(v >= -1);
        }
    }

    #[test]
    fn f64_in_unit_interval() {
        let mut rng = SimpleRng::new(3);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn shuffle_keeps_elements() {
        let mut rng = SimpleRng::new(11);
        let mut v: Vec<u32> = (0..52).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, (0..52).collect::<Vec<_>>());
    }

    #[test]
    fn choose_returns_member() {
        let mut rng = SimpleRng::new(5);
        let items = ["a", "b", "c"];
        assert!(items.contains(rng.choose(&items)));
    }
}
