//! Draw helpers over the single shared random source.
//!
//! Every random decision made while growing a layout (connector candidate order,
//! decoration and facing choice, container slots, the inverse-cost weighted pick)
//! goes through these helpers so one [`RngCore`] stream drives a whole run.
use rand::RngCore;

/// Generate a random float in the range [0, 1).
#[inline]
pub fn rand01<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
}

/// Uniform index in `0..len`. `len` must be non-zero.
#[inline]
pub fn uniform_index<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0, "uniform_index over an empty range");
    ((rand01(rng) * len as f64) as usize).min(len.saturating_sub(1))
}

/// Uniform integer in the inclusive range `lo..=hi`.
pub fn uniform_range<R: RngCore + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    let span = (hi as i64 - lo as i64 + 1) as usize;
    lo + uniform_index(rng, span) as i32
}

/// Pick one element uniformly, or `None` for an empty slice.
pub fn choose<'a, T, R: RngCore + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[uniform_index(rng, items.len())])
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: RngCore + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = uniform_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// Categorical draw given non-negative weights. Weights need not sum to one.
///
/// Returns `None` when there is no positive weight.
pub fn weighted_index<R: RngCore + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut roll = rand01(rng) * total;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_positive = Some(i);
        if roll < w {
            return Some(i);
        }
        roll -= w;
    }

    last_positive
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    pub(crate) struct FixedRng {
        pub value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn rand01_stays_below_one() {
        for value in [0, 1, u32::MAX / 2, u32::MAX - 1, u32::MAX] {
            let mut rng = FixedRng { value };
            let r = rand01(&mut rng);
            assert!((0.0..1.0).contains(&r), "rand01({value}) = {r}");
        }
    }

    #[test]
    fn uniform_index_covers_last_bucket() {
        let mut rng = FixedRng { value: u32::MAX };
        assert_eq!(uniform_index(&mut rng, 4), 3);
        let mut rng = FixedRng { value: 0 };
        assert_eq!(uniform_index(&mut rng, 4), 0);
    }

    #[test]
    fn uniform_range_is_inclusive() {
        let mut rng = FixedRng { value: u32::MAX };
        assert_eq!(uniform_range(&mut rng, 2, 5), 5);
        assert_eq!(uniform_range(&mut rng, 7, 7), 7);
    }

    #[test]
    fn choose_on_empty_slice_is_none() {
        let mut rng = FixedRng { value: 0 };
        let empty: [u8; 0] = [];
        assert!(choose(&mut rng, &empty).is_none());
        assert_eq!(choose(&mut rng, &[9]), Some(&9));
    }

    #[test]
    fn shuffle_keeps_all_elements() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut items: Vec<u32> = (0..32).collect();
        shuffle(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(weighted_index(&mut rng, &[0.0, 2.0, 1.0]), Some(1));
        let mut rng = FixedRng { value: u32::MAX };
        assert_eq!(weighted_index(&mut rng, &[0.0, 2.0, 1.0, 0.0]), Some(2));
        assert_eq!(weighted_index(&mut rng, &[0.0, 0.0]), None);
    }
}
