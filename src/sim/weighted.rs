//! Pick-by-cumulative-weight selection over any RNG

use rand::Rng;

/// Choose one item with probability proportional to its weight.
///
/// Non-positive and non-finite weights are never picked. Returns `None` when
/// nothing has a usable weight.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [(f32, T)], rng: &mut R) -> Option<&'a T> {
    let usable = |w: f32| w.is_finite() && w > 0.0;
    let total: f32 = items.iter().map(|(w, _)| *w).filter(|w| usable(*w)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut cursor = rng.random::<f32>() * total;
    let mut last = None;
    for (weight, item) in items {
        if !usable(*weight) {
            continue;
        }
        cursor -= weight;
        if cursor <= 0.0 {
            return Some(item);
        }
        last = Some(item);
    }
    // Float drift can leave a sliver of cursor past the final bucket
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_respects_weights() {
        let mut rng = Pcg32::seed_from_u64(42);
        let items = [(0.1, 'a'), (0.0, 'x'), (0.9, 'b')];
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            match pick(&items, &mut rng) {
                Some('a') => counts[0] += 1,
                Some('b') => counts[1] += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        assert!(counts[0] > 700 && counts[0] < 1300, "a picked {} times", counts[0]);
    }

    #[test]
    fn test_pick_empty_or_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty: [(f32, u8); 0] = [];
        assert_eq!(pick(&empty, &mut rng), None);
        assert_eq!(pick(&[(0.0, 1u8), (f32::NAN, 2)], &mut rng), None);
    }

    #[test]
    fn test_single_item_always_picked() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(pick(&[(2.5, "only")], &mut rng), Some(&"only"));
        }
    }
}
