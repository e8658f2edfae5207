use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use rand::seq::SliceRandom;

/// Deals items into `group_count` groups in snake order (A B C C B A A B ...),
/// which evens out the strength of each group when items arrive ranked.
pub fn snake_distribute<T>(items: impl IntoIterator<Item = T>, group_count: usize) -> Vec<Vec<T>> {
    let group_count = group_count.max(1);
    let mut groups: Vec<Vec<T>> = (0..group_count).map(|_| Vec::new()).collect();

    let mut index: isize = 0;
    let mut direction: isize = 1;
    for item in items {
        groups[index as usize].push(item);
        index += direction;
        if index >= group_count as isize {
            index = group_count as isize - 1;
            direction = -1;
        } else if index < 0 {
            index = 0;
            direction = 1;
        }
    }
    groups
}

/// Takes one item from each group per round, in group order.
pub fn interleave<T>(groups: Vec<Vec<T>>) -> Vec<T> {
    let total = groups.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = groups.into_iter().map(Vec::into_iter).collect();
    let mut flat = Vec::with_capacity(total);

    while flat.len() < total {
        for iter in iters.iter_mut() {
            if let Some(item) = iter.next() {
                flat.push(item);
            }
        }
    }
    flat
}

/// Buckets items by key, keeping buckets in order of first appearance.
pub fn group_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<Vec<T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<Vec<T>> = Vec::new();

    for item in items {
        let slot = *index.entry(key(&item)).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(item);
    }
    buckets
}

/// Shuffles inside consecutive blocks only, so items stay near where the
/// ordering put them.
pub fn shuffle_within_blocks<T, R: Rng + ?Sized>(items: &mut [T], block_size: usize, rng: &mut R) {
    for block in items.chunks_mut(block_size.max(1)) {
        block.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_snake_order() {
        let groups = snake_distribute(1..=8, 3);
        assert_eq!(groups, vec![vec![1, 6, 7], vec![2, 5, 8], vec![3, 4]]);
    }

    #[test]
    fn test_snake_single_group() {
        let groups = snake_distribute(1..=4, 1);
        assert_eq!(groups, vec![vec![1, 2, 3, 4]]);

        let groups = snake_distribute(1..=3, 0);
        assert_eq!(groups, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_interleave_uneven_groups() {
        let flat = interleave(vec![vec![1, 4, 7], vec![2, 5], vec![3]]);
        assert_eq!(flat, vec![1, 2, 3, 4, 5, 7]);
    }

    #[test]
    fn test_group_by_key_keeps_first_appearance() {
        let buckets = group_by_key(vec!["b1", "a1", "b2", "c1", "a2"], |s| s.chars().next());
        assert_eq!(buckets, vec![vec!["b1", "b2"], vec!["a1", "a2"], vec!["c1"]]);
    }

    #[test]
    fn test_block_shuffle_stays_in_block() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..10).collect();
        shuffle_within_blocks(&mut items, 4, &mut rng);

        let mut first: Vec<u32> = items[0..4].to_vec();
        first.sort();
        let mut last: Vec<u32> = items[8..].to_vec();
        last.sort();

        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(last, vec![8, 9]);
    }
}
