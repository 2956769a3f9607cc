//! Random selection helpers used by the study modes.

use rand::seq::SliceRandom;
use rand::Rng;

/// Return a shuffled copy of `items`.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut result = items.to_vec();
    result.shuffle(rng);
    result
}

/// Pick up to `count` items without repetition.
pub fn random_items<T: Clone, R: Rng + ?Sized>(items: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let mut result = shuffle(items, rng);
    result.truncate(count.min(items.len()));
    result
}

/// Pick up to `count` items, skipping any equal to one in `exclude`.
pub fn random_items_excluding<T, R>(items: &[T], count: usize, exclude: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let filtered: Vec<T> = items
        .iter()
        .filter(|item| !exclude.contains(item))
        .cloned()
        .collect();
    random_items(&filtered, count, rng)
}
