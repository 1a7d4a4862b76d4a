use rand::Rng;

/// Returns a uniformly random permutation of `items` (Fisher-Yates).
///
/// The input is left untouched. Pass a seeded rng for reproducible output.
pub fn shuffle<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
