/// Index of the first element that is not strictly greater than its
/// predecessor, or `None` when the sequence is strictly increasing.
pub fn first_non_increasing(values: &[f64]) -> Option<usize> {
    values
        .windows(2)
        .position(|w| w[1].partial_cmp(&w[0]) != Some(core::cmp::Ordering::Greater))
        .map(|i| i + 1)
}
