//! Batch distribution for parallel sweeps.
//!
//! Splits work into batches so long runs can report progress between them
//! and sampling runs can give every batch its own RNG stream.

use rayon::prelude::*;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use dmd_stats::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Maps `items` in parallel, one batch at a time, calling `on_batch(done, total)`
/// after each batch. Output order matches input order.
pub fn map_in_batches<T, R, F, P>(items: &[T], batch_size: usize, map: F, mut on_batch: P) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
    P: FnMut(usize, usize),
{
    let total = items.len();
    let batch_size = batch_size.max(1);
    let mut out = Vec::with_capacity(total);
    for chunk in items.chunks(batch_size) {
        out.extend(chunk.par_iter().map(&map).collect::<Vec<_>>());
        on_batch(out.len(), total);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_ranges_even_split() {
        let r = batch_ranges(100, 4);
        assert_eq!(r, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
    }

    #[test]
    fn batch_ranges_with_remainder() {
        let r = batch_ranges(10, 3);
        assert_eq!(r, vec![(0, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn batch_ranges_more_batches_than_items() {
        let r = batch_ranges(3, 10);
        assert_eq!(r, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn batch_ranges_empty() {
        assert!(batch_ranges(0, 5).is_empty());
        assert!(batch_ranges(10, 0).is_empty());
    }

    #[test]
    fn map_in_batches_reports_progress_and_keeps_order() {
        let items: Vec<u32> = (0..10).collect();
        let mut progress = Vec::new();
        let doubled = map_in_batches(&items, 4, |x| x * 2, |done, total| progress.push((done, total)));
        assert_eq!(doubled, (0..10).map(|x| x * 2).collect::<Vec<_>>());
        assert_eq!(progress, vec![(4, 10), (8, 10), (10, 10)]);
    }
}
