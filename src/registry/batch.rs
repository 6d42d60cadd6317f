//! Splitting identifier lists into request-sized batches

use std::time::Duration;

/// Batch sizing and the one-time rate-limit pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub chunk_size: usize,
    /// Batch index at which the pause happens
    pub max_calls: usize,
    pub pause: Duration,
}

impl BatchPlan {
    /// Ordered, non-overlapping batches of at most `chunk_size` items.
    ///
    /// An input that fits in one chunk is a single batch; an empty input has
    /// none. `chunk_size` must be non-zero, which the client builder enforces.
    pub fn partition<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        items.chunks(self.chunk_size).collect()
    }

    /// Whether to cool down before sending batch `index` (0-based).
    ///
    /// Triggers on equality only, so a fetch pauses at most once.
    pub fn pause_before(&self, index: usize) -> Option<Duration> {
        (index == self.max_calls).then_some(self.pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(chunk_size: usize, max_calls: usize) -> BatchPlan {
        BatchPlan {
            chunk_size,
            max_calls,
            pause: Duration::from_secs(60),
        }
    }

    #[test]
    fn batches_cover_input_in_order_without_overlap() {
        for len in 0..25usize {
            for chunk_size in 1..7usize {
                let items: Vec<usize> = (0..len).collect();
                let batches = plan(chunk_size, 10).partition(&items);

                assert_eq!(batches.len(), len.div_ceil(chunk_size));
                assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= chunk_size));
                let flattened: Vec<usize> = batches.concat();
                assert_eq!(flattened, items);
            }
        }
    }

    #[test]
    fn small_input_is_one_batch() {
        let items = [1, 2, 3];
        let batches = plan(3, 10).partition(&items);
        assert_eq!(batches, vec![&items[..]]);
    }

    #[test]
    fn three_ids_chunk_two() {
        let items = [1, 2, 3];
        let batches = plan(2, 10).partition(&items);
        assert_eq!(batches, vec![&[1, 2][..], &[3][..]]);
    }

    #[test]
    fn pause_only_at_threshold_index() {
        let p = plan(2, 2);
        let pauses: Vec<usize> = (0..10).filter(|i| p.pause_before(*i).is_some()).collect();
        assert_eq!(pauses, vec![2]);
        assert_eq!(p.pause_before(2), Some(Duration::from_secs(60)));
    }
}
