//! Shared priority-queue primitives for the flood-fill/selector/stamper
//! kernel (spec §4.3). Every variant of the kernel pushes `Candidate`s into
//! a max-score-first heap; ties are broken deterministically by a hash of
//! `(tile, owner, counter)`, never by heap insertion order or wall clock
//! (spec §4.3, §5, §9).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::rng::tie_break_hash;
use crate::topology::TileId;

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub tile: TileId,
    pub owner: i32,
    pub path_distance: f64,
    pub score: f64,
    /// Monotonically increasing insertion counter, combined into the
    /// tie-break hash so that two candidates with identical
    /// `(tile, owner, score)` still resolve deterministically.
    pub counter: u64,
}

impl Candidate {
    fn tie_break(&self) -> u64 {
        tie_break_hash(self.tile, self.owner, self.counter)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.tile == other.tile && self.owner == other.owner
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; we want max-score-first, with lower
        // tile_id winning ties (spec §4.3), which we encode by reversing
        // the tie-break hash comparison combined with tile_id as the
        // ultimate discriminator.
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tile.cmp(&self.tile)) // lower tile_id wins -> appears "greater" in the max-heap
            .then_with(|| other.tie_break().cmp(&self.tie_break()))
    }
}

/// A deterministic max-score-first priority queue. Wraps `BinaryHeap` with
/// an explicit insertion counter so tie-breaking never depends on heap
/// internals.
pub struct PriorityQueue {
    heap: BinaryHeap<Candidate>,
    next_counter: u64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new(), next_counter: 0 }
    }

    pub fn push(&mut self, tile: TileId, owner: i32, path_distance: f64, score: f64) {
        let counter = self.next_counter;
        self.next_counter += 1;
        self.heap.push(Candidate { tile, owner, path_distance, score, counter });
    }

    pub fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_score_pops_first() {
        let mut q = PriorityQueue::new();
        q.push(1, 0, 0.0, 0.5);
        q.push(2, 0, 0.0, 0.9);
        q.push(3, 0, 0.0, 0.1);
        assert_eq!(q.pop().unwrap().tile, 2);
        assert_eq!(q.pop().unwrap().tile, 1);
        assert_eq!(q.pop().unwrap().tile, 3);
    }

    #[test]
    fn equal_score_breaks_tie_by_lower_tile_id() {
        let mut q = PriorityQueue::new();
        q.push(9, 0, 0.0, 0.5);
        q.push(2, 0, 0.0, 0.5);
        q.push(5, 0, 0.0, 0.5);
        assert_eq!(q.pop().unwrap().tile, 2);
    }

    #[test]
    fn ordering_is_deterministic_across_insertion_orders() {
        let mut q1 = PriorityQueue::new();
        q1.push(1, 0, 0.0, 0.3);
        q1.push(2, 1, 0.0, 0.3);
        q1.push(3, 0, 0.0, 0.3);

        let mut q2 = PriorityQueue::new();
        q2.push(3, 0, 0.0, 0.3);
        q2.push(1, 0, 0.0, 0.3);
        q2.push(2, 1, 0.0, 0.3);

        let order1: Vec<u32> = std::iter::from_fn(|| q1.pop().map(|c| c.tile)).collect();
        let order2: Vec<u32> = std::iter::from_fn(|| q2.pop().map(|c| c.tile)).collect();
        assert_eq!(order1, order2);
    }
}
