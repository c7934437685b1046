//! Generic weighted cost field (spec §4.3 "Weighted cost field"): Dijkstra
//! from a set of sources with caller-supplied edge cost and per-visit
//! callback. Backs distance-to-coast and rift-age fields.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::topology::{TileId, Topology};

#[derive(PartialEq)]
struct HeapEntry {
    cost: f64,
    tile: TileId,
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, tie-broken by tile id for determinism.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.tile.cmp(&other.tile))
    }
}

/// Run Dijkstra from `sources` (each with its own starting cost, e.g. 0.0).
/// `edge_cost(from, to)` returns the incremental cost of stepping from
/// `from` to its neighbor `to`. `on_visit(tile, cost)` is called exactly
/// once, the first time each tile is finalized (lowest-cost pop).
///
/// Returns the final cost field; unreached tiles hold `f64::INFINITY`.
pub fn weighted_cost_field(
    topo: &Topology,
    sources: &[(TileId, f64)],
    mut edge_cost: impl FnMut(TileId, TileId) -> f64,
    mut on_visit: impl FnMut(TileId, f64),
) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; topo.tile_count()];
    let mut visited = vec![false; topo.tile_count()];
    let mut heap = BinaryHeap::new();

    let mut sorted_sources = sources.to_vec();
    sorted_sources.sort_by(|a, b| a.0.cmp(&b.0));
    for &(t, cost) in &sorted_sources {
        if cost < dist[t as usize] {
            dist[t as usize] = cost;
            heap.push(HeapEntry { cost, tile: t });
        }
    }

    while let Some(HeapEntry { cost, tile }) = heap.pop() {
        if visited[tile as usize] {
            continue;
        }
        visited[tile as usize] = true;
        on_visit(tile, cost);

        for &n in topo.neighbors(tile) {
            if visited[n as usize] {
                continue;
            }
            let next_cost = cost + edge_cost(tile, n);
            if next_cost < dist[n as usize] {
                dist[n as usize] = next_cost;
                heap.push(HeapEntry { cost: next_cost, tile: n });
            }
        }
    }
    dist
}
