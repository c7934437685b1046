//! Simple BFS and fractal flood fill (spec §4.3). These back plate
//! assignment, microplates, lakes, and glaciers: all of them honor
//! ownership, per-owner quotas, and an orphan-cleanup pass for any tile the
//! expansion never reached.

use std::collections::VecDeque;

use super::priority::PriorityQueue;
use super::quota::hamilton_quota;
use crate::buffers::BufferPool;
use crate::topology::{TileId, Topology};

/// Predicate-gated, unbounded-or-capped breadth-first search from a set of
/// seeds (spec §4.3 "Simple BFS"). The `visited` scratch buffer is rented
/// from `pool` and returned before this function exits (spec §3 "transient
/// buffers ... are rented from a pool and returned at stage end").
pub fn simple_bfs(
    topo: &Topology,
    seeds: &[TileId],
    mut predicate: impl FnMut(TileId) -> bool,
    cap: Option<usize>,
    pool: &BufferPool,
) -> Vec<TileId> {
    let mut visited = pool.rent_bool(topo.tile_count());
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    let mut seeds_sorted = seeds.to_vec();
    seeds_sorted.sort_unstable();
    for &s in &seeds_sorted {
        if !visited[s as usize] && predicate(s) {
            visited[s as usize] = true;
            order.push(s);
            queue.push_back(s);
        }
    }

    while let Some(t) = queue.pop_front() {
        if let Some(cap) = cap {
            if order.len() >= cap {
                break;
            }
        }
        let mut ns: Vec<TileId> = topo.neighbors(t).to_vec();
        ns.sort_unstable();
        for n in ns {
            if !visited[n as usize] && predicate(n) {
                visited[n as usize] = true;
                order.push(n);
                queue.push_back(n);
                if let Some(cap) = cap {
                    if order.len() >= cap {
                        break;
                    }
                }
            }
        }
    }
    pool.return_bool(visited);
    order
}

/// Per-owner seed for a fractal flood fill.
#[derive(Clone, Copy)]
pub struct FillSeed {
    pub tile: TileId,
    pub owner: i32,
    pub weight: f64,
}

/// Result of a fractal flood fill: the owner assigned to every tile (-1 for
/// tiles outside `eligible`, which never get claimed or orphan-cleaned),
/// plus whether every owner reached its quota (spec §4.3 "short-fill").
pub struct FillResult {
    pub owners: Vec<i32>,
    pub reached_quota: bool,
}

/// Run a fractal flood fill: seeds are pre-claimed, then neighbors are
/// enqueued scored by `noise_score(tile, owner) * weight - distance_penalty
/// * path_distance`. Per-owner quotas are computed by Hamilton
/// largest-remainder over `seeds`' weights against `total_tiles` so the
/// total claimed equals the target. After expansion, any tile inside
/// `eligible` that was never claimed is assigned to its nearest seed by
/// great-circle distance (orphan cleanup).
pub fn fractal_flood_fill(
    topo: &Topology,
    seeds: &[FillSeed],
    total_tiles: usize,
    eligible: impl Fn(TileId) -> bool,
    mut noise_score: impl FnMut(TileId, i32) -> f64,
    distance_penalty: f64,
) -> FillResult {
    let n = topo.tile_count();
    let mut owners = vec![-1i32; n];
    let weights: Vec<f64> = seeds.iter().map(|s| s.weight).collect();
    let quotas = hamilton_quota(&weights, total_tiles);
    let mut claimed: Vec<usize> = vec![0; seeds.len()];

    let mut pq = PriorityQueue::new();
    // Seeds are processed in registration order (spec §4.3).
    for (owner_idx, seed) in seeds.iter().enumerate() {
        if owners[seed.tile as usize] == -1 {
            owners[seed.tile as usize] = seed.owner;
            claimed[owner_idx] += 1;
            enqueue_neighbors(topo, seed.tile, owner_idx as i32, seed.weight, 1.0, distance_penalty, &mut noise_score, &owners, &eligible, &mut pq);
        }
    }

    while let Some(candidate) = pq.pop() {
        let owner_idx = candidate.owner as usize;
        if owners[candidate.tile as usize] != -1 {
            continue;
        }
        if claimed[owner_idx] >= quotas[owner_idx] {
            continue;
        }
        owners[candidate.tile as usize] = seeds[owner_idx].owner;
        claimed[owner_idx] += 1;
        enqueue_neighbors(
            topo,
            candidate.tile,
            candidate.owner,
            seeds[owner_idx].weight,
            candidate.path_distance + 1.0,
            distance_penalty,
            &mut noise_score,
            &owners,
            &eligible,
            &mut pq,
        );
    }

    let reached_quota = claimed.iter().zip(quotas.iter()).all(|(c, q)| c >= q);

    // Orphan cleanup: any eligible, unclaimed tile goes to its nearest seed.
    for t in 0..n as u32 {
        if owners[t as usize] == -1 && eligible(t) {
            let pos = topo.position(t);
            let mut best_owner = seeds[0].owner;
            let mut best_dist = f64::INFINITY;
            for seed in seeds {
                let d = crate::sphere::great_circle_distance_rad(pos, topo.position(seed.tile));
                if d < best_dist {
                    best_dist = d;
                    best_owner = seed.owner;
                }
            }
            owners[t as usize] = best_owner;
        }
    }

    FillResult { owners, reached_quota }
}

#[allow(clippy::too_many_arguments)]
fn enqueue_neighbors(
    topo: &Topology,
    tile: TileId,
    owner_idx: i32,
    weight: f64,
    path_distance: f64,
    distance_penalty: f64,
    noise_score: &mut impl FnMut(TileId, i32) -> f64,
    owners: &[i32],
    eligible: &impl Fn(TileId) -> bool,
    pq: &mut PriorityQueue,
) {
    for &n in topo.neighbors(tile) {
        if owners[n as usize] == -1 && eligible(n) {
            let score = noise_score(n, owner_idx) * weight - distance_penalty * path_distance;
            pq.push(n, owner_idx, path_distance, score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    #[test]
    fn simple_bfs_respects_cap() {
        let topo = Topology::build(3).unwrap();
        let pool = BufferPool::new();
        let result = simple_bfs(&topo, &[0], |_| true, Some(10), &pool);
        assert_eq!(result.len(), 10);
    }

    #[test]
    fn simple_bfs_predicate_blocks_expansion() {
        let topo = Topology::build(3).unwrap();
        let pool = BufferPool::new();
        let result = simple_bfs(&topo, &[0], |t| t == 0, None, &pool);
        assert_eq!(result, vec![0]);
    }

    #[test]
    fn fractal_fill_claims_every_eligible_tile() {
        let topo = Topology::build(5).unwrap();
        let n = topo.tile_count();
        let seeds = vec![
            FillSeed { tile: 0, owner: 0, weight: 0.5 },
            FillSeed { tile: (n / 2) as u32, owner: 1, weight: 0.5 },
        ];
        let result = fractal_flood_fill(&topo, &seeds, n, |_| true, |_, _| 0.0, 0.1);
        assert!(result.owners.iter().all(|&o| o == 0 || o == 1));
        assert!(result.reached_quota);
    }

    #[test]
    fn fractal_fill_is_deterministic() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let seeds = vec![
            FillSeed { tile: 0, owner: 0, weight: 1.0 },
            FillSeed { tile: 7, owner: 1, weight: 1.0 },
            FillSeed { tile: 20, owner: 2, weight: 1.0 },
        ];
        let run = || fractal_flood_fill(&topo, &seeds, n, |_| true, |t, o| ((t as i64 * 7 + o as i64 * 13) % 97) as f64 / 97.0, 0.05).owners;
        assert_eq!(run(), run());
    }
}
