//! Hotspots (spec §4.6): mantle plumes fixed in the deep-mantle frame trace
//! a track across the plate drifting over them — each step follows the
//! neighbor whose direction best aligns with the local plate's velocity —
//! stamping a chain of volcanoes whose intensity decays from the active
//! (most recent) end toward the oldest.

use crate::rng::WorldRng;
use crate::sphere::tangent_basis;
use crate::tile::{Hotspot, HotspotId, Plate, PlateId, Volcano, VolcanoId, VolcanoType};
use crate::topology::{TileId, Topology};

const HOTSPOT_DENSITY_PER_TILE: f64 = 1.0 / 1400.0;
const TRACK_LEN: usize = 8;

pub fn trace_hotspots(
    topo: &Topology,
    plate_id: &[PlateId],
    plates: &[Plate],
    rng: &mut WorldRng,
) -> (Vec<Hotspot>, Vec<Volcano>) {
    let mut fork = rng.fork("features::hotspots");
    let n = topo.tile_count();
    let count = ((n as f64) * HOTSPOT_DENSITY_PER_TILE).round().max(1.0) as usize;

    let mut hotspots = Vec::new();
    let mut volcanoes = Vec::new();
    let mut next_hotspot_id: HotspotId = 0;
    let mut next_volcano_id: VolcanoId = 0;

    for _ in 0..count {
        let start = fork.next_index(n) as TileId;
        let track = trace_one_track(topo, plate_id, plates, start);
        if track.is_empty() {
            continue;
        }
        let last = track.len().saturating_sub(1).max(1);
        let age_gradient: Vec<f32> = (0..track.len()).map(|i| i as f32 / last as f32).collect();

        for (i, &t) in track.iter().enumerate() {
            let age_fraction = age_gradient[i];
            let intensity = (1.0 - age_fraction * 0.85).max(0.05);
            volcanoes.push(Volcano { id: next_volcano_id, tile: t, kind: VolcanoType::ShieldVolcano, intensity });
            next_volcano_id += 1;
        }

        hotspots.push(Hotspot { id: next_hotspot_id, track, age_gradient });
        next_hotspot_id += 1;
    }

    (hotspots, volcanoes)
}

/// Walk away from `start` one hop at a time, always picking the unvisited
/// neighbor whose direction from the current tile best aligns with the
/// owning plate's tangent-plane velocity.
fn trace_one_track(topo: &Topology, plate_id: &[PlateId], plates: &[Plate], start: TileId) -> Vec<TileId> {
    let mut track = vec![start];
    let mut visited = vec![false; topo.tile_count()];
    visited[start as usize] = true;
    let mut cur = start;

    for _ in 1..TRACK_LEN {
        let p = plate_id[cur as usize];
        if p < 0 {
            break;
        }
        let (vx, vy) = plates[p as usize].velocity;
        let center = topo.position(cur);
        let (east, north) = tangent_basis(center);

        let next = topo.neighbors(cur).iter().copied().filter(|&nb| !visited[nb as usize]).max_by(|&a, &b| {
            let score = |t: TileId| {
                let dir = topo.position(t) - center;
                dir.dot(east) * vx + dir.dot(north) * vy
            };
            score(a).partial_cmp(&score(b)).unwrap()
        });

        match next {
            Some(nb) => {
                visited[nb as usize] = true;
                track.push(nb);
                cur = nb;
            }
            None => break,
        }
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plates::{major_fill, random_velocity, seed_plates};

    #[test]
    fn tracks_never_revisit_a_tile() {
        let topo = Topology::build(6).unwrap();
        let mut rng = WorldRng::seed(3);
        let seeds = seed_plates(&topo, 5, 0.4, &mut rng).unwrap();
        let plate_id: Vec<PlateId> = major_fill(&topo, &seeds, 0.1, &mut rng).unwrap();
        let velocities: Vec<(f64, f64)> = (0..seeds.len()).map(|_| random_velocity(&mut rng)).collect();
        let plates: Vec<Plate> = seeds
            .iter()
            .enumerate()
            .map(|(i, s)| Plate {
                id: i as PlateId,
                seed_tile: s.tile,
                kind: s.kind,
                size_tier: s.size_tier,
                crust_fraction: s.crust_fraction,
                velocity: velocities[i],
                direction_seed: 0,
                tile_count: 0,
                head_tiles: Vec::new(),
                convergent_tiles: Vec::new(),
                divergent_tiles: Vec::new(),
                transform_tiles: Vec::new(),
            })
            .collect();

        let (hotspots, volcanoes) = trace_hotspots(&topo, &plate_id, &plates, &mut rng);
        for h in &hotspots {
            let mut seen = std::collections::HashSet::new();
            for &t in &h.track {
                assert!(seen.insert(t), "track revisited tile {t}");
            }
        }
        assert_eq!(volcanoes.len(), hotspots.iter().map(|h| h.track.len()).sum::<usize>());
    }
}
