//! Volcanism (spec §4.6): boundary tiles are volcanic candidates; each is
//! accepted against a context-specific spawn threshold, then a volcano type
//! is drawn from a context-specific categorical weight table and given an
//! intensity drawn from a context-specific range.

use crate::rng::WorldRng;
use crate::tile::{BoundaryKind, CrustKind, Volcano, VolcanoId, VolcanoType};
use crate::topology::Topology;

struct Context {
    spawn_threshold: f32,
    type_weights: [(VolcanoType, f32); 4],
    intensity_range: (f32, f32),
}

fn context_for(boundary: BoundaryKind, crust: CrustKind) -> Option<Context> {
    match (boundary, crust) {
        (BoundaryKind::Convergent, CrustKind::Continental) => Some(Context {
            spawn_threshold: 0.08,
            type_weights: [
                (VolcanoType::StratoVolcano, 0.55),
                (VolcanoType::Caldera, 0.2),
                (VolcanoType::CinderCone, 0.2),
                (VolcanoType::ShieldVolcano, 0.05),
            ],
            intensity_range: (0.4, 1.0),
        }),
        (BoundaryKind::Convergent, _) => Some(Context {
            spawn_threshold: 0.05,
            type_weights: [
                (VolcanoType::ShieldVolcano, 0.5),
                (VolcanoType::StratoVolcano, 0.35),
                (VolcanoType::CinderCone, 0.1),
                (VolcanoType::Caldera, 0.05),
            ],
            intensity_range: (0.3, 0.8),
        }),
        (BoundaryKind::Divergent, _) => Some(Context {
            spawn_threshold: 0.12,
            type_weights: [
                (VolcanoType::FissureVent, 0.7),
                (VolcanoType::ShieldVolcano, 0.2),
                (VolcanoType::CinderCone, 0.1),
                (VolcanoType::Caldera, 0.0),
            ],
            intensity_range: (0.2, 0.6),
        }),
        (BoundaryKind::Transform, _) => Some(Context {
            spawn_threshold: 0.02,
            type_weights: [
                (VolcanoType::CinderCone, 0.6),
                (VolcanoType::ShieldVolcano, 0.3),
                (VolcanoType::FissureVent, 0.1),
                (VolcanoType::Caldera, 0.0),
            ],
            intensity_range: (0.1, 0.4),
        }),
        (BoundaryKind::None, _) => None,
    }
}

fn sample_type(weights: &[(VolcanoType, f32); 4], draw: f32) -> VolcanoType {
    let total: f32 = weights.iter().map(|(_, w)| w).sum();
    let mut cursor = draw * total;
    for &(kind, w) in weights {
        if cursor < w {
            return kind;
        }
        cursor -= w;
    }
    weights[0].0
}

pub fn spawn_volcanoes(
    topo: &Topology,
    boundary_kind: &[BoundaryKind],
    crust_kind: &[CrustKind],
    next_id: &mut VolcanoId,
    rng: &mut WorldRng,
) -> Vec<Volcano> {
    let mut fork = rng.fork("features::volcanism");
    let mut volcanoes = Vec::new();

    for t in 0..topo.tile_count() as u32 {
        let Some(ctx) = context_for(boundary_kind[t as usize], crust_kind[t as usize]) else { continue };
        if fork.next_f32() >= ctx.spawn_threshold {
            continue;
        }
        let kind = sample_type(&ctx.type_weights, fork.next_f32());
        let intensity = fork.next_range(ctx.intensity_range.0 as f64, ctx.intensity_range.1 as f64) as f32;
        volcanoes.push(Volcano { id: *next_id, tile: t, kind, intensity });
        *next_id += 1;
    }

    volcanoes
}
