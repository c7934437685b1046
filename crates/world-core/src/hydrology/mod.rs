//! Hydrology pipeline (spec §4.7): flow accumulation, lakes, rivers,
//! fjords/glaciers, and a final waterbody pass over whatever the fills
//! leave behind.

mod flow;
mod glaciers;
mod lakes;
mod rivers;
mod waterbodies;

pub use flow::compute_flow_accumulation;
pub use glaciers::trace_glaciers;
pub use lakes::fill_lakes;
pub use rivers::carve_rivers;
pub use waterbodies::collect_waterbodies;

use crate::buffers::BufferPool;
use crate::rng::WorldRng;
use crate::tile::{Tile, Waterbody};
use crate::topology::Topology;

pub struct HydrologyOutput {
    pub waterbodies: Vec<Waterbody>,
}

/// Run the full hydrology pipeline in order: flow accumulation feeds both
/// lakes (from its pits) and rivers (from its high-flow channels); glaciers
/// read the resulting water/land layout to trace fjords; the waterbody pass
/// runs last over whatever lakes and the ocean leave behind.
pub fn run_hydrology(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng, pool: &BufferPool) -> HydrologyOutput {
    let mut fork = rng.fork("hydrology");

    compute_flow_accumulation(topo, tiles);
    fill_lakes(topo, tiles, &mut fork);
    carve_rivers(topo, tiles);
    trace_glaciers(topo, tiles, &mut fork);
    let waterbodies = collect_waterbodies(topo, tiles, pool);

    HydrologyOutput { waterbodies }
}
