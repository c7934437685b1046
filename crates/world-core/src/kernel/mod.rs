//! The flood-fill / selector / stamper kernel (spec §4.3): the shared
//! primitives every higher-level stage (plates, hydrology, features,
//! climate) builds its spatial operations from. Keeping them here means
//! every stage gets the same deterministic tie-breaking for free instead of
//! reimplementing it.

pub mod dijkstra;
pub mod flood;
pub mod priority;
pub mod quota;
pub mod selector;
pub mod stamper;

pub use dijkstra::weighted_cost_field;
pub use flood::{fractal_flood_fill, simple_bfs, FillResult, FillSeed};
pub use priority::{Candidate, PriorityQueue};
pub use quota::hamilton_quota;
pub use selector::{select_area, AreaSelection, AreaSelectorConfig};
pub use stamper::{brush_stamp, stamp, stamp_orogeny_spine, Falloff, StampAction};
