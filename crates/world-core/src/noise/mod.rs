//! Noise expression system (spec §4.4): fBm leaves, domain warp, and the
//! composable `Expr` tree built from them.

pub mod expr;
pub mod fbm;
pub mod warp;

pub use expr::{Expr, Stack};
pub use fbm::Fbm;
pub use warp::domain_warp;
