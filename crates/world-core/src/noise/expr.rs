//! Composable noise expressions (spec §4.4): evaluable-at-position trees
//! whose leaves are fBm stacks and whose operators combine or perturb them.
//! Expressions are immutable and safely shareable across threads — every
//! stage that samples terrain roughness, mask thresholds, or climate detail
//! noise builds one of these once and evaluates it per tile from any
//! worker.

use crate::noise::fbm::Fbm;
use crate::noise::warp::domain_warp;
use crate::sphere::Vec3;

/// A leaf noise source: one fBm octave stack at a fixed scale and seed
/// offset.
pub struct Stack {
    fbm: Fbm,
}

impl Stack {
    pub fn new(seed: u32, h: f32, octaves: u32, scale: f64) -> Self {
        Self { fbm: Fbm::new(seed, h, octaves, scale) }
    }

    fn eval(&self, p: Vec3) -> f64 {
        self.fbm.sample(p)
    }
}

/// A composable, position-evaluable noise expression (spec §4.4).
pub enum Expr {
    Leaf(Stack),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    /// Zero below `threshold`, one at/above it (a hard mask, not a
    /// smoothstep — callers wanting soft edges compose with `Mul`).
    Threshold(Box<Expr>, f64),
    Invert(Box<Expr>),
    /// Evaluates `warp_source` at `p` (and two decorrelated offset samples
    /// of the same source) to perturb `p`, then evaluates `base` at the
    /// perturbed position. `warp_source` is itself an arbitrary `Expr`, so
    /// any composable noise tree can drive the warp.
    DomainWarp { base: Box<Expr>, warp_source: Box<Expr>, strength: f64 },
}

impl Expr {
    pub fn leaf(seed: u32, h: f32, octaves: u32, scale: f64) -> Self {
        Expr::Leaf(Stack::new(seed, h, octaves, scale))
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(b))
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Mul(Box::new(a), Box::new(b))
    }

    pub fn threshold(a: Expr, t: f64) -> Self {
        Expr::Threshold(Box::new(a), t)
    }

    pub fn invert(a: Expr) -> Self {
        Expr::Invert(Box::new(a))
    }

    pub fn domain_warp(base: Expr, warp_source: Expr, strength: f64) -> Self {
        Expr::DomainWarp { base: Box::new(base), warp_source: Box::new(warp_source), strength }
    }

    /// Evaluate the expression tree at `p`. Pure: no mutable state, safe to
    /// call concurrently from many workers over the same `Expr`.
    pub fn eval(&self, p: Vec3) -> f64 {
        match self {
            Expr::Leaf(stack) => stack.eval(p),
            Expr::Add(a, b) => a.eval(p) + b.eval(p),
            Expr::Mul(a, b) => a.eval(p) * b.eval(p),
            Expr::Threshold(a, t) => {
                if a.eval(p) >= *t {
                    1.0
                } else {
                    0.0
                }
            }
            Expr::Invert(a) => -a.eval(p),
            Expr::DomainWarp { base, warp_source, strength } => {
                let warped = domain_warp(p, warp_source, *strength);
                base.eval(warped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_combines_two_leaves() {
        let a = Expr::leaf(1, 0.7, 4, 3.0);
        let b = Expr::leaf(2, 0.7, 4, 3.0);
        let p = Vec3::from_latlon(10.0, 20.0);
        let expected = a.eval(p) + {
            let b2 = Expr::leaf(2, 0.7, 4, 3.0);
            b2.eval(p)
        };
        let combo = Expr::add(Expr::leaf(1, 0.7, 4, 3.0), b);
        assert!((combo.eval(p) - expected).abs() < 1e-9);
        let _ = a;
    }

    #[test]
    fn threshold_is_binary() {
        let expr = Expr::threshold(Expr::leaf(5, 0.7, 4, 3.0), -10.0);
        let p = Vec3::from_latlon(0.0, 0.0);
        assert_eq!(expr.eval(p), 1.0);
        let expr2 = Expr::threshold(Expr::leaf(5, 0.7, 4, 3.0), 10.0);
        assert_eq!(expr2.eval(p), 0.0);
    }

    #[test]
    fn invert_negates() {
        let leaf = Expr::leaf(9, 0.7, 4, 3.0);
        let p = Vec3::from_latlon(5.0, 5.0);
        let base = Expr::leaf(9, 0.7, 4, 3.0).eval(p);
        let inverted = Expr::invert(leaf);
        assert!((inverted.eval(p) + base).abs() < 1e-9);
    }

    #[test]
    fn domain_warp_changes_result_vs_unwarped() {
        let warped = Expr::domain_warp(Expr::leaf(3, 0.7, 4, 3.0), Expr::leaf(77, 0.7, 4, 2.0), 0.3);
        let plain = Expr::leaf(3, 0.7, 4, 3.0);
        let p = Vec3::from_latlon(33.0, 12.0);
        assert_ne!(warped.eval(p), plain.eval(p));
    }

    #[test]
    fn domain_warp_source_is_composable() {
        // The warp source is an arbitrary Expr, not just a single leaf.
        let source = Expr::add(Expr::leaf(1, 0.6, 3, 2.0), Expr::leaf(2, 0.6, 3, 2.0));
        let warped = Expr::domain_warp(Expr::leaf(9, 0.7, 4, 3.0), source, 0.25);
        let plain = Expr::leaf(9, 0.7, 4, 3.0);
        let p = Vec3::from_latlon(-8.0, 51.0);
        assert_ne!(warped.eval(p), plain.eval(p));
    }

    #[test]
    fn eval_is_deterministic() {
        let expr = Expr::mul(Expr::leaf(1, 0.6, 3, 2.0), Expr::leaf(2, 0.6, 3, 2.0));
        let p = Vec3::from_latlon(-40.0, 100.0);
        assert_eq!(expr.eval(p), expr.eval(p));
    }
}
