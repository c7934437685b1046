//! Hamilton largest-remainder apportionment (spec §4.3, GLOSSARY): allocate
//! an exact integer `total` across weighted owners, minimizing rounding
//! error, with ties on the fractional remainder broken by owner index.

/// Allocate `total` whole units across `weights` (need not sum to 1) using
/// the Hamilton / largest-remainder method: each owner first gets
/// `floor(share)`, then the remaining units go to the owners with the
/// largest fractional remainders.
pub fn hamilton_quota(weights: &[f64], total: usize) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        // Degenerate: split as evenly as possible.
        return hamilton_quota(&vec![1.0; weights.len()], total);
    }

    let shares: Vec<f64> = weights.iter().map(|w| w / sum * total as f64).collect();
    let mut quotas: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
    let assigned: usize = quotas.iter().sum();
    let remainder = total.saturating_sub(assigned);

    let mut fractional: Vec<(usize, f64)> = shares
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s - s.floor()))
        .collect();
    // Largest remainder first; ties broken by lower owner index for determinism.
    fractional.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

    for &(idx, _) in fractional.iter().take(remainder) {
        quotas[idx] += 1;
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotas_sum_to_total() {
        let weights = [0.2, 0.3, 0.5];
        let q = hamilton_quota(&weights, 101);
        assert_eq!(q.iter().sum::<usize>(), 101);
    }

    #[test]
    fn equal_weights_split_evenly() {
        let weights = [1.0, 1.0, 1.0, 1.0];
        let q = hamilton_quota(&weights, 100);
        assert_eq!(q, vec![25, 25, 25, 25]);
    }

    #[test]
    fn zero_weights_fall_back_to_even_split() {
        let weights = [0.0, 0.0];
        let q = hamilton_quota(&weights, 10);
        assert_eq!(q.iter().sum::<usize>(), 10);
    }

    #[test]
    fn remainder_favors_larger_fractional_parts() {
        // shares: 1.6, 1.6, 0.8 -> floors 1,1,0 sum=2, remainder=2
        // fractional: 0.6, 0.6, 0.8 -> owner 2 (0.8) gets first extra, then tie between 0/1 by index.
        let weights = [1.6, 1.6, 0.8];
        let q = hamilton_quota(&weights, 4);
        assert_eq!(q, vec![2, 1, 1]);
    }
}
