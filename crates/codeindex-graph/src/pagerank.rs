//! Weighted PageRank by power iteration.
//!
//! Operates on a plain index-based edge list so callers can rank working
//! copies (with virtual nodes) without touching the authoritative graph.

/// Compute PageRank over `n` nodes and weighted directed edges.
///
/// Dangling mass is redistributed uniformly; iteration stops at `tolerance`
/// (L1 distance between successive vectors) or `max_iterations`.
pub fn weighted_pagerank(
    n: usize,
    edges: &[(usize, usize, f64)],
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    let nf = n as f64;

    // Outgoing adjacency with precomputed per-source weight sums.
    let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut out_weight = vec![0.0f64; n];
    for &(src, dst, weight) in edges {
        if src >= n || dst >= n || weight <= 0.0 {
            continue;
        }
        out[src].push((dst, weight));
        out_weight[src] += weight;
    }

    let mut scores = vec![1.0 / nf; n];

    for _ in 0..max_iterations {
        let mut next = vec![(1.0 - damping) / nf; n];

        for src in 0..n {
            if out_weight[src] == 0.0 {
                // Dangling node: spread its mass over everyone.
                let share = damping * scores[src] / nf;
                for slot in next.iter_mut() {
                    *slot += share;
                }
            } else {
                let mass = damping * scores[src] / out_weight[src];
                for &(dst, weight) in &out[src] {
                    next[dst] += mass * weight;
                }
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();

        scores = next;

        if diff < tolerance {
            break;
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAMPING: f64 = 0.85;
    const ITERS: usize = 100;
    const TOL: f64 = 1e-6;

    #[test]
    fn empty_graph_returns_empty() {
        assert!(weighted_pagerank(0, &[], DAMPING, ITERS, TOL).is_empty());
    }

    #[test]
    fn single_node_gets_all_mass() {
        let scores = weighted_pagerank(1, &[], DAMPING, ITERS, TOL);
        assert!((scores[0] - 1.0).abs() < 0.01);
    }

    #[test]
    fn chain_accumulates_downstream() {
        // 0 -> 1 -> 2: rank flows down the chain.
        let scores = weighted_pagerank(3, &[(0, 1, 1.0), (1, 2, 1.0)], DAMPING, ITERS, TOL);
        assert!(scores[2] > scores[1]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn mass_is_conserved() {
        let scores = weighted_pagerank(
            4,
            &[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)],
            DAMPING,
            ITERS,
            TOL,
        );
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 0.01, "total {total}");
    }

    #[test]
    fn heavier_edge_attracts_more_mass() {
        // 0 points at 1 with weight 10 and at 2 with weight 1.
        let scores = weighted_pagerank(3, &[(0, 1, 10.0), (0, 2, 1.0)], DAMPING, ITERS, TOL);
        assert!(scores[1] > scores[2]);
    }

    #[test]
    fn star_center_ranks_highest() {
        // 1, 2, 3 all point at 0.
        let scores = weighted_pagerank(
            4,
            &[(1, 0, 1.0), (2, 0, 1.0), (3, 0, 1.0)],
            DAMPING,
            ITERS,
            TOL,
        );
        for leaf in 1..4 {
            assert!(scores[0] > scores[leaf]);
        }
    }
}
