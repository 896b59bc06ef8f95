//! Variant B - kidney-exchange cycle finding. The compatibility graph is a
//! flat, index-addressed edge array rather than a pointer-linked graph, per
//! the design note "cyclic data -> index arrays"; cycles are triples of edge
//! indices, `UNMATCHED`-padded for length-2 cycles.

use crate::data::UNMATCHED;

const LOG_TARGET: &str = "veilmatch::solver::kidney_exchange";

/// A directed compatibility edge between two `(hospital_id, pair_id)`
/// vertices, collapsed here to the pair id (hospital bookkeeping lives with
/// the caller).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompatEdge {
    pub from_pair: u16,
    pub to_pair: u16,
}

/// A selected cycle: up to 3 edge indices into the input `edges` array,
/// `UNMATCHED`-padded for length-2 cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycle {
    pub edges: [u16; 3],
}

impl Cycle {
    fn empty() -> Self {
        Self { edges: [UNMATCHED; 3] }
    }
}

/// Enumerates simple 2-/3-cycles over `edges[0..actual_edge_count]` by
/// triple-nested indexed iteration (fixed bound `MAX_EDGES`), selecting
/// greedily and edge-disjoint, preferring length-3 cycles first.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(actual_edge_count))]
pub fn find_cycles<const MAX_EDGES: usize, const MAX_CYCLES: usize>(
    edges: &[CompatEdge; MAX_EDGES],
    actual_edge_count: usize,
) -> [Cycle; MAX_CYCLES] {
    let mut used = [false; MAX_EDGES];
    let mut cycles = [Cycle::empty(); MAX_CYCLES];
    let mut count = 0usize;

    'three: for i in 0..actual_edge_count {
        if used[i] || count >= MAX_CYCLES {
            continue;
        }
        for j in 0..actual_edge_count {
            if j == i || used[j] || edges[j].from_pair != edges[i].to_pair {
                continue;
            }
            for k in 0..actual_edge_count {
                if k == i || k == j || used[k] {
                    continue;
                }
                if edges[k].from_pair == edges[j].to_pair && edges[k].to_pair == edges[i].from_pair
                {
                    used[i] = true;
                    used[j] = true;
                    used[k] = true;
                    cycles[count] = Cycle { edges: [i as u16, j as u16, k as u16] };
                    count += 1;
                    if count >= MAX_CYCLES {
                        break 'three;
                    }
                    continue 'three;
                }
            }
        }
    }

    'two: for i in 0..actual_edge_count {
        if used[i] || count >= MAX_CYCLES {
            continue;
        }
        for j in 0..actual_edge_count {
            if j == i || used[j] {
                continue;
            }
            if edges[j].from_pair == edges[i].to_pair && edges[j].to_pair == edges[i].from_pair {
                used[i] = true;
                used[j] = true;
                cycles[count] = Cycle { edges: [i as u16, j as u16, UNMATCHED] };
                count += 1;
                if count >= MAX_CYCLES {
                    break 'two;
                }
                continue 'two;
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_simple_two_cycle() {
        let edges: [CompatEdge; 2] = [
            CompatEdge { from_pair: 0, to_pair: 1 },
            CompatEdge { from_pair: 1, to_pair: 0 },
        ];
        let cycles = find_cycles::<2, 2>(&edges, 2);
        assert_eq!(cycles[0].edges, [0, 1]);
        assert_eq!(cycles[1], Cycle::empty());
    }

    #[test]
    fn prefers_three_cycles_over_two_cycles_sharing_an_edge() {
        // 0->1, 1->2, 2->0 forms a 3-cycle; 0->1 also pairs with a 1->0 edge
        // that would form a 2-cycle but shares edge 0.
        let edges: [CompatEdge; 4] = [
            CompatEdge { from_pair: 0, to_pair: 1 },
            CompatEdge { from_pair: 1, to_pair: 2 },
            CompatEdge { from_pair: 2, to_pair: 0 },
            CompatEdge { from_pair: 1, to_pair: 0 },
        ];
        let cycles = find_cycles::<4, 2>(&edges, 4);
        assert_eq!(cycles[0].edges, [0, 1, 2]);
    }

    #[test]
    fn scenario_e6_five_pairs_complete_compatibility() {
        // 5 donor-recipient pairs, compatibility proven for every ordered
        // pair (complete directed graph minus self-loops).
        let mut edges = [CompatEdge { from_pair: 0, to_pair: 0 }; 20];
        let mut n = 0;
        for from in 0u16..5 {
            for to in 0u16..5 {
                if from != to {
                    edges[n] = CompatEdge { from_pair: from, to_pair: to };
                    n += 1;
                }
            }
        }
        let cycles = find_cycles::<20, 4>(&edges, n);

        let found = cycles.iter().any(|c| c.edges[0] != UNMATCHED);
        assert!(found, "expected at least one cycle");

        let mut seen_edges = std::collections::HashSet::new();
        for cycle in &cycles {
            for &e in &cycle.edges {
                if e == UNMATCHED {
                    continue;
                }
                assert!(seen_edges.insert(e), "edge {e} used in two cycles");
            }
        }
    }

    #[test]
    fn no_cycles_when_graph_is_acyclic() {
        let edges: [CompatEdge; 2] = [
            CompatEdge { from_pair: 0, to_pair: 1 },
            CompatEdge { from_pair: 1, to_pair: 2 },
        ];
        let cycles = find_cycles::<2, 2>(&edges, 2);
        assert_eq!(cycles, [Cycle::empty(), Cycle::empty()]);
    }
}
