//! Bounded simple-path enumeration between entry points and targets
//!
//! Each (entry, target) pair is searched independently with a depth-first
//! walk that never revisits a node. Pairs run in parallel; results are
//! reassembled in pair order so output is deterministic.

use crate::graph::ComponentGraph;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Search bounds for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationLimits {
    /// Maximum edges per path
    pub max_depth: usize,
    /// Above this many candidates, paths of fewer than three nodes are dropped
    pub prune_threshold: usize,
    /// Stop searching a pair once this many paths were found
    pub max_paths_per_pair: usize,
    /// Stop searching a pair after this many partial-path extensions
    pub max_explored_per_pair: usize,
    /// Keep at most this many paths across all pairs
    pub max_total_paths: usize,
}

impl Default for EnumerationLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            prune_threshold: 5,
            max_paths_per_pair: 1000,
            max_explored_per_pair: 100_000,
            max_total_paths: 10_000,
        }
    }
}

/// Why a pair search stopped before exhausting the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// `max_paths_per_pair` paths were found
    PathCap,
    /// `max_explored_per_pair` extensions were spent
    ExploreBudget,
}

/// Paths found for a single pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairPaths {
    /// Component ids in traversal order
    pub paths: Vec<Vec<String>>,
    /// Set when a per-pair cap stopped the search early
    pub truncated: Option<Truncation>,
    /// Partial paths extended during the search
    pub explored: usize,
}

/// Paths found across all pairs
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub paths: Vec<Vec<String>>,
    pub pairs_searched: usize,
    pub warnings: Vec<String>,
}

/// All simple paths from `entry` to `target` within the limits.
///
/// Unknown endpoints or `entry == target` yield no paths.
pub fn paths_between(
    graph: &ComponentGraph,
    entry: &str,
    target: &str,
    limits: &EnumerationLimits,
) -> PairPaths {
    let (Some(start), Some(goal)) = (graph.index_of(entry), graph.index_of(target)) else {
        return PairPaths::default();
    };
    if start == goal || limits.max_depth == 0 {
        return PairPaths::default();
    }

    let mut search = PairSearch {
        graph,
        goal,
        limits,
        stack: vec![start],
        visited: vec![false; graph.node_count()],
        found: Vec::new(),
        explored: 0,
    };
    search.visited[start.index()] = true;
    let truncated = search.walk();

    let mut paths: Vec<Vec<String>> = search
        .found
        .into_iter()
        .map(|nodes| {
            nodes
                .into_iter()
                .filter_map(|idx| graph.node_at(idx).map(|n| n.id.clone()))
                .collect()
        })
        .collect();

    if paths.len() > limits.prune_threshold {
        let before = paths.len();
        paths.retain(|p| p.len() >= 3);
        debug!(
            "Pruned {} direct path(s) for {} -> {}",
            before - paths.len(),
            entry,
            target
        );
    }

    PairPaths {
        paths,
        truncated,
        explored: search.explored,
    }
}

/// Depth-first search state for one (entry, target) pair
struct PairSearch<'a> {
    graph: &'a ComponentGraph,
    goal: NodeIndex,
    limits: &'a EnumerationLimits,
    stack: Vec<NodeIndex>,
    visited: Vec<bool>,
    found: Vec<Vec<NodeIndex>>,
    explored: usize,
}

impl PairSearch<'_> {
    /// Extend the top of the stack. Returns the cap that stopped the search, if any.
    fn walk(&mut self) -> Option<Truncation> {
        let current = *self.stack.last()?;
        let depth = self.stack.len() - 1;

        for next in self.graph.successors(current) {
            if self.visited[next.index()] {
                continue;
            }

            if next == self.goal {
                let mut path = self.stack.clone();
                path.push(next);
                self.found.push(path);
                if self.found.len() >= self.limits.max_paths_per_pair {
                    return Some(Truncation::PathCap);
                }
                continue;
            }

            // The goal must still be reachable within the remaining budget
            if depth + 2 > self.limits.max_depth {
                continue;
            }

            if self.explored >= self.limits.max_explored_per_pair {
                return Some(Truncation::ExploreBudget);
            }
            self.explored += 1;

            self.visited[next.index()] = true;
            self.stack.push(next);
            let stopped = self.walk();
            self.stack.pop();
            self.visited[next.index()] = false;

            if stopped.is_some() {
                return stopped;
            }
        }

        None
    }
}

/// Enumerate every (entry, target) pair on a pool of `workers` threads.
///
/// Output order is entry order, then target order, then discovery order.
pub fn enumerate(
    graph: &ComponentGraph,
    entries: &[String],
    targets: &[String],
    limits: &EnumerationLimits,
    workers: usize,
) -> Result<Enumeration, rayon::ThreadPoolBuildError> {
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .flat_map(|e| {
            targets
                .iter()
                .filter(move |t| *t != e)
                .map(move |t| (e.as_str(), t.as_str()))
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()?;

    let per_pair: Vec<PairPaths> = pool.install(|| {
        pairs
            .par_iter()
            .map(|(entry, target)| paths_between(graph, entry, target, limits))
            .collect()
    });

    let mut result = Enumeration {
        pairs_searched: pairs.len(),
        ..Default::default()
    };

    for ((entry, target), found) in pairs.iter().zip(per_pair) {
        if found.paths.is_empty() {
            debug!("No path from {} to {}", entry, target);
        }
        let stopped = match found.truncated {
            Some(Truncation::PathCap) => Some(format!(
                "Path search for {} -> {} stopped at {} path(s)",
                entry, target, limits.max_paths_per_pair
            )),
            Some(Truncation::ExploreBudget) => Some(format!(
                "Path search for {} -> {} stopped after exploring {} partial path(s)",
                entry, target, found.explored
            )),
            None => None,
        };
        if let Some(msg) = stopped {
            warn!("{}", msg);
            result.warnings.push(msg);
        }
        result.paths.extend(found.paths);
    }

    if result.paths.len() > limits.max_total_paths {
        let msg = format!(
            "Kept the first {} of {} enumerated paths",
            limits.max_total_paths,
            result.paths.len()
        );
        warn!("{}", msg);
        result.warnings.push(msg);
        result.paths.truncate(limits.max_total_paths);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Inventory;
    use crate::models::{Component, ComponentKind};

    fn graph(edges: &[(&str, &str)]) -> ComponentGraph {
        let mut ids: Vec<&str> = edges.iter().flat_map(|(a, b)| [*a, *b]).collect();
        ids.sort();
        ids.dedup();

        let components: Vec<Component> = ids
            .iter()
            .map(|id| {
                let mut c = Component::new(id, id, ComponentKind::Ecu);
                for (from, to) in edges {
                    if from == id {
                        c = c.connected_to(to);
                    }
                }
                c
            })
            .collect();
        let inventory = Inventory::new(components.clone());
        ComponentGraph::build(&components, &inventory).graph
    }

    fn ids(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direct_path() {
        let g = graph(&[("a", "b")]);
        let found = paths_between(&g, "a", "b", &EnumerationLimits::default());
        assert_eq!(found.paths, vec![ids(&["a", "b"])]);
        assert_eq!(found.truncated, None);
    }

    #[test]
    fn test_unreachable_pair_has_no_paths() {
        let g = graph(&[("a", "b"), ("c", "d")]);
        assert!(paths_between(&g, "a", "d", &EnumerationLimits::default())
            .paths
            .is_empty());
        assert!(paths_between(&g, "b", "a", &EnumerationLimits::default())
            .paths
            .is_empty());
    }

    #[test]
    fn test_same_entry_and_target_skipped() {
        let g = graph(&[("a", "b"), ("b", "a")]);
        assert!(paths_between(&g, "a", "a", &EnumerationLimits::default())
            .paths
            .is_empty());
    }

    #[test]
    fn test_paths_are_simple() {
        // Cycle b <-> c must not produce repeated nodes
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d"), ("b", "d")]);
        let found = paths_between(&g, "a", "d", &EnumerationLimits::default());
        assert_eq!(found.paths, vec![ids(&["a", "b", "c", "d"]), ids(&["a", "b", "d"])]);
        for path in &found.paths {
            let mut unique = path.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), path.len());
        }
    }

    #[test]
    fn test_depth_bound() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        let limits = EnumerationLimits {
            max_depth: 2,
            ..Default::default()
        };
        let found = paths_between(&g, "a", "d", &limits);
        assert_eq!(found.paths, vec![ids(&["a", "d"])]);

        for path in paths_between(&g, "a", "d", &EnumerationLimits::default()).paths {
            assert!(path.len() <= EnumerationLimits::default().max_depth + 1);
        }
    }

    #[test]
    fn test_zero_depth_finds_nothing() {
        let g = graph(&[("a", "b")]);
        let limits = EnumerationLimits {
            max_depth: 0,
            ..Default::default()
        };
        assert!(paths_between(&g, "a", "b", &limits).paths.is_empty());
    }

    #[test]
    fn test_direct_paths_pruned_above_threshold() {
        // a -> t directly plus five two-hop routes: six candidates
        let mut edges = vec![("a", "t")];
        for mid in ["m1", "m2", "m3", "m4", "m5"] {
            edges.push(("a", mid));
            edges.push((mid, "t"));
        }
        let g = graph(&edges);

        let found = paths_between(&g, "a", "t", &EnumerationLimits::default());
        assert_eq!(found.paths.len(), 5);
        assert!(found.paths.iter().all(|p| p.len() >= 3));

        let relaxed = EnumerationLimits {
            prune_threshold: 10,
            ..Default::default()
        };
        assert_eq!(paths_between(&g, "a", "t", &relaxed).paths.len(), 6);
    }

    #[test]
    fn test_per_pair_cap() {
        let mut edges = Vec::new();
        for mid in ["m1", "m2", "m3", "m4"] {
            edges.push(("a", mid));
            edges.push((mid, "t"));
        }
        let g = graph(&edges);
        let limits = EnumerationLimits {
            max_paths_per_pair: 2,
            ..Default::default()
        };
        let found = paths_between(&g, "a", "t", &limits);
        assert_eq!(found.paths.len(), 2);
        assert_eq!(found.truncated, Some(Truncation::PathCap));
    }

    /// Every node links to every other; `t` only has outgoing edges
    fn dense_without_route(size: usize) -> ComponentGraph {
        let names: Vec<String> = (0..size).map(|i| format!("n{}", i)).collect();
        let mut edges: Vec<(&str, &str)> = Vec::new();
        for a in &names {
            for b in &names {
                if a != b {
                    edges.push((a.as_str(), b.as_str()));
                }
            }
        }
        edges.push(("t", "n0"));
        graph(&edges)
    }

    #[test]
    fn test_explore_budget_stops_unreachable_search() {
        let g = dense_without_route(12);
        let limits = EnumerationLimits {
            max_depth: 12,
            max_paths_per_pair: 1,
            max_explored_per_pair: 500,
            ..Default::default()
        };
        let found = paths_between(&g, "n0", "t", &limits);
        assert!(found.paths.is_empty());
        assert_eq!(found.truncated, Some(Truncation::ExploreBudget));
        assert_eq!(found.explored, 500);

        let result = enumerate(&g, &ids(&["n0"]), &ids(&["t"]), &limits, 1).expect("pool");
        assert!(result.paths.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("partial path"));
    }

    #[test]
    fn test_small_search_stays_under_budget() {
        let g = dense_without_route(4);
        let found = paths_between(&g, "n0", "t", &EnumerationLimits::default());
        assert!(found.paths.is_empty());
        assert_eq!(found.truncated, None);
        // 3 + 3*2 + 3*2*1 simple extensions from n0
        assert_eq!(found.explored, 15);
    }

    #[test]
    fn test_enumerate_orders_by_pair() {
        let g = graph(&[("a", "x"), ("a", "y"), ("b", "x")]);
        let entries = ids(&["b", "a"]);
        let targets = ids(&["y", "x"]);
        let result = enumerate(&g, &entries, &targets, &EnumerationLimits::default(), 2)
            .expect("pool");

        assert_eq!(result.pairs_searched, 4);
        assert_eq!(
            result.paths,
            vec![ids(&["b", "x"]), ids(&["a", "y"]), ids(&["a", "x"])]
        );
    }

    #[test]
    fn test_enumerate_global_cap() {
        let g = graph(&[("a", "x"), ("a", "y"), ("a", "z")]);
        let limits = EnumerationLimits {
            max_total_paths: 2,
            ..Default::default()
        };
        let result =
            enumerate(&g, &ids(&["a"]), &ids(&["x", "y", "z"]), &limits, 1).expect("pool");
        assert_eq!(result.paths.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_enumerate_is_deterministic() {
        let g = graph(&[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d"), ("b", "d")]);
        let entries = ids(&["a", "b"]);
        let targets = ids(&["c", "d"]);
        let first = enumerate(&g, &entries, &targets, &EnumerationLimits::default(), 4)
            .expect("pool");
        let second = enumerate(&g, &entries, &targets, &EnumerationLimits::default(), 1)
            .expect("pool");
        assert_eq!(first.paths, second.paths);
    }
}
