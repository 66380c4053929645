//! Fixed-link connectivity graph.
//!
//! `ConnectivityGraph` holds a deduplicated adjacency list over [`SystemId`]s
//! and provides unweighted BFS distances, routes, centrality measures and
//! articulation points (chokepoints). Neighbor lists are sorted so every
//! traversal visits systems in enumeration order.

use std::collections::VecDeque;

use crate::error::{PlannerError, PlannerResult};
use crate::network::{Network, SystemId};

/// Hop counts from one source to every system; `None` = unreachable.
pub type HopRow = Vec<Option<u32>>;

#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    adj: Vec<Vec<SystemId>>,
    edge_count: usize,
}

impl ConnectivityGraph {
    /// Build the graph from a network's internal fixed links.
    pub fn new(network: &Network) -> Self {
        Self::from_edges(network.len(), network.links().iter().copied())
    }

    /// Build a graph over `len` systems from arbitrary edges.
    pub fn from_edges(len: usize, edges: impl IntoIterator<Item = (SystemId, SystemId)>) -> Self {
        let mut adj: Vec<Vec<SystemId>> = vec![Vec::new(); len];
        for (a, b) in edges {
            if a == b {
                continue;
            }
            adj[a.index()].push(b);
            adj[b.index()].push(a);
        }
        let mut edge_count = 0;
        for neighbors in &mut adj {
            neighbors.sort_unstable();
            neighbors.dedup();
            edge_count += neighbors.len();
        }
        Self {
            adj,
            edge_count: edge_count / 2,
        }
    }

    /// A copy of this graph with extra one-hop edges (e.g. active bridges).
    pub fn with_extra_edges(&self, extra: &[(SystemId, SystemId)]) -> Self {
        let mut edges = Vec::with_capacity(self.edge_count + extra.len());
        for (i, neighbors) in self.adj.iter().enumerate() {
            let a = SystemId(i as u32);
            edges.extend(neighbors.iter().filter(|&&b| a < b).map(|&b| (a, b)));
        }
        edges.extend_from_slice(extra);
        Self::from_edges(self.adj.len(), edges)
    }

    pub fn len(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn neighbors(&self, id: SystemId) -> &[SystemId] {
        &self.adj[id.index()]
    }

    /// Number of fixed links at a system.
    pub fn degree(&self, id: SystemId) -> usize {
        self.adj[id.index()].len()
    }

    /// BFS hop counts from `source` to every system.
    pub fn hops_from(&self, source: SystemId) -> HopRow {
        let mut dist: HopRow = vec![None; self.adj.len()];
        let mut queue = VecDeque::new();
        dist[source.index()] = Some(0);
        queue.push_back(source);
        while let Some(current) = queue.pop_front() {
            let next_hops = dist[current.index()].map(|d| d + 1);
            for &next in &self.adj[current.index()] {
                if dist[next.index()].is_none() {
                    dist[next.index()] = next_hops;
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Shortest fixed-link hop count, or `None` when no path exists.
    pub fn hop_distance(&self, from: SystemId, to: SystemId) -> Option<u32> {
        self.hops_from(from)[to.index()]
    }

    /// Shortest route including both endpoints, or `None` when unreachable.
    pub fn route(&self, from: SystemId, to: SystemId) -> Option<Vec<SystemId>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut parent: Vec<Option<SystemId>> = vec![None; self.adj.len()];
        let mut visited = vec![false; self.adj.len()];
        let mut queue = VecDeque::new();
        visited[from.index()] = true;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for &next in &self.adj[current.index()] {
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;
                parent[next.index()] = Some(current);
                if next == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while let Some(prev) = parent[cursor.index()] {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.adj.len()];
        let mut components = 0;
        for start in 0..self.adj.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(v) = stack.pop() {
                for &w in &self.adj[v] {
                    if !seen[w.index()] {
                        seen[w.index()] = true;
                        stack.push(w.index());
                    }
                }
            }
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }

    /// Fail with `Disconnected` unless the graph is a single component.
    pub fn ensure_connected(&self) -> PlannerResult<()> {
        let components = self.component_count();
        if components > 1 {
            return Err(PlannerError::Disconnected { components });
        }
        Ok(())
    }

    /// Closeness centrality per system: `(r - 1) / sum(dist)` scaled by
    /// `(r - 1) / (n - 1)`, where `r` counts systems reachable from it.
    /// Requires a connected graph.
    pub fn closeness_centrality(&self) -> PlannerResult<Vec<f64>> {
        self.ensure_connected()?;
        let n = self.adj.len();
        let scores = (0..n)
            .map(|i| {
                let row = self.hops_from(SystemId(i as u32));
                let reached: Vec<u32> = row.into_iter().flatten().collect();
                let total: u32 = reached.iter().sum();
                if total == 0 || n <= 1 {
                    return 0.0;
                }
                let others = (reached.len() - 1) as f64;
                (others / total as f64) * (others / (n - 1) as f64)
            })
            .collect();
        Ok(scores)
    }

    /// Normalized betweenness centrality (Brandes).
    ///
    /// With `sources = Some(k)` only the first `k` systems in enumeration order
    /// are used as BFS sources and the result is scaled by `n / k`; the sample
    /// is deterministic. `None` computes the exact value. Requires a connected
    /// graph.
    pub fn betweenness_centrality(&self, sources: Option<usize>) -> PlannerResult<Vec<f64>> {
        self.ensure_connected()?;
        let n = self.adj.len();
        let k = sources.map_or(n, |k| k.min(n));
        let mut centrality = vec![0.0f64; n];

        for s in 0..k {
            let mut order = Vec::with_capacity(n);
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut sigma = vec![0.0f64; n];
            let mut dist: Vec<Option<u32>> = vec![None; n];
            sigma[s] = 1.0;
            dist[s] = Some(0);
            let mut queue = VecDeque::from([s]);

            while let Some(v) = queue.pop_front() {
                order.push(v);
                let dv = dist[v].unwrap_or(0);
                for &w in &self.adj[v] {
                    let w = w.index();
                    if dist[w].is_none() {
                        dist[w] = Some(dv + 1);
                        queue.push_back(w);
                    }
                    if dist[w] == Some(dv + 1) {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }

            let mut delta = vec![0.0f64; n];
            while let Some(w) = order.pop() {
                for &v in &preds[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    centrality[w] += delta[w];
                }
            }
        }

        if n > 2 {
            let mut scale = 1.0 / ((n - 1) * (n - 2)) as f64;
            if k > 0 && k < n {
                scale *= n as f64 / k as f64;
            }
            for value in &mut centrality {
                *value *= scale;
            }
        }
        Ok(centrality)
    }

    /// Systems whose removal splits their component (chokepoints), in
    /// enumeration order. Iterative Tarjan low-link.
    pub fn articulation_points(&self) -> Vec<SystemId> {
        let n = self.adj.len();
        let mut disc: Vec<Option<u32>> = vec![None; n];
        let mut low = vec![0u32; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut is_cut = vec![false; n];
        let mut timer = 0u32;

        for root in 0..n {
            if disc[root].is_some() {
                continue;
            }
            disc[root] = Some(timer);
            low[root] = timer;
            timer += 1;
            let mut root_children = 0;
            // (system, index of the next neighbor to visit)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(top) = stack.last_mut() {
                let v = top.0;
                if top.1 < self.adj[v].len() {
                    let w = self.adj[v][top.1].index();
                    top.1 += 1;
                    match disc[w] {
                        None => {
                            parent[w] = Some(v);
                            disc[w] = Some(timer);
                            low[w] = timer;
                            timer += 1;
                            if v == root {
                                root_children += 1;
                            }
                            stack.push((w, 0));
                        }
                        Some(dw) if parent[v] != Some(w) => low[v] = low[v].min(dw),
                        Some(_) => {}
                    }
                } else {
                    stack.pop();
                    if let Some(&(p, _)) = stack.last() {
                        low[p] = low[p].min(low[v]);
                        if p != root && disc[p].is_some_and(|dp| low[v] >= dp) {
                            is_cut[p] = true;
                        }
                    }
                }
            }
            if root_children > 1 {
                is_cut[root] = true;
            }
        }

        (0..n)
            .filter(|&i| is_cut[i])
            .map(|i| SystemId(i as u32))
            .collect()
    }

    /// Edges present over edges possible.
    pub fn density(&self) -> f64 {
        let n = self.adj.len();
        if n < 2 {
            return 0.0;
        }
        2.0 * self.edge_count as f64 / (n * (n - 1)) as f64
    }

    /// Diameter and mean shortest-path length over all ordered pairs.
    /// Requires a connected graph.
    pub fn path_length_stats(&self) -> PlannerResult<(u32, f64)> {
        self.ensure_connected()?;
        let n = self.adj.len();
        if n < 2 {
            return Ok((0, 0.0));
        }
        let mut diameter = 0;
        let mut total: u64 = 0;
        for i in 0..n {
            for d in self.hops_from(SystemId(i as u32)).into_iter().flatten() {
                diameter = diameter.max(d);
                total += u64::from(d);
            }
        }
        Ok((diameter, total as f64 / (n * (n - 1)) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(u32, u32)]) -> ConnectivityGraph {
        ConnectivityGraph::from_edges(n, edges.iter().map(|&(a, b)| (SystemId(a), SystemId(b))))
    }

    fn path3() -> ConnectivityGraph {
        // 0 - 1 - 2
        graph(3, &[(0, 1), (1, 2)])
    }

    #[test]
    fn test_hops_and_distance() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let row = g.hops_from(SystemId(0));
        assert_eq!(row, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(g.hop_distance(SystemId(3), SystemId(0)), Some(3));
    }

    #[test]
    fn test_unreachable() {
        let g = graph(3, &[(0, 1)]);
        assert_eq!(g.hop_distance(SystemId(0), SystemId(2)), None);
        assert_eq!(g.route(SystemId(0), SystemId(2)), None);
        assert_eq!(g.component_count(), 2);
        assert!(matches!(
            g.ensure_connected(),
            Err(PlannerError::Disconnected { components: 2 })
        ));
    }

    #[test]
    fn test_route() {
        //     0
        //    / \
        //   1   2
        //  / \
        // 3   4
        let g = graph(5, &[(0, 1), (0, 2), (1, 3), (1, 4)]);
        let route = g.route(SystemId(2), SystemId(4)).unwrap();
        assert_eq!(route, vec![SystemId(2), SystemId(0), SystemId(1), SystemId(4)]);
        assert_eq!(g.route(SystemId(3), SystemId(3)), Some(vec![SystemId(3)]));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let g = graph(2, &[(0, 1), (1, 0), (0, 1)]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(SystemId(0)), 1);
    }

    #[test]
    fn test_closeness_path() {
        let c = path3().closeness_centrality().unwrap();
        assert!((c[0] - 2.0 / 3.0).abs() < 1e-9);
        assert!((c[1] - 1.0).abs() < 1e-9);
        assert!((c[2] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_path_exact() {
        let b = path3().betweenness_centrality(None).unwrap();
        assert_eq!(b[0], 0.0);
        assert!((b[1] - 1.0).abs() < 1e-9);
        assert_eq!(b[2], 0.0);
    }

    #[test]
    fn test_betweenness_star() {
        let g = graph(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let b = g.betweenness_centrality(None).unwrap();
        assert!((b[0] - 1.0).abs() < 1e-9);
        for leaf in &b[1..] {
            assert_eq!(*leaf, 0.0);
        }
    }

    #[test]
    fn test_betweenness_sample_is_deterministic() {
        let g = graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
        let first = g.betweenness_centrality(Some(2)).unwrap();
        let second = g.betweenness_centrality(Some(2)).unwrap();
        assert_eq!(first, second);
        // sample larger than the graph is the exact computation
        assert_eq!(
            g.betweenness_centrality(Some(100)).unwrap(),
            g.betweenness_centrality(None).unwrap()
        );
    }

    #[test]
    fn test_betweenness_uses_first_sources_rescaled() {
        // 0 - 1 - 2 - 3
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let exact = g.betweenness_centrality(None).unwrap();
        assert!((exact[1] - 2.0 / 3.0).abs() < 1e-9);
        assert!((exact[2] - 2.0 / 3.0).abs() < 1e-9);

        // source 0 alone: 1 sits on 0->2 and 0->3, 2 on 0->3; scaled by 4/1
        let one = g.betweenness_centrality(Some(1)).unwrap();
        assert_eq!(one[0], 0.0);
        assert!((one[1] - 4.0 / 3.0).abs() < 1e-9);
        assert!((one[2] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(one[3], 0.0);

        // sources 0 and 1 happen to give the exact values after the 4/2 rescale
        let two = g.betweenness_centrality(Some(2)).unwrap();
        for (sampled, full) in two.iter().zip(&exact) {
            assert!((sampled - full).abs() < 1e-9);
        }
    }

    #[test]
    fn test_centrality_requires_connected() {
        let g = graph(3, &[(0, 1)]);
        assert!(g.closeness_centrality().is_err());
        assert!(g.betweenness_centrality(None).is_err());
    }

    #[test]
    fn test_articulation_points() {
        // 0 - 1 - 2 - 3, plus triangle 2-3-4: cut vertices are 1 and 2
        let g = graph(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 2)]);
        assert_eq!(g.articulation_points(), vec![SystemId(1), SystemId(2)]);
    }

    #[test]
    fn test_articulation_points_cycle_has_none() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert!(g.articulation_points().is_empty());
    }

    #[test]
    fn test_articulation_root_with_two_children() {
        let g = graph(3, &[(0, 1), (0, 2)]);
        assert_eq!(g.articulation_points(), vec![SystemId(0)]);
    }

    #[test]
    fn test_extra_edges() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let bridged = g.with_extra_edges(&[(SystemId(0), SystemId(3))]);
        assert_eq!(bridged.hop_distance(SystemId(0), SystemId(3)), Some(1));
        assert_eq!(bridged.edge_count(), 4);
        // original untouched
        assert_eq!(g.hop_distance(SystemId(0), SystemId(3)), Some(3));
    }

    #[test]
    fn test_path_length_stats() {
        let (diameter, avg) = path3().path_length_stats().unwrap();
        assert_eq!(diameter, 2);
        // pairs: 1,2,1 each way → 8 / 6
        assert!((avg - 8.0 / 6.0).abs() < 1e-9);
        assert!((path3().density() - 2.0 / 3.0).abs() < 1e-9);
    }
}
