use super::*;
use crate::error::{OracleError, Result};
use rand::Rng;

/// Weight of the implicit self-loop every vertex starts with.
pub const SELF_LOOP_WEIGHT: f64 = 1.0;

pub trait EdgeWriter {
    fn add_edge(&mut self, u: Node, v: Node, weight: f64) -> Result<()>;
}

/// Undirected weighted graph with an implicit unit self-loop per vertex.
///
/// The self-loop only shows up in the degree: `degree(v) = 1 + sum of incident
/// edge weights`. It never appears in the adjacency list, so `num_neighbors(v)`
/// counts edge endpoints only. Parallel edges are kept as duplicate entries.
///
/// Next to every adjacency list sits the running sum of the incident edge
/// weights, so neighbors can be drawn proportionally to their edge weight.
///
/// # Example
/// ```
/// use rust_opinion_oracle::prelude::*;
/// let mut graph = Graph::new(2);
/// graph.add_edge(0, 1, 1.0).unwrap();
///
/// assert_eq!(graph.degree(0), 2.0);
/// assert_eq!(graph.neighbors(1), &[0]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    degrees: Vec<f64>,
    neighbors: Vec<Vec<Node>>,
    cumulative_weights: Vec<Vec<f64>>,

    edges: Vec<Edge>,
    total_edge_weight: f64,
}

impl Graph {
    pub fn new(num_nodes: Node) -> Self {
        Self {
            degrees: vec![SELF_LOOP_WEIGHT; num_nodes],
            neighbors: vec![Vec::new(); num_nodes],
            cumulative_weights: vec![Vec::new(); num_nodes],
            edges: Vec::new(),
            total_edge_weight: 0.0,
        }
    }

    pub fn num_nodes(&self) -> Node {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn total_edge_weight(&self) -> f64 {
        self.total_edge_weight
    }

    #[inline]
    pub fn degree(&self, u: Node) -> f64 {
        self.degrees[u]
    }

    #[inline]
    pub fn num_neighbors(&self, u: Node) -> usize {
        self.neighbors[u].len()
    }

    #[inline]
    pub fn neighbor_at(&self, u: Node, index: usize) -> Node {
        self.neighbors[u][index]
    }

    pub fn neighbors(&self, u: Node) -> &[Node] {
        &self.neighbors[u]
    }

    /// Sum of the weights of the edges incident to `u`, without the self-loop.
    pub fn incident_weight(&self, u: Node) -> f64 {
        self.cumulative_weights[u].last().copied().unwrap_or(0.0)
    }

    /// Weight of the edge behind `neighbor_at(u, index)`.
    pub fn edge_weight_at(&self, u: Node, index: usize) -> f64 {
        let cumulative = &self.cumulative_weights[u];
        match index {
            0 => cumulative[0],
            i => cumulative[i] - cumulative[i - 1],
        }
    }

    /// Index into the neighbors of `u`, drawn proportionally to the edge weight.
    ///
    /// Returns `None` if `u` has no incident edge of positive weight.
    pub fn weighted_neighbor_index(&self, u: Node, rng: &mut impl Rng) -> Option<usize> {
        let total = self.incident_weight(u);
        if !(total > 0.0) {
            return None;
        }

        let target = rng.gen::<f64>() * total;
        let cumulative = &self.cumulative_weights[u];
        let index = cumulative.partition_point(|&c| c <= target);

        Some(index.min(cumulative.len() - 1))
    }

    pub fn contains(&self, u: Node) -> bool {
        u < self.num_nodes()
    }

    pub fn check_vertex(&self, u: Node) -> Result<Node> {
        if self.contains(u) {
            Ok(u)
        } else {
            Err(OracleError::out_of_range(u, self.num_nodes()))
        }
    }
}

impl EdgeWriter for Graph {
    fn add_edge(&mut self, u: Node, v: Node, weight: f64) -> Result<()> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;

        self.neighbors[u].push(v);
        self.neighbors[v].push(u);

        for w in [u, v] {
            let cumulative = self.incident_weight(w) + weight;
            self.cumulative_weights[w].push(cumulative);
        }

        self.degrees[u] += weight;
        self.degrees[v] += weight;

        self.edges.push((u, v, weight));
        self.total_edge_weight += weight;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pcg_rand::Pcg64;
    use rand::SeedableRng;

    #[test]
    fn isolated_vertices_have_self_loop_degree() {
        let graph = Graph::new(3);
        assert_eq!(graph.num_nodes(), 3);
        for u in 0..3 {
            assert_eq!(graph.degree(u), SELF_LOOP_WEIGHT);
            assert_eq!(graph.num_neighbors(u), 0);
        }
    }

    #[test]
    fn two_vertex_edge() {
        let mut graph = Graph::new(2);
        graph.add_edge(0, 1, 1.0).unwrap();

        assert_eq!(graph.degree(0), 2.0);
        assert_eq!(graph.degree(1), 2.0);
        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0]);
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn multi_edges_are_not_deduplicated() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 0.5).unwrap();
        graph.add_edge(0, 1, 2.0).unwrap();
        graph.add_edge(2, 0, 0.25).unwrap();

        assert_eq!(graph.neighbors(0), &[1, 1, 2]);
        assert_eq!(graph.neighbor_at(0, 2), 2);
        assert_eq!(graph.degree(0), 1.0 + 0.5 + 2.0 + 0.25);
        assert_eq!(graph.degree(1), 1.0 + 0.5 + 2.0);
        assert_eq!(graph.total_edge_weight(), 2.75);
    }

    #[test]
    fn degree_matches_incident_weights() {
        let edges = [(0, 1, 1.5), (1, 2, 0.5), (2, 3, 3.0), (3, 0, 1.0), (1, 1, 2.0)];
        let mut graph = Graph::new(4);
        for &(u, v, w) in &edges {
            graph.add_edge(u, v, w).unwrap();
        }

        for u in 0..4 {
            let incident: f64 = edges
                .iter()
                .map(|&(a, b, w)| (a == u) as u8 as f64 * w + (b == u) as u8 as f64 * w)
                .sum();
            let endpoints = edges
                .iter()
                .map(|&(a, b, _)| (a == u) as usize + (b == u) as usize)
                .sum::<usize>();

            assert_eq!(graph.degree(u), 1.0 + incident);
            assert_eq!(graph.num_neighbors(u), endpoints);
        }
    }

    #[test]
    fn cumulative_weights_follow_adjacency() {
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 0.5).unwrap();
        graph.add_edge(0, 2, 2.0).unwrap();
        graph.add_edge(1, 0, 1.5).unwrap();

        assert_eq!(graph.incident_weight(0), 4.0);
        assert_eq!(graph.incident_weight(0) + SELF_LOOP_WEIGHT, graph.degree(0));
        assert_eq!(graph.edge_weight_at(0, 0), 0.5);
        assert_eq!(graph.edge_weight_at(0, 1), 2.0);
        assert_eq!(graph.edge_weight_at(0, 2), 1.5);
        assert_eq!(graph.incident_weight(2), 2.0);
        assert_eq!(graph.edges(), &[(0, 1, 0.5), (0, 2, 2.0), (1, 0, 1.5)]);
    }

    #[test]
    fn weighted_neighbors_follow_edge_weights() {
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(0, 2, 3.0).unwrap();
        graph.add_edge(0, 3, 0.0).unwrap();

        let mut rng = Pcg64::seed_from_u64(17);
        let mut counts = [0usize; 3];
        for _ in 0..40_000 {
            counts[graph.weighted_neighbor_index(0, &mut rng).unwrap()] += 1;
        }

        assert_eq!(counts[2], 0);
        let share = counts[1] as f64 / 40_000.0;
        assert!((share - 0.75).abs() < 0.02, "share: {}", share);
    }

    #[test]
    fn weighted_neighbor_needs_positive_weight() {
        let mut graph = Graph::new(3);
        graph.add_edge(1, 2, 0.0).unwrap();
        let mut rng = Pcg64::seed_from_u64(0);

        assert_eq!(graph.weighted_neighbor_index(0, &mut rng), None);
        assert_eq!(graph.weighted_neighbor_index(1, &mut rng), None);
    }

    #[test]
    fn rejects_out_of_range_endpoints() {
        let mut graph = Graph::new(2);
        assert!(matches!(
            graph.add_edge(0, 2, 1.0),
            Err(OracleError::VertexOutOfRange {
                vertex: 2,
                num_nodes: 2
            })
        ));

        // nothing was applied
        assert_eq!(graph.num_neighbors(0), 0);
        assert_eq!(graph.degree(0), 1.0);
    }
}
