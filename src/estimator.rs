use super::*;
use crate::error::{OracleError, Result};
use crate::graph::Graph;
use crate::parameters::Parameters;
use crate::sampler::{sample_step, Step};
use rand::Rng;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WalkConfig {
    /// Maximum number of steps of a single walk.
    pub num_steps: usize,
    /// Number of independent walks per estimated vertex.
    pub num_walks: usize,
}

impl WalkConfig {
    pub fn new(num_steps: usize, num_walks: usize) -> Self {
        Self {
            num_steps,
            num_walks,
        }
    }

    pub fn from_parameters(opt: &Parameters) -> Self {
        Self::new(opt.num_steps, opt.num_walks)
    }
}

/// Estimates the expressed opinion of a single vertex with truncated random walks.
///
/// Each walk adds `s[v] / degree(v)` for every vertex `v` it visits (revisits
/// and self-loop steps included) until it either runs out of steps or is
/// absorbed. The sum over all walks is divided by `2 * num_walks`.
#[derive(Clone, Copy, Debug)]
pub struct WalkEstimator<'a> {
    graph: &'a Graph,
    opinions: &'a [f64],
    config: WalkConfig,
}

impl<'a> WalkEstimator<'a> {
    pub fn new(graph: &'a Graph, opinions: &'a [f64], config: WalkConfig) -> Result<Self> {
        if opinions.len() < graph.num_nodes() {
            return Err(OracleError::OpinionsTooShort {
                opinions: opinions.len(),
                num_nodes: graph.num_nodes(),
            });
        }

        Ok(Self {
            graph,
            opinions,
            config,
        })
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn opinions(&self) -> &'a [f64] {
        self.opinions
    }

    pub fn config(&self) -> WalkConfig {
        self.config
    }

    pub fn estimate(&self, u: Node, rng: &mut impl Rng) -> Result<f64> {
        self.graph.check_vertex(u)?;
        Ok(self.estimate_with_draws(u, || rng.gen::<f64>()))
    }

    /// Runs all walks from `u`, taking one uniform draw from `[0, 1)` per step.
    ///
    /// `u` must be a vertex of the graph.
    pub(crate) fn estimate_with_draws(&self, u: Node, mut draw: impl FnMut() -> f64) -> f64 {
        if self.config.num_walks == 0 {
            return 0.0;
        }

        let x_u: f64 = (0..self.config.num_walks)
            .map(|_| self.single_walk(u, &mut draw))
            .sum();

        x_u / (2 * self.config.num_walks) as f64
    }

    fn single_walk(&self, u: Node, draw: &mut impl FnMut() -> f64) -> f64 {
        let mut current = u;
        let mut x_walk = 0.0;

        for _ in 0..self.config.num_steps {
            x_walk += self.opinions[current] / self.graph.degree(current);

            match sample_step(self.graph, current, draw()) {
                Step::SelfLoop => {}
                Step::Move(next) => current = next,
                Step::Terminate => break,
            }
        }

        x_walk
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::EdgeWriter;
    use assert_float_eq::*;
    use pcg_rand::Pcg64;
    use rand::SeedableRng;

    fn two_vertex_graph() -> Graph {
        let mut graph = Graph::new(2);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph
    }

    fn replay(draws: &[f64]) -> impl FnMut() -> f64 + '_ {
        let mut iter = draws.iter().copied();
        move || iter.next().expect("ran out of replayed draws")
    }

    #[test]
    fn zero_steps_estimate_zero() {
        let graph = two_vertex_graph();
        let opinions = [1.0, 0.5];
        let mut rng = Pcg64::seed_from_u64(1);

        for num_walks in [1, 10, 1000] {
            let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(0, num_walks)).unwrap();
            for u in 0..2 {
                assert_eq!(est.estimate(u, &mut rng).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn zero_walks_estimate_zero() {
        let graph = two_vertex_graph();
        let opinions = [1.0, 0.5];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(5, 0)).unwrap();
        let mut rng = Pcg64::seed_from_u64(2);
        assert_eq!(est.estimate(0, &mut rng).unwrap(), 0.0);
    }

    #[test]
    fn replayed_draws_follow_the_walk() {
        let graph = two_vertex_graph();
        let opinions = [1.0, 0.5];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(4, 2)).unwrap();

        // walk 1: stay at 0, move to 1, stay at 1, move to 0  => 1/2 + 1/2 + 1/4 + 1/4
        // walk 2: terminate right after the first accumulation  => 1/2
        let draws = [0.75, 0.1, 0.9, 0.2, 0.3];
        let value = est.estimate_with_draws(0, replay(&draws));

        assert_eq!(value, (1.5 + 0.5) / 4.0);
    }

    #[test]
    fn replay_is_deterministic() {
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(1, 2, 2.0).unwrap();
        graph.add_edge(2, 3, 0.5).unwrap();
        graph.add_edge(3, 0, 1.5).unwrap();
        let opinions = [0.1, 0.9, 0.4, 0.6];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(20, 50)).unwrap();

        let mut rng = Pcg64::seed_from_u64(1234);
        let draws: Vec<f64> = (0..20 * 50).map(|_| rng.gen()).collect();

        let first = est.estimate_with_draws(2, replay(&draws));
        let second = est.estimate_with_draws(2, replay(&draws));
        assert_eq!(first.to_bits(), second.to_bits());

        let a = est.estimate(2, &mut Pcg64::seed_from_u64(99)).unwrap();
        let b = est.estimate(2, &mut Pcg64::seed_from_u64(99)).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn isolated_vertex_accumulates_once_before_terminating() {
        let graph = Graph::new(1);
        let opinions = [0.8];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(5, 1)).unwrap();

        assert_eq!(est.estimate_with_draws(0, replay(&[0.2])), 0.8 / 2.0);
        assert_float_absolute_eq!(
            est.estimate_with_draws(0, replay(&[0.7, 0.7, 0.1])),
            3.0 * 0.8 / 2.0,
            1e-12
        );
    }

    #[test]
    fn two_vertex_single_step_converges() {
        let graph = two_vertex_graph();
        let opinions = [1.0, 0.0];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(1, 100_000)).unwrap();
        let mut rng = Pcg64::seed_from_u64(42);

        // a single step accumulates exactly once, so there is no sampling noise
        assert_float_absolute_eq!(est.estimate(0, &mut rng).unwrap(), 0.25, 1e-9);
        assert_float_absolute_eq!(est.estimate(1, &mut rng).unwrap(), 0.0, 1e-12);
    }

    #[test]
    fn isolated_vertex_converges_to_own_share() {
        // expected number of accumulating steps is 2, which cancels the normalization
        let graph = Graph::new(1);
        let opinions = [0.6];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(200, 200_000)).unwrap();
        let mut rng = Pcg64::seed_from_u64(7);

        assert_float_absolute_eq!(est.estimate(0, &mut rng).unwrap(), 0.6, 0.01);
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let graph = two_vertex_graph();
        let opinions = [1.0, 0.0];
        let est = WalkEstimator::new(&graph, &opinions, WalkConfig::new(3, 3)).unwrap();
        let mut rng = Pcg64::seed_from_u64(3);

        assert!(matches!(
            est.estimate(2, &mut rng),
            Err(OracleError::VertexOutOfRange { vertex: 2, .. })
        ));
    }

    #[test]
    fn rejects_short_opinion_vector() {
        let graph = two_vertex_graph();
        let opinions = [1.0];
        assert!(matches!(
            WalkEstimator::new(&graph, &opinions, WalkConfig::new(3, 3)),
            Err(OracleError::OpinionsTooShort {
                opinions: 1,
                num_nodes: 2
            })
        ));
    }
}
