//! Recovers innate opinions from known expressed opinions.
//!
//! In equilibrium `degree(u) * z[u] = s[u] + sum_i w_i z[v_i]`, so the innate
//! opinion is the expressed one scaled by the degree minus the weighted
//! neighbor sum. High degree vertices get the neighbor sum estimated from a
//! weighted sample of their neighbors instead.

use super::*;
use crate::error::{OracleError, Result};
use crate::graph::Graph;
use crate::parameters::Parameters;
use fxhash::FxHashMap;
use rand::Rng;
use tracing::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InnateConfig {
    /// Neighbors drawn per repetition; vertices with at most this many
    /// neighbors are computed exactly.
    pub num_samples: usize,
    /// Independent neighbor samples whose median is used.
    pub repetitions: usize,
}

impl InnateConfig {
    pub fn new(num_samples: usize, repetitions: usize) -> Self {
        Self {
            num_samples,
            repetitions,
        }
    }

    pub fn from_parameters(opt: &Parameters) -> Self {
        Self::new(opt.num_samples, opt.repetitions)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct InnateEstimator<'a> {
    graph: &'a Graph,
    expressed: &'a [f64],
    config: InnateConfig,
}

impl<'a> InnateEstimator<'a> {
    pub fn new(graph: &'a Graph, expressed: &'a [f64], config: InnateConfig) -> Result<Self> {
        if expressed.len() < graph.num_nodes() {
            return Err(OracleError::OpinionsTooShort {
                opinions: expressed.len(),
                num_nodes: graph.num_nodes(),
            });
        }

        if config.repetitions == 0 {
            return Err(OracleError::InvalidParameter(
                "need at least one repetition".into(),
            ));
        }

        Ok(Self {
            graph,
            expressed,
            config,
        })
    }

    /// Innate opinion of `u`, clamped to `[0, 1]`.
    pub fn estimate(&self, u: Node, rng: &mut impl Rng) -> Result<f64> {
        self.graph.check_vertex(u)?;

        let neighbor_sum = if self.config.num_samples >= self.graph.num_neighbors(u) {
            self.exact_neighbor_sum(u)
        } else {
            let mut sums: Vec<f64> = (0..self.config.repetitions)
                .map(|_| self.sampled_neighbor_sum(u, rng))
                .collect();
            median(&mut sums)
        };

        let opinion = self.graph.degree(u) * self.expressed[u] - neighbor_sum;
        Ok(opinion.clamp(0.0, 1.0))
    }

    pub fn estimate_many(
        &self,
        vertices: &[Node],
        rng: &mut impl Rng,
    ) -> Result<FxHashMap<Node, f64>> {
        let mut opinions = FxHashMap::default();
        for &u in vertices {
            opinions.insert(u, self.estimate(u, rng)?);
        }

        debug!("Estimated {} innate opinions", opinions.len());
        Ok(opinions)
    }

    fn exact_neighbor_sum(&self, u: Node) -> f64 {
        (0..self.graph.num_neighbors(u))
            .map(|i| self.graph.edge_weight_at(u, i) * self.expressed[self.graph.neighbor_at(u, i)])
            .sum()
    }

    /// Draws neighbors proportionally to their edge weight, so each draw
    /// contributes `incident_weight / num_samples` times its expressed opinion.
    fn sampled_neighbor_sum(&self, u: Node, rng: &mut impl Rng) -> f64 {
        let mut sum = 0.0;
        for _ in 0..self.config.num_samples {
            match self.graph.weighted_neighbor_index(u, rng) {
                Some(i) => sum += self.expressed[self.graph.neighbor_at(u, i)],
                None => return 0.0,
            }
        }

        sum * self.graph.incident_weight(u) / self.config.num_samples as f64
    }
}

/// Median of a non-empty slice; averages the two middle values for even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
