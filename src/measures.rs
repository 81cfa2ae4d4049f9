//! Aggregate opinion-dynamics measures extrapolated from a sample of vertices.
//!
//! Every sum over the sample is scaled by `num_nodes / sample_size`, turning it
//! into an estimate of the corresponding sum over the whole graph.

use super::*;
use crate::error::{OracleError, Result};
use crate::graph::Graph;
use fxhash::FxHashMap;
use itertools::Itertools;
use rand::Rng;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measures {
    pub average_opinion: f64,
    pub sum_of_opinions: f64,
    pub controversy: f64,
    pub squared_norm_innate: f64,
    pub internal_conflict: f64,
    pub disagreement_controversy: f64,
    pub polarization: f64,
    pub disagreement: f64,
}

/// Which side of the sample is known exactly.
///
/// Innate and expressed opinions have the same sum over the whole graph, so
/// the sum of opinions is extrapolated from the exact side.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Known {
    Innate,
    Expressed,
}

pub struct SampledMeasures {
    num_nodes: Node,
    total_edge_weight: f64,
    /// `(expressed, innate)` per sampled vertex, ordered by vertex id.
    sample: Vec<(f64, f64)>,
    known: Known,
}

impl SampledMeasures {
    /// Sample of estimated expressed opinions next to the known innate ones.
    pub fn new(graph: &Graph, expressed: &FxHashMap<Node, f64>, innate: &[f64]) -> Result<Self> {
        let sample = expressed
            .iter()
            .sorted_by_key(|&(&u, _)| u)
            .map(|(&u, &z)| match innate.get(u) {
                Some(&s) => Ok((z, s)),
                None => Err(OracleError::out_of_range(u, innate.len())),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_sample(graph, sample, Known::Innate)
    }

    /// Sample of estimated innate opinions next to the known expressed ones.
    pub fn with_estimated_innate(
        graph: &Graph,
        expressed: &[f64],
        innate: &FxHashMap<Node, f64>,
    ) -> Result<Self> {
        let sample = innate
            .iter()
            .sorted_by_key(|&(&u, _)| u)
            .map(|(&u, &s)| match expressed.get(u) {
                Some(&z) => Ok((z, s)),
                None => Err(OracleError::out_of_range(u, expressed.len())),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_sample(graph, sample, Known::Expressed)
    }

    fn from_sample(graph: &Graph, sample: Vec<(f64, f64)>, known: Known) -> Result<Self> {
        if sample.is_empty() {
            return Err(OracleError::InvalidParameter(
                "measures need at least one sampled vertex".into(),
            ));
        }

        Ok(Self {
            num_nodes: graph.num_nodes(),
            total_edge_weight: graph.total_edge_weight(),
            sample,
            known,
        })
    }

    fn scale(&self) -> f64 {
        self.num_nodes as f64 / self.sample.len() as f64
    }

    fn scaled_sum(&self, f: impl Fn(f64, f64) -> f64) -> f64 {
        self.scale() * self.sample.iter().map(|&(z, s)| f(z, s)).sum::<f64>()
    }

    pub fn sum_of_opinions(&self) -> f64 {
        match self.known {
            Known::Innate => self.scaled_sum(|_, s| s),
            Known::Expressed => self.scaled_sum(|z, _| z),
        }
    }

    pub fn average_opinion(&self) -> f64 {
        self.sum_of_opinions() / self.num_nodes as f64
    }

    pub fn controversy(&self) -> f64 {
        self.scaled_sum(|z, _| z * z)
    }

    pub fn squared_norm_innate(&self) -> f64 {
        self.scaled_sum(|_, s| s * s)
    }

    pub fn internal_conflict(&self) -> f64 {
        self.scaled_sum(|z, s| (z - s) * (z - s))
    }

    pub fn disagreement_controversy(&self) -> f64 {
        self.scaled_sum(|z, s| z * s).clamp(0.0, self.num_nodes as f64)
    }

    pub fn polarization(&self) -> f64 {
        let avg = self.average_opinion();
        self.scaled_sum(|z, _| (z - avg) * (z - avg))
    }

    pub fn disagreement(&self) -> f64 {
        let value =
            (self.squared_norm_innate() - self.controversy() - self.internal_conflict()) / 2.0;
        value.max(0.0).min(self.total_edge_weight)
    }

    pub fn compute(&self) -> Measures {
        Measures {
            average_opinion: self.average_opinion(),
            sum_of_opinions: self.sum_of_opinions(),
            controversy: self.controversy(),
            squared_norm_innate: self.squared_norm_innate(),
            internal_conflict: self.internal_conflict(),
            disagreement_controversy: self.disagreement_controversy(),
            polarization: self.polarization(),
            disagreement: self.disagreement(),
        }
    }
}

/// Draws `k` edges uniformly at random, with replacement.
pub fn sample_edges(graph: &Graph, k: usize, rng: &mut impl Rng) -> Vec<Edge> {
    if graph.num_edges() == 0 {
        return Vec::new();
    }

    (0..k)
        .map(|_| graph.edges()[rng.gen_range(0..graph.num_edges())])
        .collect()
}

/// Vertices touched by `edges`, each once, in ascending order.
pub fn edge_endpoints(edges: &[Edge]) -> Vec<Node> {
    edges
        .iter()
        .flat_map(|&(u, v, _)| [u, v])
        .sorted()
        .dedup()
        .collect()
}

/// Disagreement `sum_{(u,v)} w (z_u - z_v)^2` extrapolated from a uniform
/// edge sample: the sample sum is scaled by `num_edges / sample_size`.
pub fn edge_sampled_disagreement(
    num_edges: usize,
    edges: &[Edge],
    expressed: impl Fn(Node) -> Option<f64>,
) -> Result<f64> {
    if edges.is_empty() {
        return Err(OracleError::InvalidParameter(
            "disagreement needs at least one sampled edge".into(),
        ));
    }

    let mut sum = 0.0;
    for &(u, v, weight) in edges {
        let z_u = expressed(u).ok_or_else(|| missing_opinion(u))?;
        let z_v = expressed(v).ok_or_else(|| missing_opinion(v))?;
        sum += weight * (z_u - z_v) * (z_u - z_v);
    }

    Ok(sum * num_edges as f64 / edges.len() as f64)
}

fn missing_opinion(u: Node) -> OracleError {
    OracleError::InvalidParameter(format!("no expressed opinion for vertex {}", u))
}
