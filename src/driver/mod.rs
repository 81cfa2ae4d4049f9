mod reports;
mod worker;

use super::*;
use crate::error::{OracleError, Result};
use crate::estimator::{WalkConfig, WalkEstimator};
use crate::graph::Graph;
use crate::parameters::Parameters;
use worker::Worker;

use crossbeam::atomic::AtomicCell;
use fxhash::FxHashMap;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;
use tracing::{debug, info};

pub type Opinions = FxHashMap<Node, f64>;

#[derive(Debug, Copy, Clone)]
struct Task {
    vertex: Node,
    seed: u64,
}

/// Fans walk estimation out over a fixed pool of worker threads.
///
/// Before any work starts, the master generator hands out one seed per
/// requested vertex in request order. Each task seeds its own generator from
/// it, so the result depends on the master seed only and not on the number
/// of threads or on scheduling.
pub struct Oracle<'a, R> {
    rng: R,
    num_threads: usize,
    estimator: WalkEstimator<'a>,
}

impl<'a, R: Rng + SeedableRng> Oracle<'a, R> {
    pub fn new(rng: R, num_threads: usize, estimator: WalkEstimator<'a>) -> Result<Self> {
        if num_threads == 0 {
            return Err(OracleError::InvalidParameter(
                "number of threads must be positive".into(),
            ));
        }

        Ok(Self {
            rng,
            num_threads,
            estimator,
        })
    }

    pub fn from_parameters(
        rng: R,
        opt: &Parameters,
        graph: &'a Graph,
        opinions: &'a [f64],
    ) -> Result<Self> {
        let estimator = WalkEstimator::new(graph, opinions, WalkConfig::from_parameters(opt))?;
        Self::new(rng, opt.num_threads.unwrap_or_else(num_cpus::get), estimator)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn estimator(&self) -> &WalkEstimator<'a> {
        &self.estimator
    }

    pub fn estimate_all(&mut self) -> Result<Opinions> {
        let vertices = (0..self.estimator.graph().num_nodes()).collect_vec();
        self.estimate_many(&vertices)
    }

    /// Estimates the opinions of `vertices`; duplicates collapse into one key.
    ///
    /// The whole request is rejected if any id is not a vertex of the graph.
    pub fn estimate_many(&mut self, vertices: &[Node]) -> Result<Opinions> {
        let graph = self.estimator.graph();
        for &u in vertices {
            graph.check_vertex(u)?;
        }

        let mut opinions: Opinions = vertices.iter().map(|&u| (u, 0.0)).collect();
        if vertices.is_empty() {
            return Ok(opinions);
        }

        let tasks = vertices
            .iter()
            .map(|&vertex| Task {
                vertex,
                seed: self.rng.gen(),
            })
            .collect_vec();

        let num_threads = self.num_threads.min(tasks.len());
        debug!(
            "Estimating {} vertices ({} distinct) on {} threads",
            tasks.len(),
            opinions.len(),
            num_threads
        );

        let estimates = self.run_workers(&tasks, num_threads)?;

        // request order, so the last duplicate wins
        for (task, estimate) in tasks.iter().zip(estimates) {
            opinions.insert(task.vertex, estimate);
        }

        info!("Estimated {} expressed opinions", opinions.len());

        Ok(opinions)
    }

    fn run_workers(&self, tasks: &[Task], num_threads: usize) -> Result<Vec<f64>> {
        let estimator = self.estimator;
        let progress = AtomicCell::new(0usize);
        let progress = &progress;

        let buffers = crossbeam::thread::scope(|scope| {
            let handles = (0..num_threads)
                .map(|rank| {
                    scope.spawn(move |_| {
                        Worker::<R>::new(estimator, tasks, progress, rank, num_threads).run()
                    })
                })
                .collect_vec();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<std::thread::Result<Vec<_>>>()
        })
        .map_err(|_| OracleError::WorkerPanicked)?
        .map_err(|_| OracleError::WorkerPanicked)?;

        let mut estimates = vec![0.0; tasks.len()];
        for (position, estimate) in buffers.into_iter().flatten() {
            estimates[position] = estimate;
        }

        Ok(estimates)
    }
}
