use super::reports::Reporter;
use super::*;

pub(super) struct Worker<'a, 'b, R> {
    rank: usize,
    num_threads: usize,

    estimator: WalkEstimator<'a>,
    tasks: &'b [Task],
    progress: &'b AtomicCell<usize>,
    reporter: Option<Reporter>,

    _rng: PhantomData<R>,
}

impl<'a, 'b, R: Rng + SeedableRng> Worker<'a, 'b, R> {
    pub(super) fn new(
        estimator: WalkEstimator<'a>,
        tasks: &'b [Task],
        progress: &'b AtomicCell<usize>,
        rank: usize,
        num_threads: usize,
    ) -> Self {
        // a single worker reports for everyone
        let reporter = (rank + 1 == num_threads).then(|| Reporter::new(tasks.len()));

        Self {
            rank,
            num_threads,
            estimator,
            tasks,
            progress,
            reporter,
            _rng: PhantomData,
        }
    }

    /// Estimates every `num_threads`-th task starting at `rank` and returns
    /// `(position, estimate)` pairs.
    pub(super) fn run(mut self) -> Vec<(usize, f64)> {
        let mut estimates = Vec::with_capacity(self.tasks.len() / self.num_threads + 1);

        for position in (self.rank..self.tasks.len()).step_by(self.num_threads) {
            let Task { vertex, seed } = self.tasks[position];
            let mut rng = R::seed_from_u64(seed);

            let estimate = self.estimator.estimate_with_draws(vertex, || rng.gen::<f64>());
            estimates.push((position, estimate));

            let done = self.progress.fetch_add(1) + 1;
            if let Some(reporter) = self.reporter.as_mut() {
                reporter.report_progress_sometimes(done);
            }
        }

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.report_progress_forced(self.progress.load());
        }

        estimates
    }
}
