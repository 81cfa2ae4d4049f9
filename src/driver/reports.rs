use std::time::Instant;
use tracing::debug;

const REPORT_INTERVAL_S: f64 = 0.2;

pub(super) struct Reporter {
    start: Instant,
    last_report: Instant,

    num_total_vertices: usize,
    last_report_done: usize,
}

impl Reporter {
    pub(super) fn new(num_total_vertices: usize) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_report: now,
            num_total_vertices,
            last_report_done: 0,
        }
    }

    pub(super) fn report_progress_sometimes(&mut self, done: usize) {
        let now = Instant::now();
        let duration = now.duration_since(self.last_report);

        if duration.as_secs_f64() < REPORT_INTERVAL_S {
            return;
        }

        self.report_progress_now(now, done);
    }

    pub(super) fn report_progress_forced(&mut self, done: usize) {
        let now = Instant::now();
        self.report_progress_now(now, done);
    }

    fn report_progress_now(&mut self, now: Instant, done: usize) {
        let elapsed_ms = now.duration_since(self.start).as_millis();
        let since_last = now.duration_since(self.last_report).as_secs_f64();

        debug!(
            "{:>7}ms {:>9} of {:>9} vertices ({:>5.1} %); {:>9.1} vertices/s",
            elapsed_ms,
            done,
            self.num_total_vertices,
            100.0 * done as f64 / self.num_total_vertices.max(1) as f64,
            (done - self.last_report_done.min(done)) as f64 / since_last.max(f64::EPSILON)
        );

        self.last_report = now;
        self.last_report_done = done;
    }
}
