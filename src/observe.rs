use std::time::{Duration, Instant};

/// One timed checkpoint of a composition run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub label: String,
    pub step: Duration,
    pub total: Duration,
}

/// Receives checkpoints at fixed points of a run (render start, post-scheduling, post-render).
pub trait Observer {
    /// Record one checkpoint.
    fn checkpoint(&mut self, cp: &Checkpoint);
}

/// Forwards checkpoints to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn checkpoint(&mut self, cp: &Checkpoint) {
        tracing::info!(
            label = %cp.label,
            step_ms = cp.step.as_millis() as u64,
            total_ms = cp.total.as_millis() as u64,
            "checkpoint"
        );
    }
}

/// Keeps every checkpoint in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub checkpoints: Vec<Checkpoint>,
}

impl RecordingObserver {
    /// Labels in arrival order.
    pub fn labels(&self) -> Vec<&str> {
        self.checkpoints.iter().map(|c| c.label.as_str()).collect()
    }
}

impl Observer for RecordingObserver {
    fn checkpoint(&mut self, cp: &Checkpoint) {
        self.checkpoints.push(cp.clone());
    }
}

/// Measures step and total elapsed time.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
    last: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl Stopwatch {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Close the current step under `label`.
    pub fn lap(&mut self, label: impl Into<String>) -> Checkpoint {
        let now = Instant::now();
        let cp = Checkpoint {
            label: label.into(),
            step: now.duration_since(self.last),
            total: now.duration_since(self.start),
        };
        self.last = now;
        cp
    }

    /// Close the current step and hand it to `observer`.
    pub fn report(&mut self, observer: &mut dyn Observer, label: impl Into<String>) {
        let cp = self.lap(label);
        observer.checkpoint(&cp);
    }
}
