mod worker;

use crate::{
    config::EngineConfig,
    graph::TaskGraph,
    queue::ReadyQueue,
    sync::{Arc, AtomicU64, Condvar, Mutex, Ordering, spawn_named},
    trace::ExecTrace,
};
use std::io;
use thiserror::Error;
use tracing::debug;

/// Error returned by [`Engine::run`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A worker thread could not be spawned. Workers started before the
    /// failure are shut down and joined before this is returned.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] io::Error),
    /// A task body panicked. The worker that observed the panic stops the
    /// pool; the cycle it happened in never completes.
    #[error("task `{label}` panicked, engine stopped")]
    TaskPanicked {
        /// Label of the node whose task panicked.
        label: char,
    },
}

/// Outcome of a completed run.
#[must_use]
#[derive(Debug)]
pub struct RunReport {
    /// Cycles completed; equals the configured loop count.
    pub loops: u64,
    /// Per-cycle traces, oldest first. Empty unless
    /// [`record_traces`](EngineConfig::record_traces) was set.
    pub traces: Vec<String>,
    /// The graph, with every counter back at zero; ready for another run.
    pub graph: TaskGraph,
}

/// State shared between the controlling thread and the pool.
///
/// One value per run; workers hold it behind an [`Arc`] and the
/// controlling thread recovers it after the join. Nothing here is
/// process-global, so multiple engines can coexist in one process.
pub(crate) struct Shared {
    graph: TaskGraph,
    config: EngineConfig,
    queue: ReadyQueue,
    trace: ExecTrace,
    /// Cycles started so far; advanced by the worker that dequeues the
    /// source, read by the sink-side controller.
    loops_done: AtomicU64,
    /// Traces retained for the run report.
    cycle_traces: Mutex<Vec<String>>,
    /// First task panic observed, if any.
    failure: Mutex<Option<char>>,
    /// Start gate: workers check in here before the source is seeded, so
    /// the initial push cannot race a worker that has not yet reached the
    /// queue.
    started: Mutex<usize>,
    all_started: Condvar,
}

impl Shared {
    fn new(graph: TaskGraph, config: EngineConfig) -> Self {
        let trace = ExecTrace::for_nodes(graph.len());
        let queue = ReadyQueue::with_capacity(graph.len());
        Self {
            graph,
            config,
            queue,
            trace,
            loops_done: AtomicU64::new(0),
            cycle_traces: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            started: Mutex::new(0),
            all_started: Condvar::new(),
        }
    }

    fn report_started(&self) {
        {
            let mut started = self.started.lock().expect("Shared::report_started");
            *started += 1;
        }
        self.all_started.notify_all();
    }

    fn wait_all_started(&self, expected: usize) {
        let mut started = self.started.lock().expect("Shared::wait_all_started");
        while *started < expected {
            started = self
                .all_started
                .wait(started)
                .expect("Shared::wait_all_started: wait");
        }
    }
}

/// Ties a [`TaskGraph`] to a worker pool and drives it for the configured
/// number of cycles.
///
/// The engine is purely reactive: it computes no schedule up front. Ready
/// nodes sit in a shared FIFO and are picked up by whichever worker is
/// free, so throughput follows the graph's inherent parallelism up to the
/// pool size. Between independent nodes no ordering is guaranteed; the
/// precedence encoded by the edges is guaranteed in every cycle.
#[must_use]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    /// Prepare a run of `graph` under `config`.
    ///
    /// No threads are started yet; resource acquisition happens in
    /// [`run`](Self::run).
    pub fn new(graph: TaskGraph, config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(graph, config)),
        }
    }

    /// Run the graph for the configured number of cycles and tear down.
    ///
    /// Spawns the pool, waits until every worker has checked in, seeds the
    /// source, then blocks until the cycle controller stops the pool and
    /// every worker has been joined. The graph comes back inside the
    /// report with all counters at zero.
    ///
    /// # Errors
    /// [`EngineError::Spawn`] if a worker thread cannot be created;
    /// [`EngineError::TaskPanicked`] if a task body panicked mid-run.
    pub fn run(self) -> Result<RunReport, EngineError> {
        let Self { shared } = self;
        let workers = shared.config.workers.get();

        if shared.config.print_graph {
            shared.graph.log_topology();
        }

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::with_capacity(workers);
        for index in 0..workers {
            if shared.config.log_runner_lifecycle {
                debug!(worker = index, "spawning runner");
            }
            let worker_shared = Arc::clone(&shared);
            let handle = match spawn_named(format!("runner-{index}"), move || {
                worker_shared.worker_loop(index);
            }) {
                Ok(handle) => handle,
                Err(err) => {
                    shared.queue.shutdown();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(EngineError::Spawn(err));
                }
            };
            handles.push(handle);
        }

        shared.wait_all_started(workers);

        // First cycle: seed the source. The worker that pops it advances
        // the loop counter.
        shared.queue.push_back(shared.graph.source());

        for handle in handles {
            if let Err(panic) = handle.join() {
                // Engine bug, not a task failure: task panics are caught in
                // the worker loop.
                std::panic::resume_unwind(panic);
            }
        }

        let loops = shared.loops_done.load(Ordering::Relaxed);
        let failure = *shared.failure.lock().expect("Engine::run: [1]");
        let traces = core::mem::take(&mut *shared.cycle_traces.lock().expect("Engine::run: [2]"));
        let shared = Arc::into_inner(shared).expect("Engine::run: [3]");
        let Shared { graph, .. } = shared;

        if let Some(label) = failure {
            return Err(EngineError::TaskPanicked { label });
        }

        Ok(RunReport {
            loops,
            traces,
            graph,
        })
    }
}
