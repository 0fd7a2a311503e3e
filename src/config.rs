use core::num::{NonZeroU64, NonZeroUsize};

/// Engine parameters and observability toggles.
///
/// Defaults to a single worker running a single cycle with every toggle
/// off. The toggles map to `tracing` events; nothing is emitted unless a
/// subscriber is installed (see [`logging::init`](crate::logging::init)).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker threads in the pool.
    pub workers: NonZeroUsize,
    /// Number of full graph traversals to run.
    pub loops: NonZeroU64,
    /// Dump the topology once before the first cycle.
    pub print_graph: bool,
    /// Log each cycle boundary.
    pub log_loops: bool,
    /// Log worker start and exit.
    pub log_runner_lifecycle: bool,
    /// Log which worker picked up which node.
    pub log_runner_task: bool,
    /// Log the execution trace at the end of each cycle.
    pub log_exec_trace: bool,
    /// Keep every cycle's trace and hand them back in the run report.
    pub record_traces: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::MIN,
            loops: NonZeroU64::MIN,
            print_graph: false,
            log_loops: false,
            log_runner_lifecycle: false,
            log_runner_task: false,
            log_exec_trace: false,
            record_traces: false,
        }
    }
}

impl EngineConfig {
    /// Configuration with the given pool size and loop count and all
    /// toggles off.
    ///
    /// # Panics
    /// If `workers` or `loops` is zero.
    pub fn new(workers: usize, loops: u64) -> Self {
        let workers =
            NonZeroUsize::new(workers).expect("EngineConfig::new: pool size must be at least 1");
        let loops =
            NonZeroU64::new(loops).expect("EngineConfig::new: loop count must be at least 1");
        Self {
            workers,
            loops,
            ..Self::default()
        }
    }
}
