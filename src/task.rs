use core::time::Duration;
use rand::Rng;
use std::thread;

/// A single unit of work attached to a graph node.
///
/// The engine treats tasks as opaque: no arguments, no return value, no
/// error channel. A task runs by shared reference because the same node is
/// executed once per cycle, possibly by a different worker each time, and
/// the node outlives every cycle.
///
/// Tasks may block; a blocked task occupies its worker but never the queue
/// or any node lock, so the rest of the graph keeps flowing as long as the
/// pool has a free worker. A task that panics stops the engine (see
/// [`Engine::run`](crate::engine::Engine::run)).
///
/// Any `Fn() + Send + Sync` closure is a task.
pub trait Task: Send + Sync {
    /// Execute the task body to completion.
    fn run(&self);
}

impl<F> Task for F
where
    F: Fn() + Send + Sync,
{
    fn run(&self) {
        self();
    }
}

/// Workload that sleeps for `duration` on every invocation.
///
/// Stands in for real task bodies when exercising a pipeline: the sleep
/// simulates the task's cost without doing any work.
pub fn sleep(duration: Duration) -> impl Task {
    move || {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Workload that sleeps for `duration` scaled by a factor drawn uniformly
/// from `[1 - spread, 1 + spread]` on each invocation.
///
/// A `spread` of `0.1` gives the customary ±10% perturbation, enough to
/// shake loose interleavings that fixed durations would mask.
///
/// # Panics
/// If `spread` is not within `[0, 1)`.
pub fn sleep_jittered(duration: Duration, spread: f64) -> impl Task {
    assert!(
        (0.0..1.0).contains(&spread),
        "task::sleep_jittered: jitter spread {spread} must be within [0, 1)"
    );
    move || {
        let factor = rand::thread_rng().gen_range(1.0 - spread..=1.0 + spread);
        let perturbed = duration.mul_f64(factor);
        if !perturbed.is_zero() {
            thread::sleep(perturbed);
        }
    }
}
