use crate::{engine::Shared, sync::Ordering, types::NodeId};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, info};

impl Shared {
    /// Body of one pool thread.
    ///
    /// Workers are symmetric and long-lived: each loops over the ready
    /// queue until shutdown, executing whatever node comes off the head.
    /// Per iteration: pop, mark the trace, run the task, mark again, reset
    /// this node's counter, then either publish completion to the children
    /// or, for the sink, close out the cycle.
    pub(crate) fn worker_loop(&self, index: usize) {
        if self.config.log_runner_lifecycle {
            debug!(worker = index, "runner started");
        }
        self.report_started();

        while let Some(id) = self.queue.pop_front_blocking() {
            if id == self.graph.source() {
                // The source is dispatched exactly once per cycle, so this
                // is the race-free spot to advance the loop counter.
                self.loops_done.fetch_add(1, Ordering::Relaxed);
            }
            let node = self.graph.node(id);
            if self.config.log_runner_task {
                debug!(worker = index, label = %node.label, "run task");
            }

            self.trace.mark(node.label);
            let outcome = catch_unwind(AssertUnwindSafe(|| node.task.run()));
            if outcome.is_err() {
                error!(worker = index, label = %node.label, "task panicked, stopping engine");
                self.failure
                    .lock()
                    .expect("Shared::worker_loop: [1]")
                    .get_or_insert(node.label);
                self.queue.shutdown();
                break;
            }
            self.trace.mark(node.label);

            // Re-arm this node before publishing below. The moment the
            // last child is published, the remainder of the cycle can
            // finish and the sink can restart the graph without waiting on
            // this worker, making next-cycle arrivals at this node
            // possible; a reset placed after the publish could erase one.
            // Right now no arrival can race the zeroing: this cycle's
            // parents are all done, next cycle's cannot run yet.
            self.reset(id);

            if id == self.graph.sink() {
                self.finish_cycle();
            } else {
                for &child in self.graph.children(id) {
                    self.arrive(child);
                }
            }
        }

        if self.config.log_runner_lifecycle {
            debug!(worker = index, "runner exiting");
        }
    }

    /// Zero the node's satisfied counter, performed by the worker that just
    /// executed it.
    fn reset(&self, id: NodeId) {
        let node = self.graph.node(id);
        let mut satisfied = node.satisfied.lock().expect("Shared::reset");
        *satisfied = 0;
    }

    /// Record one parent completion for `child`.
    ///
    /// The arrival that makes the count full is responsible for the
    /// enqueue. The decision is made under the child's counter lock; the
    /// count reaches `required` exactly once per cycle, so no two workers
    /// can both see it. The push itself happens after the lock is
    /// released, keeping node locks and the queue lock disjoint.
    fn arrive(&self, child: NodeId) {
        let node = self.graph.node(child);
        let ready = {
            let mut satisfied = node.satisfied.lock().expect("Shared::arrive");
            *satisfied += 1;
            debug_assert!(
                *satisfied <= node.required,
                "node `{}`: satisfied count {} exceeds required {}",
                node.label,
                *satisfied,
                node.required
            );
            *satisfied == node.required
        };
        if ready {
            self.queue.push_back(child);
        }
    }

    /// Sink-side cycle bookkeeping.
    ///
    /// Runs on whichever worker executed the sink. Takes the finished
    /// trace, then either re-seeds the source for the next cycle or, once
    /// the loop target is reached, stops the pool.
    fn finish_cycle(&self) {
        let done = self.loops_done.load(Ordering::Relaxed);
        let trace = self.trace.take();

        #[cfg(debug_assertions)]
        self.check_cycle_end(&trace);

        if self.config.log_exec_trace {
            info!(cycle = done, %trace, "cycle trace");
        }
        if self.config.record_traces {
            self.cycle_traces
                .lock()
                .expect("Shared::finish_cycle")
                .push(trace);
        }
        if self.config.log_loops {
            info!(cycle = done, "cycle complete");
        }

        if done == self.config.loops.get() {
            info!("{done} loops, stop runners");
            self.queue.shutdown();
        } else {
            self.queue.push_back(self.graph.source());
        }
    }

    /// Debug-build audit at the cycle boundary: the trace must be one
    /// complete precedence-respecting traversal, and every counter must be
    /// back at zero before the next cycle is seeded.
    #[cfg(debug_assertions)]
    fn check_cycle_end(&self, trace: &str) {
        use crate::trace::{is_complete, respects_precedence};

        debug_assert!(
            is_complete(trace, self.graph.labels()),
            "trace `{trace}` is not a complete traversal"
        );
        for id in self.graph.ids() {
            for &child in self.graph.children(id) {
                debug_assert!(
                    respects_precedence(trace, self.graph.label(id), self.graph.label(child)),
                    "trace `{trace}` violates edge {} -> {}",
                    self.graph.label(id),
                    self.graph.label(child)
                );
            }
            debug_assert_eq!(
                self.graph.satisfied(id),
                0,
                "node `{}` still has arrivals recorded at the cycle boundary",
                self.graph.label(id)
            );
        }
    }
}
