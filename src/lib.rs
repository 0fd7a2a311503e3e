//! Reactive runtime that repeatedly executes a fixed task DAG over a pool
//! of worker threads.
//!
//! `dagrun` targets soft-real-time, data-driven pipelines such as
//! sensor-fusion control loops, where every iteration is the same graph
//! and throughput should scale with the graph's inherent parallelism. It:
//! - Owns the topology in a flat arena and validates it once at build
//!   time (single source, single sink, acyclic); the dispatch path never
//!   re-checks it.
//! - Tracks readiness with a per-node satisfied counter under a per-node
//!   lock; the parent completion that fills a counter enqueues the child.
//! - Feeds a pool of symmetric, long-lived workers from one FIFO ready
//!   queue (mutex + condition variable). There is no work stealing and no
//!   precomputed schedule; ready nodes go to whichever worker is free.
//! - Re-arms the whole graph at each cycle boundary: the worker that
//!   executes the sink either re-seeds the source or stops the pool, and
//!   every node zeroes its own counter before publishing completion so
//!   the next cycle can begin arriving immediately.
//! - Records a per-cycle execution trace (two markers per task) whose
//!   shape encodes the precedence guarantee.
//!
//! Key modules:
//! - `graph`: the node arena, the builder, and build-time validation.
//! - `task`: the `Task` interface plus simulated sleep workloads.
//! - `config`: pool size, loop count, and observability toggles.
//! - `engine`: the worker pool, the cycle controller, and the run
//!   lifecycle.
//! - `trace`: trace-shape predicates shared by the engine's debug audits
//!   and by tests.
//! - `logging`: optional `tracing` subscriber bootstrap.
//!
//! Quick start:
//! 1. Declare nodes and edges on a [`GraphBuilder`], then `build()`.
//! 2. Pick a pool size and loop count via [`EngineConfig`].
//! 3. Hand both to [`Engine::new`] and call `run()`.
//!
//! ```
//! use dagrun::{Engine, EngineConfig, GraphBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = GraphBuilder::new();
//! let first = builder.node('A', || {})?;
//! let last = builder.node('Z', || {})?;
//! builder.link(first, last);
//!
//! let report = Engine::new(builder.build()?, EngineConfig::new(2, 3)).run()?;
//! assert_eq!(report.loops, 3);
//! # Ok(())
//! # }
//! ```
//!
//! The engine guarantees the partial order imposed by the graph: within
//! one cycle a node runs exactly once, and only after all of its parents
//! completed in that same cycle. It does not guarantee any particular
//! interleaving between independent nodes.

/// Engine parameters and observability toggles.
pub mod config;
/// The worker pool, cycle controller and run lifecycle.
///
/// Contains the `Engine` entry point, the shared run state handed to the
/// pool, and the per-worker dispatch loop.
pub mod engine;
/// Graph construction and validation.
///
/// The node arena, the `GraphBuilder` API (`node`, `link`, `find`,
/// `build`) and the frozen `TaskGraph` with its accessors.
pub mod graph;
/// `tracing` subscriber bootstrap for embedders without their own.
pub mod logging;
mod queue;
mod sync;
/// Task definitions and simulated workloads.
pub mod task;
/// Execution-trace predicates.
///
/// A cycle's trace appends each node's label at task start and task end;
/// the predicates here check completeness and precedence of a finished
/// trace.
pub mod trace;
/// Core types: node handles and map aliases.
pub mod types;

pub use crate::{
    config::EngineConfig,
    engine::{Engine, EngineError, RunReport},
    graph::{GraphBuilder, GraphError, TaskGraph},
    task::Task,
    types::NodeId,
};
