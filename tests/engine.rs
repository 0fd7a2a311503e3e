use dagrun::{
    Engine, EngineConfig, EngineError, GraphBuilder, TaskGraph,
    task::{sleep, sleep_jittered},
    trace,
};
use std::time::Duration;

fn config(workers: usize, loops: u64) -> EngineConfig {
    let mut config = EngineConfig::new(workers, loops);
    config.record_traces = true;
    config
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A → a → Z
fn chain(task_ms: u64) -> TaskGraph {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', sleep(ms(task_ms))).unwrap();
    let mid = builder.node('a', sleep(ms(task_ms))).unwrap();
    let sink = builder.node('Z', sleep(ms(task_ms))).unwrap();
    builder.link(source, mid);
    builder.link(mid, sink);
    builder.build().unwrap()
}

/// A → {a, b} → z → Z, with `a` and `b` long enough to overlap.
fn diamond() -> TaskGraph {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', sleep(ms(0))).unwrap();
    let left = builder.node('a', sleep(ms(15))).unwrap();
    let right = builder.node('b', sleep(ms(15))).unwrap();
    let join = builder.node('z', sleep(ms(3))).unwrap();
    let sink = builder.node('Z', sleep(ms(0))).unwrap();
    builder.link(source, left);
    builder.link(source, right);
    builder.link(left, join);
    builder.link(right, join);
    builder.link(join, sink);
    builder.build().unwrap()
}

/// The 14-node pipeline:
///
/// ```text
/// A → a b c    a → 1 2    b → 2 i    c → 2 3 4
/// 1 → Z        2 → x Z    3 → x      4 → x
/// i → j k      j → y      k → y
/// x → Z        y → Z
/// ```
fn pipeline(task_ms: u64, jitter: bool) -> TaskGraph {
    let labels = [
        'A', 'a', 'b', 'c', '1', '2', '3', '4', 'i', 'j', 'k', 'x', 'y', 'Z',
    ];
    let edges = [
        ('A', 'a'),
        ('A', 'b'),
        ('A', 'c'),
        ('a', '1'),
        ('a', '2'),
        ('b', '2'),
        ('b', 'i'),
        ('c', '2'),
        ('c', '3'),
        ('c', '4'),
        ('1', 'Z'),
        ('2', 'x'),
        ('2', 'Z'),
        ('3', 'x'),
        ('4', 'x'),
        ('i', 'j'),
        ('i', 'k'),
        ('j', 'y'),
        ('k', 'y'),
        ('x', 'Z'),
        ('y', 'Z'),
    ];

    let mut builder = GraphBuilder::new();
    for label in labels {
        if jitter {
            builder.node(label, sleep_jittered(ms(task_ms), 0.1)).unwrap();
        } else {
            builder.node(label, sleep(ms(task_ms))).unwrap();
        }
    }
    for (parent, child) in edges {
        let parent = builder.find(parent).unwrap();
        let child = builder.find(child).unwrap();
        builder.link(parent, child);
    }
    builder.build().unwrap()
}

fn assert_valid_trace(graph: &TaskGraph, cycle_trace: &str) {
    assert!(
        trace::is_complete(cycle_trace, graph.labels()),
        "trace `{cycle_trace}` is not a complete traversal"
    );
    for id in graph.ids() {
        for &child in graph.children(id) {
            assert!(
                trace::respects_precedence(cycle_trace, graph.label(id), graph.label(child)),
                "trace `{cycle_trace}` violates {} -> {}",
                graph.label(id),
                graph.label(child)
            );
        }
    }
}

#[test]
fn linear_chain_single_worker_trace() {
    let report = Engine::new(chain(10), config(1, 1)).run().unwrap();

    assert_eq!(report.loops, 1);
    assert_eq!(report.traces, vec!["AAaaZZ".to_owned()]);
}

#[test]
fn diamond_two_workers_shape() {
    let graph = diamond();
    let report = Engine::new(graph, config(2, 1)).run().unwrap();

    assert_eq!(report.loops, 1);
    let [cycle_trace] = report.traces.as_slice() else {
        panic!("expected one trace, got {:?}", report.traces);
    };
    assert_eq!(cycle_trace.chars().count(), 10);
    assert!(cycle_trace.starts_with("AA"), "trace `{cycle_trace}`");
    assert!(cycle_trace.ends_with("zzZZ"), "trace `{cycle_trace}`");
    assert_valid_trace(&report.graph, cycle_trace);
}

#[test]
fn pipeline_five_workers_ten_loops() {
    let graph = pipeline(1, true);
    let report = Engine::new(graph, config(5, 10)).run().unwrap();

    assert_eq!(report.loops, 10);
    assert_eq!(report.traces.len(), 10);
    for cycle_trace in &report.traces {
        assert_eq!(cycle_trace.chars().count(), 28);
        assert_valid_trace(&report.graph, cycle_trace);
    }
}

#[test]
fn source_to_sink_only() {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', sleep(ms(1))).unwrap();
    let sink = builder.node('Z', sleep(ms(1))).unwrap();
    builder.link(source, sink);
    let graph = builder.build().unwrap();

    let report = Engine::new(graph, config(2, 3)).run().unwrap();

    assert_eq!(report.loops, 3);
    assert_eq!(report.traces, vec!["AAZZ".to_owned(); 3]);
}

#[test]
fn zero_duration_tasks_do_not_deadlock() {
    let graph = pipeline(0, false);
    let report = Engine::new(graph, config(4, 50)).run().unwrap();

    assert_eq!(report.loops, 50);
    assert_eq!(report.traces.len(), 50);
    for cycle_trace in &report.traces {
        assert_valid_trace(&report.graph, cycle_trace);
    }
}

#[test]
fn single_worker_runs_are_deterministic() {
    let first = Engine::new(pipeline(0, false), config(1, 3)).run().unwrap();
    let second = Engine::new(pipeline(0, false), config(1, 3)).run().unwrap();

    // One worker and a FIFO queue linearise the graph the same way every
    // cycle and every run.
    assert_eq!(first.traces.len(), 3);
    for cycle_trace in &first.traces {
        assert_eq!(cycle_trace, &first.traces[0]);
    }
    assert_eq!(first.traces, second.traces);
}

#[test]
fn counters_reset_and_graph_is_reusable() {
    let report = Engine::new(diamond(), config(2, 4)).run().unwrap();

    let graph = report.graph;
    for id in graph.ids() {
        assert_eq!(graph.satisfied(id), 0, "node `{}`", graph.label(id));
    }
    let join = graph.find('z').unwrap();
    assert_eq!(graph.required(join), 2);

    // A finished run leaves the graph fully re-armed: hand it to a fresh
    // engine and go again.
    let rerun = Engine::new(graph, config(3, 2)).run().unwrap();
    assert_eq!(rerun.loops, 2);
    for cycle_trace in &rerun.traces {
        assert_valid_trace(&rerun.graph, cycle_trace);
    }
}

#[test]
fn panicking_task_stops_engine() {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', sleep(ms(0))).unwrap();
    let faulty = builder.node('p', || panic!("boom")).unwrap();
    let sink = builder.node('Z', sleep(ms(0))).unwrap();
    builder.link(source, faulty);
    builder.link(faulty, sink);
    let graph = builder.build().unwrap();

    let err = Engine::new(graph, config(2, 5)).run().unwrap_err();
    assert!(
        matches!(err, EngineError::TaskPanicked { label: 'p' }),
        "unexpected error: {err}"
    );
}

#[test]
fn traces_not_recorded_by_default() {
    let report = Engine::new(chain(0), EngineConfig::new(2, 4)).run().unwrap();

    assert_eq!(report.loops, 4);
    assert!(report.traces.is_empty());
}

#[test]
fn config_defaults_to_one_worker_one_loop() {
    let config = EngineConfig::default();
    assert_eq!(config.workers.get(), 1);
    assert_eq!(config.loops.get(), 1);
    assert!(!config.record_traces);

    let report = Engine::new(chain(0), config).run().unwrap();
    assert_eq!(report.loops, 1);
}

#[test]
#[should_panic(expected = "pool size must be at least 1")]
fn config_rejects_empty_pool() {
    let _ = EngineConfig::new(0, 1);
}

#[test]
#[should_panic(expected = "loop count must be at least 1")]
fn config_rejects_zero_loops() {
    let _ = EngineConfig::new(1, 0);
}

#[test]
fn trace_completeness_predicate() {
    assert!(trace::is_complete("AAaaZZ", ['A', 'a', 'Z']));
    assert!(trace::is_complete("AAababZZ", ['A', 'a', 'b', 'Z']));
    assert!(!trace::is_complete("AAaa", ['A', 'a', 'Z']));
    assert!(!trace::is_complete("AAaaZZZ", ['A', 'a', 'Z']));
    assert!(!trace::is_complete("AAaaZZx", ['A', 'a', 'Z']));
}

#[test]
fn trace_precedence_predicate() {
    assert!(trace::respects_precedence("AAaaZZ", 'A', 'a'));
    assert!(trace::respects_precedence("AAaaZZ", 'a', 'Z'));
    // Parent still running when the child started.
    assert!(!trace::respects_precedence("AaAaZZ", 'A', 'a'));
    // Missing markers never pass.
    assert!(!trace::respects_precedence("AAaa", 'a', 'Z'));
}
