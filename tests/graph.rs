use dagrun::{GraphBuilder, GraphError};

fn noop() -> impl Fn() + Send + Sync + 'static {
    || {}
}

#[test]
fn duplicate_label_rejected() {
    let mut builder = GraphBuilder::new();
    builder.node('A', noop()).unwrap();
    let err = builder.node('A', noop()).unwrap_err();
    assert_eq!(err, GraphError::DuplicateLabel('A'));
}

#[test]
fn empty_graph_rejected() {
    let err = GraphBuilder::new().build().unwrap_err();
    assert_eq!(err, GraphError::Empty);
}

#[test]
#[should_panic(expected = "linked to itself")]
fn self_link_panics() {
    let mut builder = GraphBuilder::new();
    let only = builder.node('A', noop()).unwrap();
    builder.link(only, only);
}

#[test]
fn multiple_sources_rejected() {
    let mut builder = GraphBuilder::new();
    let first = builder.node('A', noop()).unwrap();
    let second = builder.node('B', noop()).unwrap();
    let sink = builder.node('Z', noop()).unwrap();
    builder.link(first, sink);
    builder.link(second, sink);
    let err = builder.build().unwrap_err();
    assert_eq!(err, GraphError::MultipleSources('A', 'B'));
}

#[test]
fn multiple_sinks_rejected() {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', noop()).unwrap();
    let left = builder.node('y', noop()).unwrap();
    let right = builder.node('z', noop()).unwrap();
    builder.link(source, left);
    builder.link(source, right);
    let err = builder.build().unwrap_err();
    assert_eq!(err, GraphError::MultipleSinks('y', 'z'));
}

#[test]
fn cycle_rejected() {
    // A → b → c → b, c → Z: single source and sink, but {b, c} can never
    // be eliminated.
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', noop()).unwrap();
    let b = builder.node('b', noop()).unwrap();
    let c = builder.node('c', noop()).unwrap();
    let sink = builder.node('Z', noop()).unwrap();
    builder.link(source, b);
    builder.link(b, c);
    builder.link(c, b);
    builder.link(c, sink);
    let err = builder.build().unwrap_err();
    assert_eq!(err, GraphError::Cycle);
}

#[test]
fn in_degrees_follow_links() {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', noop()).unwrap();
    let left = builder.node('a', noop()).unwrap();
    let right = builder.node('b', noop()).unwrap();
    let join = builder.node('z', noop()).unwrap();
    let sink = builder.node('Z', noop()).unwrap();
    builder.link(source, left);
    builder.link(source, right);
    builder.link(left, join);
    builder.link(right, join);
    builder.link(join, sink);

    assert_eq!(builder.find('z'), Some(join));
    let graph = builder.build().unwrap();

    assert_eq!(graph.len(), 5);
    assert_eq!(graph.label(graph.source()), 'A');
    assert_eq!(graph.label(graph.sink()), 'Z');
    assert_eq!(graph.required(source), 0);
    assert_eq!(graph.required(join), 2);
    assert_eq!(graph.required(sink), 1);
    assert_eq!(graph.children(source), [left, right]);
    assert_eq!(graph.parents(join), [left, right]);
    assert_eq!(graph.find('b'), Some(right));
    assert_eq!(graph.find('q'), None);
}

#[test]
fn single_edge_graph_builds() {
    let mut builder = GraphBuilder::new();
    let source = builder.node('A', noop()).unwrap();
    let sink = builder.node('Z', noop()).unwrap();
    builder.link(source, sink);
    let graph = builder.build().unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.source(), source);
    assert_eq!(graph.sink(), sink);
    assert_eq!(graph.satisfied(sink), 0);
}
