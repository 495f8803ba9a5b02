use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use triode::{Component, DefaultContainer, TypeKey};
use triode_gems::{Dependency, DependencyGraph, DependencyListener, DependencyMonitor, Edge};

struct Service;
struct Database;
struct Cache;
struct Clock;

#[derive(Component)]
struct Settings;

#[derive(Component)]
struct Pool {
    settings: Arc<Settings>,
}

#[derive(Component)]
struct Api {
    pool: Arc<Pool>,
    settings: Arc<Settings>,
}

fn dependency(component: TypeKey, dependency: Option<TypeKey>) -> Dependency {
    Dependency {
        component,
        dependency,
    }
}

#[test]
fn test_graph_from_notifications() {
    let service = TypeKey::of::<Service>();
    let database = TypeKey::of::<Database>();
    let cache = TypeKey::of::<Cache>();
    let clock = TypeKey::of::<Clock>();
    let notifications = vec![
        dependency(service, Some(database)),
        dependency(service, Some(cache)),
        dependency(service, Some(database)),
        dependency(cache, Some(database)),
        dependency(clock, None),
        dependency(database, None),
    ];
    let graph = DependencyGraph::new();

    for notification in &notifications {
        graph.on_dependency(*notification);
    }

    let expected_edges: BTreeSet<Edge> = notifications
        .iter()
        .filter_map(|v| v.dependency.map(|to| Edge { from: v.component, to }))
        .collect();
    assert_eq!(graph.edges(), expected_edges.into_iter().collect::<Vec<_>>());
    assert_eq!(graph.edge_count(), 3);

    let expected_nodes: BTreeSet<TypeKey> = notifications
        .iter()
        .flat_map(|v| [Some(v.component), v.dependency])
        .flatten()
        .collect();
    let nodes: BTreeSet<TypeKey> = graph.types().into_iter().collect();
    assert_eq!(nodes, expected_nodes);
    assert_eq!(graph.node_count(), 4);
}

#[test]
fn test_graph_node_ids() {
    let graph = DependencyGraph::new();
    graph.add_dependency(TypeKey::of::<Service>(), Some(TypeKey::of::<Database>()));
    graph.add_dependency(TypeKey::of::<Cache>(), Some(TypeKey::of::<Database>()));

    assert_eq!(
        graph.types(),
        vec![
            TypeKey::of::<Service>(),
            TypeKey::of::<Database>(),
            TypeKey::of::<Cache>(),
        ]
    );
    let database = graph.node(&TypeKey::of::<Database>()).unwrap();
    assert_eq!(database.index(), 1);
    assert!(graph.node(&TypeKey::of::<Clock>()).is_none());
}

#[test]
fn test_graph_dependencies_of() {
    let graph = DependencyGraph::new();
    graph.add_dependency(TypeKey::of::<Service>(), Some(TypeKey::of::<Cache>()));
    graph.add_dependency(TypeKey::of::<Service>(), Some(TypeKey::of::<Database>()));
    graph.add_dependency(TypeKey::of::<Cache>(), Some(TypeKey::of::<Clock>()));

    assert_eq!(
        graph.dependencies_of(&TypeKey::of::<Service>()),
        vec![TypeKey::of::<Cache>(), TypeKey::of::<Database>()]
    );
    assert!(graph.dependencies_of(&TypeKey::of::<Database>()).is_empty());
}

#[test]
fn test_graph_concurrent_notifications() {
    let graph = Arc::new(DependencyGraph::new());

    thread::scope(|s| {
        for _ in 0..8 {
            let graph = graph.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    graph.add_dependency(TypeKey::of::<Service>(), Some(TypeKey::of::<Database>()));
                    graph.add_dependency(TypeKey::of::<Service>(), Some(TypeKey::of::<Cache>()));
                    graph.add_dependency(TypeKey::of::<Clock>(), None);
                }
            });
        }
    });

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 2);
    let ids: BTreeSet<usize> = graph.nodes().iter().map(|(id, _)| id.index()).collect();
    assert_eq!(ids.len(), 4);
    let by_id: Vec<TypeKey> = graph.nodes().into_iter().map(|(_, ty)| ty).collect();
    assert_eq!(graph.types(), by_id);
    let service = graph.dependencies_of(&TypeKey::of::<Service>());
    let mut expected = vec![TypeKey::of::<Database>(), TypeKey::of::<Cache>()];
    expected.sort_by_key(|v| graph.node(v));
    assert_eq!(service, expected);
}

#[test]
fn test_graph_records_container() {
    let graph = Arc::new(DependencyGraph::new());
    let container = DefaultContainer::builder()
        .with_monitor(Arc::new(DependencyMonitor::new(graph.clone())))
        .add_component::<Settings>()
        .add_component::<Pool>()
        .add_component::<Api>()
        .build();

    container.get::<Api>().unwrap().unwrap();

    assert_eq!(
        graph.edges(),
        {
            let mut edges = vec![
                Edge {
                    from: TypeKey::of::<Pool>(),
                    to: TypeKey::of::<Settings>(),
                },
                Edge {
                    from: TypeKey::of::<Api>(),
                    to: TypeKey::of::<Pool>(),
                },
                Edge {
                    from: TypeKey::of::<Api>(),
                    to: TypeKey::of::<Settings>(),
                },
            ];
            edges.sort();
            edges
        }
    );
    assert_eq!(graph.node_count(), 3);
}
