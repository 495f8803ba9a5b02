use std::fs;
use std::sync::Arc;

use serde::Deserialize;
use tempfile::NamedTempFile;
use triode::{Component, DefaultContainer, TypeKey};
use triode_gems::{
    Config, ConfigSection, DependencyGraph, LoggingConfig, MonitorConfig, TracingConfig,
};

#[derive(Debug, Deserialize, PartialEq)]
struct PoolConfig {
    size: usize,
    name: String,
}

impl ConfigSection for PoolConfig {
    fn key() -> &'static str {
        "pool"
    }
}

#[derive(Component)]
struct Database;

#[derive(Component)]
struct Repository {
    database: Arc<Database>,
}

#[test]
fn test_config_section() {
    let config = Config::parse(r#"{"pool": {"size": 2, "name": "replica"}}"#).unwrap();

    let pool = config.section::<PoolConfig>().unwrap().unwrap();

    assert_eq!(
        pool,
        PoolConfig {
            size: 2,
            name: "replica".to_string(),
        }
    );
    assert!(config.section::<MonitorConfig>().unwrap().is_none());
}

#[test]
fn test_config_null_section_is_missing() {
    let config = Config::parse(r#"{"pool": null}"#).unwrap();

    assert!(config.section::<PoolConfig>().unwrap().is_none());
}

#[test]
fn test_config_invalid_section() {
    let config = Config::parse(r#"{"pool": {"size": "large"}}"#).unwrap();

    assert!(config.section::<PoolConfig>().is_err());
}

#[test]
fn test_config_parse_invalid_json() {
    assert!(Config::parse(r#"{ "monitor": oops }"#).is_err());
}

#[test]
fn test_config_parse_file() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"
    {
        "monitor": {
            "logging": { "logger": "app" },
            "record_dependencies": true
        },
        "tracing": {
            "level": "info",
            "directives": ["triode=trace"]
        }
    }
    "#,
    )
    .unwrap();

    let config = Config::parse_file(file.path()).unwrap();

    let monitor = config.section::<MonitorConfig>().unwrap().unwrap();
    assert_eq!(
        monitor,
        MonitorConfig {
            logging: Some(LoggingConfig {
                logger: Some("app".to_string()),
            }),
            record_dependencies: true,
        }
    );
    let section = config.section::<TracingConfig>().unwrap().unwrap();
    assert_eq!(section.level, tracing::Level::INFO);
    assert_eq!(section.directives, vec!["triode=trace"]);
    section.env_filter().unwrap();
}

#[test]
fn test_config_parse_file_not_found() {
    assert!(Config::parse_file("missing_config_file.json").is_err());
}

#[test]
fn test_tracing_config_defaults() {
    let config = Config::parse(r#"{"tracing": {}}"#).unwrap();

    let section = config.section::<TracingConfig>().unwrap().unwrap();

    assert_eq!(section.level, tracing::Level::DEBUG);
    assert!(section.directives.is_empty());
}

#[test]
fn test_tracing_config_invalid_level() {
    let config = Config::parse(r#"{"tracing": {"level": "loud"}}"#).unwrap();

    assert!(config.section::<TracingConfig>().is_err());
}

#[test]
fn test_tracing_config_serialization() {
    let config = TracingConfig {
        level: tracing::Level::WARN,
        directives: vec!["triode=trace".to_string()],
    };

    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(
        value,
        serde_json::json!({"level": "WARN", "directives": ["triode=trace"]})
    );
    let text = serde_json::json!({ "tracing": value }).to_string();
    let section = Config::parse(text).unwrap().section::<TracingConfig>().unwrap().unwrap();
    assert_eq!(section.level, tracing::Level::WARN);
    assert_eq!(section.directives, config.directives);
}

#[test]
fn test_monitor_config_records_dependencies() {
    let config = Config::parse(r#"{"monitor": {"record_dependencies": true}}"#).unwrap();
    let graph = Arc::new(DependencyGraph::new());
    let monitor = config
        .section::<MonitorConfig>()
        .unwrap()
        .unwrap()
        .build(&graph);

    let container = DefaultContainer::builder()
        .with_monitor(monitor)
        .add_component::<Database>()
        .add_component::<Repository>()
        .build();
    container.get::<Repository>().unwrap().unwrap();

    assert_eq!(
        graph.dependencies_of(&TypeKey::of::<Repository>()),
        vec![TypeKey::of::<Database>()]
    );
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn test_config_monitor_chain() {
    let config = Config::parse(
        r#"{"monitor": {"logging": {"logger": "app"}, "record_dependencies": true}}"#,
    )
    .unwrap();
    let graph = Arc::new(DependencyGraph::new());

    let container = DefaultContainer::builder()
        .with_monitor(config.monitor(&graph).unwrap())
        .add_component::<Database>()
        .add_component::<Repository>()
        .build();
    container.get::<Repository>().unwrap().unwrap();

    assert_eq!(
        graph.dependencies_of(&TypeKey::of::<Repository>()),
        vec![TypeKey::of::<Database>()]
    );
}

#[test]
fn test_config_monitor_without_section() {
    let graph = Arc::new(DependencyGraph::new());

    let container = DefaultContainer::builder()
        .with_monitor(Config::default().monitor(&graph).unwrap())
        .add_component::<Database>()
        .add_component::<Repository>()
        .build();
    container.get::<Repository>().unwrap().unwrap();

    assert_eq!(graph.node_count(), 0);
    let config = Config::parse(r#"{"monitor": {"record_dependencies": "yes"}}"#).unwrap();
    assert!(config.monitor(&graph).is_err());
}

#[test]
fn test_monitor_config_default_records_nothing() {
    let graph = Arc::new(DependencyGraph::new());
    let monitor = MonitorConfig::default().build(&graph);

    let container = DefaultContainer::builder()
        .with_monitor(monitor)
        .add_component::<Database>()
        .add_component::<Repository>()
        .build();
    let repository = container.get::<Repository>().unwrap().unwrap();

    assert!(Arc::ptr_eq(
        &repository.database,
        &container.get::<Database>().unwrap().unwrap()
    ));
    assert_eq!(graph.node_count(), 0);
}
