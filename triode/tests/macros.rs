use std::sync::Arc;

use triode::{Component, DefaultContainer, TypeKey, component};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

trait Named: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Component)]
struct Config;

#[derive(Component)]
#[implements(dyn Greeter)]
struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

#[derive(Component)]
#[implements(dyn Named)]
struct Service {
    config: Arc<Config>,
    greeter: Arc<dyn Greeter>,
}

impl Named for Service {
    fn name(&self) -> &str {
        "service"
    }
}

struct Database {
    #[allow(unused)]
    config: Arc<Config>,
    url: String,
}

#[component(implements(dyn Named))]
impl Database {
    #[factory]
    fn open(config: Arc<Config>) -> Result<Self, std::io::Error> {
        Ok(Self {
            config,
            url: "sqlite::memory:".to_string(),
        })
    }
}

impl Named for Database {
    fn name(&self) -> &str {
        &self.url
    }
}

struct Clock;

#[component]
impl Clock {
    #[factory]
    fn new() -> Self {
        Self
    }
}

struct Failing;

#[component]
impl Failing {
    #[factory]
    fn new(_config: Arc<Config>) -> Result<Self, std::io::Error> {
        Err(std::io::Error::other("unavailable"))
    }
}

#[test]
fn test_derive_dependencies() {
    assert!(Config::dependencies().is_empty());
    assert_eq!(
        Service::dependencies(),
        vec![
            TypeKey::of::<Config>(),
            TypeKey::interface::<dyn Greeter>(),
        ]
    );
    assert!(Service::dependencies()[1].is_interface());
    assert_eq!(Database::dependencies(), vec![TypeKey::of::<Config>()]);
}

#[test]
fn test_derive_interfaces() {
    assert!(Config::interfaces().is_empty());
    assert_eq!(English::interfaces().len(), 1);
    assert_eq!(Service::interfaces().len(), 1);
    assert_eq!(Database::interfaces().len(), 1);
}

#[test]
fn test_container_macros() {
    let container = DefaultContainer::builder()
        .add_component::<Config>()
        .add_component_with_key::<English>(TypeKey::interface::<dyn Greeter>())
        .add_component::<Service>()
        .add_component::<Database>()
        .add_component::<Clock>()
        .build();

    container.verify().unwrap();

    let service = container.get::<Service>().unwrap().unwrap();
    let config = container.get::<Config>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&service.config, &config));
    assert_eq!(service.greeter.greet(), "hello");

    let database = container.get::<Database>().unwrap().unwrap();
    assert_eq!(database.name(), "sqlite::memory:");
    assert!(container.get::<Clock>().unwrap().is_some());
}

#[test]
fn test_factory_error_is_reported() {
    let container = DefaultContainer::builder()
        .add_component::<Config>()
        .add_component::<Failing>()
        .build();

    let Err(err) = container.get::<Failing>() else {
        panic!("failing factory must not produce a component");
    };

    assert!(err.to_string().contains("unavailable"), "{err}");
}
