use std::sync::Arc;

use triode::{
    Component, ComponentAdapter, ComponentKey, ConstructorAdapter, DefaultContainer,
    HidingAdapter, TypeKey,
};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

trait Counter: Send + Sync {
    fn count(&self) -> usize;
}

trait Describe: Send + Sync {
    fn describe(&self) -> &'static str;
}

trait Unrelated: Send + Sync {}

#[derive(Component)]
#[implements(dyn Greeter, dyn Counter, dyn Describe)]
struct Robot;

impl Greeter for Robot {
    fn greet(&self) -> String {
        "beep".to_string()
    }
}

impl Counter for Robot {
    fn count(&self) -> usize {
        42
    }
}

impl Describe for Robot {
    fn describe(&self) -> &'static str {
        "robot"
    }
}

fn hiding(key: impl Into<ComponentKey>, strict: bool) -> HidingAdapter {
    HidingAdapter::hiding(ConstructorAdapter::new::<Robot>(key), strict)
}

#[test]
fn test_hiding_multiple_interfaces() {
    let adapter = hiding(
        ComponentKey::types([
            TypeKey::interface::<dyn Greeter>(),
            TypeKey::interface::<dyn Counter>(),
        ]),
        true,
    );
    let container = DefaultContainer::builder().build();

    let instance = adapter.resolve(&container).unwrap();

    assert!(instance.is_hidden());
    assert_eq!(instance.interface::<dyn Greeter>().unwrap().greet(), "beep");
    assert_eq!(instance.interface::<dyn Counter>().unwrap().count(), 42);
    assert_eq!(
        instance.exposed_interfaces(),
        vec![
            TypeKey::interface::<dyn Greeter>(),
            TypeKey::interface::<dyn Counter>(),
        ]
    );
}

#[test]
fn test_hidden_instance_exposes_nothing_else() {
    let adapter = hiding(ComponentKey::interface::<dyn Greeter>(), true);
    let container = DefaultContainer::builder().build();

    let instance = adapter.resolve(&container).unwrap();

    assert!(instance.implements::<dyn Greeter>());
    assert!(!instance.implements::<dyn Counter>());
    assert!(!instance.implements::<dyn Describe>());
    assert!(instance.interface::<dyn Describe>().is_none());
    assert!(instance.downcast::<Robot>().is_none());
    assert_eq!(instance.implementation(), TypeKey::of::<Robot>());
}

#[test]
fn test_hiding_advertises_hide_set_only() {
    let base = ConstructorAdapter::new::<Robot>(ComponentKey::interface::<dyn Greeter>());
    let mut declared = vec![
        TypeKey::interface::<dyn Greeter>(),
        TypeKey::interface::<dyn Counter>(),
        TypeKey::interface::<dyn Describe>(),
    ];
    declared.sort();
    assert_eq!(base.interfaces(), declared);

    let adapter = HidingAdapter::hiding(base, true);
    assert_eq!(adapter.interfaces(), vec![TypeKey::interface::<dyn Greeter>()]);

    let adapter = hiding(ComponentKey::of::<Robot>(), false);
    assert_eq!(adapter.interfaces(), declared);
}

#[test]
fn test_interface_handles_share_object() {
    let adapter = hiding(
        ComponentKey::types([
            TypeKey::interface::<dyn Greeter>(),
            TypeKey::interface::<dyn Counter>(),
        ]),
        true,
    );
    let container = DefaultContainer::builder().build();
    let instance = adapter.resolve(&container).unwrap();

    let greeter = instance.interface::<dyn Greeter>().unwrap();
    let counter = instance.interface::<dyn Counter>().unwrap();

    assert_eq!(
        Arc::as_ptr(&greeter) as *const u8,
        Arc::as_ptr(&counter) as *const u8
    );
}

#[test]
fn test_hiding_rejects_concrete_type_in_list() {
    for strict in [true, false] {
        let adapter = hiding(
            ComponentKey::types([TypeKey::interface::<dyn Greeter>(), TypeKey::of::<Robot>()]),
            strict,
        );
        let container = DefaultContainer::builder().build();

        let err = adapter.resolve(&container).unwrap_err();
        assert!(err.is_introspection());
        assert!(err.to_string().contains("must be interfaces"), "{err}");

        let err = adapter.verify(&container).unwrap_err();
        assert!(err.is_introspection());
    }
}

#[test]
fn test_hiding_rejects_empty_list() {
    let adapter = hiding(ComponentKey::types(Vec::<TypeKey>::new()), false);
    let container = DefaultContainer::builder().build();

    let err = adapter.resolve(&container).unwrap_err();
    assert!(err.is_introspection());
}

#[test]
fn test_strict_hiding_rejects_name_key() {
    let adapter = hiding("some string", true);
    let container = DefaultContainer::builder().build();

    let err = adapter.resolve(&container).unwrap_err();
    assert!(err.is_introspection());
    assert!(err.to_string().contains("In strict mode"), "{err}");
    assert!(adapter.verify(&container).is_err());
}

#[test]
fn test_strict_hiding_rejects_concrete_key() {
    let adapter = hiding(ComponentKey::of::<Robot>(), true);
    let container = DefaultContainer::builder().build();

    assert!(adapter.resolve(&container).unwrap_err().is_introspection());
}

#[test]
fn test_non_strict_hiding_returns_raw_instance() {
    for key in [ComponentKey::name("some string"), ComponentKey::of::<Robot>()] {
        let adapter = hiding(key, false);
        let container = DefaultContainer::builder().build();

        let instance = adapter.resolve(&container).unwrap();
        assert!(!instance.is_hidden());
        assert!(instance.downcast::<Robot>().is_some());
        assert!(instance.implements::<dyn Describe>());
        adapter.verify(&container).unwrap();
    }
}

#[test]
fn test_hiding_requires_implemented_interface() {
    let adapter = hiding(ComponentKey::interface::<dyn Unrelated>(), true);
    let container = DefaultContainer::builder().build();

    let err = adapter.resolve(&container).unwrap_err();
    assert!(err.is_introspection());
    assert!(err.to_string().contains("does not implement"), "{err}");
}

#[test]
fn test_hiding_is_not_lifecycle_aware_without_delegate_support() {
    let adapter = hiding(ComponentKey::interface::<dyn Greeter>(), true);

    let capabilities = adapter.capabilities();
    assert!(capabilities.monitor_aware);
    assert!(!capabilities.lifecycle);
}
