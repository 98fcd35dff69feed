//! Behavioural tests for binding modules and configuration-driven discovery.

use rstest::rstest;
use scenario_di::{
    BindingModule, BindingTable, FactoryConfig, ObjectFactory, Policy, ScopeError, binding_module,
    registered_modules,
};
use std::rc::Rc;

#[derive(Default)]
struct Inventory {
    items: Vec<&'static str>,
}

struct PaymentGateway;

#[derive(Default)]
struct CheckoutSteps;

fn checkout_module(table: &mut BindingTable) -> Result<(), ScopeError> {
    table.bind::<Inventory>(Policy::ScenarioScoped, || Inventory {
        items: vec!["apple", "pear"],
    })?;
    table.bind::<PaymentGateway>(Policy::Singleton, || PaymentGateway)
}

fn conflicting_module(table: &mut BindingTable) -> Result<(), ScopeError> {
    table.bind::<PaymentGateway>(Policy::Transient, || PaymentGateway)
}

binding_module!("checkout", checkout_module);
binding_module!("conflicting", conflicting_module);

#[test]
fn modules_are_collected_at_link_time() {
    let names: Vec<_> = registered_modules().iter().map(|m| m.name).collect();
    assert!(names.contains(&"checkout"));
    assert!(names.contains(&"conflicting"));
}

#[test]
fn configured_module_is_installed() -> Result<(), ScopeError> {
    let config = FactoryConfig::default()
        .with_module("checkout")
        .with_log_resolutions(true);
    let mut factory = ObjectFactory::from_config(&config)?;
    assert!(factory.bindings().contains::<Inventory>());

    factory.start()?;
    let inventory = factory.get_instance::<Inventory>()?;
    assert_eq!(inventory.items, ["apple", "pear"]);
    let gateway = factory.get_instance::<PaymentGateway>()?;
    factory.stop()?;

    factory.start()?;
    assert!(Rc::ptr_eq(&gateway, &factory.get_instance::<PaymentGateway>()?));
    assert!(!Rc::ptr_eq(&inventory, &factory.get_instance::<Inventory>()?));
    factory.stop()?;
    Ok(())
}

#[rstest]
#[case::unknown("no-such-module")]
#[case::near_miss("Checkout")]
fn unknown_module_fails(#[case] name: &str) {
    let config = FactoryConfig::default().with_module(name);
    assert!(matches!(
        ObjectFactory::from_config(&config),
        Err(ScopeError::UnknownModule { name: missing }) if missing == name
    ));
}

#[test]
fn config_without_module_builds_empty_factory() -> Result<(), ScopeError> {
    let factory = ObjectFactory::from_config(&FactoryConfig::default())?;
    assert!(factory.bindings().is_empty());
    Ok(())
}

#[test]
fn modules_compose_with_glue() -> Result<(), ScopeError> {
    let modules: [&dyn BindingModule; 1] = [&checkout_module];
    let mut factory = ObjectFactory::with_modules(modules)?;
    factory.add_glue::<CheckoutSteps>()?;
    factory.start()?;
    factory.get_instance::<CheckoutSteps>()?;
    factory.get_instance::<Inventory>()?;
    factory.stop()?;
    Ok(())
}

#[test]
fn overlapping_modules_are_rejected() {
    let modules: [&dyn BindingModule; 2] = [&checkout_module, &conflicting_module];
    assert!(matches!(
        ObjectFactory::with_modules(modules),
        Err(ScopeError::DuplicateBinding { type_name }) if type_name.ends_with("PaymentGateway")
    ));
}

#[test]
fn install_after_start_is_rejected() -> Result<(), ScopeError> {
    let mut factory = ObjectFactory::new();
    factory.start()?;
    assert!(matches!(
        factory.install(&checkout_module),
        Err(ScopeError::BindingTableSealed { .. })
    ));
    factory.stop()?;
    Ok(())
}
