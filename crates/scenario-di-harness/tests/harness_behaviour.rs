//! Behavioural tests for scoped harness execution semantics.

use rstest::{fixture, rstest};
use scenario_di::{ObjectFactory, Policy, ScopeError};
use scenario_di_harness::{
    HarnessAdapter, ScenarioMetadata, ScenarioRunRequest, ScenarioRunner, ScopedHarness,
};
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

struct Engine;

#[derive(Default)]
struct Basket {
    items: Cell<u8>,
}

#[fixture]
fn harness() -> ScopedHarness {
    let mut factory = ObjectFactory::new();
    factory
        .add_binding::<Engine>(Policy::Singleton, || Engine)
        .unwrap_or_else(|e| panic!("binding engine: {e}"));
    factory
        .add_glue::<Basket>()
        .unwrap_or_else(|e| panic!("registering glue: {e}"));
    ScopedHarness::new(factory)
}

fn scenario<'a, T>(
    name: &str,
    runner: impl FnOnce(&mut ObjectFactory) -> T + 'a,
) -> ScenarioRunRequest<'a, T> {
    ScenarioRunRequest::new(
        ScenarioMetadata::new("tests/features/basket.feature", name, 3, vec![]),
        ScenarioRunner::new(runner),
    )
}

#[rstest]
fn harness_executes_runner_once(mut harness: ScopedHarness) -> Result<(), ScopeError> {
    let call_count = Rc::new(Cell::new(0u8));
    let call_count_clone = Rc::clone(&call_count);
    let result = harness.run(scenario("Counting", move |_| {
        call_count_clone.set(call_count_clone.get() + 1);
        "done"
    }))?;
    assert_eq!(result, "done");
    assert_eq!(call_count.get(), 1);
    Ok(())
}

#[rstest]
fn scenario_objects_are_fresh_per_run(mut harness: ScopedHarness) -> Result<(), ScopeError> {
    let fill = |factory: &mut ObjectFactory| -> Result<Rc<Basket>, ScopeError> {
        let basket = factory.get_instance::<Basket>()?;
        basket.items.set(basket.items.get() + 1);
        let again = factory.get_instance::<Basket>()?;
        again.items.set(again.items.get() + 1);
        Ok(again)
    };
    let first = harness.run(scenario("First", fill))??;
    let second = harness.run(scenario("Second", fill))??;
    assert_eq!(first.items.get(), 2);
    assert_eq!(second.items.get(), 2);
    assert!(!Rc::ptr_eq(&first, &second));
    Ok(())
}

#[rstest]
fn singletons_survive_across_runs(mut harness: ScopedHarness) -> Result<(), ScopeError> {
    let first = harness.run(scenario("First", |f| f.get_instance::<Engine>()))??;
    let second = harness.run(scenario("Second", |f| f.get_instance::<Engine>()))??;
    assert!(Rc::ptr_eq(&first, &second));
    Ok(())
}

#[rstest]
fn panicking_scenario_does_not_poison_the_next(
    mut harness: ScopedHarness,
) -> Result<(), ScopeError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        harness.run(scenario("Exploding", |factory| -> u8 {
            let _basket = factory.get_instance::<Basket>();
            panic!("checkout failed");
        }))
    }));
    assert!(outcome.is_err());
    assert!(!harness.factory().is_started());

    let cached = harness.run(scenario("Recovering", |factory| {
        factory.registry().scope().cached_len()
    }))?;
    assert_eq!(cached, 0);
    Ok(())
}

#[rstest]
fn unbound_type_is_reported_inside_scenario(
    mut harness: ScopedHarness,
) -> Result<(), ScopeError> {
    let outcome = harness.run(scenario("Missing", |f| f.get_instance::<u64>().map(|_| ())))?;
    assert!(matches!(outcome, Err(ScopeError::UnboundType { .. })));
    assert!(!harness.factory().is_started());
    Ok(())
}
