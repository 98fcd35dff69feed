//! Harness adapter trait for scenario execution.

use scenario_di::ScopeError;

use crate::runner::ScenarioRunRequest;

/// Runs scenario closures inside a harness-specific environment.
///
/// # Examples
///
/// ```
/// use scenario_di::{ObjectFactory, Policy, ScopeError};
/// use scenario_di_harness::{
///     HarnessAdapter, ScenarioMetadata, ScenarioRunRequest, ScenarioRunner, ScopedHarness,
/// };
///
/// let mut factory = ObjectFactory::new();
/// factory.add_binding::<u8>(Policy::ScenarioScoped, || 5)?;
/// let mut harness = ScopedHarness::new(factory);
///
/// let request = ScenarioRunRequest::new(
///     ScenarioMetadata::new("tests/features/demo.feature", "Example", 3, vec![]),
///     ScenarioRunner::new(|factory| factory.get_instance::<u8>().map(|n| *n + 5)),
/// );
/// assert_eq!(harness.run(request)??, 10);
/// # Ok::<(), ScopeError>(())
/// ```
pub trait HarnessAdapter {
    /// Executes one scenario request and returns the runner result.
    ///
    /// # Errors
    ///
    /// Returns lifecycle errors raised while opening or closing the scenario.
    fn run<T>(&mut self, request: ScenarioRunRequest<'_, T>) -> Result<T, ScopeError>;
}
