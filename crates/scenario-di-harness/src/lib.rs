//! Scenario harness for `scenario-di`.
//!
//! A harness owns an [`scenario_di::ObjectFactory`] and wraps every scenario
//! body in a `start()`/`stop()` pair, so scenario-scoped objects never leak
//! from one scenario into the next even when a step panics.

mod adapter;
mod runner;
mod scoped_harness;
#[cfg(test)]
mod test_utils;

pub use adapter::HarnessAdapter;
pub use runner::{ScenarioMetadata, ScenarioRunRequest, ScenarioRunner};
pub use scoped_harness::ScopedHarness;
