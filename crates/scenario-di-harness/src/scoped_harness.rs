//! Harness that brackets each scenario with `start()` and `stop()`.

use scenario_di::{ObjectFactory, ScopeError};

use crate::adapter::HarnessAdapter;
use crate::runner::{ScenarioMetadata, ScenarioRunRequest};

/// Synchronous harness owning the scenario's [`ObjectFactory`].
///
/// Each request runs in a fresh scenario. The scenario is stopped when the
/// runner returns and also when it panics, so a failing scenario never
/// leaves its scope open for the next one.
#[derive(Debug, Default)]
pub struct ScopedHarness {
    factory: ObjectFactory,
}

impl ScopedHarness {
    /// Creates a harness around `factory`.
    #[must_use]
    pub fn new(factory: ObjectFactory) -> Self {
        Self { factory }
    }

    /// Returns the wrapped factory.
    #[must_use]
    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    /// Returns the wrapped factory mutably, e.g. to add bindings before the
    /// first run.
    pub fn factory_mut(&mut self) -> &mut ObjectFactory {
        &mut self.factory
    }

    /// Consumes the harness, returning the factory.
    #[must_use]
    pub fn into_factory(self) -> ObjectFactory {
        self.factory
    }
}

impl HarnessAdapter for ScopedHarness {
    fn run<T>(&mut self, request: ScenarioRunRequest<'_, T>) -> Result<T, ScopeError> {
        let (metadata, runner) = request.into_parts();
        let scenario = self.factory.start()?;
        log::debug!("running {metadata} as {scenario}");
        let mut guard = ScenarioGuard {
            factory: &mut self.factory,
            metadata: &metadata,
            armed: true,
        };
        let output = runner.run(&mut *guard.factory);
        guard.finish()?;
        Ok(output)
    }
}

/// Stops the open scenario if the runner unwinds.
struct ScenarioGuard<'f, 'm> {
    factory: &'f mut ObjectFactory,
    metadata: &'m ScenarioMetadata,
    armed: bool,
}

impl ScenarioGuard<'_, '_> {
    fn finish(mut self) -> Result<(), ScopeError> {
        self.armed = false;
        self.factory.stop()
    }
}

impl Drop for ScenarioGuard<'_, '_> {
    fn drop(&mut self) {
        if !self.armed || !self.factory.is_started() {
            return;
        }
        log::warn!("scenario {} unwound; stopping it", self.metadata);
        if let Err(error) = self.factory.stop() {
            log::warn!("failed to stop scenario {}: {error}", self.metadata);
        }
    }
}
