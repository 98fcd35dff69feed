//! Scenario runner request and metadata types.

use scenario_di::ObjectFactory;

/// Describes the scenario a harness is about to run.
///
/// # Examples
///
/// ```
/// use scenario_di_harness::ScenarioMetadata;
///
/// let metadata = ScenarioMetadata::new(
///     "tests/features/checkout.feature",
///     "Paying for a basket",
///     12,
///     vec!["@smoke".to_string()],
/// );
/// assert_eq!(metadata.scenario_name(), "Paying for a basket");
/// assert_eq!(metadata.to_string(), "tests/features/checkout.feature:12 (Paying for a basket)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioMetadata {
    feature_path: String,
    scenario_name: String,
    scenario_line: u32,
    tags: Vec<String>,
}

impl ScenarioMetadata {
    /// Creates metadata for one scenario run.
    #[must_use]
    pub fn new(
        feature_path: impl Into<String>,
        scenario_name: impl Into<String>,
        scenario_line: u32,
        tags: Vec<String>,
    ) -> Self {
        Self {
            feature_path: feature_path.into(),
            scenario_name: scenario_name.into(),
            scenario_line,
            tags,
        }
    }

    /// Returns the feature path.
    #[must_use]
    pub fn feature_path(&self) -> &str {
        &self.feature_path
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// Returns the one-based line number in the feature file.
    #[must_use]
    pub const fn scenario_line(&self) -> u32 {
        self.scenario_line
    }

    /// Returns the scenario tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Default for ScenarioMetadata {
    fn default() -> Self {
        Self::new("<unknown>", "<unknown>", 1, Vec::new())
    }
}

impl std::fmt::Display for ScenarioMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} ({})",
            self.feature_path, self.scenario_line, self.scenario_name
        )
    }
}

/// The body of one scenario, given the factory to pull step objects from.
///
/// # Examples
///
/// ```
/// use scenario_di::ObjectFactory;
/// use scenario_di_harness::ScenarioRunner;
///
/// let mut factory = ObjectFactory::new();
/// let runner = ScenarioRunner::new(|factory: &mut ObjectFactory| factory.is_started());
/// assert!(!runner.run(&mut factory));
/// ```
pub struct ScenarioRunner<'a, T> {
    inner: Box<dyn FnOnce(&mut ObjectFactory) -> T + 'a>,
}

impl<'a, T> ScenarioRunner<'a, T> {
    /// Wraps a closure as a scenario runner.
    #[must_use]
    pub fn new(inner: impl FnOnce(&mut ObjectFactory) -> T + 'a) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Executes the wrapped closure against `factory`.
    pub fn run(self, factory: &mut ObjectFactory) -> T {
        (self.inner)(factory)
    }
}

/// A harness execution request for one scenario.
pub struct ScenarioRunRequest<'a, T> {
    metadata: ScenarioMetadata,
    runner: ScenarioRunner<'a, T>,
}

impl<'a, T> ScenarioRunRequest<'a, T> {
    /// Creates a request from metadata and a runner.
    #[must_use]
    pub fn new(metadata: ScenarioMetadata, runner: ScenarioRunner<'a, T>) -> Self {
        Self { metadata, runner }
    }

    /// Returns metadata for diagnostics or harness setup.
    #[must_use]
    pub fn metadata(&self) -> &ScenarioMetadata {
        &self.metadata
    }

    /// Consumes the request and returns metadata and runner separately.
    #[must_use]
    pub fn into_parts(self) -> (ScenarioMetadata, ScenarioRunner<'a, T>) {
        (self.metadata, self.runner)
    }
}
