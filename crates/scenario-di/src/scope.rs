//! The scenario scope and its instance cache.
//!
//! A [`ScenarioScope`] is either closed or open for exactly one scenario.
//! While open it caches one instance per scenario-scoped binding; closing it
//! drops the whole cache so nothing leaks into the next scenario.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use derive_more::From;
use hashbrown::HashMap;

use crate::binding::{Binding, Instance};
use crate::error::ScopeError;

/// Identifier assigned to each scenario opened by a registry.
///
/// Identifiers increase monotonically per registry, starting at 1.
///
/// # Examples
///
/// ```
/// use scenario_di::ScenarioId;
///
/// let id = ScenarioId::from(4);
/// assert_eq!(id.get(), 4);
/// assert_eq!(id.to_string(), "scenario #4");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, From)]
pub struct ScenarioId(u64);

impl ScenarioId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario #{}", self.0)
    }
}

/// Lifetime boundary for scenario-scoped instances.
///
/// # Examples
///
/// ```
/// use scenario_di::{Binding, Policy, ScenarioId, ScenarioScope, ScopeError};
/// use std::rc::Rc;
///
/// let binding = Binding::new::<String>(Policy::ScenarioScoped, || "cart".to_owned());
/// let mut scope = ScenarioScope::default();
/// scope.open(ScenarioId::from(1))?;
/// let first = scope.get_or_create(&binding)?;
/// let second = scope.get_or_create(&binding)?;
/// assert!(Rc::ptr_eq(&first, &second));
/// assert_eq!(scope.close()?, 1);
/// # Ok::<(), ScopeError>(())
/// ```
#[derive(Default)]
pub struct ScenarioScope {
    current: Option<ScenarioId>,
    cache: HashMap<TypeId, Instance>,
}

impl ScenarioScope {
    /// Opens the scope for `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyOpen`] if a scenario is already open.
    pub fn open(&mut self, scenario: ScenarioId) -> Result<(), ScopeError> {
        if let Some(current) = self.current {
            return Err(ScopeError::AlreadyOpen { scenario: current });
        }
        debug_assert!(self.cache.is_empty(), "closed scope retained instances");
        self.current = Some(scenario);
        log::debug!("opened {scenario}");
        Ok(())
    }

    /// Closes the scope and discards every cached instance.
    ///
    /// Returns how many instances were discarded. Each is dropped once the
    /// last handle given out for it goes away.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotOpen`] if no scenario is open.
    pub fn close(&mut self) -> Result<usize, ScopeError> {
        let scenario = self.current.take().ok_or(ScopeError::NotOpen)?;
        let discarded = self.cache.len();
        self.cache.clear();
        log::debug!("closed {scenario}, discarded {discarded} scenario-scoped instance(s)");
        Ok(discarded)
    }

    /// Returns the cached instance for `binding`, creating it on a miss.
    ///
    /// A failing factory leaves the cache untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::ScopeNotOpen`] when the scope is closed and
    /// [`ScopeError::Factory`] when the factory fails.
    pub fn get_or_create(&mut self, binding: &Binding) -> Result<Rc<dyn Any>, ScopeError> {
        if self.current.is_none() {
            return Err(ScopeError::ScopeNotOpen {
                type_name: binding.type_name(),
            });
        }
        if let Some(instance) = self.cache.get(&binding.type_id()) {
            return Ok(Rc::clone(instance));
        }
        let instance = binding.create()?;
        self.cache.insert(binding.type_id(), Rc::clone(&instance));
        Ok(instance)
    }

    /// Returns `true` while a scenario is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the open scenario, if any.
    #[must_use]
    pub fn current(&self) -> Option<ScenarioId> {
        self.current
    }

    /// Returns the number of instances cached for the open scenario.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub(crate) fn is_cached(&self, type_id: TypeId) -> bool {
        self.cache.contains_key(&type_id)
    }
}

impl fmt::Debug for ScenarioScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioScope")
            .field("current", &self.current)
            .field("cached", &self.cache.len())
            .finish()
    }
}
