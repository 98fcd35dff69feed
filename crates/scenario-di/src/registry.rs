//! Policy dispatch over the binding table and the two caches.
//!
//! The registry owns the [`BindingTable`], the singleton cache, and the
//! [`ScenarioScope`]. It lives for as long as its owner keeps it; only the
//! scope changes between scenarios.

use std::any::{Any, TypeId, type_name};
use std::rc::Rc;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::binding::{Binding, BindingTable, Instance, Policy};
use crate::error::ScopeError;
use crate::scope::{ScenarioId, ScenarioScope};

/// Resolves requested types to instances according to their binding policy.
///
/// # Examples
///
/// ```
/// use scenario_di::{BindingTable, Policy, Registry, ScopeError};
/// use std::rc::Rc;
///
/// struct Engine;
///
/// let mut table = BindingTable::new();
/// table.bind::<Engine>(Policy::Singleton, || Engine)?;
/// let mut registry = Registry::new(table);
///
/// registry.open_scenario()?;
/// let first = registry.resolve::<Engine>()?;
/// registry.close_scenario()?;
///
/// registry.open_scenario()?;
/// let second = registry.resolve::<Engine>()?;
/// assert!(Rc::ptr_eq(&first, &second));
/// # Ok::<(), ScopeError>(())
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    table: BindingTable,
    singletons: HashMap<TypeId, Instance>,
    scope: ScenarioScope,
    opened: u64,
    log_resolutions: bool,
}

impl Registry {
    /// Creates a registry over `table`.
    ///
    /// The table stays open for registration until the first scenario opens.
    #[must_use]
    pub fn new(table: BindingTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Enables trace logging of every resolution.
    pub fn set_log_resolutions(&mut self, enabled: bool) {
        self.log_resolutions = enabled;
    }

    /// Returns the binding table.
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.table
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut BindingTable {
        &mut self.table
    }

    /// Returns the scenario scope.
    #[must_use]
    pub fn scope(&self) -> &ScenarioScope {
        &self.scope
    }

    /// Returns the number of singletons created so far.
    #[must_use]
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// Opens the next scenario, sealing the binding table on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyOpen`] if a scenario is already open.
    pub fn open_scenario(&mut self) -> Result<ScenarioId, ScopeError> {
        let scenario = ScenarioId::from(self.opened + 1);
        self.scope.open(scenario)?;
        self.opened += 1;
        if !self.table.is_sealed() {
            self.table.seal();
            log::debug!("sealed binding table with {} binding(s)", self.table.len());
        }
        Ok(scenario)
    }

    /// Closes the open scenario and discards its instances.
    ///
    /// Returns how many scenario-scoped instances were discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotOpen`] if no scenario is open.
    pub fn close_scenario(&mut self) -> Result<usize, ScopeError> {
        self.scope.close()
    }

    /// Resolves an instance of `T`.
    ///
    /// Every policy is handled by its own arm; none falls back to another.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnboundType`] when `T` has no binding,
    /// [`ScopeError::ScopeNotOpen`] when no scenario is open, and
    /// [`ScopeError::Factory`] when the factory fails.
    pub fn resolve<T: 'static>(&mut self) -> Result<Rc<T>, ScopeError> {
        let binding = self.table.lookup::<T>()?;
        let Some(scenario) = self.scope.current() else {
            return Err(ScopeError::ScopeNotOpen {
                type_name: binding.type_name(),
            });
        };
        let instance = match binding.policy() {
            Policy::Transient => binding.create()?,
            Policy::Singleton => singleton(&mut self.singletons, binding)?,
            Policy::ScenarioScoped => self.scope.get_or_create(binding)?,
        };
        if self.log_resolutions {
            log::trace!(
                "resolved {} ({}) in {scenario}",
                binding.type_name(),
                binding.policy()
            );
        }
        Ok(downcast::<T>(instance))
    }

    /// Returns `true` when an instance for `binding` is currently cached.
    ///
    /// Transient bindings are never cached.
    #[must_use]
    pub fn is_cached(&self, binding: &Binding) -> bool {
        match binding.policy() {
            Policy::Transient => false,
            Policy::Singleton => self.singletons.contains_key(&binding.type_id()),
            Policy::ScenarioScoped => self.scope.is_cached(binding.type_id()),
        }
    }
}

fn singleton(
    cache: &mut HashMap<TypeId, Instance>,
    binding: &Binding,
) -> Result<Instance, ScopeError> {
    match cache.entry(binding.type_id()) {
        Entry::Occupied(entry) => Ok(Rc::clone(entry.get())),
        Entry::Vacant(entry) => {
            let instance = binding.create()?;
            log::debug!("created singleton {}", binding.type_name());
            Ok(Rc::clone(entry.insert(instance)))
        }
    }
}

fn downcast<T: 'static>(instance: Rc<dyn Any>) -> Rc<T> {
    instance.downcast::<T>().unwrap_or_else(|_| {
        unreachable!(
            "binding for {} produced an instance of another type",
            type_name::<T>()
        )
    })
}
