//! Bindings and the table that holds them.
//!
//! A [`Binding`] pairs a requested type with the [`Policy`] that governs
//! reuse of its instances and a zero-argument factory. The [`BindingTable`]
//! keys bindings by [`TypeId`] and becomes read-only once sealed, which the
//! registry does when the first scenario starts.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::error::{BoxError, ScopeError};

/// Type-erased instance handle shared between caches and callers.
pub(crate) type Instance = Rc<dyn Any>;

type FactoryFn = Box<dyn Fn() -> Result<Instance, BoxError>>;

/// Rule governing reuse of instances produced by a binding.
///
/// # Examples
///
/// ```
/// use scenario_di::Policy;
///
/// assert_eq!(Policy::ScenarioScoped.as_str(), "scenario-scoped");
/// assert_eq!(Policy::default(), Policy::Transient);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Policy {
    /// A new instance for every request.
    #[default]
    Transient,
    /// One instance for the lifetime of the registry.
    Singleton,
    /// One instance per open scenario.
    ScenarioScoped,
}

impl Policy {
    /// Returns the lowercase name used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Singleton => "singleton",
            Self::ScenarioScoped => "scenario-scoped",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Association between a requested type, its policy, and its factory.
///
/// # Examples
///
/// ```
/// use scenario_di::{Binding, Policy};
///
/// #[derive(Default)]
/// struct Basket;
///
/// let binding = Binding::new::<Basket>(Policy::ScenarioScoped, Basket::default);
/// assert_eq!(binding.policy(), Policy::ScenarioScoped);
/// assert!(binding.type_name().ends_with("Basket"));
/// ```
pub struct Binding {
    type_id: TypeId,
    type_name: &'static str,
    policy: Policy,
    factory: FactoryFn,
}

impl Binding {
    /// Creates a binding for `T` with an infallible factory.
    #[must_use]
    pub fn new<T: 'static>(policy: Policy, factory: impl Fn() -> T + 'static) -> Self {
        Self::from_erased::<T>(
            policy,
            Box::new(move || Ok(Rc::new(factory()) as Instance)),
        )
    }

    /// Creates a binding for `T` whose factory may fail.
    ///
    /// Errors returned by `factory` reach the caller of the resolving
    /// operation as [`ScopeError::Factory`] without further wrapping.
    #[must_use]
    pub fn try_new<T, E>(policy: Policy, factory: impl Fn() -> Result<T, E> + 'static) -> Self
    where
        T: 'static,
        E: Into<BoxError>,
    {
        Self::from_erased::<T>(
            policy,
            Box::new(move || {
                factory()
                    .map(|value| Rc::new(value) as Instance)
                    .map_err(Into::into)
            }),
        )
    }

    fn from_erased<T: 'static>(policy: Policy, factory: FactoryFn) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            policy,
            factory,
        }
    }

    /// Returns the [`TypeId`] of the bound type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the bound type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the reuse policy.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Invokes the factory.
    pub(crate) fn create(&self) -> Result<Instance, ScopeError> {
        (self.factory)().map_err(ScopeError::Factory)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("type_name", &self.type_name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Bindings keyed by requested type.
///
/// # Examples
///
/// ```
/// use scenario_di::{BindingTable, Policy, ScopeError};
///
/// struct Engine;
///
/// let mut table = BindingTable::new();
/// table.bind::<Engine>(Policy::Singleton, || Engine)?;
/// assert!(table.contains::<Engine>());
///
/// table.seal();
/// let late = table.bind::<u8>(Policy::Transient, || 1);
/// assert!(matches!(late, Err(ScopeError::BindingTableSealed { .. })));
/// # Ok::<(), ScopeError>(())
/// ```
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<TypeId, Binding>,
    sealed: bool,
}

impl BindingTable {
    /// Creates an empty, unsealed table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `binding` to the table.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::BindingTableSealed`] once the table is sealed and
    /// [`ScopeError::DuplicateBinding`] when the type is already bound.
    pub fn register(&mut self, binding: Binding) -> Result<(), ScopeError> {
        if self.sealed {
            return Err(ScopeError::BindingTableSealed {
                type_name: binding.type_name,
            });
        }
        match self.bindings.entry(binding.type_id) {
            Entry::Occupied(_) => Err(ScopeError::DuplicateBinding {
                type_name: binding.type_name,
            }),
            Entry::Vacant(slot) => {
                log::trace!("bound {} as {}", binding.type_name, binding.policy);
                slot.insert(binding);
                Ok(())
            }
        }
    }

    /// Binds `T` with an infallible factory.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn bind<T: 'static>(
        &mut self,
        policy: Policy,
        factory: impl Fn() -> T + 'static,
    ) -> Result<(), ScopeError> {
        self.register(Binding::new::<T>(policy, factory))
    }

    /// Binds `T` with a fallible factory.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn try_bind<T, E>(
        &mut self,
        policy: Policy,
        factory: impl Fn() -> Result<T, E> + 'static,
    ) -> Result<(), ScopeError>
    where
        T: 'static,
        E: Into<BoxError>,
    {
        self.register(Binding::try_new::<T, E>(policy, factory))
    }

    /// Looks up the binding for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnboundType`] when `T` has no binding.
    pub fn lookup<T: 'static>(&self) -> Result<&Binding, ScopeError> {
        self.bindings
            .get(&TypeId::of::<T>())
            .ok_or_else(|| ScopeError::UnboundType {
                type_name: type_name::<T>(),
            })
    }

    /// Returns `true` when `T` is bound.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_id(TypeId::of::<T>())
    }

    pub(crate) fn contains_id(&self, type_id: TypeId) -> bool {
        self.bindings.contains_key(&type_id)
    }

    /// Makes the table read-only. Sealing twice has no further effect.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns `true` once the table rejects further registrations.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::cell::Cell;

    struct Widget;
    struct Gauge(u8);

    #[fixture]
    fn table() -> BindingTable {
        BindingTable::new()
    }

    #[rstest]
    fn lookup_returns_registered_binding(mut table: BindingTable) -> Result<(), ScopeError> {
        table.bind::<Widget>(Policy::ScenarioScoped, || Widget)?;
        let binding = table.lookup::<Widget>()?;
        assert_eq!(binding.policy(), Policy::ScenarioScoped);
        assert_eq!(binding.type_id(), TypeId::of::<Widget>());
        assert_eq!(table.len(), 1);
        Ok(())
    }

    #[rstest]
    fn duplicate_registration_is_rejected(mut table: BindingTable) -> Result<(), ScopeError> {
        table.bind::<Widget>(Policy::Transient, || Widget)?;
        let err = table.bind::<Widget>(Policy::Singleton, || Widget);
        assert!(matches!(err, Err(ScopeError::DuplicateBinding { type_name }) if type_name.ends_with("Widget")));
        assert_eq!(table.lookup::<Widget>()?.policy(), Policy::Transient);
        Ok(())
    }

    #[rstest]
    fn unbound_lookup_fails(table: BindingTable) {
        let err = table.lookup::<Gauge>();
        assert!(matches!(err, Err(ScopeError::UnboundType { type_name }) if type_name.ends_with("Gauge")));
    }

    #[rstest]
    fn sealed_table_rejects_registration(mut table: BindingTable) {
        table.seal();
        table.seal();
        assert!(table.is_sealed());
        let err = table.bind::<Gauge>(Policy::Transient, || Gauge(1));
        assert!(matches!(err, Err(ScopeError::BindingTableSealed { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn factory_runs_on_every_create() -> Result<(), ScopeError> {
        let calls = Rc::new(Cell::new(0u8));
        let counter = Rc::clone(&calls);
        let binding = Binding::new::<Gauge>(Policy::Transient, move || {
            counter.set(counter.get() + 1);
            Gauge(counter.get())
        });
        let first = binding.create()?;
        let second = binding.create()?;
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 2);
        assert_eq!(first.downcast_ref::<Gauge>().map(|g| g.0), Some(1));
        Ok(())
    }

    #[test]
    fn fallible_factory_error_is_preserved() {
        let binding = Binding::try_new::<Gauge, _>(Policy::Singleton, || {
            Err::<Gauge, _>("sensor offline")
        });
        let err = binding.create().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("sensor offline"));
    }

    #[rstest]
    #[case(Policy::Transient, "transient")]
    #[case(Policy::Singleton, "singleton")]
    #[case(Policy::ScenarioScoped, "scenario-scoped")]
    fn policy_names(#[case] policy: Policy, #[case] expected: &str) {
        assert_eq!(policy.as_str(), expected);
        assert_eq!(policy.to_string(), expected);
    }

    #[test]
    fn debug_omits_factory() {
        let binding = Binding::new::<Widget>(Policy::Singleton, || Widget);
        let rendered = format!("{binding:?}");
        assert!(rendered.contains("Singleton"));
        assert!(rendered.contains(".."));
    }
}
