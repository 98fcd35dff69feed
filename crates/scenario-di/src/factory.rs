//! The object factory a scenario runner talks to.
//!
//! [`ObjectFactory`] mirrors the runner-facing contract: bindings and glue
//! types are added up front, then each scenario is bracketed by
//! [`start`](ObjectFactory::start) and [`stop`](ObjectFactory::stop) with
//! [`get_instance`](ObjectFactory::get_instance) calls in between. It has no
//! state of its own beyond the registry; it is started exactly when the
//! registry's scenario scope is open.

use std::any::{TypeId, type_name};
use std::rc::Rc;

use hashbrown::HashMap;

use crate::binding::{Binding, BindingTable, Policy};
use crate::config::FactoryConfig;
use crate::error::{BoxError, ScopeError};
use crate::module::{BindingModule, find_module};
use crate::registry::Registry;
use crate::scope::ScenarioId;

/// A step type waiting to be bound when the first scenario starts.
struct Glue {
    type_name: &'static str,
    binding: fn() -> Binding,
}

fn glue_binding<T: Default + 'static>() -> Binding {
    Binding::new::<T>(Policy::ScenarioScoped, T::default)
}

/// Scenario-scoped object factory for behaviour tests.
///
/// # Examples
///
/// ```
/// use scenario_di::{ObjectFactory, Policy, ScopeError};
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Widget;
///
/// let mut factory = ObjectFactory::new();
/// factory.add_binding::<Widget>(Policy::ScenarioScoped, Widget::default)?;
///
/// factory.start()?;
/// let a = factory.get_instance::<Widget>()?;
/// let b = factory.get_instance::<Widget>()?;
/// factory.stop()?;
/// assert!(Rc::ptr_eq(&a, &b));
///
/// factory.start()?;
/// let c = factory.get_instance::<Widget>()?;
/// factory.stop()?;
/// assert!(!Rc::ptr_eq(&a, &c));
/// # Ok::<(), ScopeError>(())
/// ```
#[derive(Default)]
pub struct ObjectFactory {
    registry: Registry,
    glue: HashMap<TypeId, Glue>,
}

impl ObjectFactory {
    /// Creates a factory with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with every module in `modules` installed.
    ///
    /// # Errors
    ///
    /// Propagates the first registration failure.
    pub fn with_modules<'m>(
        modules: impl IntoIterator<Item = &'m dyn BindingModule>,
    ) -> Result<Self, ScopeError> {
        let mut factory = Self::new();
        for module in modules {
            factory.install(module)?;
        }
        Ok(factory)
    }

    /// Creates a factory from `config`, installing the registered module it
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnknownModule`] if no module with the configured
    /// name was registered, or propagates the module's registration failure.
    pub fn from_config(config: &FactoryConfig) -> Result<Self, ScopeError> {
        let mut factory = Self::new();
        factory
            .registry
            .set_log_resolutions(config.log_resolutions);
        if let Some(name) = config.module.as_deref() {
            let module = find_module(name).ok_or_else(|| ScopeError::UnknownModule {
                name: name.to_owned(),
            })?;
            log::debug!(
                "installing binding module '{name}' from {}:{}",
                module.file,
                module.line
            );
            factory.install(module)?;
        }
        Ok(factory)
    }

    /// Creates a factory configured from the process environment.
    ///
    /// # Errors
    ///
    /// See [`FactoryConfig::from_env`] and [`from_config`](Self::from_config).
    pub fn from_env() -> Result<Self, ScopeError> {
        Self::from_config(&FactoryConfig::from_env()?)
    }

    /// Applies `module` to the binding table.
    ///
    /// # Errors
    ///
    /// Propagates the module's registration failures.
    pub fn install(&mut self, module: &(impl BindingModule + ?Sized)) -> Result<(), ScopeError> {
        module.configure(self.registry.bindings_mut())
    }

    /// Adds a prepared binding.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::DuplicateBinding`] or
    /// [`ScopeError::BindingTableSealed`].
    pub fn add(&mut self, binding: Binding) -> Result<(), ScopeError> {
        self.registry.bindings_mut().register(binding)
    }

    /// Binds `T` with an infallible factory.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn add_binding<T: 'static>(
        &mut self,
        policy: Policy,
        factory: impl Fn() -> T + 'static,
    ) -> Result<(), ScopeError> {
        self.add(Binding::new::<T>(policy, factory))
    }

    /// Binds `T` with a fallible factory.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn try_add_binding<T, E>(
        &mut self,
        policy: Policy,
        factory: impl Fn() -> Result<T, E> + 'static,
    ) -> Result<(), ScopeError>
    where
        T: 'static,
        E: Into<BoxError>,
    {
        self.add(Binding::try_new::<T, E>(policy, factory))
    }

    /// Records a step type.
    ///
    /// On the first [`start`](Self::start) every recorded type without an
    /// explicit binding is bound scenario-scoped, created with
    /// [`Default::default`]. Returns `true` if the type was not already
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::BindingTableSealed`] after the first start.
    pub fn add_glue<T: Default + 'static>(&mut self) -> Result<bool, ScopeError> {
        if self.registry.bindings().is_sealed() {
            return Err(ScopeError::BindingTableSealed {
                type_name: type_name::<T>(),
            });
        }
        let glue = Glue {
            type_name: type_name::<T>(),
            binding: glue_binding::<T>,
        };
        Ok(self.glue.insert(TypeId::of::<T>(), glue).is_none())
    }

    /// Opens a new scenario.
    ///
    /// The first call binds pending glue types and seals the binding table.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyOpen`] if a scenario is already open.
    pub fn start(&mut self) -> Result<ScenarioId, ScopeError> {
        if let Some(scenario) = self.current_scenario() {
            return Err(ScopeError::AlreadyOpen { scenario });
        }
        self.bind_glue()?;
        self.registry.open_scenario()
    }

    fn bind_glue(&mut self) -> Result<(), ScopeError> {
        let table = self.registry.bindings_mut();
        for (type_id, glue) in self.glue.drain() {
            if table.contains_id(type_id) {
                log::debug!("glue type {} keeps its explicit binding", glue.type_name);
                continue;
            }
            table.register((glue.binding)())?;
        }
        Ok(())
    }

    /// Returns an instance of `T` for the open scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnboundType`], [`ScopeError::ScopeNotOpen`], or
    /// the factory's own error.
    pub fn get_instance<T: 'static>(&mut self) -> Result<Rc<T>, ScopeError> {
        self.registry.resolve::<T>()
    }

    /// Closes the open scenario, discarding its instances.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotOpen`] if no scenario is open.
    pub fn stop(&mut self) -> Result<(), ScopeError> {
        self.registry.close_scenario()?;
        Ok(())
    }

    /// Returns `true` between [`start`](Self::start) and
    /// [`stop`](Self::stop).
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.registry.scope().is_open()
    }

    /// Returns the open scenario, if any.
    #[must_use]
    pub fn current_scenario(&self) -> Option<ScenarioId> {
        self.registry.scope().current()
    }

    /// Returns the binding table.
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        self.registry.bindings()
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Names of recorded glue types that have not been bound yet.
    pub fn pending_glue(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.glue.values().map(|glue| glue.type_name)
    }

    /// Serialize the binding table and scope state to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenario_di::{ObjectFactory, Policy};
    ///
    /// let mut factory = ObjectFactory::new();
    /// factory.add_binding::<u32>(Policy::Singleton, || 7).expect("bind u32");
    /// let json = factory.dump_bindings().expect("serialize bindings");
    /// assert!(json.contains("\"singleton\""));
    /// ```
    #[cfg(feature = "diagnostics")]
    pub fn dump_bindings(&self) -> serde_json::Result<String> {
        crate::diagnostics::dump_bindings(self)
    }
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("registry", &self.registry)
            .field("pending_glue", &self.glue.len())
            .finish()
    }
}
