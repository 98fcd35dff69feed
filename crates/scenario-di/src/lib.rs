//! Scenario-scoped instance registry for behaviour tests.
//!
//! A scenario runner asks an [`ObjectFactory`] for step objects. Each
//! requested type is bound under one of three [`Policy`] values:
//!
//! - [`Policy::Transient`]: a new instance on every request.
//! - [`Policy::Singleton`]: one instance for the factory's lifetime.
//! - [`Policy::ScenarioScoped`]: one instance per scenario, discarded when the
//!   scenario stops.
//!
//! Scenarios are strictly sequential. A factory is not shared between
//! threads; parallel workers each build their own.
//!
//! # Examples
//!
//! ```
//! use scenario_di::{ObjectFactory, Policy, ScopeError};
//! use std::rc::Rc;
//!
//! struct Engine;
//!
//! let mut factory = ObjectFactory::new();
//! factory.add_binding::<Engine>(Policy::Singleton, || Engine)?;
//!
//! let mut engines = Vec::new();
//! for _ in 0..3 {
//!     factory.start()?;
//!     engines.push(factory.get_instance::<Engine>()?);
//!     factory.stop()?;
//! }
//! assert!(Rc::ptr_eq(&engines[0], &engines[2]));
//! # Ok::<(), ScopeError>(())
//! ```

pub use inventory::{iter, submit};

mod binding;
pub mod config;
#[cfg(feature = "diagnostics")]
mod diagnostics;
mod error;
mod factory;
mod module;
mod registry;
mod scope;

pub use binding::{Binding, BindingTable, Policy};
pub use config::FactoryConfig;
pub use error::{BoxError, ScopeError};
pub use factory::ObjectFactory;
pub use module::{BindingModule, RegisteredModule, find_module, registered_modules};
pub use registry::Registry;
pub use scope::{ScenarioId, ScenarioScope};
