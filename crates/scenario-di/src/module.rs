//! Binding modules and link-time module discovery.
//!
//! A [`BindingModule`] groups related bindings so they can be installed in
//! one call. Modules registered with [`binding_module!`](crate::binding_module)
//! are collected through `inventory` and can be selected by name, which is
//! how [`ObjectFactory::from_config`](crate::ObjectFactory::from_config)
//! locates the module named in configuration.

use inventory::iter;

use crate::binding::BindingTable;
use crate::error::ScopeError;

/// A reusable group of bindings.
///
/// Closures taking `&mut BindingTable` implement this trait, so ad hoc modules
/// need no named type.
///
/// # Examples
///
/// ```
/// use scenario_di::{BindingModule, BindingTable, Policy, ScopeError};
///
/// struct Ledger;
///
/// let module = |table: &mut BindingTable| table.bind::<Ledger>(Policy::Singleton, || Ledger);
/// let mut table = BindingTable::new();
/// module.configure(&mut table)?;
/// assert!(table.contains::<Ledger>());
/// # Ok::<(), ScopeError>(())
/// ```
pub trait BindingModule {
    /// Adds this module's bindings to `table`.
    ///
    /// # Errors
    ///
    /// Propagates registration failures such as duplicate bindings.
    fn configure(&self, table: &mut BindingTable) -> Result<(), ScopeError>;
}

impl<F> BindingModule for F
where
    F: Fn(&mut BindingTable) -> Result<(), ScopeError>,
{
    fn configure(&self, table: &mut BindingTable) -> Result<(), ScopeError> {
        self(table)
    }
}

/// A named module submitted to the process-wide collection.
///
/// Use [`binding_module!`](crate::binding_module) rather than constructing
/// this directly, so the source location is captured.
#[derive(Debug)]
pub struct RegisteredModule {
    /// Name used to select the module from configuration.
    pub name: &'static str,
    /// Function adding the module's bindings.
    pub configure: fn(&mut BindingTable) -> Result<(), ScopeError>,
    /// Source file where the module was registered.
    pub file: &'static str,
    /// Line number within the source file.
    pub line: u32,
}

impl BindingModule for RegisteredModule {
    fn configure(&self, table: &mut BindingTable) -> Result<(), ScopeError> {
        (self.configure)(table)
    }
}

inventory::collect!(RegisteredModule);

/// Register a named binding module with the process-wide collection.
///
/// # Examples
///
/// ```
/// use scenario_di::{BindingTable, Policy, ScopeError, binding_module, find_module};
///
/// struct Clock;
///
/// fn clock_module(table: &mut BindingTable) -> Result<(), ScopeError> {
///     table.bind::<Clock>(Policy::Singleton, || Clock)
/// }
///
/// binding_module!("clock", clock_module);
///
/// assert!(find_module("clock").is_some());
/// ```
#[macro_export]
macro_rules! binding_module {
    ($name:expr, $configure:path $(,)?) => {
        const _: () = {
            $crate::submit! {
                $crate::RegisteredModule {
                    name: $name,
                    configure: $configure,
                    file: file!(),
                    line: line!(),
                }
            }
        };
    };
}

/// Return every registered module, ordered by name.
#[must_use]
pub fn registered_modules() -> Vec<&'static RegisteredModule> {
    let mut modules: Vec<_> = iter::<RegisteredModule>.into_iter().collect();
    modules.sort_by(|a, b| a.name.cmp(b.name).then_with(|| a.file.cmp(b.file)));
    modules
}

/// Find the module registered under `name`.
///
/// When several modules share a name the one that sorts first by source file
/// wins and a warning is logged.
#[must_use]
pub fn find_module(name: &str) -> Option<&'static RegisteredModule> {
    let mut matching = registered_modules()
        .into_iter()
        .filter(|module| module.name == name);
    let found = matching.next()?;
    for shadowed in matching {
        log::warn!(
            "binding module '{name}' at {}:{} is shadowed by {}:{}",
            shadowed.file,
            shadowed.line,
            found.file,
            found.line
        );
    }
    Some(found)
}
