//! Diagnostics-only export of the binding table.
//!
//! The dump lists every binding with its policy and whether an instance is
//! currently cached, plus the scope state and any glue types not yet bound.
//! Entries are sorted by type name so output is stable between runs.

use serde::Serialize;

use crate::factory::ObjectFactory;

#[derive(Serialize)]
struct DumpedBinding {
    type_name: &'static str,
    policy: &'static str,
    cached: bool,
}

#[derive(Serialize)]
struct BindingDump {
    sealed: bool,
    open_scenario: Option<u64>,
    singletons: usize,
    bindings: Vec<DumpedBinding>,
    pending_glue: Vec<&'static str>,
}

pub(crate) fn dump_bindings(factory: &ObjectFactory) -> serde_json::Result<String> {
    let registry = factory.registry();
    let mut bindings: Vec<_> = registry
        .bindings()
        .iter()
        .map(|binding| DumpedBinding {
            type_name: binding.type_name(),
            policy: binding.policy().as_str(),
            cached: registry.is_cached(binding),
        })
        .collect();
    bindings.sort_by(|a, b| a.type_name.cmp(b.type_name));

    let mut pending_glue: Vec<_> = factory.pending_glue().collect();
    pending_glue.sort_unstable();

    serde_json::to_string(&BindingDump {
        sealed: registry.bindings().is_sealed(),
        open_scenario: registry.scope().current().map(crate::ScenarioId::get),
        singletons: registry.singleton_count(),
        bindings,
        pending_glue,
    })
}
