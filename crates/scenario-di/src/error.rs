//! Error types surfaced by the scoped instance registry.
//!
//! Every failure here reflects a configuration gap or a lifecycle misuse, so
//! none of them are retried. Factory failures are carried through untouched.

use thiserror::Error;

use crate::scope::ScenarioId;

/// Boxed error produced by a fallible factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can arise while registering bindings, managing the scenario
/// scope, or resolving instances.
///
/// # Examples
///
/// ```
/// use scenario_di::ScopeError;
///
/// let error = ScopeError::NotOpen;
/// assert_eq!(error.to_string(), "no scenario is open");
/// assert!(error.is_lifecycle());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScopeError {
    /// Raised when a type is registered twice.
    #[error("type '{type_name}' is already bound")]
    DuplicateBinding {
        /// Name of the type that was already bound.
        type_name: &'static str,
    },
    /// Raised when a binding is added after the first scenario started.
    #[error("cannot bind '{type_name}': bindings are sealed once a scenario has started")]
    BindingTableSealed {
        /// Name of the type whose registration was rejected.
        type_name: &'static str,
    },
    /// Raised when resolving a type that has no binding.
    #[error("no binding registered for type '{type_name}'")]
    UnboundType {
        /// Name of the requested type.
        type_name: &'static str,
    },
    /// Raised when resolving while no scenario is open.
    #[error("cannot resolve '{type_name}': no scenario is open, call start() first")]
    ScopeNotOpen {
        /// Name of the requested type.
        type_name: &'static str,
    },
    /// Raised when a scenario is started while another is still open.
    #[error("{scenario} is still open, call stop() before starting another")]
    AlreadyOpen {
        /// Identifier of the scenario that is still open.
        scenario: ScenarioId,
    },
    /// Raised when stopping with no open scenario.
    #[error("no scenario is open")]
    NotOpen,
    /// Raised when configuration names a binding module that was never
    /// registered.
    #[error("no binding module named '{name}' has been registered")]
    UnknownModule {
        /// The configured module name.
        name: String,
    },
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A factory failed to produce an instance.
    #[error(transparent)]
    Factory(BoxError),
}

impl ScopeError {
    /// Returns `true` for start/stop sequencing errors.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::ScopeNotOpen { .. } | Self::AlreadyOpen { .. } | Self::NotOpen
        )
    }

    /// Returns the type name the error refers to, when there is one.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateBinding { type_name }
            | Self::BindingTableSealed { type_name }
            | Self::UnboundType { type_name }
            | Self::ScopeNotOpen { type_name } => Some(type_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("database unreachable")]
    struct Unreachable;

    #[test]
    fn duplicate_binding_displays_type() {
        let error = ScopeError::DuplicateBinding { type_name: "Widget" };
        assert_eq!(error.to_string(), "type 'Widget' is already bound");
        assert_eq!(error.type_name(), Some("Widget"));
        assert!(!error.is_lifecycle());
    }

    #[test]
    fn already_open_mentions_scenario() {
        let error = ScopeError::AlreadyOpen {
            scenario: ScenarioId::from(3),
        };
        assert_eq!(
            error.to_string(),
            "scenario #3 is still open, call stop() before starting another"
        );
        assert!(error.is_lifecycle());
        assert_eq!(error.type_name(), None);
    }

    #[test]
    fn factory_error_is_transparent() {
        let error = ScopeError::Factory(Box::new(Unreachable));
        assert_eq!(error.to_string(), "database unreachable");
        assert!(error.source().is_none());
        let ScopeError::Factory(inner) = error else {
            panic!("expected factory variant");
        };
        assert!(inner.downcast_ref::<Unreachable>().is_some());
    }
}
