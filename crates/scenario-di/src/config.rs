//! Factory configuration parsed from environment variables.
//!
//! Settings can be overridden with variables prefixed `SCENARIO_DI_`:
//!
//! - `SCENARIO_DI_MODULE`: name of a registered binding module to install.
//! - `SCENARIO_DI_LOG_RESOLUTIONS`: trace every resolution when truthy.

use std::env;

use crate::error::ScopeError;

/// Environment variable naming the binding module to install.
pub const MODULE_ENV: &str = "SCENARIO_DI_MODULE";

/// Environment variable toggling per-resolution trace logging.
pub const LOG_RESOLUTIONS_ENV: &str = "SCENARIO_DI_LOG_RESOLUTIONS";

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

/// Configuration for an [`ObjectFactory`](crate::ObjectFactory).
///
/// # Examples
///
/// ```
/// use scenario_di::FactoryConfig;
///
/// let config = FactoryConfig::default()
///     .with_module("checkout")
///     .with_log_resolutions(true);
/// assert_eq!(config.module.as_deref(), Some("checkout"));
/// assert!(config.log_resolutions);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Registered binding module to install, if any.
    pub module: Option<String>,
    /// Whether each resolution is logged at trace level.
    pub log_resolutions: bool,
}

impl FactoryConfig {
    /// Load configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; a blank module name counts as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::InvalidConfig`] if `SCENARIO_DI_LOG_RESOLUTIONS`
    /// is not a recognised boolean.
    pub fn from_env() -> Result<Self, ScopeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScopeError> {
        let module = lookup(MODULE_ENV)
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        let log_resolutions = lookup(LOG_RESOLUTIONS_ENV)
            .map(|val| {
                parse_env_bool(&val).ok_or_else(|| {
                    ScopeError::InvalidConfig(format!(
                        "invalid {LOG_RESOLUTIONS_ENV} value '{val}', expected a boolean"
                    ))
                })
            })
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            module,
            log_resolutions,
        })
    }

    /// Apply optional overrides, for callers that take precedence over the
    /// environment.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        module: Option<String>,
        log_resolutions: Option<bool>,
    ) -> Self {
        if let Some(name) = module {
            self.module = Some(name);
        }

        if let Some(enabled) = log_resolutions {
            self.log_resolutions = enabled;
        }

        self
    }

    /// Select the binding module to install.
    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.module = Some(name.into());
        self
    }

    /// Toggle per-resolution trace logging.
    #[must_use]
    pub fn with_log_resolutions(mut self, enabled: bool) -> Self {
        self.log_resolutions = enabled;
        self
    }
}
