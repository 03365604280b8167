//! Configuration types for the devscript runtime.
//!
//! `EngineConfig` is a plain builder; `EngineConfig::from_env` layers the
//! `DEVSCRIPT_*` environment variables over the defaults.

use rhai::OptimizationLevel;

/// Environment variable naming the module that exposes `iointr`.
pub const ENV_MODULE: &str = "DEVSCRIPT_MODULE";
/// Environment variable selecting the optimizer: 1 none, 2 simple, 3 full.
pub const ENV_OPTIMIZE: &str = "DEVSCRIPT_OPTIMIZE";
/// Environment variable enabling diagnostics for convenience execution.
pub const ENV_DEBUG: &str = "DEVSCRIPT_DEBUG";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Module name under which the parameter exchange function is reachable
    /// as `<module_name>::iointr`.
    /// Default: "dev"
    pub module_name: String,

    /// Rhai optimization level applied when compiling fragments.
    /// Default: Simple
    pub optimization: OptimizationLevel,

    /// Debug flag used by the process-wide `exec`.
    /// Default: false
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module_name: "dev".to_string(),
            optimization: OptimizationLevel::Simple,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from `DEVSCRIPT_*` environment variables.
    ///
    /// Unset or invalid variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let module_name = std::env::var(ENV_MODULE)
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.module_name);
        let optimization = match env_config(ENV_OPTIMIZE, 2) {
            1 => OptimizationLevel::None,
            3 => OptimizationLevel::Full,
            _ => defaults.optimization,
        };
        let debug = env_config(ENV_DEBUG, 0) > 0;

        Self {
            module_name,
            optimization,
            debug,
        }
    }

    /// Set the module name.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Set the optimization level.
    pub fn optimization(mut self, level: OptimizationLevel) -> Self {
        self.optimization = level;
        self
    }

    /// Enable or disable diagnostics.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

/// Read a positive integer configuration value from the environment.
///
/// Returns `default` when the variable is unset, does not parse, or is not
/// positive.
pub fn env_config(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.module_name, "dev");
        assert_eq!(config.optimization, OptimizationLevel::Simple);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .module_name("pv")
            .optimization(OptimizationLevel::Full)
            .debug(true);

        assert_eq!(config.module_name, "pv");
        assert_eq!(config.optimization, OptimizationLevel::Full);
        assert!(config.debug);
    }

    #[test]
    fn test_env_config_fallbacks() {
        assert_eq!(env_config("DEVSCRIPT_TEST_UNSET_VARIABLE", 7), 7);
    }
}
