//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{FabricConfig, IndexConfig, RouterConfig};
use std::path::Path;

/// The configuration file name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "fabric.toml";

/// Loads and validates `fabric.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<FabricConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `fabric.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<FabricConfig, ConfigError> {
    let config: FabricConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_index(&config.index)?;
    validate_router(&config.router)?;
    Ok(config)
}

fn validate_index(index: &IndexConfig) -> Result<(), ConfigError> {
    if index.initial_capacity < 0 {
        return Err(ConfigError::ValidationError(format!(
            "index.initial_capacity must not be negative (got {})",
            index.initial_capacity
        )));
    }
    // NaN fails both comparisons.
    if !(index.load_factor > 0.0 && index.load_factor < 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "index.load_factor must be between 0 and 1 exclusive (got {})",
            index.load_factor
        )));
    }
    Ok(())
}

fn validate_router(router: &RouterConfig) -> Result<(), ConfigError> {
    if router.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "router.max_iterations must be at least 1".to_string(),
        ));
    }
    if router.wire_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "router.wire_capacity must be at least 1".to_string(),
        ));
    }
    for (name, value) in [
        ("base_cost", router.base_cost),
        ("present_factor", router.present_factor),
        ("history_factor", router.history_factor),
    ] {
        if value < 0 {
            return Err(ConfigError::ValidationError(format!(
                "router.{name} must not be negative (got {value})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, FabricConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[index]
initial_capacity = 64
load_factor = 0.75

[router]
max_iterations = 30
base_cost = 2
present_factor = 4
history_factor = 3
wire_capacity = 2
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.index.initial_capacity, 64);
        assert_eq!(config.index.load_factor, 0.75);
        assert_eq!(config.router.max_iterations, 30);
        assert_eq!(config.router.base_cost, 2);
        assert_eq!(config.router.present_factor, 4);
        assert_eq!(config.router.history_factor, 3);
        assert_eq!(config.router.wire_capacity, 2);
    }

    #[test]
    fn negative_capacity_errors() {
        let err = load_config_from_str("[index]\ninitial_capacity = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_factor_out_of_range_errors() {
        for lf in ["0.0", "1.0", "1.5", "-0.2"] {
            let toml = format!("[index]\nload_factor = {lf}\n");
            let err = load_config_from_str(&toml).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "{lf}");
        }
    }

    #[test]
    fn zero_iterations_errors() {
        let err = load_config_from_str("[router]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn negative_factor_errors() {
        let err = load_config_from_str("[router]\nhistory_factor = -2\n").unwrap_err();
        assert!(format!("{err}").contains("router.history_factor"));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[router]\nmax_iterations = 5\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.router.max_iterations, 5);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
