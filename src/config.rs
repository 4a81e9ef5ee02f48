//! Scheduler defaults and parameter file loading.
//!
//! Every default the scheduler and sessions use lives here as a named
//! constant; `SchedulingParameters::default()` is built from them.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::srs::SchedulingParameters;

// ==================== Learning Steps ====================

/// Learning steps for a card that has never graduated: 1 day → 2 days
pub const DEFAULT_LEARNING_STEPS: &[&str] = &["1d", "2d"];

/// Relearning steps after a lapse
pub const DEFAULT_RELEARNING_STEPS: &[&str] = &["10m"];

/// Graduation interval when a learning card is graded "easy"
pub const DEFAULT_EASY_INTERVAL: &str = "4d";

/// Delay before a lapsed card comes back
pub const DEFAULT_FORGOT_INTERVAL: &str = "10m";

/// Upper bound on any interval (100 years)
pub const DEFAULT_MAX_INTERVAL: &str = "36500d";

// ==================== Ease & Multipliers ====================

pub const DEFAULT_STARTING_EASE: f64 = 2.5;

/// Ease never drops below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Extra interval multiplier for "easy" in review
pub const DEFAULT_EASY_BONUS: f64 = 1.3;

pub const DEFAULT_INTERVAL_MULTIPLIER: f64 = 1.0;

/// Share of the old interval kept after a lapse (result is at least 1 day)
pub const DEFAULT_LAPSE_INTERVAL_MULTIPLIER: f64 = 0.5;

pub const EASY_EASE_BONUS: f64 = 0.15;
pub const AGAIN_EASE_PENALTY: f64 = 0.2;
pub const HARD_EASE_PENALTY: f64 = 0.15;
pub const HARD_INTERVAL_FACTOR: f64 = 1.2;

// ==================== Session Configuration ====================

/// New cards introduced per review session
pub const DEFAULT_NEW_CARD_LIMIT: usize = 20;

/// Placeholder shown when one grade's preview cannot be computed
pub const PREVIEW_PLACEHOLDER: &str = "?";

// ==================== Parameter Files ====================

/// Parameters file looked up in the working directory
pub const PARAMS_FILE: &str = "recall.toml";

/// Env var naming an alternative parameters file (TOML or JSON)
pub const PARAMS_ENV_VAR: &str = "RECALL_PARAMS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("Invalid scheduling parameters: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "Failed to read parameters file",
            ConfigError::Parse { .. } => "Failed to parse parameters file",
            ConfigError::Invalid(_) => "Scheduling parameters are invalid",
        }
    }
}

/// Load parameters with priority: recall.toml > .env/RECALL_PARAMS > default
pub fn load_parameters() -> Result<SchedulingParameters, ConfigError> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let env_path = std::env::var(PARAMS_ENV_VAR).ok().map(PathBuf::from);
    resolve_parameters(Path::new("."), env_path.as_deref())
}

/// Resolve parameters from `dir/recall.toml`, then `env_path`, then defaults.
///
/// A file that exists but does not parse or validate is an error, never a
/// silent fallback.
pub fn resolve_parameters(
    dir: &Path,
    env_path: Option<&Path>,
) -> Result<SchedulingParameters, ConfigError> {
    // Priority 1: recall.toml
    let local = dir.join(PARAMS_FILE);
    if local.exists() {
        tracing::info!("Using scheduling parameters from {}", local.display());
        return parameters_from_file(&local);
    }

    // Priority 2: RECALL_PARAMS
    if let Some(path) = env_path {
        tracing::info!(
            "Using scheduling parameters from {} env: {}",
            PARAMS_ENV_VAR,
            path.display()
        );
        return parameters_from_file(path);
    }

    tracing::info!("Using default scheduling parameters");
    Ok(SchedulingParameters::default())
}

/// Read a parameters file; `.json` is parsed as JSON, anything else as TOML
pub fn parameters_from_file(path: &Path) -> Result<SchedulingParameters, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let params: SchedulingParameters = if is_json {
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    } else {
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    };

    params.validate()?;
    Ok(params)
}

/// Parse and validate a TOML parameters record
pub fn parameters_from_toml(contents: &str) -> Result<SchedulingParameters, ConfigError> {
    let params: SchedulingParameters = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: "<inline>".to_string(),
        message: e.to_string(),
    })?;
    params.validate()?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::DurationSpec;
    use tempfile::TempDir;

    #[test]
    fn test_parameters_from_toml_partial() {
        let params = parameters_from_toml(
            r#"
            learning_steps = ["1m", "10m"]
            interval_multiplier = 0.8

            [adjustments]
            hard_interval_factor = 1.1
            "#,
        )
        .unwrap();

        assert_eq!(
            params.learning_steps,
            vec![DurationSpec::from("1m"), DurationSpec::from("10m")]
        );
        assert!((params.interval_multiplier - 0.8).abs() < f64::EPSILON);
        assert!((params.adjustments.hard_interval_factor - 1.1).abs() < f64::EPSILON);
        assert!((params.starting_ease - DEFAULT_STARTING_EASE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parameters_from_toml_numeric_days() {
        let params = parameters_from_toml("easy_interval = 3").unwrap();
        assert_eq!(params.easy_interval, DurationSpec::Days(3.0));
    }

    #[test]
    fn test_parameters_from_toml_invalid() {
        let err = parameters_from_toml(r#"learning_steps = ["1x"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert_eq!(err.user_message(), "Scheduling parameters are invalid");
    }

    #[test]
    fn test_parameters_from_toml_syntax_error() {
        let err = parameters_from_toml("learning_steps = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_resolve_defaults_when_nothing_configured() {
        let temp = TempDir::new().unwrap();
        let params = resolve_parameters(temp.path(), None).unwrap();
        assert_eq!(params, SchedulingParameters::default());
    }

    #[test]
    fn test_resolve_prefers_local_file_over_env() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(PARAMS_FILE), "starting_ease = 2.0").unwrap();
        let env_file = temp.path().join("other.json");
        std::fs::write(&env_file, r#"{ "starting_ease": 3.0 }"#).unwrap();

        let params = resolve_parameters(temp.path(), Some(&env_file)).unwrap();
        assert!((params.starting_ease - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_env_json_file() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("params.json");
        std::fs::write(&env_file, r#"{ "minimum_ease": 1.5 }"#).unwrap();

        let params = resolve_parameters(temp.path(), Some(&env_file)).unwrap();
        assert!((params.minimum_ease - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_missing_env_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let err = resolve_parameters(temp.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
