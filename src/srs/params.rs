//! Per-learner scheduling parameters.
//!
//! Every field has a default from `config`, so a partial record only overrides
//! what it names.

use serde::{Deserialize, Serialize};

use super::duration::DurationSpec;
use crate::config::{self, ConfigError};

/// Ease and interval adjustments applied by individual grades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaseAdjustments {
  /// Added to ease on "easy"
  pub easy_ease_bonus: f64,
  /// Subtracted from ease on a lapse
  pub again_ease_penalty: f64,
  /// Subtracted from ease on "hard" in review
  pub hard_ease_penalty: f64,
  /// Interval growth factor for "hard" in review
  pub hard_interval_factor: f64,
}

impl Default for EaseAdjustments {
  fn default() -> Self {
    Self {
      easy_ease_bonus: config::EASY_EASE_BONUS,
      again_ease_penalty: config::AGAIN_EASE_PENALTY,
      hard_ease_penalty: config::HARD_EASE_PENALTY,
      hard_interval_factor: config::HARD_INTERVAL_FACTOR,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingParameters {
  pub learning_steps: Vec<DurationSpec>,
  pub relearning_steps: Vec<DurationSpec>,
  /// Graduation interval when a learning card is graded "easy"
  pub easy_interval: DurationSpec,
  pub starting_ease: f64,
  pub easy_bonus: f64,
  pub interval_multiplier: f64,
  pub max_interval: DurationSpec,
  /// Delay before a lapsed card is shown again
  pub forgot_interval: DurationSpec,
  pub lapse_interval_multiplier: f64,
  pub minimum_ease: f64,
  pub adjustments: EaseAdjustments,
}

impl Default for SchedulingParameters {
  fn default() -> Self {
    Self {
      learning_steps: specs(config::DEFAULT_LEARNING_STEPS),
      relearning_steps: specs(config::DEFAULT_RELEARNING_STEPS),
      easy_interval: config::DEFAULT_EASY_INTERVAL.into(),
      starting_ease: config::DEFAULT_STARTING_EASE,
      easy_bonus: config::DEFAULT_EASY_BONUS,
      interval_multiplier: config::DEFAULT_INTERVAL_MULTIPLIER,
      max_interval: config::DEFAULT_MAX_INTERVAL.into(),
      forgot_interval: config::DEFAULT_FORGOT_INTERVAL.into(),
      lapse_interval_multiplier: config::DEFAULT_LAPSE_INTERVAL_MULTIPLIER,
      minimum_ease: config::MIN_EASE_FACTOR,
      adjustments: EaseAdjustments::default(),
    }
  }
}

fn specs(steps: &[&str]) -> Vec<DurationSpec> {
  steps.iter().map(|s| DurationSpec::from(*s)).collect()
}

impl SchedulingParameters {
  /// Check the record before it is used for a session.
  ///
  /// The scheduler re-parses durations on every call and still fails on a
  /// bad one; this catches it up front with a field name attached.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.learning_steps.is_empty() {
      return Err(ConfigError::Invalid("learning_steps must not be empty".into()));
    }

    let named_steps = self
      .learning_steps
      .iter()
      .map(|s| ("learning_steps", s))
      .chain(self.relearning_steps.iter().map(|s| ("relearning_steps", s)));
    let named_intervals = [
      ("easy_interval", &self.easy_interval),
      ("max_interval", &self.max_interval),
      ("forgot_interval", &self.forgot_interval),
    ];

    for (field, spec) in named_steps.chain(named_intervals) {
      let ms = spec
        .to_ms()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", field, e)))?;
      if ms < 0 {
        return Err(ConfigError::Invalid(format!(
          "{}: '{}' is negative",
          field, spec
        )));
      }
    }

    let factors = [
      ("starting_ease", self.starting_ease),
      ("easy_bonus", self.easy_bonus),
      ("interval_multiplier", self.interval_multiplier),
      ("lapse_interval_multiplier", self.lapse_interval_multiplier),
      ("minimum_ease", self.minimum_ease),
      ("easy_ease_bonus", self.adjustments.easy_ease_bonus),
      ("again_ease_penalty", self.adjustments.again_ease_penalty),
      ("hard_ease_penalty", self.adjustments.hard_ease_penalty),
      ("hard_interval_factor", self.adjustments.hard_interval_factor),
    ];
    for (field, value) in factors {
      if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid(format!(
          "{} must be a finite non-negative number, got {}",
          field, value
        )));
      }
    }

    if self.minimum_ease > self.starting_ease {
      return Err(ConfigError::Invalid(format!(
        "minimum_ease ({}) exceeds starting_ease ({})",
        self.minimum_ease, self.starting_ease
      )));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    let params = SchedulingParameters::default();
    assert!(params.validate().is_ok());
    assert_eq!(params.learning_steps, vec![DurationSpec::from("1d"), DurationSpec::from("2d")]);
    assert!((params.starting_ease - 2.5).abs() < f64::EPSILON);
    assert!((params.minimum_ease - 1.3).abs() < f64::EPSILON);
  }

  #[test]
  fn test_partial_record_keeps_defaults() {
    let json = r#"{ "starting_ease": 2.2, "learning_steps": ["10m", 1] }"#;
    let params: SchedulingParameters = serde_json::from_str(json).unwrap();

    assert!((params.starting_ease - 2.2).abs() < f64::EPSILON);
    assert_eq!(
      params.learning_steps,
      vec![DurationSpec::from("10m"), DurationSpec::Days(1.0)]
    );
    assert_eq!(params.forgot_interval, DurationSpec::from(config::DEFAULT_FORGOT_INTERVAL));
    assert_eq!(params.adjustments, EaseAdjustments::default());
  }

  #[test]
  fn test_nested_adjustment_override() {
    let json = r#"{ "adjustments": { "again_ease_penalty": 0.3 } }"#;
    let params: SchedulingParameters = serde_json::from_str(json).unwrap();

    assert!((params.adjustments.again_ease_penalty - 0.3).abs() < f64::EPSILON);
    assert!((params.adjustments.easy_ease_bonus - config::EASY_EASE_BONUS).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_rejects_empty_learning_steps() {
    let params = SchedulingParameters {
      learning_steps: vec![],
      ..Default::default()
    };
    assert!(matches!(params.validate(), Err(ConfigError::Invalid(_))));
  }

  #[test]
  fn test_validate_rejects_bad_duration() {
    let params = SchedulingParameters {
      forgot_interval: DurationSpec::from("ten minutes"),
      ..Default::default()
    };
    let err = params.validate().unwrap_err();
    assert!(err.to_string().contains("forgot_interval"));
  }

  #[test]
  fn test_validate_rejects_negative_duration() {
    let params = SchedulingParameters {
      relearning_steps: vec![DurationSpec::from("-10m")],
      ..Default::default()
    };
    let err = params.validate().unwrap_err();
    assert!(err.to_string().contains("relearning_steps"));
  }

  #[test]
  fn test_validate_rejects_min_ease_above_starting() {
    let params = SchedulingParameters {
      minimum_ease: 3.0,
      ..Default::default()
    };
    assert!(params.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_nan_multiplier() {
    let params = SchedulingParameters {
      interval_multiplier: f64::NAN,
      ..Default::default()
    };
    assert!(params.validate().is_err());
  }
}
