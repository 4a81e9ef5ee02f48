//! Interval hints for each grade, computed without committing anything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::duration::format_duration;
use super::params::SchedulingParameters;
use super::sm2::apply_review;
use crate::config::PREVIEW_PLACEHOLDER;
use crate::domain::{Grade, SchedulingState};

/// Formatted delay until due for every grade ("10m", "3d", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradePreview {
  pub again: String,
  pub hard: String,
  pub good: String,
  pub easy: String,
}

impl GradePreview {
  pub fn get(&self, grade: Grade) -> &str {
    match grade {
      Grade::Again => &self.again,
      Grade::Hard => &self.hard,
      Grade::Good => &self.good,
      Grade::Easy => &self.easy,
    }
  }
}

/// Preview all four grades. A grade whose computation fails shows
/// `PREVIEW_PLACEHOLDER`; the others are unaffected.
pub fn preview_all(
  state: Option<&SchedulingState>,
  params: &SchedulingParameters,
  now: DateTime<Utc>,
) -> GradePreview {
  let hint = |grade: Grade| match apply_review(state, grade, params, now) {
    Ok(outcome) => format_duration((outcome.due_at - now).num_milliseconds()),
    Err(e) => {
      tracing::warn!("Preview for {} failed: {}", grade.as_str(), e);
      PREVIEW_PLACEHOLDER.to_string()
    }
  };

  GradePreview {
    again: hint(Grade::Again),
    hard: hint(Grade::Hard),
    good: hint(Grade::Good),
    easy: hint(Grade::Easy),
  }
}
