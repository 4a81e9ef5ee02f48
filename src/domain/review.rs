use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Phase;

/// Recall quality for a graded review, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
  Again = 1,
  Hard = 2,
  Good = 3,
  Easy = 4,
}

impl Grade {
  pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

  pub fn from_u8(value: u8) -> Option<Self> {
    match value {
      1 => Some(Self::Again),
      2 => Some(Self::Hard),
      3 => Some(Self::Good),
      4 => Some(Self::Easy),
      _ => None,
    }
  }

  pub fn as_u8(&self) -> u8 {
    *self as u8
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "again" => Some(Self::Again),
      "hard" => Some(Self::Hard),
      "good" => Some(Self::Good),
      "easy" => Some(Self::Easy),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Again => "again",
      Self::Hard => "hard",
      Self::Good => "good",
      Self::Easy => "easy",
    }
  }

  pub fn is_correct(&self) -> bool {
    !matches!(self, Self::Again)
  }
}

/// Outcome of an ungraded self-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickReviewResult {
  Forgot,
  Remembered,
}

impl QuickReviewResult {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Forgot => "forgot",
      Self::Remembered => "remembered",
    }
  }

  /// Grade recorded in the review log for this result
  pub fn as_grade(&self) -> Grade {
    match self {
      Self::Forgot => Grade::Again,
      Self::Remembered => Grade::Good,
    }
  }
}

/// Which kind of session produced a review event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
  Review,
  QuickReview,
}

impl ReviewMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Review => "review",
      Self::QuickReview => "quick_review",
    }
  }
}

/// Review log entry emitted by sessions. The caller decides whether and where
/// to persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
  pub card_id: i64,
  /// 1 = again .. 4 = easy
  pub grade: u8,
  pub time_ms: Option<i64>,
  pub raw_payload: serde_json::Value,
  pub reviewed_at: DateTime<Utc>,
}

impl ReviewEvent {
  /// Event for a graded review that moved the card between phases
  pub fn graded(
    card_id: i64,
    grade: Grade,
    phase_before: Option<Phase>,
    phase_after: Phase,
    interval_days: f64,
    time_ms: Option<i64>,
    reviewed_at: DateTime<Utc>,
  ) -> Self {
    Self {
      card_id,
      grade: grade.as_u8(),
      time_ms,
      raw_payload: json!({
        "mode": ReviewMode::Review.as_str(),
        "phase_before": phase_before.map(|p| p.as_str()).unwrap_or("new"),
        "phase_after": phase_after.as_str(),
        "interval_days": interval_days,
      }),
      reviewed_at,
    }
  }

  /// Event for a quick review; carries no scheduling data
  pub fn quick(
    card_id: i64,
    result: QuickReviewResult,
    time_ms: Option<i64>,
    reviewed_at: DateTime<Utc>,
  ) -> Self {
    Self {
      card_id,
      grade: result.as_grade().as_u8(),
      time_ms,
      raw_payload: json!({
        "mode": ReviewMode::QuickReview.as_str(),
        "result": result.as_str(),
      }),
      reviewed_at,
    }
  }

  pub fn mode(&self) -> Option<ReviewMode> {
    match self.raw_payload.get("mode").and_then(|m| m.as_str()) {
      Some("review") => Some(ReviewMode::Review),
      Some("quick_review") => Some(ReviewMode::QuickReview),
      _ => None,
    }
  }
}
