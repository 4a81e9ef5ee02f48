use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flashcard as the scheduler sees it. Content is opaque; only the id matters
/// for scheduling, the rest is carried through for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub id: i64,
  pub front: String,
  pub back: String,
  /// Pack the card belongs to, if any
  pub pack_id: Option<String>,
}

impl Card {
  pub fn new(id: i64, front: impl Into<String>, back: impl Into<String>) -> Self {
    Self {
      id,
      front: front.into(),
      back: back.into(),
      pack_id: None,
    }
  }

  pub fn with_pack(mut self, pack_id: impl Into<String>) -> Self {
    self.pack_id = Some(pack_id.into());
    self
  }
}

/// Scheduling phase of a card that has been graded at least once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Learning,
  Review,
  Relearning,
}

impl Phase {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "learning" => Some(Self::Learning),
      "review" => Some(Self::Review),
      "relearning" => Some(Self::Relearning),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Learning => "learning",
      Self::Review => "review",
      Self::Relearning => "relearning",
    }
  }

  /// True while the card is walking a step list (learning or relearning)
  pub fn is_stepping(&self) -> bool {
    matches!(self, Self::Learning | Self::Relearning)
  }
}

/// Per-card scheduling state for one learner.
///
/// Created on the first grade for a card and replaced by a fresh value on every
/// later grade. Interval values are in days and may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
  pub phase: Phase,
  pub ease: f64,
  pub interval_days: f64,
  pub repetitions: u32,
  pub lapses: u32,
  pub step_index: usize,
  /// Interval to graduate into once relearning finishes
  #[serde(default)]
  pub pending_interval_days: Option<f64>,
  #[serde(default)]
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub updated_at: DateTime<Utc>,
}

impl SchedulingState {
  /// Fresh state for a card that has never been graded
  pub fn new(starting_ease: f64, now: DateTime<Utc>) -> Self {
    Self {
      phase: Phase::Learning,
      ease: starting_ease,
      interval_days: 0.0,
      repetitions: 0,
      lapses: 0,
      step_index: 0,
      pending_interval_days: None,
      last_reviewed_at: None,
      updated_at: now,
    }
  }
}

/// Scheduling state record as exchanged with persistence.
///
/// Owner/profile identifiers are attached by the caller, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchedule {
  pub card_id: i64,
  pub state: SchedulingState,
  pub due_at: DateTime<Utc>,
}

impl StoredSchedule {
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.due_at <= now
  }
}
