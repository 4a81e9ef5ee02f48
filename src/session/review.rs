//! Graded review session: a priority queue over one sitting's cards.
//!
//! Ordering, re-applied after every commit:
//! 1. completed items last
//! 2. learning/relearning, then review, then new
//! 3. earliest `scheduled_at` first
//!
//! A card graded "again" stays in the sitting and is always eligible until it
//! gets a passing grade. Any passing grade completes the card for the sitting,
//! whatever its new due time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::SessionError;
use crate::config;
use crate::domain::{Card, Grade, Phase, ReviewEvent, SchedulingState, StoredSchedule};
use crate::srs::{GradePreview, SchedulingParameters, apply_review, preview_all};

/// Queue-level phase; `New` means no scheduling state exists yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePhase {
  New,
  Learning,
  Review,
  Relearning,
}

impl QueuePhase {
  pub fn from_state(state: Option<&SchedulingState>) -> Self {
    match state.map(|s| s.phase) {
      None => Self::New,
      Some(Phase::Learning) => Self::Learning,
      Some(Phase::Review) => Self::Review,
      Some(Phase::Relearning) => Self::Relearning,
    }
  }

  /// Lower is shown first
  pub fn priority(&self) -> u8 {
    match self {
      Self::Learning | Self::Relearning => 0,
      Self::Review => 1,
      Self::New => 2,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Review => "review",
      Self::Relearning => "relearning",
    }
  }
}

#[derive(Debug, Clone)]
pub struct QueueItem {
  pub card: Card,
  pub state: Option<SchedulingState>,
  pub phase: QueuePhase,
  pub scheduled_at: DateTime<Utc>,
  pub is_completed: bool,
}

impl QueueItem {
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.scheduled_at <= now
  }
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewSessionOptions {
  /// New cards that may be introduced this sitting
  pub new_card_limit: usize,
}

impl Default for ReviewSessionOptions {
  fn default() -> Self {
    Self {
      new_card_limit: config::DEFAULT_NEW_CARD_LIMIT,
    }
  }
}

/// A computed but uncommitted grade. Persist `review_event` and `schedule`,
/// then pass this back to `move_to_next`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReview {
  pub card_id: i64,
  pub grade: Grade,
  pub review_event: ReviewEvent,
  pub schedule: StoredSchedule,
  pub is_card_completed: bool,
  pub next_due: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
  pub total: usize,
  pub completed: usize,
  pub remaining: usize,
  pub new: usize,
  pub learning: usize,
  pub review: usize,
  pub relearning: usize,
}

pub struct ReviewSession {
  items: Vec<QueueItem>,
  params: SchedulingParameters,
  options: ReviewSessionOptions,
  /// Cards graded "again" this sitting and not yet passed
  again: HashSet<i64>,
  new_cards_seen: usize,
}

impl ReviewSession {
  /// Build the queue. `schedules` holds persisted state for cards that have
  /// been graded before; cards without one are new and due at `started_at`.
  pub fn new(
    cards: Vec<Card>,
    schedules: Vec<StoredSchedule>,
    params: SchedulingParameters,
    options: ReviewSessionOptions,
    started_at: DateTime<Utc>,
  ) -> Self {
    let mut by_card: HashMap<i64, StoredSchedule> =
      schedules.into_iter().map(|s| (s.card_id, s)).collect();

    let items = cards
      .into_iter()
      .map(|card| {
        let stored = by_card.remove(&card.id);
        let scheduled_at = stored.as_ref().map_or(started_at, |s| s.due_at);
        let state = stored.map(|s| s.state);
        QueueItem {
          phase: QueuePhase::from_state(state.as_ref()),
          card,
          state,
          scheduled_at,
          is_completed: false,
        }
      })
      .collect();

    let mut session = Self {
      items,
      params,
      options,
      again: HashSet::new(),
      new_cards_seen: 0,
    };
    session.sort();

    tracing::debug!(
      total = session.items.len(),
      new_card_limit = session.options.new_card_limit,
      "review session started"
    );
    session
  }

  fn sort(&mut self) {
    self.items.sort_by(|a, b| {
      a.is_completed
        .cmp(&b.is_completed)
        .then(a.phase.priority().cmp(&b.phase.priority()))
        .then(a.scheduled_at.cmp(&b.scheduled_at))
    });
  }

  fn is_eligible(&self, item: &QueueItem, now: DateTime<Utc>) -> bool {
    if item.is_completed {
      return false;
    }
    if self.again.contains(&item.card.id) {
      return true;
    }
    if item.phase == QueuePhase::New && self.new_cards_seen >= self.options.new_card_limit {
      return false;
    }
    item.is_due(now)
  }

  fn current_index(&self, now: DateTime<Utc>) -> Option<usize> {
    self.items.iter().position(|item| self.is_eligible(item, now))
  }

  /// The card to show next, or `None` when the sitting is over
  pub fn get_current_card(&self, now: DateTime<Utc>) -> Option<&QueueItem> {
    self.current_index(now).map(|i| &self.items[i])
  }

  pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
    self.current_index(now).is_none()
  }

  /// Grade the current card. Nothing in the queue changes until the result
  /// is handed to `move_to_next`.
  pub fn submit_grade(
    &self,
    grade: Grade,
    now: DateTime<Utc>,
    time_ms: Option<i64>,
  ) -> Result<PendingReview, SessionError> {
    let idx = self.current_index(now).ok_or(SessionError::NoCurrentCard)?;
    let item = &self.items[idx];

    let outcome = apply_review(item.state.as_ref(), grade, &self.params, now)?;
    let review_event = ReviewEvent::graded(
      item.card.id,
      grade,
      item.state.as_ref().map(|s| s.phase),
      outcome.state.phase,
      outcome.state.interval_days,
      time_ms,
      now,
    );

    Ok(PendingReview {
      card_id: item.card.id,
      grade,
      review_event,
      schedule: StoredSchedule {
        card_id: item.card.id,
        state: outcome.state,
        due_at: outcome.due_at,
      },
      is_card_completed: grade != Grade::Again,
      next_due: outcome.due_at,
    })
  }

  /// Commit a pending result into its queue item and re-sort
  pub fn move_to_next(&mut self, result: PendingReview) -> Result<(), SessionError> {
    let item = self
      .items
      .iter_mut()
      .find(|item| item.card.id == result.card_id)
      .ok_or(SessionError::UnknownCard(result.card_id))?;

    let was_new = item.phase == QueuePhase::New;
    item.state = Some(result.schedule.state);
    item.phase = QueuePhase::from_state(item.state.as_ref());
    item.scheduled_at = result.next_due;

    if result.grade == Grade::Again {
      item.is_completed = false;
      self.again.insert(result.card_id);
    } else {
      item.is_completed = true;
      self.again.remove(&result.card_id);
    }

    tracing::debug!(
      card_id = result.card_id,
      grade = result.grade.as_str(),
      phase = item.phase.as_str(),
      completed = item.is_completed,
      "committed review"
    );

    if was_new {
      self.new_cards_seen += 1;
    }
    self.sort();
    Ok(())
  }

  /// Interval hints for the current card
  pub fn preview_current(&self, now: DateTime<Utc>) -> Option<GradePreview> {
    self
      .get_current_card(now)
      .map(|item| preview_all(item.state.as_ref(), &self.params, now))
  }

  pub fn stats(&self) -> SessionStats {
    let mut stats = SessionStats {
      total: self.items.len(),
      ..Default::default()
    };
    for item in &self.items {
      if item.is_completed {
        stats.completed += 1;
      }
      if !item.is_completed || self.again.contains(&item.card.id) {
        stats.remaining += 1;
      }
      match item.phase {
        QueuePhase::New => stats.new += 1,
        QueuePhase::Learning => stats.learning += 1,
        QueuePhase::Review => stats.review += 1,
        QueuePhase::Relearning => stats.relearning += 1,
      }
    }
    stats
  }

  pub fn new_cards_seen(&self) -> usize {
    self.new_cards_seen
  }

  /// Queue in current display order
  pub fn items(&self) -> &[QueueItem] {
    &self.items
  }

  pub fn params(&self) -> &SchedulingParameters {
    &self.params
  }
}
