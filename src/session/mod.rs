//! In-memory study sessions.
//!
//! Two independent queue managers:
//! - `ReviewSession` runs every grade through the scheduler and hands back
//!   persistence-ready records
//! - `QuickReviewSession` is an ungraded self-test that never reads or writes
//!   scheduling state
//!
//! A session is owned by one caller for one sitting and dropped afterwards.

pub mod quick;
pub mod review;

use thiserror::Error;

use crate::srs::ScheduleError;

pub use quick::{QuickReviewOptions, QuickReviewOutcome, QuickReviewSession, QuickSessionStats};
pub use review::{
  PendingReview, QueueItem, QueuePhase, ReviewSession, ReviewSessionOptions, SessionStats,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
  /// submit/grade was called with nothing eligible; check completion first
  #[error("no current card in session")]
  NoCurrentCard,
  #[error("card {0} is not part of this session")]
  UnknownCard(i64),
  #[error(transparent)]
  Schedule(#[from] ScheduleError),
}

impl SessionError {
  pub fn user_message(&self) -> &'static str {
    match self {
      SessionError::NoCurrentCard => "No card to review",
      SessionError::UnknownCard(_) => "Card is not in this session",
      SessionError::Schedule(e) => e.user_message(),
    }
  }
}
