pub mod card;
pub mod review;

pub use card::{Card, Phase, SchedulingState, StoredSchedule};
pub use review::{Grade, QuickReviewResult, ReviewEvent, ReviewMode};
