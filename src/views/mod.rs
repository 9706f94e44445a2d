//! Client-side derivations shown by the commands
//!
//! Everything here is pure: inputs are already-fetched backend records and
//! locally stored state, outputs are what the terminal renders.

pub mod achievements;
pub mod challenges;
pub mod dashboard;
pub mod leaderboard;
pub mod timer;

pub use achievements::AchievementSummary;
pub use challenges::{ChallengeFilter, ChallengeListState, StatusFilter, PER_PAGE};
pub use dashboard::DashboardStats;
pub use leaderboard::LeaderboardRow;
