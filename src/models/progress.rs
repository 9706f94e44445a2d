use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Challenge, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Started,
    Submitted,
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Started => write!(f, "started"),
            ProgressStatus::Submitted => write!(f, "submitted"),
            ProgressStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: u64,
    pub user: UserSummary,
    pub challenge: Challenge,
    pub status: ProgressStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_earned: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

/// An achievement earned by the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub id: u64,
    pub user: UserSummary,
    pub achievement: Achievement,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub user: UserSummary,
    pub total_points: u32,
    pub challenges_completed: u32,
    pub rank: u32,
    pub updated_at: DateTime<Utc>,
}
