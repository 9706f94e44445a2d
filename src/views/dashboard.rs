use serde::Serialize;

use crate::models::{Challenge, LeaderboardEntry, ProgressStatus, UserId, UserProgress};

/// How many recent challenges and top users the dashboard fetches.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub completed: usize,
    /// Size of the recent-challenges sample the rate is computed over.
    pub sampled: usize,
    /// Percentage, capped at 100.
    pub completion_rate: f64,
    pub total_points: u32,
    /// `None` when the user is not among the top entries.
    pub rank: Option<u32>,
}

impl DashboardStats {
    pub fn compute(
        progress: &[UserProgress],
        recent: &[Challenge],
        top: &[LeaderboardEntry],
        user_id: Option<UserId>,
    ) -> Self {
        let completed = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .count();
        let sampled = recent.len();
        let completion_rate = if sampled == 0 {
            0.0
        } else {
            (completed as f64 / sampled as f64 * 100.0).min(100.0)
        };
        let total_points = progress.iter().map(|p| p.points_earned).sum();
        let rank = user_id.and_then(|id| {
            top.iter()
                .take(RECENT_LIMIT)
                .find(|entry| entry.user.id == id)
                .map(|entry| entry.rank)
        });

        Self {
            completed,
            sampled,
            completion_rate,
            total_points,
            rank,
        }
    }

    pub fn rank_label(&self) -> String {
        self.rank
            .map(|r| format!("#{r}"))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::challenge_json;

    fn progress(id: u64, status: &str, points: u32) -> UserProgress {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "user": {"id": 1, "username": "alice"},
            "challenge": challenge_json(id, "c", "beginner", 1),
            "status": status,
            "points_earned": points,
            "created_at": "2026-01-03T00:00:00Z",
            "updated_at": "2026-01-03T00:00:00Z"
        }))
        .unwrap()
    }

    fn entry(user_id: u64, rank: u32) -> LeaderboardEntry {
        serde_json::from_value(serde_json::json!({
            "id": rank,
            "user": {"id": user_id, "username": format!("u{user_id}")},
            "total_points": 100 - rank,
            "challenges_completed": 1,
            "rank": rank,
            "updated_at": "2026-01-03T00:00:00Z"
        }))
        .unwrap()
    }

    fn recent(n: u64) -> Vec<Challenge> {
        (1..=n)
            .map(|id| serde_json::from_value(challenge_json(id, "r", "beginner", 1)).unwrap())
            .collect()
    }

    #[test]
    fn test_counts_points_and_rate() {
        let records = vec![
            progress(1, "completed", 10),
            progress(2, "completed", 25),
            progress(3, "started", 0),
        ];
        let stats = DashboardStats::compute(&records, &recent(5), &[], Some(1));

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.total_points, 35);
        assert_eq!(stats.completion_rate, 40.0);
        assert_eq!(stats.rank_label(), "N/A");
    }

    #[test]
    fn test_rate_is_zero_without_recent_and_capped() {
        let records: Vec<_> = (1..=7).map(|id| progress(id, "completed", 1)).collect();
        assert_eq!(DashboardStats::compute(&records, &[], &[], None).completion_rate, 0.0);
        assert_eq!(DashboardStats::compute(&records, &recent(5), &[], None).completion_rate, 100.0);
    }

    #[test]
    fn test_rank_only_from_top_entries() {
        let top: Vec<_> = (1..=8).map(|rank| entry(rank as u64 + 10, rank)).collect();

        let stats = DashboardStats::compute(&[], &[], &top, Some(13));
        assert_eq!(stats.rank, Some(3));
        assert_eq!(stats.rank_label(), "#3");

        let stats = DashboardStats::compute(&[], &[], &top, Some(17));
        assert_eq!(stats.rank, None);
    }
}
