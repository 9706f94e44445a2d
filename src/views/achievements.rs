use serde::Serialize;

use crate::models::UserAchievement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementSummary {
    pub earned: usize,
    /// Size of the full catalog, when known.
    pub total: Option<usize>,
    pub points: u32,
}

impl AchievementSummary {
    pub fn compute(earned: &[UserAchievement], total: Option<usize>) -> Self {
        Self {
            earned: earned.len(),
            total,
            points: earned.iter().map(|ua| ua.achievement.points).sum(),
        }
    }

    /// Earned share of the catalog in percent; 0 when the catalog is empty or unknown.
    pub fn percentage(&self) -> f64 {
        match self.total {
            Some(total) if total > 0 => self.earned as f64 / total as f64 * 100.0,
            _ => 0.0,
        }
    }
}
