//! Wire types shared by the service facades and views

mod challenge;
mod page;
mod progress;
mod user;

pub use challenge::{
    Category, Challenge, ChallengeId, Difficulty, Submission, SubmissionStatus,
};
pub use page::Page;
pub use progress::{Achievement, LeaderboardEntry, ProgressStatus, UserAchievement, UserProgress};
pub use user::{
    AuthResponse, LoginRequest, ProfileFieldsUpdate, ProfileUpdate, RegisterRequest,
    RefreshResponse, User, UserId, UserProfile, UserSummary,
};
