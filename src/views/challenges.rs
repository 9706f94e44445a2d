//! Challenge list filtering and pagination, and the detail view helpers

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::models::{Challenge, ChallengeId, Difficulty, ProgressStatus, Submission, UserProgress};

/// Challenges per list page.
pub const PER_PAGE: usize = 6;

/// Filter on the current user's progress for each challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    /// Progress record exists with status `started`.
    InProgress,
    /// No progress record at all.
    NotStarted,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "in-progress" | "in_progress" => Ok(StatusFilter::InProgress),
            "not-started" | "not_started" => Ok(StatusFilter::NotStarted),
            other => Err(format!(
                "unknown status filter: {other} (expected all, completed, in-progress, not-started)"
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::InProgress => "in-progress",
            StatusFilter::NotStarted => "not-started",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallengeFilter {
    pub search: String,
    pub difficulty: Option<Difficulty>,
    pub category: Option<u64>,
    pub status: StatusFilter,
}

impl ChallengeFilter {
    pub fn matches(&self, challenge: &Challenge, progress: Option<&UserProgress>) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !challenge.title.to_lowercase().contains(&needle)
            && !challenge.description.to_lowercase().contains(&needle)
        {
            return false;
        }
        if self.difficulty.is_some_and(|d| d != challenge.difficulty) {
            return false;
        }
        if self.category.is_some_and(|c| c != challenge.category.id) {
            return false;
        }
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => progress.is_some_and(|p| p.status == ProgressStatus::Completed),
            StatusFilter::InProgress => progress.is_some_and(|p| p.status == ProgressStatus::Started),
            StatusFilter::NotStarted => progress.is_none(),
        }
    }

    /// Challenges passing the filter, in input order.
    pub fn apply<'a>(&self, challenges: &'a [Challenge], progress: &[UserProgress]) -> Vec<&'a Challenge> {
        let by_challenge: HashMap<ChallengeId, &UserProgress> =
            progress.iter().map(|p| (p.challenge.id, p)).collect();
        challenges
            .iter()
            .filter(|c| self.matches(c, by_challenge.get(&c.id).copied()))
            .collect()
    }
}

/// Filter plus current page. Any filter change goes back to page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeListState {
    filter: ChallengeFilter,
    page: usize,
}

impl Default for ChallengeListState {
    fn default() -> Self {
        Self {
            filter: ChallengeFilter::default(),
            page: 1,
        }
    }
}

impl ChallengeListState {
    pub fn filter(&self) -> &ChallengeFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filter(&mut self, filter: ChallengeFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.set_filter(ChallengeFilter {
            search: search.into(),
            ..self.filter.clone()
        });
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.set_filter(ChallengeFilter {
            difficulty,
            ..self.filter.clone()
        });
    }

    pub fn set_category(&mut self, category: Option<u64>) {
        self.set_filter(ChallengeFilter {
            category,
            ..self.filter.clone()
        });
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.set_filter(ChallengeFilter {
            status,
            ..self.filter.clone()
        });
    }

    /// Pages below 1 are treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Slice of `items` on 1-based `page`. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.max(1).saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// The user's submissions for one challenge, newest first.
pub fn submissions_for(id: ChallengeId, submissions: &[Submission]) -> Vec<&Submission> {
    let mut matching: Vec<&Submission> = submissions.iter().filter(|s| s.challenge.id == id).collect();
    matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    matching
}

/// Reject blank solutions before anything is sent.
pub fn check_submission(content: &str) -> Result<&str, &'static str> {
    if content.trim().is_empty() {
        Err("Please enter your solution before submitting")
    } else {
        Ok(content)
    }
}
