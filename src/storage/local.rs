//! Local-only UI state: bookmarks and per-challenge start times
//!
//! Never sent to the backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{KeyValueStore, StorageError};
use crate::models::ChallengeId;

pub const BOOKMARKS_KEY: &str = "bookmarkedChallenges";

fn start_time_key(id: ChallengeId) -> String {
    format!("challenge_{id}_start_time")
}

#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
}

impl LocalState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Bookmarked challenge ids in the order they were added.
    ///
    /// An unreadable value is treated as an empty list.
    pub fn bookmarks(&self) -> Result<Vec<ChallengeId>, StorageError> {
        Ok(self
            .store
            .get(BOOKMARKS_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    pub fn is_bookmarked(&self, id: ChallengeId) -> Result<bool, StorageError> {
        Ok(self.bookmarks()?.contains(&id))
    }

    /// Flip the bookmark for `id`; returns whether it is bookmarked now.
    pub fn toggle_bookmark(&self, id: ChallengeId) -> Result<bool, StorageError> {
        let mut encode_error = None;
        let mut bookmarked = false;
        self.store.update(&mut |entries| {
            let mut ids: Vec<ChallengeId> = entries
                .get(BOOKMARKS_KEY)
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();

            if ids.contains(&id) {
                ids.retain(|existing| *existing != id);
                bookmarked = false;
            } else {
                ids.push(id);
                bookmarked = true;
            }

            match serde_json::to_string(&ids) {
                Ok(raw) => {
                    entries.insert(BOOKMARKS_KEY.to_string(), raw);
                }
                Err(e) => encode_error = Some(e),
            }
        })?;

        match encode_error {
            Some(source) => Err(StorageError::Encode {
                key: BOOKMARKS_KEY.to_string(),
                source,
            }),
            None => Ok(bookmarked),
        }
    }

    pub fn start_time(&self, id: ChallengeId) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self
            .store
            .get(&start_time_key(id))?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc)))
    }

    /// Record `now` as the start time unless one is already stored.
    /// Returns the effective start time.
    pub fn start_timer(
        &self,
        id: ChallengeId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StorageError> {
        if let Some(existing) = self.start_time(id)? {
            return Ok(existing);
        }
        self.store.set(&start_time_key(id), &now.to_rfc3339())?;
        Ok(now)
    }

    pub fn clear_timer(&self, id: ChallengeId) -> Result<(), StorageError> {
        self.store.remove(&start_time_key(id))
    }
}
