use serde::Serialize;

use crate::models::LeaderboardEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow<'a> {
    #[serde(flatten)]
    pub entry: &'a LeaderboardEntry,
    /// Row belongs to the logged-in user.
    pub is_you: bool,
}

/// Entries matching `search` on username or name, sorted by rank.
pub fn rows<'a>(
    entries: &'a [LeaderboardEntry],
    search: &str,
    username: Option<&str>,
) -> Vec<LeaderboardRow<'a>> {
    let needle = search.trim().to_lowercase();
    let mut rows: Vec<LeaderboardRow<'a>> = entries
        .iter()
        .filter(|e| {
            needle.is_empty()
                || [&e.user.username, &e.user.first_name, &e.user.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .map(|entry| LeaderboardRow {
            entry,
            is_you: username == Some(entry.user.username.as_str()),
        })
        .collect();
    rows.sort_by_key(|row| row.entry.rank);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: u32, username: &str, first: &str, last: &str) -> LeaderboardEntry {
        serde_json::from_value(serde_json::json!({
            "id": rank,
            "user": {"id": rank, "username": username, "first_name": first, "last_name": last},
            "total_points": 1000 / rank,
            "challenges_completed": 3,
            "rank": rank,
            "updated_at": "2026-01-03T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_search_sort_and_you_marker() {
        let entries = vec![
            entry(3, "carol", "Carol", "Danvers"),
            entry(1, "alice", "Alice", "Liddell"),
            entry(2, "bob", "Robert", "Alison"),
        ];

        let all = rows(&entries, "", Some("bob"));
        let ranks: Vec<u32> = all.iter().map(|r| r.entry.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(all.iter().filter(|r| r.is_you).count(), 1);
        assert!(all[1].is_you);

        let found: Vec<&str> = rows(&entries, "ALI", None)
            .iter()
            .map(|r| r.entry.user.username.as_str())
            .collect();
        assert_eq!(found, vec!["alice", "bob"]);
        assert!(rows(&entries, "zed", None).is_empty());
    }
}
