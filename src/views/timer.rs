use chrono::{DateTime, Duration, Utc};

/// Time since `start`, never negative.
pub fn elapsed_since(start: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - start).max(Duration::zero())
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
