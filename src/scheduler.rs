//! Review-interval scheduling.
//!
//! A word is due `2^review_count` days after it was last reviewed. The
//! reference timestamp is `last_reviewed_at` (which equals `created_at` until
//! the first review); see DESIGN.md for why that reading was chosen.

use crate::types::WordRecord;
use chrono::{DateTime, Utc};

const DAY_SECONDS: i64 = 86_400;

/// Minimum real elapsed time before a word can resurface in `list -v`.
/// Stops a word reviewed this morning from coming back tonight.
const SHORT_TERM_REVIEW_THRESHOLD: i64 = 24 * 60 * 60;

/// Whole days until the record is due for review, clamped at zero.
pub fn days_until_review(record: &WordRecord, now: DateTime<Utc>) -> i64 {
    let elapsed_days = (now - record.last_reviewed_at).num_seconds() / DAY_SECONDS;
    let interval = 2_i64.checked_pow(record.review_count).unwrap_or(i64::MAX);
    (interval - elapsed_days).max(0)
}

/// Whether the record should appear in a review listing.
pub fn is_due(record: &WordRecord, now: DateTime<Utc>) -> bool {
    days_until_review(record, now) == 0
        && (now - record.last_reviewed_at).num_seconds() > SHORT_TERM_REVIEW_THRESHOLD
}

/// "day" for one or fewer days, "days" otherwise.
pub fn day_word(days: i64) -> &'static str {
    if days <= 1 { "day" } else { "days" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_with(review_count: u32, reviewed_days_ago: i64, now: DateTime<Utc>) -> WordRecord {
        let mut record = WordRecord::new("hello", "world", now - Duration::days(reviewed_days_ago));
        record.review_count = review_count;
        record
    }

    #[test]
    fn test_fresh_word_due_in_one_day() {
        let now = Utc::now();
        let record = record_with(0, 0, now);
        assert_eq!(days_until_review(&record, now), 1);
    }

    #[test]
    fn test_interval_doubles_with_reviews() {
        let now = Utc::now();
        assert_eq!(days_until_review(&record_with(1, 0, now), now), 2);
        assert_eq!(days_until_review(&record_with(3, 0, now), now), 8);
        assert_eq!(days_until_review(&record_with(3, 5, now), now), 3);
    }

    #[test]
    fn test_non_increasing_as_time_passes() {
        let now = Utc::now();
        let mut previous = i64::MAX;
        for elapsed in 0..20 {
            let days = days_until_review(&record_with(2, elapsed, now), now);
            assert!(days <= previous, "went up at elapsed={elapsed}");
            previous = days;
        }
    }

    #[test]
    fn test_clamps_at_zero() {
        let now = Utc::now();
        let record = record_with(0, 400, now);
        assert_eq!(days_until_review(&record, now), 0);
    }

    #[test]
    fn test_large_review_count_saturates() {
        let now = Utc::now();
        let record = record_with(u32::MAX, 1, now);
        assert!(days_until_review(&record, now) > 0);
    }

    #[test]
    fn test_due_requires_full_day_elapsed() {
        let now = Utc::now();
        // Exactly one day elapsed: interval math says due, the 24h floor says no.
        let record = record_with(0, 1, now);
        assert_eq!(days_until_review(&record, now), 0);
        assert!(!is_due(&record, now));

        let overdue = record_with(0, 3, now);
        assert!(is_due(&overdue, now));
    }

    #[test]
    fn test_day_word_boundary() {
        assert_eq!(day_word(0), "day");
        assert_eq!(day_word(1), "day");
        assert_eq!(day_word(2), "days");
    }
}
