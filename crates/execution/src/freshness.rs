//! Freshness check for stored content.

use refresher_core::{ContentRecord, Time};

/// True when `record` exists and is younger than `max_age` at `now`.
///
/// A non-positive `max_age` means nothing is fresh, which is how forced
/// regeneration bypasses the check.
pub fn is_fresh(record: Option<&ContentRecord>, max_age: chrono::Duration, now: Time) -> bool {
    let Some(record) = record else {
        return false;
    };
    if max_age <= chrono::Duration::zero() {
        return false;
    }
    now.signed_duration_since(record.generated_at) < max_age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use refresher_core::ContentPayload;

    fn record_at(generated_at: Time) -> ContentRecord {
        ContentRecord::new(ContentPayload::default(), generated_at)
    }

    #[test]
    fn test_absent_is_never_fresh() {
        assert!(!is_fresh(None, Duration::days(30), Utc::now()));
    }

    #[test]
    fn test_boundary() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let record = record_at(t);
        let max_age = Duration::days(30);
        let eps = Duration::milliseconds(1);

        assert!(is_fresh(Some(&record), max_age, t + max_age - eps));
        assert!(!is_fresh(Some(&record), max_age, t + max_age));
        assert!(!is_fresh(Some(&record), max_age, t + max_age + eps));
    }

    #[test]
    fn test_zero_max_age_forces_regeneration() {
        let now = Utc::now();
        assert!(!is_fresh(Some(&record_at(now)), Duration::zero(), now));
        assert!(!is_fresh(
            Some(&record_at(now + Duration::hours(1))),
            Duration::zero(),
            now
        ));
    }
}
