//! Daily refresh boundary and the clock the refresh loop sleeps on.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Wall-clock time source for the refresh loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Resolve once `deadline` has been reached.
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

/// [`Clock`] backed by the system clock and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        // Negative durations mean the deadline already passed.
        if let Ok(wait) = (deadline - Utc::now()).to_std() {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Next time the clock reads `hour:00` UTC, strictly after `now`.
///
/// Hours past 23 are clamped to 23.
pub fn next_refresh_at(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let boundary = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(boundary).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, h, m, 0).unwrap()
    }

    #[test]
    fn test_boundary_later_today() {
        assert_eq!(next_refresh_at(at(9, 30), 12), at(12, 0));
    }

    #[test]
    fn test_boundary_passed_rolls_to_tomorrow() {
        let next = next_refresh_at(at(13, 0), 12);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_exactly_on_boundary_targets_tomorrow() {
        let next = next_refresh_at(at(12, 0), 12);
        assert_eq!(next - at(12, 0), Duration::days(1));
    }

    #[test]
    fn test_out_of_range_hour_is_clamped() {
        assert_eq!(next_refresh_at(at(1, 0), 99), at(23, 0));
    }
}
