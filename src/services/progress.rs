//! Progress aggregation over a Will's check-in history.
//!
//! Pure functions from a check-in snapshot to statistics; no I/O so
//! the rules can be pinned precisely in tests.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::models::{CheckIn, CheckInStatus, FollowThrough, Will};

/// Aggregated adherence statistics for one Will.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WillProgress {
    /// Whole-day span from start to min(end, today), inclusive, min 1.
    pub total_days: u32,
    pub checked_in_days: u32,
    pub yes_count: u32,
    pub partial_count: u32,
    pub no_count: u32,
    /// `round(100 * (yes + 0.5*partial) / checked_in_days)`, 0 when
    /// nothing is checked in.
    pub success_rate: u32,
    /// Streak still running at the most recent check-in.
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Compute progress from a snapshot of check-ins.
///
/// Streak rule, preserved from observed product behavior: scanning in
/// ascending date order, `yes` and `partial` extend the streak and an
/// explicit `no` resets it. A day with no check-in at all does NOT
/// reset the streak. Intent is ambiguous upstream; do not "fix" this
/// without product sign-off.
pub fn compute_progress(will: &Will, check_ins: &[CheckIn], today: NaiveDate) -> WillProgress {
    let mut check_ins: Vec<&CheckIn> = check_ins.iter().collect();
    check_ins.sort_by_key(|c| c.date);

    let mut yes_count = 0u32;
    let mut partial_count = 0u32;
    let mut no_count = 0u32;
    let mut current_streak = 0u32;
    let mut best_streak = 0u32;

    for check_in in &check_ins {
        match check_in.status {
            CheckInStatus::Yes => yes_count += 1,
            CheckInStatus::Partial => partial_count += 1,
            CheckInStatus::No => no_count += 1,
        }
        if check_in.status.counts_toward_streak() {
            current_streak += 1;
            best_streak = best_streak.max(current_streak);
        } else {
            current_streak = 0;
        }
    }

    let checked_in_days = u32::try_from(check_ins.len()).unwrap_or(u32::MAX);

    WillProgress {
        total_days: total_days(will, today),
        checked_in_days,
        yes_count,
        partial_count,
        no_count,
        success_rate: success_rate(yes_count, partial_count, checked_in_days),
        current_streak,
        best_streak,
    }
}

/// Inclusive day count from the start date to min(end, today), never
/// below 1 even before the Will starts.
fn total_days(will: &Will, today: NaiveDate) -> u32 {
    let upper = match will.end_date {
        Some(end) => end.min(today),
        None => today,
    };
    let span = (upper - will.start_date).num_days() + 1;
    u32::try_from(span.max(1)).unwrap_or(u32::MAX)
}

/// Percentage in [0, 100]; partial days count half.
pub fn success_rate(yes_count: u32, partial_count: u32, checked_in_days: u32) -> u32 {
    if checked_in_days == 0 {
        return 0;
    }
    let weighted = f64::from(yes_count) + 0.5 * f64::from(partial_count);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rate = (100.0 * weighted / f64::from(checked_in_days)).round() as u32;
    rate.min(100)
}

/// Default Will-level follow-through classification from the success
/// rate: >= 80 yes, >= 50 mostly, else no.
pub fn classify_follow_through(success_rate: u32) -> FollowThrough {
    if success_rate >= 80 {
        FollowThrough::Yes
    } else if success_rate >= 50 {
        FollowThrough::Mostly
    } else {
        FollowThrough::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Will, WillMode};
    use uuid::Uuid;

    fn will_spanning(start: (i32, u32, u32), end: (i32, u32, u32)) -> Will {
        Will::new(
            "test",
            Uuid::new_v4(),
            WillMode::Solo,
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        )
        .with_end_date(NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap())
    }

    fn check_in_on(will: &Will, day: u32, status: CheckInStatus) -> CheckIn {
        CheckIn::new(
            will.id,
            will.created_by,
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            status,
        )
    }

    #[test]
    fn test_five_day_scenario() {
        // [yes, yes, no, partial, yes] over five days
        let will = will_spanning((2026, 3, 1), (2026, 3, 5));
        let check_ins: Vec<CheckIn> = [
            CheckInStatus::Yes,
            CheckInStatus::Yes,
            CheckInStatus::No,
            CheckInStatus::Partial,
            CheckInStatus::Yes,
        ]
        .iter()
        .enumerate()
        .map(|(i, s)| check_in_on(&will, u32::try_from(i).unwrap() + 1, *s))
        .collect();

        let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let progress = compute_progress(&will, &check_ins, today);

        assert_eq!(progress.total_days, 5);
        assert_eq!(progress.checked_in_days, 5);
        assert_eq!(progress.yes_count, 3);
        assert_eq!(progress.partial_count, 1);
        assert_eq!(progress.no_count, 1);
        // round(100 * (3 + 0.5) / 5) = 70
        assert_eq!(progress.success_rate, 70);
        assert_eq!(progress.best_streak, 2);
        assert_eq!(progress.current_streak, 2);
    }

    #[test]
    fn test_empty_history_rates_zero() {
        let will = will_spanning((2026, 3, 1), (2026, 3, 10));
        let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let progress = compute_progress(&will, &[], today);

        assert_eq!(progress.success_rate, 0);
        assert_eq!(progress.checked_in_days, 0);
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.best_streak, 0);
        // clamped to today, inclusive
        assert_eq!(progress.total_days, 4);
    }

    #[test]
    fn test_missing_day_does_not_reset_streak() {
        // Check-ins on the 1st and 5th with a three-day gap. The gap
        // does not break the streak; only an explicit `no` does.
        let will = will_spanning((2026, 3, 1), (2026, 3, 10));
        let check_ins = vec![
            check_in_on(&will, 1, CheckInStatus::Yes),
            check_in_on(&will, 5, CheckInStatus::Yes),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let progress = compute_progress(&will, &check_ins, today);

        assert_eq!(progress.current_streak, 2);
        assert_eq!(progress.best_streak, 2);
    }

    #[test]
    fn test_unsorted_input_is_scanned_in_date_order() {
        let will = will_spanning((2026, 3, 1), (2026, 3, 3));
        let check_ins = vec![
            check_in_on(&will, 3, CheckInStatus::Yes),
            check_in_on(&will, 1, CheckInStatus::Yes),
            check_in_on(&will, 2, CheckInStatus::No),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let progress = compute_progress(&will, &check_ins, today);

        // in date order the `no` lands in the middle
        assert_eq!(progress.best_streak, 1);
        assert_eq!(progress.current_streak, 1);
    }

    #[test]
    fn test_total_days_minimum_one() {
        let will = will_spanning((2026, 3, 10), (2026, 3, 20));
        // today precedes the start
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let progress = compute_progress(&will, &[], today);
        assert_eq!(progress.total_days, 1);
    }

    #[test]
    fn test_total_days_clamps_to_end_date() {
        let will = will_spanning((2026, 3, 1), (2026, 3, 5));
        let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let progress = compute_progress(&will, &[], today);
        assert_eq!(progress.total_days, 5);
    }

    #[test]
    fn test_success_rate_rounding() {
        // 1 yes + 1 partial over 3 days: 100 * 1.5 / 3 = 50
        assert_eq!(success_rate(1, 1, 3), 50);
        // 2 partial over 3: 100 / 3 = 33.33 -> 33
        assert_eq!(success_rate(0, 2, 3), 33);
        // 1 yes over 3: -> 33; 2 yes over 3 -> 67
        assert_eq!(success_rate(2, 0, 3), 67);
        assert_eq!(success_rate(5, 0, 5), 100);
    }

    #[test]
    fn test_follow_through_thresholds() {
        assert_eq!(classify_follow_through(100), FollowThrough::Yes);
        assert_eq!(classify_follow_through(80), FollowThrough::Yes);
        assert_eq!(classify_follow_through(79), FollowThrough::Mostly);
        assert_eq!(classify_follow_through(50), FollowThrough::Mostly);
        assert_eq!(classify_follow_through(49), FollowThrough::No);
        assert_eq!(classify_follow_through(0), FollowThrough::No);
    }
}
