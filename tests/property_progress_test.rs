//! Property tests for the progress aggregation rules.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use uuid::Uuid;

use willcircle::domain::models::{CheckIn, CheckInStatus, Will, WillMode};
use willcircle::services::{compute_progress, success_rate};

fn status_strategy() -> impl Strategy<Value = CheckInStatus> {
    prop_oneof![
        Just(CheckInStatus::Yes),
        Just(CheckInStatus::No),
        Just(CheckInStatus::Partial),
    ]
}

proptest! {
    #[test]
    fn success_rate_is_a_percentage(yes in 0u32..500, partial in 0u32..500, extra in 0u32..500) {
        let checked_in = yes + partial + extra;
        let rate = success_rate(yes, partial, checked_in);
        prop_assert!(rate <= 100);
    }

    #[test]
    fn all_yes_rates_one_hundred(n in 1u32..500) {
        prop_assert_eq!(success_rate(n, 0, n), 100);
    }

    #[test]
    fn progress_counts_are_consistent(statuses in prop::collection::vec(status_strategy(), 0..120)) {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let will = Will::new("prop", Uuid::new_v4(), WillMode::Solo, start);
        let check_ins: Vec<CheckIn> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                CheckIn::new(will.id, will.created_by, start + Duration::days(i as i64), *s)
            })
            .collect();
        let today = start + Duration::days(365);

        let progress = compute_progress(&will, &check_ins, today);

        prop_assert_eq!(progress.checked_in_days as usize, statuses.len());
        prop_assert_eq!(
            progress.yes_count + progress.partial_count + progress.no_count,
            progress.checked_in_days
        );
        prop_assert!(progress.success_rate <= 100);
        // a streak never exceeds the number of non-`no` days
        prop_assert!(progress.current_streak <= progress.best_streak);
        prop_assert!(progress.best_streak <= progress.yes_count + progress.partial_count);
    }

    #[test]
    fn streaks_are_order_insensitive_to_input_shuffle(
        statuses in prop::collection::vec(status_strategy(), 1..60),
        seed in any::<u64>(),
    ) {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let will = Will::new("prop", Uuid::new_v4(), WillMode::Solo, start);
        let check_ins: Vec<CheckIn> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                CheckIn::new(will.id, will.created_by, start + Duration::days(i as i64), *s)
            })
            .collect();
        let today = start + Duration::days(365);

        // a cheap deterministic shuffle: rotate by the seed
        let mut shuffled = check_ins.clone();
        let pivot = (seed as usize) % shuffled.len();
        shuffled.rotate_left(pivot);

        let a = compute_progress(&will, &check_ins, today);
        let b = compute_progress(&will, &shuffled, today);
        prop_assert_eq!(a, b);
    }
}
