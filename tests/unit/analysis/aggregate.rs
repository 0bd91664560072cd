//! Tests for per-group counts, accuracy and latency statistics

#[cfg(test)]
mod tests {
    use gmi::analysis::aggregate::{
        GroupKey, GroupStats, aggregate, format_percent, format_value,
    };
    use gmi::session::trial::{Category, Direction, Trial};
    use std::time::Duration;

    fn trial(category: Category, direction: Direction, response: Direction, secs: f64) -> Trial {
        Trial::new(category, direction, response, Duration::from_secs_f64(secs))
    }

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|value| (value - expected).abs() < 1e-9)
    }

    // Tests groups order as overall, hands, hands sides, feet, feet sides, sides
    // Verified by deriving Ord from declaration order
    #[test]
    fn test_group_order() {
        let mut keys = GroupKey::ALL.to_vec();
        keys.reverse();
        keys.sort();
        assert_eq!(keys, GroupKey::ALL.to_vec());

        let names: Vec<String> = GroupKey::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            [
                "overall",
                "hands",
                "hands/left",
                "hands/right",
                "feet",
                "feet/left",
                "feet/right",
                "left",
                "right"
            ]
        );
    }

    // Tests group names parse back to keys
    // Verified by parsing "hands/left" as hands
    #[test]
    fn test_group_from_str() {
        for key in GroupKey::ALL {
            assert_eq!(key.to_string().parse::<GroupKey>(), Ok(key));
        }
        assert!("toes".parse::<GroupKey>().is_err());
    }

    // Tests each trial lands in overall, its category, its bucket and its side
    // Verified by omitting the side group
    #[test]
    fn test_keys_for_trial() {
        let t = trial(Category::Feet, Direction::Right, Direction::Left, 1.0);
        let keys = GroupKey::keys_for(&t);

        for key in GroupKey::ALL {
            assert_eq!(keys.contains(&key), key.contains(&t), "{key}");
        }
    }

    // Tests a small mixed session against hand-computed statistics
    // Verified by counting incorrect responses as correct
    #[test]
    fn test_aggregate_mixed_session() {
        let trials = [
            trial(Category::Hands, Direction::Left, Direction::Left, 1.0),
            trial(Category::Hands, Direction::Right, Direction::Left, 2.0),
            trial(Category::Feet, Direction::Left, Direction::Left, 3.0),
            trial(Category::Feet, Direction::Right, Direction::Right, 4.0),
        ];
        let summary = aggregate(&trials);

        let overall = summary.overall();
        assert_eq!(overall.n, 4);
        assert_eq!(overall.n_correct, 3);
        assert!(close(overall.accuracy, 0.75));
        assert!(close(overall.mean_latency, 2.5));
        assert!(close(overall.median_latency, 2.5));
        assert!((overall.total_latency - 10.0).abs() < 1e-9);
        assert!((overall.correct_latency - 8.0).abs() < 1e-9);

        let hands = summary.get(GroupKey::Category(Category::Hands));
        assert_eq!((hands.n, hands.n_correct), (2, 1));

        let left = summary.get(GroupKey::Side(Direction::Left));
        assert_eq!((left.n, left.n_correct), (2, 2));
        assert!(close(left.median_latency, 2.0));

        let feet_right = summary.get(GroupKey::CategoryDirection(Category::Feet, Direction::Right));
        assert_eq!(feet_right.n, 1);
        assert!(close(feet_right.median_latency, 4.0));
    }

    // Tests group counts are consistent with each other
    // Verified by adding trials to both side groups
    #[test]
    fn test_aggregate_partition_invariants() {
        let trials = [
            trial(Category::Hands, Direction::Left, Direction::Right, 0.4),
            trial(Category::Hands, Direction::Left, Direction::Left, 0.9),
            trial(Category::Feet, Direction::Right, Direction::Right, 1.3),
            trial(Category::Feet, Direction::Left, Direction::Right, 2.2),
            trial(Category::Hands, Direction::Right, Direction::Right, 0.7),
        ];
        let summary = aggregate(&trials);
        let n = |key| summary.get(key).n;

        assert_eq!(
            n(GroupKey::Overall),
            n(GroupKey::Category(Category::Hands)) + n(GroupKey::Category(Category::Feet))
        );
        assert_eq!(
            n(GroupKey::Overall),
            n(GroupKey::Side(Direction::Left)) + n(GroupKey::Side(Direction::Right))
        );
        for category in Category::ALL {
            let buckets: usize = Direction::ALL
                .into_iter()
                .map(|d| n(GroupKey::CategoryDirection(category, d)))
                .sum();
            assert_eq!(buckets, n(GroupKey::Category(category)));
        }
        for (_, stats) in summary.groups() {
            assert!(stats.n_correct <= stats.n);
            if let Some(accuracy) = stats.accuracy {
                assert!((0.0..=1.0).contains(&accuracy));
            }
        }
    }

    // Tests empty groups report no data instead of zero
    // Verified by dividing by zero for empty groups
    #[test]
    fn test_empty_groups() {
        let summary = aggregate(&[trial(Category::Hands, Direction::Left, Direction::Left, 1.0)]);
        let feet = summary.get(GroupKey::Category(Category::Feet));

        assert_eq!(feet, &GroupStats::EMPTY);
        assert_eq!(format_value(feet.accuracy, 3), "no data");
        assert_eq!(format_percent(feet.accuracy), "no data");
        assert_eq!(summary.groups().count(), GroupKey::ALL.len());

        let nothing = aggregate(&Vec::<Trial>::new());
        assert_eq!(nothing.overall(), &GroupStats::EMPTY);
    }

    // Tests median of an odd-length group is the middle value
    // Verified by averaging the two values around the middle
    #[test]
    fn test_median_odd_count() {
        let stats = GroupStats::from_latencies(&[(5.0, true), (1.0, false), (2.0, true)]);
        assert!(close(stats.median_latency, 2.0));
        assert!(close(stats.accuracy, 2.0 / 3.0));
        assert!((stats.correct_latency - 7.0).abs() < 1e-9);
    }

    // Tests numeric formatting precision
    // Verified by rounding to two decimals
    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(0.5), 3), "0.500");
        assert_eq!(format_value(Some(1.23456), 3), "1.235");
        assert_eq!(format_percent(Some(0.75)), "75.00%");
    }
}
