//! Per-group trial counts, accuracy and latency statistics

use crate::io::configuration::NO_DATA;
use crate::session::trial::{Category, Direction, Trial};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A statistics bucket
///
/// Keys order themselves in report order: overall, hands, hands/left, hands/right,
/// feet, feet/left, feet/right, left, right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Every trial
    Overall,
    /// All trials of one category
    Category(Category),
    /// One category and one true direction
    CategoryDirection(Category, Direction),
    /// One true direction across categories
    Side(Direction),
}

impl GroupKey {
    /// Every group in report order
    pub const ALL: [Self; 9] = [
        Self::Overall,
        Self::Category(Category::Hands),
        Self::CategoryDirection(Category::Hands, Direction::Left),
        Self::CategoryDirection(Category::Hands, Direction::Right),
        Self::Category(Category::Feet),
        Self::CategoryDirection(Category::Feet, Direction::Left),
        Self::CategoryDirection(Category::Feet, Direction::Right),
        Self::Side(Direction::Left),
        Self::Side(Direction::Right),
    ];

    const fn rank(self) -> u8 {
        match self {
            Self::Overall => 0,
            Self::Category(Category::Hands) => 1,
            Self::CategoryDirection(Category::Hands, Direction::Left) => 2,
            Self::CategoryDirection(Category::Hands, Direction::Right) => 3,
            Self::Category(Category::Feet) => 4,
            Self::CategoryDirection(Category::Feet, Direction::Left) => 5,
            Self::CategoryDirection(Category::Feet, Direction::Right) => 6,
            Self::Side(Direction::Left) => 7,
            Self::Side(Direction::Right) => 8,
        }
    }

    /// The four groups a trial falls into
    pub const fn keys_for(trial: &Trial) -> [Self; 4] {
        [
            Self::Overall,
            Self::Category(trial.category),
            Self::CategoryDirection(trial.category, trial.direction),
            Self::Side(trial.direction),
        ]
    }

    /// Whether `trial` belongs to this group
    pub fn contains(self, trial: &Trial) -> bool {
        match self {
            Self::Overall => true,
            Self::Category(category) => trial.category == category,
            Self::CategoryDirection(category, direction) => {
                trial.category == category && trial.direction == direction
            }
            Self::Side(direction) => trial.direction == direction,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => f.write_str("overall"),
            Self::Category(category) => write!(f, "{category}"),
            Self::CategoryDirection(category, direction) => write!(f, "{category}/{direction}"),
            Self::Side(direction) => write!(f, "{direction}"),
        }
    }
}

/// A group name that is not one of the nine known groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroup(pub String);

impl fmt::Display for UnknownGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown group '{}'", self.0)
    }
}

impl std::error::Error for UnknownGroup {}

impl FromStr for GroupKey {
    type Err = UnknownGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.to_string() == s)
            .ok_or_else(|| UnknownGroup(s.to_string()))
    }
}

/// Descriptive statistics of one group
///
/// Ratios and latency statistics are `None` for an empty group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// Number of trials
    pub n: usize,
    /// Number of correct trials
    pub n_correct: usize,
    /// `n_correct / n`
    pub accuracy: Option<f64>,
    /// Mean latency in seconds
    pub mean_latency: Option<f64>,
    /// Median latency in seconds
    pub median_latency: Option<f64>,
    /// Sum of latencies in seconds
    pub total_latency: f64,
    /// Sum of latencies of the correct trials in seconds
    pub correct_latency: f64,
}

impl GroupStats {
    /// Statistics of a group without trials
    pub const EMPTY: Self = Self {
        n: 0,
        n_correct: 0,
        accuracy: None,
        mean_latency: None,
        median_latency: None,
        total_latency: 0.0,
        correct_latency: 0.0,
    };

    /// Compute statistics from the group's latencies, flagged with whether each
    /// trial was answered correctly
    pub fn from_latencies(samples: &[(f64, bool)]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::EMPTY;
        }

        let n_correct = samples.iter().filter(|(_, correct)| *correct).count();
        let correct_latency: f64 = samples
            .iter()
            .filter(|(_, correct)| *correct)
            .map(|(latency, _)| latency)
            .sum();
        let mut latencies: Vec<f64> = samples.iter().map(|(latency, _)| *latency).collect();

        let total_latency: f64 = latencies.iter().sum();
        latencies.sort_by(f64::total_cmp);

        Self {
            n,
            n_correct,
            accuracy: Some(n_correct as f64 / n as f64),
            mean_latency: Some(total_latency / n as f64),
            median_latency: median_of_sorted(&latencies),
            total_latency,
            correct_latency,
        }
    }
}

fn median_of_sorted(values: &[f64]) -> Option<f64> {
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values.get(mid).copied()
    } else {
        let lower = values.get(mid.checked_sub(1)?)?;
        let upper = values.get(mid)?;
        Some(f64::midpoint(*lower, *upper))
    }
}

/// Statistics for every group, in report order
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    groups: BTreeMap<GroupKey, GroupStats>,
}

impl Summary {
    /// Statistics of one group
    pub fn get(&self, key: GroupKey) -> &GroupStats {
        self.groups.get(&key).unwrap_or(&GroupStats::EMPTY)
    }

    /// Statistics over all trials
    pub fn overall(&self) -> &GroupStats {
        self.get(GroupKey::Overall)
    }

    /// Groups and their statistics in report order
    pub fn groups(&self) -> impl Iterator<Item = (GroupKey, &GroupStats)> {
        self.groups.iter().map(|(key, stats)| (*key, stats))
    }
}

/// Aggregate trials into per-group statistics
///
/// Every group is present in the result, empty ones with [`GroupStats::EMPTY`].
pub fn aggregate<'a, I>(trials: I) -> Summary
where
    I: IntoIterator<Item = &'a Trial>,
{
    let mut samples: BTreeMap<GroupKey, Vec<(f64, bool)>> =
        GroupKey::ALL.into_iter().map(|key| (key, Vec::new())).collect();

    for trial in trials {
        for key in GroupKey::keys_for(trial) {
            samples
                .entry(key)
                .or_default()
                .push((trial.latency_secs(), trial.correct()));
        }
    }

    let groups = samples
        .into_iter()
        .map(|(key, group)| (key, GroupStats::from_latencies(&group)))
        .collect();

    Summary { groups }
}

/// Format an optional statistic, writing the no-data marker for `None`
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.decimals$}"))
}

/// Format an optional ratio as a percentage
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{:.2}%", v * 100.0))
}
