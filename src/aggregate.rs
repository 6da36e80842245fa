use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{PipelineError, Result};
use crate::model::{EnrichedTeamMatch, PossessionBucket};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean<K> {
    pub key: K,
    pub count: usize,
    pub mean: f64,
}

/// Per-group means. Groups keep the order they were first seen in unless re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeans<K> {
    groups: Vec<GroupMean<K>>,
}

impl<K: Eq + Hash + Clone> GroupedMeans<K> {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut sums: Vec<(K, f64, usize)> = Vec::new();
        for (key, value) in pairs {
            let idx = *slots.entry(key.clone()).or_insert_with(|| {
                sums.push((key, 0.0, 0));
                sums.len() - 1
            });
            sums[idx].1 += value;
            sums[idx].2 += 1;
        }
        let groups = sums
            .into_iter()
            .map(|(key, sum, count)| GroupMean {
                key,
                count,
                mean: sum / count as f64,
            })
            .collect();
        Self { groups }
    }

    pub fn get(&self, key: &K) -> Option<f64> {
        self.groups.iter().find(|g| &g.key == key).map(|g| g.mean)
    }

    pub fn count(&self, key: &K) -> usize {
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .map(|g| g.count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupMean<K>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn sorted_by_key(mut self) -> Self
    where
        K: Ord,
    {
        self.groups.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    /// Highest mean first. Equal means keep encounter order.
    pub fn sorted_desc(mut self) -> Self {
        self.groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));
        self
    }
}

pub fn win_rate_by_possession(rows: &[EnrichedTeamMatch]) -> GroupedMeans<PossessionBucket> {
    GroupedMeans::from_pairs(rows.iter().filter_map(|r| {
        let bucket = r.possession_bucket?;
        let won = r.is_winner()?;
        Some((bucket, indicator(won)))
    }))
    .sorted_by_key()
}

pub fn win_rate_by_team(rows: &[EnrichedTeamMatch]) -> GroupedMeans<String> {
    GroupedMeans::from_pairs(rows.iter().filter_map(|r| {
        let name = r.team_name()?;
        let won = r.is_winner()?;
        Some((name.to_string(), indicator(won)))
    }))
    .sorted_desc()
}

/// Rows without a shot accuracy are left out.
pub fn shot_accuracy_by_result(rows: &[EnrichedTeamMatch]) -> GroupedMeans<bool> {
    GroupedMeans::from_pairs(
        rows.iter()
            .filter_map(|r| Some((r.is_winner()?, r.shot_accuracy?))),
    )
    .sorted_by_key()
}

pub fn discipline_by_result(rows: &[EnrichedTeamMatch]) -> GroupedMeans<bool> {
    GroupedMeans::from_pairs(
        rows.iter()
            .filter_map(|r| Some((r.is_winner()?, r.discipline_score as f64))),
    )
    .sorted_by_key()
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub by_possession: GroupedMeans<PossessionBucket>,
    pub by_team: GroupedMeans<String>,
    pub shot_accuracy_by_result: GroupedMeans<bool>,
    pub discipline_by_result: GroupedMeans<bool>,
}

impl Aggregates {
    pub fn compute(rows: &[EnrichedTeamMatch]) -> Self {
        Self {
            by_possession: win_rate_by_possession(rows),
            by_team: win_rate_by_team(rows),
            shot_accuracy_by_result: shot_accuracy_by_result(rows),
            discipline_by_result: discipline_by_result(rows),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingGroupPolicy {
    #[default]
    ReportGap,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightRow {
    pub metric: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSummary {
    pub rows: Vec<InsightRow>,
}

impl InsightSummary {
    pub fn build(aggregates: &Aggregates, policy: MissingGroupPolicy) -> Result<Self> {
        let mut lookups: Vec<(String, Option<f64>)> = PossessionBucket::ALL
            .iter()
            .map(|bucket| {
                (
                    format!("Win rate ({} possession)", bucket.label()),
                    aggregates.by_possession.get(bucket),
                )
            })
            .collect();
        for (result, label) in [(true, "Wins"), (false, "Losses")] {
            lookups.push((
                format!("Avg shot accuracy ({label})"),
                aggregates.shot_accuracy_by_result.get(&result),
            ));
        }
        for (result, label) in [(true, "Wins"), (false, "Losses")] {
            lookups.push((
                format!("Avg discipline score ({label})"),
                aggregates.discipline_by_result.get(&result),
            ));
        }

        let mut rows = Vec::with_capacity(lookups.len());
        for (metric, value) in lookups {
            if value.is_none() && policy == MissingGroupPolicy::Fail {
                return Err(PipelineError::EmptyGroup { metric });
            }
            rows.push(InsightRow { metric, value });
        }
        Ok(Self { rows })
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.metric == metric)
            .and_then(|r| r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_means_keep_encounter_order() {
        let g = GroupedMeans::from_pairs([("b", 1.0), ("a", 0.0), ("b", 0.0), ("c", 1.0)]);
        let keys: Vec<_> = g.iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(g.get(&"b"), Some(0.5));
        assert_eq!(g.count(&"b"), 2);
        assert_eq!(g.get(&"zz"), None);
        assert_eq!(g.count(&"zz"), 0);
    }

    #[test]
    fn descending_sort_is_stable_on_ties() {
        let g = GroupedMeans::from_pairs([("x", 0.5), ("y", 1.0), ("z", 0.5), ("w", 0.0)])
            .sorted_desc();
        let keys: Vec<_> = g.iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["y", "x", "z", "w"]);
    }

    #[test]
    fn summary_reports_gaps_or_fails() {
        let empty = Aggregates::compute(&[]);
        let summary = InsightSummary::build(&empty, MissingGroupPolicy::ReportGap)
            .expect("gaps are reported");
        assert_eq!(summary.rows.len(), 8);
        assert!(summary.rows.iter().all(|r| r.value.is_none()));
        assert_eq!(summary.rows[3].metric, "Win rate (Very High possession)");
        assert_eq!(summary.rows[7].metric, "Avg discipline score (Losses)");

        match InsightSummary::build(&empty, MissingGroupPolicy::Fail) {
            Err(PipelineError::EmptyGroup { metric }) => {
                assert_eq!(metric, "Win rate (Low possession)")
            }
            other => panic!("expected empty group error, got {other:?}"),
        }
    }
}
