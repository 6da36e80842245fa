use serde::Deserialize;

use crate::dataset::{de_count, de_flag, de_opt_count, de_opt_string};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub event_id: u64,
    #[serde(deserialize_with = "de_opt_string")]
    pub date: Option<String>,
    pub home_team_id: u32,
    pub away_team_id: u32,
    #[serde(deserialize_with = "de_flag")]
    pub home_team_winner: Option<bool>,
    #[serde(deserialize_with = "de_opt_count")]
    pub attendance: Option<u64>,
}

/// Per-team box score for one fixture; two rows per fixture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchStat {
    pub event_id: u64,
    pub team_id: u32,
    pub possession_pct: f64,
    #[serde(deserialize_with = "de_count")]
    pub total_shots: u32,
    #[serde(deserialize_with = "de_count")]
    pub shots_on_target: u32,
    #[serde(deserialize_with = "de_count")]
    pub fouls_committed: u32,
    #[serde(deserialize_with = "de_count")]
    pub yellow_cards: u32,
    #[serde(deserialize_with = "de_count")]
    pub red_cards: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: u32,
    #[serde(deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub location: Option<String>,
}

/// A stat row with its team and fixture context attached. Context fields are `None` when the
/// left join found no match.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTeamMatch {
    pub stat: TeamMatchStat,
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub home_team_id: Option<u32>,
    pub away_team_id: Option<u32>,
    pub home_team_winner: Option<bool>,
    pub attendance: Option<u64>,
    pub is_home: bool,
    pub is_winner: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTeamMatch {
    pub joined: JoinedTeamMatch,
    /// `None` when the team took no shots.
    pub shot_accuracy: Option<f64>,
    pub discipline_score: u64,
    /// `None` when possession falls outside `[0, 100]`.
    pub possession_bucket: Option<PossessionBucket>,
}

impl EnrichedTeamMatch {
    pub fn is_winner(&self) -> Option<bool> {
        self.joined.is_winner
    }

    pub fn team_name(&self) -> Option<&str> {
        self.joined.name.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PossessionBucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl PossessionBucket {
    pub const ALL: [PossessionBucket; 4] = [
        PossessionBucket::Low,
        PossessionBucket::Medium,
        PossessionBucket::High,
        PossessionBucket::VeryHigh,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PossessionBucket::Low => "Low",
            PossessionBucket::Medium => "Medium",
            PossessionBucket::High => "High",
            PossessionBucket::VeryHigh => "Very High",
        }
    }
}

impl std::fmt::Display for PossessionBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
