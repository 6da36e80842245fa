use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::model::{Fixture, JoinedTeamMatch, Team, TeamMatchStat};

#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedTeamMatch>,
    pub unmatched_teams: usize,
    pub unmatched_fixtures: usize,
}

/// Left-joins stats to teams on team id, then to fixtures on event id. Every stat row is kept
/// exactly once, in input order.
pub fn join_team_matches(
    stats: &[TeamMatchStat],
    teams: &[Team],
    fixtures: &[Fixture],
) -> JoinOutcome {
    let (named, unmatched_teams) = attach_teams(stats, teams);
    let (rows, unmatched_fixtures) = attach_fixtures(named, fixtures);
    debug!(rows = rows.len(), unmatched_teams, unmatched_fixtures, "joined team matches");
    JoinOutcome {
        rows,
        unmatched_teams,
        unmatched_fixtures,
    }
}

pub fn attach_teams(stats: &[TeamMatchStat], teams: &[Team]) -> (Vec<JoinedTeamMatch>, usize) {
    let by_id = index_first(teams, |t| t.team_id, "teams");
    let mut unmatched = 0usize;
    let rows: Vec<JoinedTeamMatch> = stats
        .iter()
        .map(|stat| {
            let team = by_id.get(&stat.team_id);
            if team.is_none() {
                unmatched += 1;
            }
            JoinedTeamMatch {
                stat: stat.clone(),
                name: team.and_then(|t| t.name.clone()),
                location: team.and_then(|t| t.location.clone()),
                date: None,
                home_team_id: None,
                away_team_id: None,
                home_team_winner: None,
                attendance: None,
                is_home: false,
                is_winner: None,
            }
        })
        .collect();
    (rows, unmatched)
}

pub fn attach_fixtures(
    rows: Vec<JoinedTeamMatch>,
    fixtures: &[Fixture],
) -> (Vec<JoinedTeamMatch>, usize) {
    let by_event = index_first(fixtures, |f| f.event_id, "fixtures");
    let mut unmatched = 0usize;
    let rows: Vec<JoinedTeamMatch> = rows
        .into_iter()
        .map(|mut row| {
            match by_event.get(&row.stat.event_id) {
                Some(fixture) => {
                    row.date = fixture.date.clone();
                    row.home_team_id = Some(fixture.home_team_id);
                    row.away_team_id = Some(fixture.away_team_id);
                    row.home_team_winner = fixture.home_team_winner;
                    row.attendance = fixture.attendance;
                }
                None => unmatched += 1,
            }
            row.is_home = row.home_team_id == Some(row.stat.team_id);
            row.is_winner = is_winner(row.is_home, row.home_team_winner);
            row
        })
        .collect();
    (rows, unmatched)
}

/// The side that played matches the recorded winning side. Unknown result stays unknown.
pub fn is_winner(is_home: bool, home_team_winner: Option<bool>) -> Option<bool> {
    home_team_winner.map(|home_won| (is_home && home_won) || (!is_home && !home_won))
}

// First occurrence wins so a stat row never fans out into several joined rows.
fn index_first<'a, T, K, F>(rows: &'a [T], key: F, table: &str) -> HashMap<K, &'a T>
where
    K: Eq + Hash + std::fmt::Display,
    F: Fn(&T) -> K,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        match index.entry(key(row)) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(slot) => {
                warn!(table, key = %slot.key(), "duplicate join key; keeping first row");
            }
        }
    }
    index
}
