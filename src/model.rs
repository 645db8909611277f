// src/model.rs
//
// Relational model reconstructed by the engine. Ids are store-assigned;
// a zero id marks a row that has not been persisted yet.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum League {
    Central,
    Pacific,
}

#[derive(Clone, Debug)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    pub short_name: String,
    pub league: League,
}

/// One game, created at most once per (date, home, away) and never updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub game_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i64,
    pub away_score: i64,
    pub game_date: NaiveDate,
    pub stadium: String,
}

/// External sites keep their own player keys; a canonical player may carry
/// one id per source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// npb.jp (box scores)
    Npb,
    /// baseball.yahoo.co.jp (pitch pages, profiles)
    Yahoo,
}

#[derive(Clone, Debug, Default)]
pub struct Player {
    pub player_id: i64,
    pub name: String,
    pub name_kana: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<u32>,
    pub position: Option<String>,
    pub throws: Option<String>,
    pub bats: Option<String>,
    pub source_ids: HashMap<Source, u64>,
}

/// A contiguous period during which a player belonged to one team.
/// `end_date == None` means "current".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffiliationInterval {
    pub player_id: i64,
    pub team_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl AffiliationInterval {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }
}

/// One batter/pitcher matchup with its raw outcome token. Immutable once
/// created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtBatResult {
    pub at_bat_id: i64,
    pub game_id: i64,
    pub batter_id: i64,
    pub pitcher_id: i64,
    pub result: String,
}

/// An at-bat pending persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAtBat {
    pub game_id: i64,
    pub batter_id: i64,
    pub pitcher_id: i64,
    pub result: String,
}

/// One pitch within an at-bat. `zone` is None when the location chart had
/// no marker for the pitch.
#[derive(Clone, Debug, PartialEq)]
pub struct PitchResult {
    pub at_bat_id: i64,
    pub sequence: u32,
    pub pitch_type: String,
    pub speed_kmh: u32,
    pub zone: Option<u8>,
    pub outcome: String,
    pub recorded_at: NaiveDateTime,
}

/// Denormalized at-bat row consumed by the statistics aggregator: the raw
/// outcome plus both sides' identity as of the game date.
#[derive(Clone, Debug)]
pub struct AtBatDetail {
    pub batter_id: i64,
    pub batter_name: String,
    pub batter_team_id: i64,
    pub batter_team_short: String,
    pub pitcher_id: i64,
    pub pitcher_name: String,
    pub pitcher_team_id: i64,
    pub pitcher_team_short: String,
    pub result: String,
}

/// One statistics row for a grouping of at-bats. Derived, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub batter_name: String,
    pub batter_team_id: i64,
    pub batter_team_name: String,
    pub pitcher_name: String,
    pub pitcher_team_id: i64,
    pub pitcher_team_name: String,

    /// Plate appearances in the grouping (every at-bat record counts).
    pub appearances: u32,
    /// Official at-bats: appearances minus walks, HBP and sacrifices.
    pub at_bats: u32,
    pub hits: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub total_bases: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub sacrifice_flies: u32,
    pub strikeouts: u32,

    pub batting_average: f64,
    pub on_base_percentage: f64,
    pub slugging_percentage: f64,
    pub ops: f64,
}
