// src/stats.rs
//
// Folds classified at-bat outcomes into batting/pitching statistics.
// All rates are rounded half-up to 3 decimals; OPS is the sum of the two
// already-rounded components, matching how consumers display them.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{AtBatDetail, Game, MatchResult};
use crate::outcome;
use crate::store::Store;
use crate::teams;

/// Round half-up to 3 decimal places.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0 + 0.5).floor() / 1000.0
}

fn count(details: &[AtBatDetail], pred: impl Fn(&str) -> bool) -> u32 {
    details.iter().filter(|d| pred(&d.result)).count() as u32
}

pub fn at_bats(details: &[AtBatDetail]) -> u32 {
    count(details, outcome::counts_as_at_bat)
}

pub fn hits(details: &[AtBatDetail]) -> u32 {
    count(details, |r| outcome::classify(r).is_hit())
}

pub fn total_bases(details: &[AtBatDetail]) -> u32 {
    details
        .iter()
        .map(|d| outcome::classify(&d.result).hit_bases as u32)
        .sum()
}

pub fn batting_average(details: &[AtBatDetail]) -> f64 {
    let ab = at_bats(details);
    if ab == 0 {
        return 0.0;
    }
    round3(hits(details) as f64 / ab as f64)
}

pub fn slugging_percentage(details: &[AtBatDetail]) -> f64 {
    let ab = at_bats(details);
    if ab == 0 {
        return 0.0;
    }
    round3(total_bases(details) as f64 / ab as f64)
}

/// (hits + walks + HBP) over total plate appearances.
pub fn on_base_percentage(details: &[AtBatDetail]) -> f64 {
    if details.is_empty() {
        return 0.0;
    }
    let reached = hits(details)
        + count(details, |r| {
            let f = outcome::classify(r);
            f.is_walk || f.is_hit_by_pitch
        });
    round3(reached as f64 / details.len() as f64)
}

pub fn ops(details: &[AtBatDetail]) -> f64 {
    slugging_percentage(details) + on_base_percentage(details)
}

/// Collapse a side's team identity: a grouping spanning several teams
/// reports the "multiple" sentinel instead of any single team.
fn side_identity(team_ids: impl Iterator<Item = i64>, first_id: i64, first_short: &str) -> (i64, String) {
    let unique: BTreeSet<i64> = team_ids.collect();
    if unique.len() > 1 {
        (teams::MULTI_TEAM_ID, s!(teams::MULTI_TEAM_LABEL))
    } else {
        (first_id, s!(first_short))
    }
}

fn team_on(store: &dyn Store, player_id: i64, date: NaiveDate) -> i64 {
    store
        .affiliations_for_player(player_id)
        .iter()
        .find(|a| a.covers(date))
        .map_or(0, |a| a.team_id)
}

/// Join a game's at-bats with both sides' identity as of the game date.
/// At-bats whose players can no longer be resolved are dropped with a
/// warning.
pub fn details_for_game(store: &dyn Store, game: &Game) -> Vec<AtBatDetail> {
    store
        .find_at_bats_by_game(game.game_id)
        .into_iter()
        .filter_map(|ab| {
            let (Some(batter), Some(pitcher)) =
                (store.find_player(ab.batter_id), store.find_player(ab.pitcher_id))
            else {
                log::warn!(
                    "at_bat {} references missing player(s) {}/{}",
                    ab.at_bat_id,
                    ab.batter_id,
                    ab.pitcher_id
                );
                return None;
            };
            let batter_team_id = team_on(store, ab.batter_id, game.game_date);
            let pitcher_team_id = team_on(store, ab.pitcher_id, game.game_date);
            Some(AtBatDetail {
                batter_id: ab.batter_id,
                batter_name: batter.name,
                batter_team_id,
                batter_team_short: s!(teams::short_name(batter_team_id)),
                pitcher_id: ab.pitcher_id,
                pitcher_name: pitcher.name,
                pitcher_team_id,
                pitcher_team_short: s!(teams::short_name(pitcher_team_id)),
                result: ab.result,
            })
        })
        .collect()
}

/// Compute one statistics row for a grouping of at-bats sharing a key.
/// Returns None for an empty grouping.
pub fn summarize(details: &[AtBatDetail]) -> Option<MatchResult> {
    let first = details.first()?;

    let (batter_team_id, batter_team_name) = side_identity(
        details.iter().map(|d| d.batter_team_id),
        first.batter_team_id,
        &first.batter_team_short,
    );
    let (pitcher_team_id, pitcher_team_name) = side_identity(
        details.iter().map(|d| d.pitcher_team_id),
        first.pitcher_team_id,
        &first.pitcher_team_short,
    );

    let facts: Vec<_> = details.iter().map(|d| outcome::classify(&d.result)).collect();
    let by = |f: fn(&outcome::OutcomeFacts) -> bool| facts.iter().filter(|x| f(x)).count() as u32;

    Some(MatchResult {
        batter_name: first.batter_name.clone(),
        batter_team_id,
        batter_team_name,
        pitcher_name: first.pitcher_name.clone(),
        pitcher_team_id,
        pitcher_team_name,

        appearances: details.len() as u32,
        at_bats: at_bats(details),
        hits: hits(details),
        singles: by(|f| f.hit_bases == 1),
        doubles: by(|f| f.hit_bases == 2),
        triples: by(|f| f.hit_bases == 3),
        home_runs: by(|f| f.hit_bases == 4),
        total_bases: total_bases(details),
        walks: by(|f| f.is_walk),
        hit_by_pitch: by(|f| f.is_hit_by_pitch),
        sacrifice_flies: by(|f| f.is_sacrifice_fly),
        strikeouts: by(|f| f.is_strikeout),

        batting_average: batting_average(details),
        on_base_percentage: on_base_percentage(details),
        slugging_percentage: slugging_percentage(details),
        ops: ops(details),
    })
}

/// Batter perspective: one row per opposing pitcher, ordered by the
/// pitcher's team id ascending, then appearance count descending.
pub fn summarize_by_pitcher(details: &[AtBatDetail]) -> Vec<MatchResult> {
    grouped(details, |d| d.pitcher_id, |m| m.pitcher_team_id)
}

/// Pitcher perspective: one row per opposing batter.
pub fn summarize_by_batter(details: &[AtBatDetail]) -> Vec<MatchResult> {
    grouped(details, |d| d.batter_id, |m| m.batter_team_id)
}

fn grouped(
    details: &[AtBatDetail],
    key: impl Fn(&AtBatDetail) -> i64,
    team_of: impl Fn(&MatchResult) -> i64,
) -> Vec<MatchResult> {
    let mut groups: BTreeMap<i64, Vec<AtBatDetail>> = BTreeMap::new();
    for d in details {
        groups.entry(key(d)).or_default().push(d.clone());
    }
    let mut rows: Vec<MatchResult> = groups.values().filter_map(|g| summarize(g)).collect();
    rows.sort_by(|a, b| {
        team_of(a)
            .cmp(&team_of(b))
            .then(b.appearances.cmp(&a.appearances))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(result: &str) -> AtBatDetail {
        detail_vs(result, 1, 4, "阪神")
    }

    fn detail_vs(result: &str, pitcher_id: i64, pitcher_team_id: i64, pitcher_short: &str) -> AtBatDetail {
        AtBatDetail {
            batter_id: 100,
            batter_name: s!("近本"),
            batter_team_id: 12,
            batter_team_short: s!("楽天"),
            pitcher_id,
            pitcher_name: s!("才木"),
            pitcher_team_id,
            pitcher_team_short: s!(pitcher_short),
            result: s!(result),
        }
    }

    #[test]
    fn round3_is_half_up() {
        assert_eq!(round3(0.3335), 0.334);
        assert_eq!(round3(0.3334), 0.333);
        assert_eq!(round3(1.0 / 3.0), 0.333);
    }

    #[test]
    fn hand_computed_rates() {
        // 10 PA: 3 singles, 1 double, 1 walk, 5 generic outs.
        let mut details: Vec<_> = ["右安", "中安", "左安", "左２"].iter().map(|t| detail(t)).collect();
        details.push(detail("四　球"));
        details.extend(["遊ゴロ", "二ゴロ", "中飛", "右飛", "三　振"].iter().map(|t| detail(t)));

        // 9 at-bats (walk excluded), 4 hits, 6 total bases.
        assert_eq!(at_bats(&details), 9);
        assert_eq!(hits(&details), 4);
        assert_eq!(total_bases(&details), 6);
        assert_eq!(batting_average(&details), 0.444);
        assert_eq!(slugging_percentage(&details), 0.667);
        assert_eq!(on_base_percentage(&details), 0.5);
        assert_eq!(ops(&details), 1.167);
    }

    #[test]
    fn zero_at_bats_yields_zero_rates() {
        let details = vec![detail("四　球"), detail("犠打")];
        assert_eq!(batting_average(&details), 0.0);
        assert_eq!(slugging_percentage(&details), 0.0);
        // Walks still reach base.
        assert_eq!(on_base_percentage(&details), 0.5);
    }

    #[test]
    fn summarize_counts() {
        let details = vec![detail("左本"), detail("死　球"), detail("犠飛"), detail("三　振")];
        let m = summarize(&details).unwrap();
        assert_eq!(m.appearances, 4);
        assert_eq!(m.at_bats, 2);
        assert_eq!(m.home_runs, 1);
        assert_eq!(m.total_bases, 4);
        assert_eq!(m.hit_by_pitch, 1);
        assert_eq!(m.sacrifice_flies, 1);
        assert_eq!(m.strikeouts, 1);
        assert_eq!(m.pitcher_team_id, 4);
        assert_eq!(m.pitcher_team_name, "阪神");
    }

    #[test]
    fn multi_team_grouping_uses_sentinel() {
        let details = vec![
            detail_vs("右安", 1, 4, "阪神"),
            detail_vs("遊ゴロ", 2, 5, "広島"),
        ];
        let m = summarize(&details).unwrap();
        assert_eq!(m.pitcher_team_id, teams::MULTI_TEAM_ID);
        assert_eq!(m.pitcher_team_name, teams::MULTI_TEAM_LABEL);
        // The batter side is uniform and keeps its team.
        assert_eq!(m.batter_team_id, 12);
    }

    #[test]
    fn by_pitcher_sorts_team_then_volume() {
        let mut details = vec![
            detail_vs("右安", 10, 5, "広島"),
            detail_vs("遊ゴロ", 20, 4, "阪神"),
            detail_vs("中飛", 30, 4, "阪神"),
            detail_vs("左２", 30, 4, "阪神"),
        ];
        details.push(detail_vs("三　振", 10, 5, "広島"));
        let rows = summarize_by_pitcher(&details);
        assert_eq!(rows.len(), 3);
        // Team 4 rows first; among them, pitcher 30 (2 PA) before 20 (1 PA).
        assert_eq!(rows[0].pitcher_team_id, 4);
        assert_eq!(rows[0].appearances, 2);
        assert_eq!(rows[1].pitcher_team_id, 4);
        assert_eq!(rows[1].appearances, 1);
        assert_eq!(rows[2].pitcher_team_id, 5);
    }
}
