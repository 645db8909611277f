// src/reconcile.rs
//
// Pairs a batting lineup's sequential outcomes with the opposing
// pitchers' batters-faced counts. Correct output depends entirely on the
// box-score parser having produced the outcome queue in true
// plate-appearance order.

use crate::error::{Result, ScrapeError};
use crate::model::NewAtBat;

/// One resolved entry of the batting team's outcome queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineupEntry {
    pub batter_id: i64,
    pub result: String,
}

/// One resolved entry of the fielding team's pitching order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PitcherEntry {
    pub pitcher_id: i64,
    pub batters_faced: u32,
}

/// Walk the pitcher list in order, consuming exactly `batters_faced`
/// entries off the front of the batting queue per pitcher.
///
/// An exhausted queue is a data-integrity fault: the error carries full
/// context and nothing is fabricated. Leftover batting entries after the
/// last pitcher are the known reconciliation gap between the two scrape
/// paths; they are surfaced as a warning, never silently dropped.
pub fn reconcile_at_bats(
    game_id: i64,
    batting: &[LineupEntry],
    pitchers: &[PitcherEntry],
) -> Result<Vec<NewAtBat>> {
    let mut out = Vec::with_capacity(batting.len());
    let mut next = 0usize;

    for pitcher in pitchers {
        for faced in 0..pitcher.batters_faced {
            let Some(entry) = batting.get(next) else {
                return Err(ScrapeError::Integrity(format!(
                    "batting queue exhausted: game={game_id} pitcher={} satisfied {faced}/{} \
                     after {next} total at-bats",
                    pitcher.pitcher_id, pitcher.batters_faced
                )));
            };
            out.push(NewAtBat {
                game_id,
                batter_id: entry.batter_id,
                pitcher_id: pitcher.pitcher_id,
                result: entry.result.clone(),
            });
            next += 1;
        }
    }

    if next < batting.len() {
        log::warn!(
            "game {game_id}: {} batting entries left after all pitchers were consumed: {:?}",
            batting.len() - next,
            &batting[next..]
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(batter_id: i64, result: &str) -> LineupEntry {
        LineupEntry { batter_id, result: s!(result) }
    }

    #[test]
    fn splits_queue_by_batters_faced() {
        let batting = vec![
            entry(1, "右安"),
            entry(2, "三　振"),
            entry(3, "四　球"),
            entry(4, "遊ゴロ"),
            entry(5, "左本"),
        ];
        let pitchers = vec![
            PitcherEntry { pitcher_id: 10, batters_faced: 2 },
            PitcherEntry { pitcher_id: 20, batters_faced: 3 },
        ];

        let rows = reconcile_at_bats(77, &batting, &pitchers).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows[..2].iter().all(|r| r.pitcher_id == 10));
        assert!(rows[2..].iter().all(|r| r.pitcher_id == 20));
        // Queue order is preserved exactly.
        let batters: Vec<i64> = rows.iter().map(|r| r.batter_id).collect();
        assert_eq!(batters, vec![1, 2, 3, 4, 5]);
        assert_eq!(rows[4].result, "左本");
        assert!(rows.iter().all(|r| r.game_id == 77));
    }

    #[test]
    fn exhausted_queue_is_an_integrity_error() {
        let batting = vec![entry(1, "右安")];
        let pitchers = vec![PitcherEntry { pitcher_id: 10, batters_faced: 3 }];
        let err = reconcile_at_bats(77, &batting, &pitchers).unwrap_err();
        assert!(matches!(err, ScrapeError::Integrity(_)));
        assert!(err.to_string().contains("pitcher=10"));
    }

    #[test]
    fn empty_inputs_produce_nothing() {
        assert!(reconcile_at_bats(1, &[], &[]).unwrap().is_empty());
    }
}
