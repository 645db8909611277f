// src/scrape/boxscore.rs
//
// Box-score page parser. The batting table has one row per lineup slot
// and one column per plate appearance in the game; because the order
// cycles, a column's filled cells do not restart at row 0. The cyclic
// walk below recovers true plate-appearance chronology; everything the
// at-bat reconciler does depends on this order being right.

use scraper::{ElementRef, Html};

use crate::error::{Result, ScrapeError};
use crate::params::{BOX_BATTERS_FACED_CELL, BOX_FIRST_RESULT_CELL, BOX_NAME_CELL, NO_APPEARANCE};
use crate::scrape::text_of;

/// One recorded plate appearance, in chronological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatterLine {
    pub name: String,
    pub result: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PitcherLine {
    pub name: String,
    pub batters_faced: u32,
}

/// One team's half of the box score.
#[derive(Clone, Debug, Default)]
pub struct TeamHalf {
    pub team_name: String,
    pub batters: Vec<BatterLine>,
    pub pitchers: Vec<PitcherLine>,
}

/// Full box score: `top` is the away side, `bottom` the home side.
#[derive(Clone, Debug)]
pub struct BoxScore {
    pub top: TeamHalf,
    pub bottom: TeamHalf,
}

pub fn parse_box_score(doc: &Html) -> Result<BoxScore> {
    let h4 = sel!("h4");
    let mut headings = doc.select(&h4).map(text_of);
    let top_team = headings.next().ok_or(ScrapeError::ElementNotFound {
        context: "box score team headings (h4)",
    })?;
    let bottom_team = headings.next().ok_or(ScrapeError::ElementNotFound {
        context: "box score second team heading (h4)",
    })?;

    let top = parse_half(doc, "table_top_b", "table_top_p", top_team)?;
    let bottom = parse_half(doc, "table_bottom_b", "table_bottom_p", bottom_team)?;
    Ok(BoxScore { top, bottom })
}

fn parse_half(doc: &Html, batting_id: &str, pitching_id: &str, team_name: String) -> Result<TeamHalf> {
    let batting_div = select_div(doc, batting_id)?;
    let pitching_div = select_div(doc, pitching_id)?;
    Ok(TeamHalf {
        team_name,
        batters: parse_batting(batting_div),
        pitchers: parse_pitching(pitching_div),
    })
}

fn select_div<'a>(doc: &'a Html, id: &str) -> Result<ElementRef<'a>> {
    let selector = scraper::Selector::parse(&format!("div#{id}"))
        .map_err(|_| ScrapeError::Malformed(format!("selector for div#{id}")))?;
    doc.select(&selector).next().ok_or(ScrapeError::ElementNotFound {
        context: "box score table container",
    })
}

/// Batting results in true plate-appearance order.
fn parse_batting(div: ElementRef) -> Vec<BatterLine> {
    let inn = sel!("tr .inn");
    let column_count = div.select(&inn).count();

    let tr = sel!("table tbody tr");
    let td = sel!("td");
    let grid: Vec<Vec<String>> = div
        .select(&tr)
        .map(|row| row.select(&td).map(text_of).collect())
        .collect();

    let mut out = Vec::new();
    let mut cursor = None;
    for col in BOX_FIRST_RESULT_CELL..BOX_FIRST_RESULT_CELL + column_count {
        let (entries, next) = walk_column(&grid, col, cursor);
        out.extend(entries);
        cursor = next;
    }
    out
}

/// Read one plate-appearance column in chronological order.
///
/// `cursor` is the row where the previous column's last entry was read
/// (None at the start of the table, or after a column ended exactly on
/// the bottom row). With a cursor, the scan runs (cursor+1)..=bottom and
/// then wraps 0..=cursor; rows without cells are spacers and recording a
/// cell moves the cursor. A column ending on the bottom row resets the
/// cursor so the next column scans top-to-bottom again.
pub(crate) fn walk_column(
    grid: &[Vec<String>],
    col: usize,
    cursor: Option<usize>,
) -> (Vec<BatterLine>, Option<usize>) {
    let Some(last_row) = grid.len().checked_sub(1) else {
        return (Vec::new(), None);
    };

    let mut out = Vec::new();
    let mut last_recorded = 0usize;

    let mut scan = |row: usize, out: &mut Vec<BatterLine>, last_recorded: &mut usize| {
        let cells = &grid[row];
        if cells.is_empty() {
            return;
        }
        let (Some(name), Some(result)) = (cells.get(BOX_NAME_CELL), cells.get(col)) else {
            return;
        };
        if result != NO_APPEARANCE {
            out.push(BatterLine { name: name.clone(), result: result.clone() });
            *last_recorded = row;
        }
    };

    match cursor {
        None => {
            for row in 0..=last_row {
                scan(row, &mut out, &mut last_recorded);
            }
        }
        Some(from) => {
            for row in from + 1..=last_row {
                scan(row, &mut out, &mut last_recorded);
            }
            for row in 0..=from.min(last_row) {
                scan(row, &mut out, &mut last_recorded);
            }
        }
    }

    let next = if last_recorded == last_row { None } else { Some(last_recorded) };
    (out, next)
}

fn parse_pitching(div: ElementRef) -> Vec<PitcherLine> {
    let tr = sel!("tr");
    let player_cell = sel!("td.player");
    let td = sel!("td");

    let mut out = Vec::new();
    for row in div.select(&tr) {
        let Some(player) = row.select(&player_cell).next() else {
            continue;
        };
        let cells: Vec<String> = row.select(&td).map(text_of).collect();
        let Some(faced) = cells.get(BOX_BATTERS_FACED_CELL) else {
            continue;
        };
        match faced.parse::<u32>() {
            Ok(batters_faced) => out.push(PitcherLine { name: text_of(player), batters_faced }),
            Err(_) => {
                log::warn!("unparseable batters-faced cell {faced:?} for {:?}", text_of(player));
            }
        }
    }
    out
}
