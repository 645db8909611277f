// src/scrape/pitches.rs
//
// Pitch-sequence walker. A pitch-source game is a chain of score pages,
// one per plate appearance, linked by opaque `index` tokens. Each page
// names the matchup (external player ids), carries a pitch table and a
// location chart, and points at the next token.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::{Result, ScrapeError};
use crate::model::{AtBatResult, PitchResult};
use crate::net::Fetch;
use crate::params;
use crate::scrape::game::parse_title;
use crate::scrape::player::resolve_by_source_id;
use crate::scrape::{text_of, title_of};
use crate::store::Store;
use crate::zone;

fn player_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/npb/player/(\d+)/top").expect("static regex"))
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"top:(-?\d+)px; left:(-?\d+)px").expect("static regex"))
}

/// The `index` token on the first-inning anchor; entry point of the walk.
pub fn start_index(doc: &Html) -> Option<String> {
    let a = sel!("a#inn_score[index]");
    doc.select(&a).next().and_then(|el| el.value().attr("index")).map(String::from)
}

/// The `index` token of the following plate appearance, absent on the
/// last page.
pub fn next_index(doc: &Html) -> Option<String> {
    let a = sel!("a#btn_next[index]");
    doc.select(&a).next().and_then(|el| el.value().attr("index")).map(String::from)
}

/// External (pitcher, batter) ids from the matchup table. Column order
/// varies; the header text decides which anchor is the pitcher. Pages
/// without a matchup (pitching changes, inning breaks) return None.
pub fn matchup_ext_ids(doc: &Html) -> Option<(u64, u64)> {
    let table = sel!("table#gm_rslt");
    let table = doc.select(&table).next()?;

    let th = sel!("thead th");
    let first_is_pitcher = table
        .select(&th)
        .next()
        .map(|h| text_of(h).contains("投手"))
        .unwrap_or(false);

    let a = sel!("tbody tr td a");
    let ids: Vec<u64> = table
        .select(&a)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| player_id_re().captures(href))
        .filter_map(|c| c[1].parse().ok())
        .collect();
    if ids.len() < 2 {
        return None;
    }
    if first_is_pitcher {
        Some((ids[0], ids[1]))
    } else {
        Some((ids[1], ids[0]))
    }
}

/// Short name of the side currently batting, from the `◯◯攻撃中` banner.
pub fn attacking_team(doc: &Html) -> Option<String> {
    let p = sel!("p");
    doc.select(&p).find_map(|el| {
        let text = text_of(el);
        text.strip_suffix("攻撃中").map(|team| team.trim().to_string())
    })
}

/// Zone per chart pitch number, from the location chart's ball markers.
/// A missing chart yields an empty map (every zone records as None).
fn course_map(section: ElementRef) -> HashMap<u32, u8> {
    let chart = sel!(".bb-allocationChart");
    let ball = sel!("span.bb-icon__ballCircle");
    let number = sel!(".bb-icon__number");

    let mut map = HashMap::new();
    let Some(chart) = section.select(&chart).next() else {
        return map;
    };
    for span in chart.select(&ball) {
        let Some(style) = span.value().attr("style") else { continue };
        let Some(caps) = style_re().captures(style) else { continue };
        let (Ok(top), Ok(left)) = (caps[1].parse::<i32>(), caps[2].parse::<i32>()) else {
            continue;
        };
        let Some(no) = span
            .select(&number)
            .next()
            .and_then(|n| text_of(n).parse::<u32>().ok())
        else {
            continue;
        };
        map.insert(no, zone::zone_for_marker(top, left));
    }
    map
}

fn parse_speed(text: &str) -> u32 {
    text.trim().trim_end_matches("km/h").parse().unwrap_or(0)
}

/// Pitch rows for one plate appearance. The pitch table numbers pitches
/// per pitcher appearance, not per at-bat; the chart numbers them per
/// at-bat. Sequence numbers are re-based on the table's first row so the
/// two line up.
pub fn parse_pitch_rows(section: ElementRef, at_bat_id: i64) -> Result<Vec<PitchResult>> {
    let zones = course_map(section);

    let table_sel = sel!("table.bb-splitsTable");
    let th = sel!("th");
    let Some(table) = section
        .select(&table_sel)
        .find(|t| t.select(&th).any(|h| text_of(h).contains("投球数")))
    else {
        return Ok(Vec::new());
    };

    let tr = sel!("tbody tr");
    let td = sel!("td");
    let rows: Vec<Vec<String>> = table
        .select(&tr)
        .map(|r| r.select(&td).map(text_of).collect())
        .collect();

    let Some(first_no) = rows.iter().find(|cells| cells.len() >= 4).map(|cells| {
        cells[1]
            .parse::<u32>()
            .map_err(|_| ScrapeError::Malformed(format!("pitch number {:?}", cells[1])))
    }) else {
        return Ok(Vec::new());
    };
    let first = first_no?;
    let Some(offset) = first.checked_sub(1) else {
        return Err(ScrapeError::Malformed(format!("pitch numbering starts at {first}")));
    };

    let recorded_at = chrono::Local::now().naive_local();
    let mut out = Vec::new();
    for cells in &rows {
        if cells.len() < 4 {
            continue;
        }
        let no: u32 = cells[1]
            .parse()
            .map_err(|_| ScrapeError::Malformed(format!("pitch number {:?}", cells[1])))?;
        let sequence = match no.checked_sub(offset) {
            Some(seq) if seq >= 1 => seq,
            _ => {
                return Err(ScrapeError::Malformed(format!(
                    "pitch number {no} precedes table start {first}"
                )))
            }
        };
        let outcome_cell = if cells.len() >= 5 { &cells[4] } else { &cells[3] };
        out.push(PitchResult {
            at_bat_id,
            sequence,
            pitch_type: cells[2].clone(),
            speed_kmh: parse_speed(&cells[3]),
            zone: zones.get(&sequence).copied(),
            outcome: outcome_cell.replace('\n', " ").trim().to_string(),
            recorded_at,
        });
    }
    Ok(out)
}

fn pop_matching(
    queue: &mut Vec<AtBatResult>,
    batter_id: i64,
    pitcher_id: i64,
) -> Option<AtBatResult> {
    let pos = queue
        .iter()
        .position(|ab| ab.batter_id == batter_id && ab.pitcher_id == pitcher_id)?;
    Some(queue.remove(pos))
}

/// Walk a finished game's plate-appearance chain and persist the pitch
/// rows against the stored at-bats. Returns the number of rows stored.
///
/// A plate appearance interrupted by a pitching change reappears on a
/// later page with the same batter and pitcher for the batting side; the
/// later page repeats the earlier pitches, so the earlier rows are
/// discarded and the at-bat is filled from the later page alone.
pub fn walk_game(store: &mut dyn Store, fetch: &mut dyn Fetch, ext_game_id: &str) -> Result<usize> {
    let top = fetch.fetch(&params::game_top_url(ext_game_id))?;
    let title = title_of(&top)
        .ok_or(ScrapeError::ElementNotFound { context: "game page title" })?;
    let (date, home_team_id, away_team_id) = parse_title(&title)?;

    let game = store
        .find_game_by_date_and_teams(date, home_team_id, away_team_id)
        .ok_or_else(|| {
            ScrapeError::Integrity(format!(
                "no stored game for {date} home={home_team_id} away={away_team_id}"
            ))
        })?;

    let mut pending = store.find_at_bats_by_game(game.game_id);
    if pending.is_empty() {
        log::warn!("game {} has no stored at-bats, skipping pitch walk", game.game_id);
        return Ok(0);
    }

    let start = fetch.fetch(&params::score_start_url(ext_game_id))?;
    let mut index = start_index(&start);

    let mut collected: Vec<PitchResult> = Vec::new();
    // Continuation detection is keyed on the batting side: the same
    // matchup reappearing for the same side is the same plate appearance.
    let mut last_by_team: HashMap<String, AtBatResult> = HashMap::new();

    while let Some(token) = index {
        if pending.is_empty() {
            break;
        }
        let page = match visit_page(store, fetch, ext_game_id, &token) {
            Ok(p) => p,
            Err(err) => {
                log::error!(
                    "pitch walk aborted: game={} index={} err={}",
                    ext_game_id,
                    token,
                    err
                );
                break;
            }
        };
        let Page { doc, matchup } = page;

        let Some((batter_id, pitcher_id, team)) = matchup else {
            index = next_index(&doc);
            continue;
        };

        let continued = last_by_team.get(&team).filter(|last| {
            last.batter_id == batter_id && last.pitcher_id == pitcher_id
        });
        let current = if let Some(last) = continued {
            let last = last.clone();
            collected.retain(|pr| pr.at_bat_id != last.at_bat_id);
            log::info!("continued plate appearance, re-reading at_bat {}", last.at_bat_id);
            last
        } else if let Some(ab) = pop_matching(&mut pending, batter_id, pitcher_id) {
            last_by_team.insert(team, ab.clone());
            ab
        } else {
            // Pinch hits and mid-appearance substitutions leave page
            // matchups with no stored counterpart.
            log::warn!(
                "no stored at-bat for batter={} pitcher={} ({} remaining), skipping page",
                batter_id,
                pitcher_id,
                pending.len()
            );
            index = next_index(&doc);
            continue;
        };

        let rows = {
            let section_sel = sel!("section.bb-splits__item");
            let Some(section) = doc.select(&section_sel).nth(1) else {
                log::error!(
                    "pitch walk aborted: game={} index={} missing splits section",
                    ext_game_id,
                    token
                );
                break;
            };
            match parse_pitch_rows(section, current.at_bat_id) {
                Ok(rows) => rows,
                Err(err) => {
                    log::error!(
                        "pitch walk aborted: game={} index={} err={}",
                        ext_game_id,
                        token,
                        err
                    );
                    break;
                }
            }
        };
        collected.extend(rows);
        index = next_index(&doc);
    }

    if !pending.is_empty() {
        log::info!("game {}: {} at-bats without pitch data", game.game_id, pending.len());
    }

    let stored = collected.len();
    if stored > 0 {
        store.create_pitch_results(collected);
    }
    Ok(stored)
}

struct Page {
    doc: Html,
    /// (batter, pitcher, attacking side), None on pages without a matchup.
    matchup: Option<(i64, i64, String)>,
}

fn visit_page(
    store: &mut dyn Store,
    fetch: &mut dyn Fetch,
    ext_game_id: &str,
    token: &str,
) -> Result<Page> {
    let doc = fetch.fetch(&params::score_url(ext_game_id, token))?;
    let Some((pitcher_ext, batter_ext)) = matchup_ext_ids(&doc) else {
        return Ok(Page { doc, matchup: None });
    };
    let pitcher = resolve_by_source_id(store, fetch, pitcher_ext)?;
    let batter = resolve_by_source_id(store, fetch, batter_ext)?;
    let team = attacking_team(&doc).unwrap_or_default();
    Ok(Page { doc, matchup: Some((batter.player_id, pitcher.player_id, team)) })
}
