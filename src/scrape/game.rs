// src/scrape/game.rs
//
// Game resolution: date/stadium/teams/score extraction and dedup against
// the store. The box page lists the away side on top, the home side on
// the bottom.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;

use crate::error::{Result, ScrapeError};
use crate::model::Game;
use crate::scrape::text_of;
use crate::store::{NewGame, Store};
use crate::teams;

/// Title keywords marking games outside statistical scope.
const SPECIAL_EVENT_KEYWORDS: [&str; 3] = ["オールスター", "日本シリーズ", "クライマックス"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameMeta {
    pub date: NaiveDate,
    pub stadium: String,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i64,
    pub away_score: i64,
}

pub fn is_special_event(title: &str) -> bool {
    SPECIAL_EVENT_KEYWORDS.iter().any(|k| title.contains(k))
}

fn kanji_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").expect("static regex"))
}

/// Parse either of the two accepted date-text forms:
/// `yyyy年M月d日…` (with arbitrary trailing decoration) or `yyyy/MM/dd`.
pub fn parse_date_text(text: &str) -> Result<NaiveDate> {
    if let Some(caps) = kanji_date_re().captures(text) {
        let (y, m, d) = (cap_num(&caps, 1), cap_num(&caps, 2), cap_num(&caps, 3));
        return NaiveDate::from_ymd_opt(y as i32, m, d)
            .ok_or_else(|| ScrapeError::DateParse(s!(text)));
    }
    NaiveDate::parse_from_str(text.trim(), "%Y/%m/%d")
        .map_err(|_| ScrapeError::DateParse(s!(text)))
}

fn cap_num(caps: &regex::Captures, i: usize) -> u32 {
    caps.get(i).map_or(0, |m| m.as_str().parse().unwrap_or(0))
}

fn team_id(name: &str) -> Result<i64> {
    teams::id_for_name(name).ok_or_else(|| ScrapeError::UnknownTeam(s!(name)))
}

/// Extract game metadata from a box page.
pub fn parse_box_game(doc: &Html) -> Result<GameMeta> {
    let place = sel!("span.place");
    let stadium = doc
        .select(&place)
        .next()
        .map(text_of)
        .ok_or(ScrapeError::ElementNotFound { context: "stadium (span.place)" })?;

    let time = sel!("time");
    let date_text = doc
        .select(&time)
        .next()
        .map(text_of)
        .ok_or(ScrapeError::ElementNotFound { context: "game date (time)" })?;
    let date = parse_date_text(&date_text)?;

    let (away_team_id, away_score) = parse_score_row(doc, "tr.top")?;
    let (home_team_id, home_score) = parse_score_row(doc, "tr.bottom")?;

    Ok(GameMeta { date, stadium, home_team_id, away_team_id, home_score, away_score })
}

fn parse_score_row(doc: &Html, row_css: &str) -> Result<(i64, i64)> {
    let name_sel = scraper::Selector::parse(&format!("{row_css} th span.hide_sp"))
        .map_err(|_| ScrapeError::Malformed(format!("selector {row_css}")))?;
    let total_sel = scraper::Selector::parse(&format!("{row_css} td.total-1"))
        .map_err(|_| ScrapeError::Malformed(format!("selector {row_css}")))?;

    let name = doc
        .select(&name_sel)
        .next()
        .map(text_of)
        .ok_or(ScrapeError::ElementNotFound { context: "score row team name" })?;
    let total = doc
        .select(&total_sel)
        .next()
        .map(text_of)
        .ok_or(ScrapeError::ElementNotFound { context: "score row total" })?;

    let score = total
        .parse::<i64>()
        .map_err(|_| ScrapeError::Malformed(format!("score cell {total:?}")))?;
    Ok((team_id(&name)?, score))
}

/// Extract (date, home team, away team) from a pitch-source game title,
/// e.g. `2024年9月16日 阪神vs.楽天 - プロ野球 - スポーツナビ`.
pub fn parse_title(title: &str) -> Result<(NaiveDate, i64, i64)> {
    let m = kanji_date_re()
        .find(title)
        .ok_or_else(|| ScrapeError::DateParse(s!(title)))?;
    let date = parse_date_text(m.as_str())?;

    let tail = title[m.end()..].trim();
    let mut sides = tail.splitn(2, "vs");
    let home_raw = sides.next().unwrap_or("");
    let away_raw = sides
        .next()
        .ok_or_else(|| ScrapeError::Malformed(format!("no vs separator in title {title:?}")))?;
    let away_raw = away_raw.trim_start_matches('.');
    let away_raw = away_raw.split(" - ").next().unwrap_or(away_raw);

    Ok((date, team_id(home_raw.trim())?, team_id(away_raw.trim())?))
}

/// Idempotent creation: at most one Game per (date, home, away).
pub fn ensure_game(store: &mut dyn Store, meta: &GameMeta) -> Game {
    if let Some(existing) =
        store.find_game_by_date_and_teams(meta.date, meta.home_team_id, meta.away_team_id)
    {
        log::debug!(
            "game already stored: {} home={} away={} (id {})",
            meta.date,
            meta.home_team_id,
            meta.away_team_id,
            existing.game_id
        );
        return existing;
    }
    store.create_game(NewGame {
        home_team_id: meta.home_team_id,
        away_team_id: meta.away_team_id,
        home_score: meta.home_score,
        away_score: meta.away_score,
        game_date: meta.date,
        stadium: meta.stadium.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn both_date_formats_parse() {
        assert_eq!(parse_date_text("2024年9月16日（月・祝）").unwrap(), date(2024, 9, 16));
        assert_eq!(parse_date_text("2024/09/16").unwrap(), date(2024, 9, 16));
        assert!(parse_date_text("9月16日").is_err());
    }

    #[test]
    fn title_splits_teams() {
        let (d, home, away) =
            parse_title("2024年9月16日 阪神vs.楽天 - プロ野球 - スポーツナビ").unwrap();
        assert_eq!(d, date(2024, 9, 16));
        assert_eq!(home, 4);
        assert_eq!(away, 12);

        // Space-separated "vs" without the dot also appears.
        let (_, home, away) = parse_title("2024年5月3日 巨人vsDeNA").unwrap();
        assert_eq!(home, 2);
        assert_eq!(away, 3);
    }

    #[test]
    fn unknown_team_is_a_hard_failure() {
        let err = parse_title("2024年7月23日 全セvs全パ").unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownTeam(_)));
    }

    #[test]
    fn special_events_detected_by_title() {
        assert!(is_special_event("マイナビオールスターゲーム2024"));
        assert!(is_special_event("SMBC日本シリーズ2024 第1戦"));
        assert!(!is_special_event("阪神vs.楽天"));
    }

    #[test]
    fn box_page_parses_and_sides_are_oriented() {
        let doc = Html::parse_document(FIXTURE);
        let meta = parse_box_game(&doc).unwrap();
        assert_eq!(
            meta,
            GameMeta {
                date: date(2024, 9, 16),
                stadium: s!("甲子園"),
                home_team_id: 4,
                away_team_id: 12,
                home_score: 3,
                away_score: 1,
            }
        );
    }

    #[test]
    fn ensure_game_is_idempotent() {
        let mut store = MemStore::new();
        let doc = Html::parse_document(FIXTURE);
        let meta = parse_box_game(&doc).unwrap();
        let first = ensure_game(&mut store, &meta);
        let second = ensure_game(&mut store, &meta);
        assert_eq!(first.game_id, second.game_id);
        assert!(store.find_game_by_date_and_teams(meta.date, 4, 12).is_some());
    }

    const FIXTURE: &str = r#"
<html><body>
<span class="place">甲子園</span>
<time>2024年9月16日（月・祝）</time>
<table>
<tr class="top"><th><span class="hide_sp">東北楽天ゴールデンイーグルス</span></th><td class="total-1">1</td></tr>
<tr class="bottom"><th><span class="hide_sp">阪神タイガース</span></th><td class="total-1">3</td></tr>
</table>
</body></html>
"#;
}
