// src/scrape/schedule.rs
//
// Schedule discovery on both sources. The box source publishes a monthly
// calendar whose game links carry the date in the path; the pitch source
// publishes a daily list of game cards.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::params;
use crate::scrape::text_of;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxGameLink {
    pub date: NaiveDate,
    pub url: String,
}

fn score_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/scores/(\d{4})/(\d{2})(\d{2})/").expect("static regex")
    })
}

fn game_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/game/(\d+)/").expect("static regex"))
}

/// Pull box-score links out of a monthly schedule page. Links whose
/// parent element carries a `div.cancel` sibling mark postponed games
/// and are skipped. Dates that do not form a real calendar day (the
/// site has no such links, but the regex alone cannot know) are
/// skipped too.
pub fn box_game_links(doc: &Html) -> Vec<BoxGameLink> {
    let anchors = sel!("a[href]");
    let cancel = sel!("div.cancel");
    let mut out = Vec::new();
    for a in doc.select(&anchors) {
        let href = match a.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let caps = match score_path_re().captures(href) {
            Some(c) => c,
            None => continue,
        };
        let cancelled = a
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| p.select(&cancel).next().is_some())
            .unwrap_or(false);
        if cancelled {
            continue;
        }
        let ymd: [u32; 3] = [1, 2, 3].map(|i| {
            caps.get(i).map_or(0, |m| m.as_str().parse().unwrap_or(0))
        });
        let date = match NaiveDate::from_ymd_opt(ymd[0] as i32, ymd[1], ymd[2]) {
            Some(d) => d,
            None => continue,
        };
        out.push(BoxGameLink { date, url: format!("{}{}box.html", params::BOX_BASE, href) });
    }
    out
}

/// Game ids listed on a pitch-source daily schedule page.
pub fn pitch_game_ids(doc: &Html) -> Vec<String> {
    let cards = sel!("a.bb-score__content");
    let mut out = Vec::new();
    for a in doc.select(&cards) {
        let href = match a.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        if let Some(caps) = game_id_re().captures(href) {
            let id = caps[1].to_string();
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
    out
}

/// A pitch-source game top page reports 試合終了 once final. Anything
/// else (in progress, suspended, not started) is not walked.
pub fn is_finished(doc: &Html) -> bool {
    let state = sel!("p.bb-gameCard__state");
    doc.select(&state).any(|p| text_of(p).contains("試合終了"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_links_filter_cancelled_and_foreign() {
        let doc = Html::parse_document(
            r#"
            <div><a href="/scores/2024/0916/t-e-22/">阪神 - 楽天</a></div>
            <div><a href="/scores/2024/0916/g-db-21/">巨人 - DeNA</a><div class="cancel">中止</div></div>
            <div><a href="/bis/players/123.html">選手</a></div>
            "#,
        );
        let links = box_game_links(&doc);
        assert_eq!(
            links,
            vec![BoxGameLink {
                date: NaiveDate::from_ymd_opt(2024, 9, 16).unwrap(),
                url: s!("https://npb.jp/scores/2024/0916/t-e-22/box.html"),
            }]
        );
    }

    #[test]
    fn pitch_ids_extract_and_dedupe() {
        let doc = Html::parse_document(
            r#"
            <a class="bb-score__content" href="/npb/game/2021028553/index"></a>
            <a class="bb-score__content" href="/npb/game/2021028553/index"></a>
            <a class="bb-score__content" href="/npb/game/2021028554/index"></a>
            <a class="bb-score__content" href="/npb/standings/"></a>
            "#,
        );
        assert_eq!(pitch_game_ids(&doc), vec![s!("2021028553"), s!("2021028554")]);
    }

    #[test]
    fn finished_state_detection() {
        let done = Html::parse_document(r#"<p class="bb-gameCard__state">試合終了</p>"#);
        let live = Html::parse_document(r#"<p class="bb-gameCard__state">7回表</p>"#);
        assert!(is_finished(&done));
        assert!(!is_finished(&live));
    }
}
