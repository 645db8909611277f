// src/teams.rs
//
// Static reference table for the twelve NPB franchises. The engine never
// mutates teams; name classification is substring-based because scraped
// text ranges from full franchise names to spaced abbreviations
// ("西　武") depending on the page.

use crate::model::{League, Team};

pub struct TeamInfo {
    pub id: i64,
    pub name: &'static str,
    pub short_name: &'static str,
    pub league: League,
    /// Fragments that identify this team inside scraped text.
    fragments: &'static [&'static str],
}

/// Sentinel used when a statistics grouping spans several teams.
pub const MULTI_TEAM_ID: i64 = 13;
pub const MULTI_TEAM_LABEL: &str = "複数";

use League::{Central, Pacific};

static TEAMS: &[TeamInfo] = &[
    TeamInfo { id: 1, name: "東京ヤクルトスワローズ", short_name: "ヤクルト", league: Central, fragments: &["ヤクルト"] },
    TeamInfo { id: 2, name: "読売ジャイアンツ", short_name: "巨人", league: Central, fragments: &["読売", "巨人"] },
    TeamInfo { id: 3, name: "横浜DeNAベイスターズ", short_name: "DeNA", league: Central, fragments: &["横浜", "横　浜", "DeNA"] },
    TeamInfo { id: 4, name: "阪神タイガース", short_name: "阪神", league: Central, fragments: &["阪神"] },
    TeamInfo { id: 5, name: "広島東洋カープ", short_name: "広島", league: Central, fragments: &["広島"] },
    TeamInfo { id: 6, name: "中日ドラゴンズ", short_name: "中日", league: Central, fragments: &["中日"] },
    TeamInfo { id: 7, name: "福岡ソフトバンクホークス", short_name: "ソフトバンク", league: Pacific, fragments: &["ソフトバンク"] },
    TeamInfo { id: 8, name: "北海道日本ハムファイターズ", short_name: "日本ハム", league: Pacific, fragments: &["日本ハム"] },
    TeamInfo { id: 9, name: "埼玉西武ライオンズ", short_name: "西武", league: Pacific, fragments: &["西武", "西　武"] },
    TeamInfo { id: 10, name: "オリックス・バファローズ", short_name: "オリックス", league: Pacific, fragments: &["オリックス"] },
    TeamInfo { id: 11, name: "千葉ロッテマリーンズ", short_name: "ロッテ", league: Pacific, fragments: &["ロッテ"] },
    TeamInfo { id: 12, name: "東北楽天ゴールデンイーグルス", short_name: "楽天", league: Pacific, fragments: &["楽天"] },
];

/// Classify a scraped team name. Returns None for names matching no
/// franchise fragment; callers treat that as a hard failure.
pub fn id_for_name(name: &str) -> Option<i64> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    TEAMS
        .iter()
        .find(|t| t.fragments.iter().any(|f| name.contains(f)))
        .map(|t| t.id)
}

pub fn by_id(team_id: i64) -> Option<&'static TeamInfo> {
    TEAMS.iter().find(|t| t.id == team_id)
}

pub fn short_name(team_id: i64) -> &'static str {
    if team_id == MULTI_TEAM_ID {
        return MULTI_TEAM_LABEL;
    }
    by_id(team_id).map_or("", |t| t.short_name)
}

pub fn all() -> impl Iterator<Item = Team> {
    TEAMS.iter().map(|t| Team {
        team_id: t.id,
        name: s!(t.name),
        short_name: s!(t.short_name),
        league: t.league,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_classify_scraped_variants() {
        assert_eq!(id_for_name("西武"), Some(9));
        assert_eq!(id_for_name("西　武"), Some(9));
        assert_eq!(id_for_name("横浜DeNAベイスターズ"), Some(3));
        assert_eq!(id_for_name("読売ジャイアンツ"), Some(2));
        assert_eq!(id_for_name("巨人"), Some(2));
    }

    #[test]
    fn unknown_names_do_not_classify() {
        assert_eq!(id_for_name(""), None);
        assert_eq!(id_for_name("メジャーリーグ選抜"), None);
    }

    #[test]
    fn short_name_handles_sentinel() {
        assert_eq!(short_name(12), "楽天");
        assert_eq!(short_name(MULTI_TEAM_ID), MULTI_TEAM_LABEL);
    }
}
