// src/params.rs
//
// Fixed bindings to the two source sites. Everything timing-related lives
// in config.rs instead, so tests can zero it out.

/// Box source (npb.jp): monthly schedule and per-game box scores.
pub const BOX_BASE: &str = "https://npb.jp";

/// Pitch source (baseball.yahoo.co.jp): daily schedule, per-pitch score
/// pages and player profiles.
pub const PITCH_BASE: &str = "https://baseball.yahoo.co.jp";

/// Game-kind codes accepted by the pitch source's schedule page.
pub const KIND_REGULAR: &str = "1,2";
pub const KIND_INTERLEAGUE: &str = "26";

/// Rotating identity pool for outbound requests.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// In the box score's batting table, cell 2 is the player name and the
/// per-plate-appearance result columns start at cell 8.
pub const BOX_NAME_CELL: usize = 2;
pub const BOX_FIRST_RESULT_CELL: usize = 8;

/// In the pitching table, cell 3 is the batters-faced count.
pub const BOX_BATTERS_FACED_CELL: usize = 3;

/// The no-appearance sentinel in batting result cells.
pub const NO_APPEARANCE: &str = "-";

pub fn box_schedule_url(year: i32, month: u32) -> String {
    format!("{BOX_BASE}/games/{year}/schedule_{month:02}_detail.html")
}

pub fn pitch_schedule_url(date: chrono::NaiveDate, kind_ids: &str) -> String {
    format!("{PITCH_BASE}/npb/schedule/?date={date}&gameKindIds={kind_ids}")
}

pub fn game_top_url(game_id: &str) -> String {
    format!("{PITCH_BASE}/npb/game/{game_id}/top")
}

pub fn score_url(game_id: &str, index: &str) -> String {
    format!("{PITCH_BASE}/npb/game/{game_id}/score?index={index}")
}

pub fn score_start_url(game_id: &str) -> String {
    format!("{PITCH_BASE}/npb/game/{game_id}/score")
}

pub fn player_url(ext_id: u64) -> String {
    format!("{PITCH_BASE}/npb/player/{ext_id}/top")
}
