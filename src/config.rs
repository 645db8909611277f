// src/config.rs
//
// Pacing windows for network courtesy. Each window is a [min, max]
// millisecond range; the actual sleep is drawn uniformly from it.
// Default windows are the production values; both source sites
// rate-limit aggressively.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct SleepWindow {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl SleepWindow {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const ZERO: SleepWindow = SleepWindow::new(0, 0);
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    /// Before every outbound request.
    pub request: SleepWindow,
    /// Between games within a day.
    pub game: SleepWindow,
    /// Between days of a range scrape.
    pub day: SleepWindow,
    /// After a transient failure, before moving on.
    pub error: SleepWindow,
    /// After a detected rate limit. Minutes-scale on purpose.
    pub rate_limit: SleepWindow,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request: SleepWindow::new(5_000, 8_000),
            game: SleepWindow::new(15_000, 25_000),
            day: SleepWindow::new(10_000, 15_000),
            error: SleepWindow::new(30_000, 60_000),
            rate_limit: SleepWindow::new(120_000, 180_000),
        }
    }
}

impl PacingConfig {
    /// Every window must satisfy min_ms <= max_ms.
    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("request", self.request),
            ("game", self.game),
            ("day", self.day),
            ("error", self.error),
            ("rate_limit", self.rate_limit),
        ];
        for (name, w) in windows {
            if w.min_ms > w.max_ms {
                return Err(format!(
                    "pacing.{name}: min_ms {} exceeds max_ms {}",
                    w.min_ms, w.max_ms
                ));
            }
        }
        Ok(())
    }

    /// All-zero pacing; for tests and offline replays.
    pub fn none() -> Self {
        Self {
            request: SleepWindow::ZERO,
            game: SleepWindow::ZERO,
            day: SleepWindow::ZERO,
            error: SleepWindow::ZERO,
            rate_limit: SleepWindow::ZERO,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pacing: PacingConfig,
    /// Extra identity strings appended to the built-in pool.
    pub user_agents: Vec<String>,
    /// Whether the orchestrator also walks per-pitch pages.
    pub with_pitches: bool,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        use serde::de::Error as _;
        let config: Self = toml::from_str(text)?;
        config.pacing.validate().map_err(toml::de::Error::custom)?;
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_slow() {
        let c = Config::default();
        assert!(c.pacing.request.min_ms >= 1_000);
        assert!(c.pacing.rate_limit.min_ms >= 60_000);
    }

    #[test]
    fn toml_overrides_partial() {
        let c = Config::from_toml_str(
            r#"
            with_pitches = true

            [pacing.request]
            min_ms = 1
            max_ms = 2
            "#,
        )
        .unwrap();
        assert!(c.with_pitches);
        assert_eq!(c.pacing.request, SleepWindow::new(1, 2));
        // Untouched windows keep their defaults.
        assert_eq!(c.pacing.day, PacingConfig::default().day);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = Config::from_toml_str(
            r#"
            [pacing.request]
            min_ms = 10
            max_ms = 2
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("pacing.request"));
    }
}
