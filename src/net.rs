// src/net.rs
//
// Single outbound document fetch with identity rotation and pacing.
// The gate never retries: different callers escalate at different
// granularity (per page, per game, per day), so retry policy stays with
// them and only the backoff windows are shared.

use std::thread;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{REFERER, USER_AGENT};
use scraper::Html;

use crate::config::{Config, PacingConfig, SleepWindow};
use crate::error::{Result, ScrapeError};
use crate::params;

/// The one seam between parsers and the network. Production uses
/// [`FetchGate`]; tests script documents.
pub trait Fetch {
    fn fetch(&mut self, url: &str) -> Result<Html>;

    /// Requests issued so far. Scripted test doubles may leave this at 0.
    fn request_count(&self) -> u64 {
        0
    }
}

/// Sleep for a random duration inside the window.
pub fn sleep_in(window: SleepWindow) {
    if window.max_ms == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(window.min_ms..=window.max_ms);
    log::debug!("sleeping {ms}ms");
    thread::sleep(Duration::from_millis(ms));
}

/// How hard an error should push the caller back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Transient,
    RateLimited,
}

/// Shared backoff policy, parameterized by severity. Every caller goes
/// through the same object so escalation behavior stays consistent.
#[derive(Clone, Copy, Debug)]
pub struct Backoff {
    pacing: PacingConfig,
}

impl Backoff {
    pub fn new(pacing: PacingConfig) -> Self {
        Self { pacing }
    }

    pub fn sleep(&self, severity: Severity) {
        match severity {
            Severity::Transient => sleep_in(self.pacing.error),
            Severity::RateLimited => sleep_in(self.pacing.rate_limit),
        }
    }

    /// Back off according to the error's classification. Parse and
    /// integrity failures are not network pressure and get no sleep.
    pub fn sleep_for(&self, err: &ScrapeError) {
        match err {
            ScrapeError::RateLimited { .. } => self.sleep(Severity::RateLimited),
            e if e.is_retryable() => self.sleep(Severity::Transient),
            _ => {}
        }
    }
}

pub struct FetchGate {
    client: reqwest::blocking::Client,
    user_agents: Vec<String>,
    request_window: SleepWindow,
    request_count: u64,
}

impl FetchGate {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let mut user_agents: Vec<String> = params::USER_AGENTS.iter().map(|&u| s!(u)).collect();
        user_agents.extend(config.user_agents.iter().cloned());
        Ok(Self {
            client,
            user_agents,
            request_window: config.pacing.request,
            request_count: 0,
        })
    }

    fn pick_user_agent(&self) -> &str {
        let i = rand::thread_rng().gen_range(0..self.user_agents.len());
        &self.user_agents[i]
    }
}

impl Fetch for FetchGate {
    fn fetch(&mut self, url: &str) -> Result<Html> {
        sleep_in(self.request_window);
        self.request_count += 1;
        log::debug!("request #{}: {}", self.request_count, url);

        let mut req = self.client.get(url).header(USER_AGENT, self.pick_user_agent());
        if url.starts_with(params::PITCH_BASE) {
            req = req.header(REFERER, format!("{}/", params::PITCH_BASE));
        }

        let resp = req.send()?;
        let status = resp.status().as_u16();
        match status {
            429 | 403 => {
                return Err(ScrapeError::RateLimited { status, url: s!(url) });
            }
            404 => return Err(ScrapeError::NotFound { url: s!(url) }),
            s if !(200..300).contains(&s) => {
                return Err(ScrapeError::Status { status, url: s!(url) });
            }
            _ => {}
        }

        let body = resp.text()?;
        if body.trim().is_empty() {
            return Err(ScrapeError::Malformed(format!("empty response body: {url}")));
        }
        Ok(Html::parse_document(&body))
    }

    fn request_count(&self) -> u64 {
        self.request_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_does_not_sleep() {
        let t = std::time::Instant::now();
        sleep_in(SleepWindow::ZERO);
        assert!(t.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn backoff_ignores_parse_errors() {
        let backoff = Backoff::new(PacingConfig {
            error: SleepWindow::new(5_000, 5_000),
            rate_limit: SleepWindow::new(5_000, 5_000),
            ..PacingConfig::none()
        });
        let t = std::time::Instant::now();
        backoff.sleep_for(&ScrapeError::Malformed(s!("x")));
        backoff.sleep_for(&ScrapeError::Integrity(s!("x")));
        assert!(t.elapsed() < Duration::from_millis(50));
    }
}
