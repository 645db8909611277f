// src/runner.rs
//
// Top-level orchestration. One pass per calendar day: ingest the day's
// box scores (games, players, affiliations, at-bats), then optionally
// walk the day's pitch pages against the at-bats just stored. A failed
// game or day logs, backs off on the error's severity and never stops
// the run.

use chrono::{Datelike, NaiveDate};
use scraper::Html;

use crate::affiliation;
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::model::Game;
use crate::net::{sleep_in, Backoff, Fetch};
use crate::params;
use crate::reconcile::{self, LineupEntry, PitcherEntry};
use crate::scrape::boxscore::{self, TeamHalf};
use crate::scrape::{game, pitches, player, schedule, title_of};
use crate::store::Store;

/// Totals for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub days: u32,
    pub games_processed: u32,
    pub games_skipped: u32,
    pub failures: u32,
    pub requests: u64,
}

pub struct Runner<'a> {
    store: &'a mut dyn Store,
    fetch: &'a mut dyn Fetch,
    backoff: Backoff,
    config: Config,
}

impl<'a> Runner<'a> {
    pub fn new(store: &'a mut dyn Store, fetch: &'a mut dyn Fetch, config: Config) -> Self {
        let backoff = Backoff::new(config.pacing);
        Self { store, fetch, backoff, config }
    }

    /// Process every day in `start..=end` in order.
    pub fn run_range(&mut self, start: NaiveDate, end: NaiveDate) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut day = start;
        while day <= end {
            self.run_day(day, &mut summary);
            summary.days += 1;
            if day < end {
                sleep_in(self.config.pacing.day);
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        summary.requests = self.fetch.request_count();
        log::info!(
            "run finished: {} days, {} games, {} skipped, {} failures, {} requests",
            summary.days,
            summary.games_processed,
            summary.games_skipped,
            summary.failures,
            summary.requests
        );
        summary
    }

    /// One calendar day, both sources. Failures are absorbed here.
    pub fn run_day(&mut self, day: NaiveDate, summary: &mut RunSummary) {
        log::info!("processing {day}");
        if let Err(err) = self.ingest_box_scores(day, summary) {
            log::warn!("box ingest failed for {day}: {err}");
            self.backoff.sleep_for(&err);
            summary.failures += 1;
        }
        if self.config.with_pitches {
            if let Err(err) = self.ingest_pitches(day, summary) {
                log::warn!("pitch ingest failed for {day}: {err}");
                self.backoff.sleep_for(&err);
                summary.failures += 1;
            }
        }
    }

    fn ingest_box_scores(&mut self, day: NaiveDate, summary: &mut RunSummary) -> Result<()> {
        let url = params::box_schedule_url(day.year(), day.month());
        let doc = self.fetch.fetch(&url)?;
        let links: Vec<_> = schedule::box_game_links(&doc)
            .into_iter()
            .filter(|l| l.date == day)
            .collect();
        log::info!("{day}: {} box game(s) scheduled", links.len());

        for (i, link) in links.iter().enumerate() {
            if i > 0 {
                sleep_in(self.config.pacing.game);
            }
            match self.process_box_game(&link.url, day) {
                Ok(true) => summary.games_processed += 1,
                Ok(false) => summary.games_skipped += 1,
                Err(err) => {
                    log::warn!("box game failed: {} err={err}", link.url);
                    self.backoff.sleep_for(&err);
                    summary.failures += 1;
                }
            }
        }
        Ok(())
    }

    /// Returns false when the game was skipped (already stored, or a
    /// special event outside statistical scope).
    fn process_box_game(&mut self, url: &str, day: NaiveDate) -> Result<bool> {
        let doc = self.fetch.fetch(url)?;
        if let Some(title) = title_of(&doc) {
            if game::is_special_event(&title) {
                log::info!("skipping special event: {title}");
                return Ok(false);
            }
        }

        let meta = game::parse_box_game(&doc)?;
        if self
            .store
            .find_game_by_date_and_teams(meta.date, meta.home_team_id, meta.away_team_id)
            .is_some()
        {
            log::debug!("already ingested: {url}");
            return Ok(false);
        }

        let score = boxscore::parse_box_score(&doc)?;

        // Top half is the away side: its batters face the bottom half's
        // pitchers, and vice versa.
        let away = self.resolve_half(&score.top, meta.away_team_id, day);
        let home = self.resolve_half(&score.bottom, meta.home_team_id, day);

        // Reconcile both halves before writing the game row: a failed page
        // must leave nothing behind for the already-ingested check to skip.
        let mut at_bats = reconcile::reconcile_at_bats(0, &away.0, &home.1)?;
        at_bats.extend(reconcile::reconcile_at_bats(0, &home.0, &away.1)?);

        let stored = game::ensure_game(self.store, &meta);
        for ab in &mut at_bats {
            ab.game_id = stored.game_id;
        }
        let created = self.store.create_at_bat_results(at_bats);
        log::info!(
            "game {}: stored {} at-bat(s)",
            stored.game_id,
            created.len()
        );
        Ok(true)
    }

    /// Resolve one half's name references and keep the affiliation
    /// timeline current for everyone who appeared.
    fn resolve_half(
        &mut self,
        half: &TeamHalf,
        team_id: i64,
        day: NaiveDate,
    ) -> (Vec<LineupEntry>, Vec<PitcherEntry>) {
        let mut lineup = Vec::with_capacity(half.batters.len());
        for line in &half.batters {
            let p = player::resolve_by_name(self.store, &line.name, team_id, day);
            affiliation::reconcile(self.store, p.player_id, team_id, day);
            lineup.push(LineupEntry { batter_id: p.player_id, result: line.result.clone() });
        }
        let mut pitchers = Vec::with_capacity(half.pitchers.len());
        for line in &half.pitchers {
            let p = player::resolve_by_name(self.store, &line.name, team_id, day);
            affiliation::reconcile(self.store, p.player_id, team_id, day);
            pitchers.push(PitcherEntry {
                pitcher_id: p.player_id,
                batters_faced: line.batters_faced,
            });
        }
        (lineup, pitchers)
    }

    fn ingest_pitches(&mut self, day: NaiveDate, summary: &mut RunSummary) -> Result<()> {
        let mut ids = self.pitch_ids_for(day, params::KIND_REGULAR)?;
        if ids.is_empty() {
            // Interleague days list nothing under the regular codes.
            ids = self.pitch_ids_for(day, params::KIND_INTERLEAGUE)?;
        }
        log::info!("{day}: {} pitch-source game(s)", ids.len());

        for (i, ext_id) in ids.iter().enumerate() {
            if i > 0 {
                sleep_in(self.config.pacing.game);
            }
            match self.process_pitch_game(ext_id) {
                Ok(()) => {}
                Err(err) => {
                    log::warn!("pitch game {ext_id} failed: {err}");
                    self.backoff.sleep_for(&err);
                    summary.failures += 1;
                }
            }
        }
        Ok(())
    }

    fn pitch_ids_for(&mut self, day: NaiveDate, kind_ids: &str) -> Result<Vec<String>> {
        let doc = self.fetch.fetch(&params::pitch_schedule_url(day, kind_ids))?;
        Ok(schedule::pitch_game_ids(&doc))
    }

    fn process_pitch_game(&mut self, ext_id: &str) -> Result<()> {
        let top = self.fetch.fetch(&params::game_top_url(ext_id))?;
        if !schedule::is_finished(&top) {
            log::info!("game {ext_id} not finished, skipping");
            return Ok(());
        }
        let stored = pitches::walk_game(self.store, self.fetch, ext_id)?;
        log::info!("game {ext_id}: stored {stored} pitch row(s)");
        Ok(())
    }
}

/// Convenience for embedders: stored game lookup by the box page alone.
pub fn game_for_box_page(store: &mut dyn Store, doc: &Html) -> Result<Game> {
    let meta = game::parse_box_game(doc)?;
    store
        .find_game_by_date_and_teams(meta.date, meta.home_team_id, meta.away_team_id)
        .ok_or_else(|| {
            ScrapeError::Integrity(format!(
                "no stored game for {} home={} away={}",
                meta.date, meta.home_team_id, meta.away_team_id
            ))
        })
}
