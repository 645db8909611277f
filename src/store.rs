// src/store.rs
//
// Persistence boundary. The engine only needs natural-key point lookups
// and append-or-close-interval writes; the real database lives behind
// this trait. MemStore is the in-crate reference implementation, used by
// tests and by embedders that do not bring their own backend.

use chrono::NaiveDate;

use crate::model::{
    AffiliationInterval, AtBatResult, Game, NewAtBat, PitchResult, Player, Source, Team,
};
use crate::teams;

pub struct NewGame {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i64,
    pub away_score: i64,
    pub game_date: NaiveDate,
    pub stadium: String,
}

pub trait Store {
    fn find_team_by_name(&self, name: &str) -> Option<Team> {
        teams::id_for_name(name).and_then(|id| teams::all().find(|t| t.team_id == id))
    }

    fn find_game_by_date_and_teams(
        &self,
        date: NaiveDate,
        home_team_id: i64,
        away_team_id: i64,
    ) -> Option<Game>;
    fn create_game(&mut self, game: NewGame) -> Game;

    fn find_player(&self, player_id: i64) -> Option<Player>;
    fn find_player_by_source_id(&self, source: Source, ext_id: u64) -> Option<Player>;
    /// Exact physical match: name, birth date, height, weight.
    fn find_player_by_profile(
        &self,
        name: &str,
        birth_date: NaiveDate,
        height_cm: Option<u32>,
        weight_kg: Option<u32>,
    ) -> Option<Player>;
    /// Looser match ignoring physical attributes.
    fn find_player_by_name_and_birth(&self, name: &str, birth_date: NaiveDate) -> Option<Player>;
    /// A row created from a bare name sighting: same name, no recorded
    /// birth date. Such rows adopt profile data when a source id
    /// resolution lands on the same name.
    fn find_provisional_player_by_name(&self, name: &str) -> Option<Player>;
    /// Name sighting resolution: the player affiliated with `team_id` on
    /// `date` carrying this name.
    fn find_player_by_name_and_team(
        &self,
        name: &str,
        team_id: i64,
        date: NaiveDate,
    ) -> Option<Player>;
    /// Insert (id 0) or update. Updates fill missing fields and merge
    /// source ids; known identity fields are never overwritten.
    fn save_player(&mut self, player: Player) -> Player;

    fn find_open_affiliation(&self, player_id: i64) -> Option<AffiliationInterval>;
    fn find_affiliation(&self, player_id: i64, team_id: i64) -> Option<AffiliationInterval>;
    fn affiliations_for_player(&self, player_id: i64) -> Vec<AffiliationInterval>;
    /// Keyed on (player, team, start date): replaces a matching interval,
    /// inserts otherwise.
    fn upsert_affiliation(&mut self, interval: AffiliationInterval);

    fn create_at_bat_results(&mut self, at_bats: Vec<NewAtBat>) -> Vec<AtBatResult>;
    /// At-bats for a game in insertion (chronological) order.
    fn find_at_bats_by_game(&self, game_id: i64) -> Vec<AtBatResult>;

    fn create_pitch_results(&mut self, pitches: Vec<PitchResult>);
    fn find_pitches_by_at_bat(&self, at_bat_id: i64) -> Vec<PitchResult>;
}

#[derive(Default)]
pub struct MemStore {
    games: Vec<Game>,
    players: Vec<Player>,
    affiliations: Vec<AffiliationInterval>,
    at_bats: Vec<AtBatResult>,
    pitches: Vec<PitchResult>,
    next_game_id: i64,
    next_player_id: i64,
    next_at_bat_id: i64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_missing(existing: &mut Player, incoming: Player) {
    if existing.name.is_empty() {
        existing.name = incoming.name;
    }
    if existing.name_kana.is_none() {
        existing.name_kana = incoming.name_kana;
    }
    if existing.birth_date.is_none() {
        existing.birth_date = incoming.birth_date;
    }
    if existing.height_cm.is_none() {
        existing.height_cm = incoming.height_cm;
    }
    if existing.weight_kg.is_none() {
        existing.weight_kg = incoming.weight_kg;
    }
    if existing.position.is_none() {
        existing.position = incoming.position;
    }
    if existing.throws.is_none() {
        existing.throws = incoming.throws;
    }
    if existing.bats.is_none() {
        existing.bats = incoming.bats;
    }
    for (source, id) in incoming.source_ids {
        existing.source_ids.entry(source).or_insert(id);
    }
}

impl Store for MemStore {
    fn find_game_by_date_and_teams(
        &self,
        date: NaiveDate,
        home_team_id: i64,
        away_team_id: i64,
    ) -> Option<Game> {
        self.games
            .iter()
            .find(|g| {
                g.game_date == date
                    && g.home_team_id == home_team_id
                    && g.away_team_id == away_team_id
            })
            .cloned()
    }

    fn create_game(&mut self, game: NewGame) -> Game {
        self.next_game_id += 1;
        let game = Game {
            game_id: self.next_game_id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            home_score: game.home_score,
            away_score: game.away_score,
            game_date: game.game_date,
            stadium: game.stadium,
        };
        self.games.push(game.clone());
        game
    }

    fn find_player(&self, player_id: i64) -> Option<Player> {
        self.players.iter().find(|p| p.player_id == player_id).cloned()
    }

    fn find_player_by_source_id(&self, source: Source, ext_id: u64) -> Option<Player> {
        self.players
            .iter()
            .find(|p| p.source_ids.get(&source) == Some(&ext_id))
            .cloned()
    }

    fn find_player_by_profile(
        &self,
        name: &str,
        birth_date: NaiveDate,
        height_cm: Option<u32>,
        weight_kg: Option<u32>,
    ) -> Option<Player> {
        self.players
            .iter()
            .find(|p| {
                p.name == name
                    && p.birth_date == Some(birth_date)
                    && p.height_cm == height_cm
                    && p.weight_kg == weight_kg
            })
            .cloned()
    }

    fn find_player_by_name_and_birth(&self, name: &str, birth_date: NaiveDate) -> Option<Player> {
        self.players
            .iter()
            .find(|p| p.name == name && p.birth_date == Some(birth_date))
            .cloned()
    }

    fn find_provisional_player_by_name(&self, name: &str) -> Option<Player> {
        self.players
            .iter()
            .find(|p| p.name == name && p.birth_date.is_none())
            .cloned()
    }

    fn find_player_by_name_and_team(
        &self,
        name: &str,
        team_id: i64,
        date: NaiveDate,
    ) -> Option<Player> {
        self.players
            .iter()
            .find(|p| {
                p.name == name
                    && self
                        .affiliations
                        .iter()
                        .any(|a| a.player_id == p.player_id && a.team_id == team_id && a.covers(date))
            })
            .cloned()
    }

    fn save_player(&mut self, player: Player) -> Player {
        if player.player_id != 0 {
            if let Some(existing) = self.players.iter_mut().find(|p| p.player_id == player.player_id)
            {
                let id = existing.player_id;
                merge_missing(existing, player);
                existing.player_id = id;
                return existing.clone();
            }
        }
        self.next_player_id += 1;
        let mut player = player;
        player.player_id = self.next_player_id;
        self.players.push(player.clone());
        player
    }

    fn find_open_affiliation(&self, player_id: i64) -> Option<AffiliationInterval> {
        self.affiliations
            .iter()
            .find(|a| a.player_id == player_id && a.end_date.is_none())
            .cloned()
    }

    fn find_affiliation(&self, player_id: i64, team_id: i64) -> Option<AffiliationInterval> {
        self.affiliations
            .iter()
            .filter(|a| a.player_id == player_id && a.team_id == team_id)
            .max_by_key(|a| a.start_date)
            .cloned()
    }

    fn affiliations_for_player(&self, player_id: i64) -> Vec<AffiliationInterval> {
        let mut out: Vec<_> = self
            .affiliations
            .iter()
            .filter(|a| a.player_id == player_id)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.start_date);
        out
    }

    fn upsert_affiliation(&mut self, interval: AffiliationInterval) {
        if let Some(existing) = self.affiliations.iter_mut().find(|a| {
            a.player_id == interval.player_id
                && a.team_id == interval.team_id
                && a.start_date == interval.start_date
        }) {
            *existing = interval;
        } else {
            self.affiliations.push(interval);
        }
    }

    fn create_at_bat_results(&mut self, at_bats: Vec<NewAtBat>) -> Vec<AtBatResult> {
        let mut created = Vec::with_capacity(at_bats.len());
        for ab in at_bats {
            self.next_at_bat_id += 1;
            let row = AtBatResult {
                at_bat_id: self.next_at_bat_id,
                game_id: ab.game_id,
                batter_id: ab.batter_id,
                pitcher_id: ab.pitcher_id,
                result: ab.result,
            };
            self.at_bats.push(row.clone());
            created.push(row);
        }
        created
    }

    fn find_at_bats_by_game(&self, game_id: i64) -> Vec<AtBatResult> {
        self.at_bats
            .iter()
            .filter(|ab| ab.game_id == game_id)
            .cloned()
            .collect()
    }

    fn create_pitch_results(&mut self, pitches: Vec<PitchResult>) {
        self.pitches.extend(pitches);
    }

    fn find_pitches_by_at_bat(&self, at_bat_id: i64) -> Vec<PitchResult> {
        self.pitches
            .iter()
            .filter(|p| p.at_bat_id == at_bat_id)
            .cloned()
            .collect()
    }
}
