use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::chips::{ChipBook, ChipKind};
use crate::http_client::http_client;
use crate::model::{Fixture, LeagueStanding, Player, Position, Roster, Team};
use crate::provider::DataProvider;

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

/// Data provider speaking the official Fantasy Premier League API.
/// Stateless: every call fetches fresh; freshness/caching policy belongs to
/// the caller.
#[derive(Debug, Default)]
pub struct FplClient;

impl FplClient {
    pub fn new() -> Self {
        Self
    }

    fn get(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{FPL_API_BASE}/{path}");
        let body = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("request failed: {path}"))?
            .text()
            .with_context(|| format!("body read failed: {path}"))?;
        debug!(path, bytes = body.len(), "fetched");
        Ok(body)
    }

    fn bootstrap(&self) -> Result<Bootstrap> {
        let body = self.get("bootstrap-static/")?;
        parse_bootstrap(&body)
    }
}

impl DataProvider for FplClient {
    fn players(&self) -> Result<Vec<Player>> {
        Ok(self.bootstrap()?.players)
    }

    fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.bootstrap()?.teams)
    }

    fn fixtures(&self) -> Result<Vec<Fixture>> {
        let body = self.get("fixtures/")?;
        parse_fixtures(&body)
    }

    fn current_gameweek(&self) -> Result<u32> {
        Ok(self.bootstrap()?.current_gameweek)
    }

    fn roster(&self, manager_id: u64) -> Result<Roster> {
        let gw = self.current_gameweek()?;
        let picks_body = self.get(&format!("entry/{manager_id}/event/{gw}/picks/"))?;
        let (player_ids, bank) = parse_picks(&picks_body)?;
        let history_body = self.get(&format!("entry/{manager_id}/history/"))?;
        let chips = parse_chip_history(&history_body)?;
        Ok(Roster {
            player_ids,
            bank,
            // Not exposed by the API; the caller can overwrite it.
            free_transfers: 1,
            chips,
        })
    }

    fn league_standings(&self, league_id: u64) -> Result<Vec<LeagueStanding>> {
        let body = self.get(&format!("leagues-classic/{league_id}/standings/"))?;
        parse_standings(&body)
    }
}

pub struct Bootstrap {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub current_gameweek: u32,
}

pub fn parse_bootstrap(raw: &str) -> Result<Bootstrap> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid bootstrap json")?;

    let mut players = Vec::new();
    if let Some(arr) = v.get("elements").and_then(|x| x.as_array()) {
        for item in arr {
            if let Some(p) = parse_player(item) {
                players.push(p);
            }
        }
    }

    let mut teams = Vec::new();
    if let Some(arr) = v.get("teams").and_then(|x| x.as_array()) {
        for item in arr {
            if let Some(t) = parse_team(item) {
                teams.push(t);
            }
        }
    }

    // The current event; before the season starts nothing is flagged, and
    // gameweek 0 means "no minutes could have been played yet".
    let current_gameweek = v
        .get("events")
        .and_then(|x| x.as_array())
        .and_then(|events| {
            events
                .iter()
                .find(|e| e.get("is_current").and_then(|x| x.as_bool()).unwrap_or(false))
                .and_then(|e| e.get("id"))
                .and_then(|x| x.as_u64())
        })
        .unwrap_or(0) as u32;

    Ok(Bootstrap {
        players,
        teams,
        current_gameweek,
    })
}

fn parse_player(v: &Value) -> Option<Player> {
    let id = v.get("id")?.as_u64()? as u32;
    let position = Position::from_element_type(v.get("element_type")?.as_u64()?)?;
    Some(Player {
        id,
        web_name: str_field(v, "web_name"),
        team_id: v.get("team")?.as_u64()? as u32,
        position,
        price: v.get("now_cost")?.as_u64()? as u32,
        total_points: v.get("total_points").and_then(|x| x.as_i64()).unwrap_or(0) as i32,
        minutes: u32_field(v, "minutes"),
        starts: u32_field(v, "starts"),
        form: str_field(v, "form"),
        points_per_game: str_field(v, "points_per_game"),
        selected_by_percent: str_field(v, "selected_by_percent"),
        bonus: u32_field(v, "bonus"),
        goals_scored: u32_field(v, "goals_scored"),
        assists: u32_field(v, "assists"),
        clean_sheets: u32_field(v, "clean_sheets"),
    })
}

fn parse_team(v: &Value) -> Option<Team> {
    Some(Team {
        id: v.get("id")?.as_u64()? as u32,
        name: str_field(v, "name"),
        short_name: str_field(v, "short_name"),
    })
}

pub fn parse_fixtures(raw: &str) -> Result<Vec<Fixture>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid fixtures json")?;
    let mut out = Vec::new();
    if let Some(arr) = v.as_array() {
        for item in arr {
            if let Some(f) = parse_fixture(item) {
                out.push(f);
            }
        }
    }
    Ok(out)
}

fn parse_fixture(v: &Value) -> Option<Fixture> {
    Some(Fixture {
        id: v.get("id")?.as_u64()? as u32,
        // null for postponed matches that have not been rescheduled.
        gameweek: v.get("event").and_then(|x| x.as_u64()).map(|g| g as u32),
        team_h: v.get("team_h")?.as_u64()? as u32,
        team_a: v.get("team_a")?.as_u64()? as u32,
        team_h_difficulty: v.get("team_h_difficulty").and_then(|x| x.as_u64()).unwrap_or(3) as u8,
        team_a_difficulty: v.get("team_a_difficulty").and_then(|x| x.as_u64()).unwrap_or(3) as u8,
        kickoff: v
            .get("kickoff_time")
            .and_then(|x| x.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        finished: v.get("finished").and_then(|x| x.as_bool()).unwrap_or(false),
    })
}

/// Squad ids plus bank (tenths) from an entry's picks payload.
pub fn parse_picks(raw: &str) -> Result<(Vec<u32>, u32)> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid picks json")?;
    let mut ids = Vec::new();
    if let Some(arr) = v.get("picks").and_then(|x| x.as_array()) {
        for pick in arr {
            if let Some(id) = pick.get("element").and_then(|x| x.as_u64()) {
                ids.push(id as u32);
            }
        }
    }
    let bank = v
        .get("entry_history")
        .and_then(|h| h.get("bank"))
        .and_then(|x| x.as_u64())
        .unwrap_or(0) as u32;
    Ok((ids, bank))
}

/// Rebuilds the chip book from an entry's season history: every chip the API
/// reports as played is marked used in its gameweek.
pub fn parse_chip_history(raw: &str) -> Result<ChipBook> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid history json")?;
    let mut book = ChipBook::new_season();
    if let Some(arr) = v.get("chips").and_then(|x| x.as_array()) {
        for chip in arr {
            let Some(name) = chip.get("name").and_then(|x| x.as_str()) else {
                continue;
            };
            let Some(kind) = chip_kind_from_name(name) else {
                continue;
            };
            let gw = chip.get("event").and_then(|x| x.as_u64()).unwrap_or(0) as u32;
            // Both instances spent is the only way this can fail; a third
            // entry of one kind would be provider garbage, so drop it.
            let _ = book.apply(kind, gw);
        }
    }
    Ok(book)
}

fn chip_kind_from_name(name: &str) -> Option<ChipKind> {
    match name {
        "wildcard" => Some(ChipKind::Wildcard),
        "freehit" => Some(ChipKind::FreeHit),
        "bboost" => Some(ChipKind::BenchBoost),
        "3xc" => Some(ChipKind::TripleCaptain),
        _ => None,
    }
}

pub fn parse_standings(raw: &str) -> Result<Vec<LeagueStanding>> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid standings json")?;
    let mut out = Vec::new();
    if let Some(arr) = v
        .get("standings")
        .and_then(|x| x.get("results"))
        .and_then(|x| x.as_array())
    {
        for item in arr {
            if let Some(row) = parse_standing(item) {
                out.push(row);
            }
        }
    }
    Ok(out)
}

fn parse_standing(v: &Value) -> Option<LeagueStanding> {
    Some(LeagueStanding {
        manager_id: v.get("entry")?.as_u64()?,
        entry_name: str_field(v, "entry_name"),
        player_name: str_field(v, "player_name"),
        total_points: v.get("total").and_then(|x| x.as_i64()).unwrap_or(0) as i32,
        rank: v.get("rank").and_then(|x| x.as_u64()).unwrap_or(0) as u32,
        last_gw_points: v.get("event_total").and_then(|x| x.as_i64()).unwrap_or(0) as i32,
    })
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string()
}

fn u32_field(v: &Value, key: &str) -> u32 {
    v.get(key).and_then(|x| x.as_u64()).unwrap_or(0) as u32
}
