//! Riot API response types (subset of fields we need) and their
//! conversion into the domain types in the parent module.

use super::{ActiveGameSnapshot, CompletedGameResult, Participant, RankSummary, RiotError};
use super::SPECTATOR_DELAY_SECS;
use serde::Deserialize;
use std::collections::HashMap;

pub const RANKED_SOLO_QUEUE: &str = "RANKED_SOLO_5x5";

/// account-v1 `by-riot-id` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

/// spectator-v5 `CurrentGameInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameInfo {
    #[serde(default)]
    pub game_length: i64,
    #[serde(default)]
    pub game_queue_config_id: Option<i64>,
    #[serde(default)]
    pub participants: Vec<CurrentGameParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameParticipant {
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub team_id: i64,
    #[serde(default)]
    pub champion_id: Option<i64>,
    #[serde(default)]
    pub riot_id: Option<String>,
    #[serde(default)]
    pub summoner_name: Option<String>,
    #[serde(default)]
    pub summoner_id: Option<String>,
    /// Usually absent on the live feed.
    #[serde(default)]
    pub team_position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<CurrentGameParticipant> for Participant {
    fn from(p: CurrentGameParticipant) -> Self {
        Participant {
            puuid: p.puuid,
            team_id: p.team_id,
            champion_id: p.champion_id,
            lane: p.team_position,
            role: p.role,
            riot_id: p.riot_id,
            summoner_name: p.summoner_name,
            summoner_id: p.summoner_id,
            kills: 0,
            deaths: 0,
            assists: 0,
        }
    }
}

impl CurrentGameInfo {
    /// Locate the target and build the snapshot around them.
    pub fn into_snapshot(self, puuid: &str) -> Result<ActiveGameSnapshot, RiotError> {
        let target = self
            .participants
            .iter()
            .find(|p| p.puuid.as_deref() == Some(puuid))
            .cloned()
            .ok_or_else(|| RiotError::ParticipantMissing {
                puuid: puuid.to_string(),
            })?;

        Ok(ActiveGameSnapshot {
            champion_id: target.champion_id,
            elapsed_seconds: self.game_length + SPECTATOR_DELAY_SECS,
            queue_id: self.game_queue_config_id,
            team_id: target.team_id,
            summoner_id: target.summoner_id,
            participants: self.participants.into_iter().map(Participant::from).collect(),
        })
    }
}

/// match-v5 `MatchDto`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub game_duration: i64,
    #[serde(default)]
    pub queue_id: Option<i64>,
    #[serde(default)]
    pub participants: Vec<MatchParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub team_id: i64,
    #[serde(default)]
    pub champion_id: Option<i64>,
    #[serde(default)]
    pub riot_id_game_name: Option<String>,
    #[serde(default)]
    pub summoner_name: Option<String>,
    #[serde(default)]
    pub summoner_id: Option<String>,
    #[serde(default)]
    pub team_position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub win: bool,
}

impl From<MatchParticipant> for Participant {
    fn from(p: MatchParticipant) -> Self {
        Participant {
            puuid: p.puuid,
            team_id: p.team_id,
            champion_id: p.champion_id,
            lane: p.team_position,
            role: p.role,
            riot_id: p.riot_id_game_name,
            summoner_name: p.summoner_name,
            summoner_id: p.summoner_id,
            kills: p.kills,
            deaths: p.deaths,
            assists: p.assists,
        }
    }
}

impl MatchDto {
    /// The target must appear in the detail record; there is no partial result.
    pub fn into_result(self, puuid: &str) -> Result<CompletedGameResult, RiotError> {
        let target = self
            .info
            .participants
            .iter()
            .find(|p| p.puuid.as_deref() == Some(puuid))
            .cloned()
            .ok_or_else(|| RiotError::ParticipantMissing {
                puuid: puuid.to_string(),
            })?;

        Ok(CompletedGameResult {
            match_id: self.metadata.match_id,
            win: target.win,
            kills: target.kills,
            deaths: target.deaths,
            assists: target.assists,
            duration_seconds: self.info.game_duration,
            queue_id: self.info.queue_id,
            champion_id: target.champion_id,
            team_id: target.team_id,
            summoner_id: target.summoner_id,
            participants: self
                .info
                .participants
                .into_iter()
                .map(Participant::from)
                .collect(),
        })
    }
}

/// league-v4 `LeagueEntryDTO`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub queue_type: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub league_points: i32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

/// Pick the solo-queue entry. No entry yields the zero summary.
pub fn summarize_rank(entries: &[LeagueEntry]) -> RankSummary {
    match entries.iter().find(|e| e.queue_type == RANKED_SOLO_QUEUE) {
        Some(solo) => RankSummary::from_record(
            solo.tier.clone().filter(|t| !t.is_empty()),
            solo.rank.clone().unwrap_or_default(),
            solo.league_points,
            solo.wins,
            solo.losses,
        ),
        None => RankSummary::default(),
    }
}

/// Data Dragon `champion.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChampionData {
    #[serde(default)]
    pub data: HashMap<String, ChampionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionEntry {
    /// Numeric champion id, as a string.
    pub key: String,
    pub name: String,
}

impl ChampionData {
    pub fn into_names(self) -> HashMap<i64, String> {
        self.data
            .into_values()
            .filter_map(|c| c.key.parse::<i64>().ok().map(|id| (id, c.name)))
            .collect()
    }
}
