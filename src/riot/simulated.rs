//! Offline gateway for `--simulate` runs.
//!
//! Cycles through a fixed 4-tick pattern: ticks 1 and 2 of every cycle
//! report an active game, ticks 0 and 3 report none. Lets the whole
//! pipeline (detection, rendering, notifier) run without an API key.

use super::{
    ActiveGameSnapshot, CompletedGameResult, MatchGateway, Participant, PlayerIdentity,
    RankSummary, RiotError,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

const SIM_PUUID: &str = "simulated-puuid";
const SIM_SUMMONER_ID: &str = "simulated-summoner";
const SIM_TEAM: i64 = 100;

#[derive(Debug, Default)]
pub struct SimulatedGateway {
    polls: AtomicU64,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn roster() -> Vec<Participant> {
        let lineup = [
            ("Target", 136, "TOP", 10, 8, 2),
            ("Jungler", 64, "JUNGLE", 4, 3, 9),
            ("Mage", 103, "MIDDLE", 7, 2, 5),
            ("Marksman", 222, "BOTTOM", 6, 4, 6),
            ("Support", 412, "UTILITY", 1, 5, 14),
        ];
        lineup
            .into_iter()
            .map(|(name, champ, lane, k, d, a)| Participant {
                puuid: Some((if name == "Target" { SIM_PUUID } else { name }).to_string()),
                team_id: SIM_TEAM,
                champion_id: Some(champ),
                lane: Some(lane.to_string()),
                role: None,
                riot_id: Some(name.to_string()),
                summoner_name: None,
                summoner_id: Some(format!("{name}-id")),
                kills: k,
                deaths: d,
                assists: a,
            })
            .collect()
    }
}

#[async_trait]
impl MatchGateway for SimulatedGateway {
    async fn resolve_identity(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<PlayerIdentity, RiotError> {
        Ok(PlayerIdentity {
            game_name: game_name.to_string(),
            tag_line: tag_line.to_string(),
            puuid: SIM_PUUID.to_string(),
        })
    }

    async fn fetch_active_game(
        &self,
        _identity: &PlayerIdentity,
    ) -> Result<Option<ActiveGameSnapshot>, RiotError> {
        let n = self.polls.fetch_add(1, Ordering::Relaxed);
        if !matches!(n % 4, 1 | 2) {
            return Ok(None);
        }
        // Live feed carries no lanes.
        let participants = Self::roster()
            .into_iter()
            .map(|p| Participant {
                lane: None,
                kills: 0,
                deaths: 0,
                assists: 0,
                ..p
            })
            .collect();
        Ok(Some(ActiveGameSnapshot {
            champion_id: Some(136),
            elapsed_seconds: 120 + n as i64 * 2,
            queue_id: Some(420),
            team_id: SIM_TEAM,
            summoner_id: Some(SIM_SUMMONER_ID.to_string()),
            participants,
        }))
    }

    async fn fetch_last_completed_game(
        &self,
        _identity: &PlayerIdentity,
    ) -> Result<Option<CompletedGameResult>, RiotError> {
        Ok(Some(CompletedGameResult {
            match_id: "SIM_MATCH_001".to_string(),
            win: true,
            kills: 10,
            deaths: 8,
            assists: 2,
            duration_seconds: 1_712,
            queue_id: Some(420),
            champion_id: Some(136),
            team_id: SIM_TEAM,
            summoner_id: Some(SIM_SUMMONER_ID.to_string()),
            participants: Self::roster(),
        }))
    }

    async fn fetch_rank_summary(&self, _summoner_id: &str) -> Result<RankSummary, RiotError> {
        Ok(RankSummary::from_record(
            Some("SILVER".to_string()),
            "IV".to_string(),
            37,
            21,
            19,
        ))
    }
}
