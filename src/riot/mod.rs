//! Riot match-data gateway.
//!
//! Four independent lookups against the Riot REST API:
//! - account-v1 `by-riot-id`: resolve `name#tag` to a puuid (once, at startup)
//! - spectator-v5 `active-games/by-summoner`: live match snapshot, 404 = not in game
//! - match-v5 `ids` + detail: most recent completed match
//! - league-v4 `entries/by-summoner`: solo-queue rank and season record
//!
//! Wire DTOs live in [`types`]; this module holds the domain types the
//! monitor consumes and the [`MatchGateway`] seam it is generic over.

pub mod client;
pub mod simulated;
pub mod types;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use client::RiotClient;
pub use simulated::SimulatedGateway;

/// Spectator data lags the real game clock. Added to `gameLength` when a
/// snapshot is built. Specific to Riot's spectator feed.
pub const SPECTATOR_DELAY_SECS: i64 = 150;

/// Placeholder used wherever upstream data is missing.
pub const UNKNOWN: &str = "unknown";

#[derive(Error, Debug)]
pub enum RiotError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("player {puuid} missing from participant list")]
    ParticipantMissing { puuid: String },
    #[error("invalid URL: {0}")]
    Url(String),
}

/// Resolved once at startup, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub game_name: String,
    pub tag_line: String,
    pub puuid: String,
}

impl PlayerIdentity {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// One participant row, normalised from either the spectator or the
/// match-v5 payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Participant {
    pub puuid: Option<String>,
    pub team_id: i64,
    pub champion_id: Option<i64>,
    /// Primary role signal (`teamPosition`): TOP, JUNGLE, MIDDLE, BOTTOM, UTILITY.
    pub lane: Option<String>,
    /// Secondary role signal (`role`): CARRY, SUPPORT, ...
    pub role: Option<String>,
    /// Platform id (riot id); preferred display name.
    pub riot_id: Option<String>,
    pub summoner_name: Option<String>,
    pub summoner_id: Option<String>,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

impl Participant {
    pub fn has_lane(&self) -> bool {
        self.lane.as_deref().map_or(false, |l| !l.trim().is_empty())
    }

    /// riot id > in-game name > internal id > "unknown".
    pub fn display_name(&self) -> &str {
        [&self.riot_id, &self.summoner_name, &self.summoner_id]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
    }

    pub fn kda(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}

/// Result of a single active-game poll while the player is in a match.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGameSnapshot {
    pub champion_id: Option<i64>,
    /// Includes [`SPECTATOR_DELAY_SECS`].
    pub elapsed_seconds: i64,
    pub queue_id: Option<i64>,
    pub team_id: i64,
    /// Encrypted summoner id of the target, used for the rank lookup.
    pub summoner_id: Option<String>,
    pub participants: Vec<Participant>,
}

impl ActiveGameSnapshot {
    pub fn queue_type(&self) -> QueueType {
        QueueType::from_queue_id(self.queue_id)
    }

    pub fn clock(&self) -> String {
        format_clock(self.elapsed_seconds)
    }
}

/// The target's most recent finished match.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGameResult {
    pub match_id: String,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub duration_seconds: i64,
    pub queue_id: Option<i64>,
    pub champion_id: Option<i64>,
    pub team_id: i64,
    pub summoner_id: Option<String>,
    pub participants: Vec<Participant>,
}

impl CompletedGameResult {
    pub fn queue_type(&self) -> QueueType {
        QueueType::from_queue_id(self.queue_id)
    }

    pub fn clock(&self) -> String {
        format_clock(self.duration_seconds)
    }

    pub fn kda(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }

    fn teammates(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.team_id == self.team_id)
    }

    pub fn team_total_kills(&self) -> u32 {
        self.teammates().map(|p| p.kills).sum()
    }

    /// Highest-kill teammate. Ties go to the earliest in arrival order.
    pub fn top_killer(&self) -> Option<&Participant> {
        self.teammates()
            .fold(None, |best: Option<&Participant>, p| match best {
                Some(b) if b.kills >= p.kills => Some(b),
                _ => Some(p),
            })
    }
}

/// Solo-queue standing. Zero-valued when the player has no ranked entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankSummary {
    pub tier: Option<String>,
    pub division: String,
    pub league_points: i32,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage, rounded to two decimals.
    pub win_rate: f64,
}

impl RankSummary {
    pub fn from_record(
        tier: Option<String>,
        division: String,
        league_points: i32,
        wins: u32,
        losses: u32,
    ) -> Self {
        let total_games = wins + losses;
        let win_rate = if total_games > 0 {
            (wins as f64 * 100.0 / total_games as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            tier,
            division,
            league_points,
            total_games,
            wins,
            losses,
            win_rate,
        }
    }

    /// `12 games, 7W 5L (58.33%)`
    pub fn record(&self) -> String {
        format!(
            "{} games, {}W {}L ({}%)",
            self.total_games, self.wins, self.losses, self.win_rate
        )
    }
}

impl fmt::Display for RankSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tier {
            None => write!(f, "Unranked"),
            Some(tier) => {
                let tier = tier_label(tier);
                if self.division.is_empty() {
                    write!(f, "{} {} LP", tier, self.league_points)
                } else {
                    write!(f, "{} {} {} LP", tier, self.division, self.league_points)
                }
            }
        }
    }
}

fn tier_label(tier: &str) -> String {
    match tier.to_ascii_uppercase().as_str() {
        "IRON" => "Iron".to_string(),
        "BRONZE" => "Bronze".to_string(),
        "SILVER" => "Silver".to_string(),
        "GOLD" => "Gold".to_string(),
        "PLATINUM" => "Platinum".to_string(),
        "EMERALD" => "Emerald".to_string(),
        "DIAMOND" => "Diamond".to_string(),
        "MASTER" => "Master".to_string(),
        "GRANDMASTER" => "Grandmaster".to_string(),
        "CHALLENGER" => "Challenger".to_string(),
        _ => tier.to_string(),
    }
}

/// Match category derived from the provider's queue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueType {
    SoloRanked,
    FlexRanked,
    Other,
    /// Queue id missing from the payload.
    Unknown,
}

impl QueueType {
    pub const SOLO_RANKED_ID: i64 = 420;
    pub const FLEX_RANKED_ID: i64 = 440;

    pub fn from_queue_id(queue_id: Option<i64>) -> Self {
        match queue_id {
            Some(Self::SOLO_RANKED_ID) => QueueType::SoloRanked,
            Some(Self::FLEX_RANKED_ID) => QueueType::FlexRanked,
            Some(_) => QueueType::Other,
            None => QueueType::Unknown,
        }
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueType::SoloRanked => write!(f, "solo ranked"),
            QueueType::FlexRanked => write!(f, "flex ranked"),
            QueueType::Other => write!(f, "other"),
            QueueType::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

/// Whole minutes plus remaining seconds: `23m 05s`.
pub fn format_clock(total_seconds: i64) -> String {
    let secs = total_seconds.max(0);
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// The calls the monitor makes against the match-data provider.
#[async_trait]
pub trait MatchGateway: Send + Sync {
    async fn resolve_identity(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<PlayerIdentity, RiotError>;

    /// `Ok(None)` means the player is not in a game.
    async fn fetch_active_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<ActiveGameSnapshot>, RiotError>;

    /// `Ok(None)` means the player has no match history.
    async fn fetch_last_completed_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<CompletedGameResult>, RiotError>;

    /// A player without a solo-queue entry gets a zero-valued summary.
    async fn fetch_rank_summary(&self, summoner_id: &str) -> Result<RankSummary, RiotError>;
}

#[async_trait]
impl<G: MatchGateway + ?Sized> MatchGateway for Box<G> {
    async fn resolve_identity(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<PlayerIdentity, RiotError> {
        (**self).resolve_identity(game_name, tag_line).await
    }

    async fn fetch_active_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<ActiveGameSnapshot>, RiotError> {
        (**self).fetch_active_game(identity).await
    }

    async fn fetch_last_completed_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<CompletedGameResult>, RiotError> {
        (**self).fetch_last_completed_game(identity).await
    }

    async fn fetch_rank_summary(&self, summoner_id: &str) -> Result<RankSummary, RiotError> {
        (**self).fetch_rank_summary(summoner_id).await
    }
}
