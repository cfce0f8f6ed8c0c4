//! Authenticated HTTP client for the Riot REST API.
//!
//! Every call carries the API key in `X-Riot-Token` and is bounded by the
//! client-wide timeout. A 404 is surfaced as `Ok(None)` by [`RiotClient::get_json`]
//! so each endpoint decides whether absence is expected or an error.

use super::types::{summarize_rank, AccountDto, CurrentGameInfo, LeagueEntry, MatchDto};
use super::{
    ActiveGameSnapshot, CompletedGameResult, MatchGateway, PlayerIdentity, RankSummary, RiotError,
};
use crate::config::RiotConfig;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

const HEADER_API_KEY: &str = "X-Riot-Token";

pub struct RiotClient {
    client: reqwest::Client,
    api_key: String,
    base_template: String,
    account_region: String,
    platform_region: String,
    match_region: String,
}

impl RiotClient {
    pub fn new(config: &RiotConfig) -> Result<Self, RiotError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_template: config.api_base_template.clone(),
            account_region: config.account_region.clone(),
            platform_region: config.platform_region.clone(),
            match_region: config.match_region.clone(),
        })
    }

    /// Build `<base for region>/<segments...>`, percent-encoding each segment.
    fn url(&self, region: &str, segments: &[&str]) -> Result<Url, RiotError> {
        let base = self.base_template.replace("{region}", region);
        let mut url = Url::parse(&base).map_err(|e| RiotError::Url(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RiotError::Url(format!("{base}: cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with auth. `Ok(None)` on 404, `Err` on any other non-success status.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, RiotError> {
        debug!(path = url.path(), "riot GET");
        let resp = self
            .client
            .get(url)
            .header(HEADER_API_KEY, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RiotError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Some(resp.json().await?))
    }

    async fn latest_match_id(&self, puuid: &str) -> Result<Option<String>, RiotError> {
        let mut url = self.url(
            &self.match_region,
            &["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"],
        )?;
        url.query_pairs_mut()
            .append_pair("start", "0")
            .append_pair("count", "1");

        let ids: Vec<String> = self.get_json(url).await?.unwrap_or_default();
        Ok(ids.into_iter().next())
    }
}

#[async_trait]
impl MatchGateway for RiotClient {
    async fn resolve_identity(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<PlayerIdentity, RiotError> {
        let url = self.url(
            &self.account_region,
            &["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line],
        )?;
        let account: AccountDto = self
            .get_json(url)
            .await?
            .ok_or_else(|| RiotError::NotFound(format!("{game_name}#{tag_line}")))?;

        if account.puuid.is_empty() {
            return Err(RiotError::NotFound(format!("{game_name}#{tag_line}")));
        }

        Ok(PlayerIdentity {
            game_name: account.game_name.unwrap_or_else(|| game_name.to_string()),
            tag_line: account.tag_line.unwrap_or_else(|| tag_line.to_string()),
            puuid: account.puuid,
        })
    }

    async fn fetch_active_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<ActiveGameSnapshot>, RiotError> {
        let url = self.url(
            &self.platform_region,
            &["lol", "spectator", "v5", "active-games", "by-summoner", &identity.puuid],
        )?;
        match self.get_json::<CurrentGameInfo>(url).await? {
            None => Ok(None),
            Some(info) => info.into_snapshot(&identity.puuid).map(Some),
        }
    }

    async fn fetch_last_completed_game(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Option<CompletedGameResult>, RiotError> {
        let Some(match_id) = self.latest_match_id(&identity.puuid).await? else {
            return Ok(None);
        };

        let url = self.url(&self.match_region, &["lol", "match", "v5", "matches", &match_id])?;
        let detail: MatchDto = self
            .get_json(url)
            .await?
            .ok_or_else(|| RiotError::NotFound(format!("match {match_id}")))?;

        detail.into_result(&identity.puuid).map(Some)
    }

    async fn fetch_rank_summary(&self, summoner_id: &str) -> Result<RankSummary, RiotError> {
        let url = self.url(
            &self.platform_region,
            &["lol", "league", "v4", "entries", "by-summoner", summoner_id],
        )?;
        let entries: Vec<LeagueEntry> = self.get_json(url).await?.unwrap_or_default();
        Ok(summarize_rank(&entries))
    }
}
