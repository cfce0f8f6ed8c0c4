//! Champion id → display name lookup.
//!
//! The full table is fetched from Data Dragon on first use and kept for
//! the rest of the run. A failed fetch leaves an empty table (never
//! retried), and every lookup then degrades to the placeholder.

use crate::riot::types::ChampionData;
use crate::riot::UNKNOWN;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct ChampionTable {
    names: HashMap<i64, String>,
}

impl ChampionTable {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, champion_id: Option<i64>) -> &str {
        champion_id
            .and_then(|id| self.names.get(&id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Owns the one-time champion table. Shared with the monitor by handle.
pub struct ChampionResolver {
    http: reqwest::Client,
    url: String,
    table: OnceCell<ChampionTable>,
}

impl ChampionResolver {
    pub fn new(url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url,
            table: OnceCell::new(),
        })
    }

    /// A resolver that never touches the network.
    pub fn preloaded(table: ChampionTable) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: String::new(),
            table: OnceCell::from(table),
        }
    }

    /// The table, loading it on first call.
    pub async fn table(&self) -> &ChampionTable {
        self.table.get_or_init(|| self.load()).await
    }

    pub async fn resolve(&self, champion_id: i64) -> String {
        self.table().await.name(Some(champion_id)).to_string()
    }

    async fn load(&self) -> ChampionTable {
        match self.fetch().await {
            Ok(table) => {
                info!(champions = table.len(), url = %self.url, "champion table loaded");
                table
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, "champion table unavailable, names will show as unknown");
                ChampionTable::default()
            }
        }
    }

    async fn fetch(&self) -> Result<ChampionTable, reqwest::Error> {
        let data: ChampionData = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(ChampionTable::new(data.into_names()))
    }
}
