//! Game state monitor.
//!
//! Polls the active-game endpoint on a fixed interval and turns the stream
//! of present/absent results into exactly one notification per transition:
//!
//! | state       | poll     | action                          | next        |
//! |-------------|----------|---------------------------------|-------------|
//! | NotInGame   | present  | rank + roster, start message    | InGame      |
//! | InGame      | absent   | last match + rank, end message  | NotInGame   |
//! | NotInGame   | absent   | -                               | NotInGame   |
//! | InGame      | present  | -                               | InGame      |
//!
//! A failed poll is logged and leaves the state untouched; the next tick
//! simply polls again. There is no backoff.

use crate::champion::ChampionResolver;
use crate::config::{split_riot_id, ConfigError};
use crate::notify::Notifier;
use crate::report::{self, ReportContext};
use crate::riot::{ActiveGameSnapshot, MatchGateway, PlayerIdentity, RankSummary, RiotError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to resolve player identity: {0}")]
    Identity(#[from] RiotError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    NotInGame,
    InGame,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::NotInGame => write!(f, "NOT_IN_GAME"),
            MonitorState::InGame => write!(f, "IN_GAME"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    GameStarted,
    GameEnded,
    Unchanged,
}

impl MonitorState {
    /// The transition table. Total over both states and both poll results.
    pub fn on_poll(self, game_present: bool) -> Transition {
        match (self, game_present) {
            (MonitorState::NotInGame, true) => Transition::GameStarted,
            (MonitorState::InGame, false) => Transition::GameEnded,
            (MonitorState::NotInGame, false) | (MonitorState::InGame, true) => {
                Transition::Unchanged
            }
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged(MonitorState),
    Started,
    /// `result_found` is false when the degraded message was sent.
    Ended { result_found: bool },
    /// A gateway call failed; state untouched.
    Failed,
}

/// Everything the monitor needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// `name#tag`
    pub riot_id: String,
    pub display_name: Option<String>,
    pub channel: String,
    pub poll_interval: Duration,
    pub profile_url_base: String,
    pub region: String,
}

pub struct GameMonitor<G, N> {
    gateway: G,
    notifier: N,
    champions: Arc<ChampionResolver>,
    identity: PlayerIdentity,
    report: ReportContext,
    channel: String,
    poll_interval: Duration,
    state: MonitorState,
}

impl<G: MatchGateway, N: Notifier> GameMonitor<G, N> {
    /// Validate the target id and resolve it. Either failure is fatal.
    pub async fn start(
        gateway: G,
        notifier: N,
        champions: Arc<ChampionResolver>,
        settings: MonitorSettings,
    ) -> Result<Self, MonitorError> {
        let (game_name, tag_line) = split_riot_id(&settings.riot_id)?;
        let identity = gateway.resolve_identity(game_name, tag_line).await?;
        info!(
            riot_id = %identity.riot_id(),
            puuid = %identity.puuid,
            "resolved player identity"
        );

        let label = settings
            .display_name
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| identity.game_name.clone());
        let report = ReportContext::new(
            label,
            &identity,
            &settings.profile_url_base,
            &settings.region,
        );

        Ok(Self {
            gateway,
            notifier,
            champions,
            identity,
            report,
            channel: settings.channel,
            poll_interval: settings.poll_interval,
            state: MonitorState::NotInGame,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Poll, then sleep, forever.
    pub async fn run(mut self) {
        info!(
            puuid = %self.identity.puuid,
            interval_secs = self.poll_interval.as_secs(),
            "monitoring game state"
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One poll plus whatever the transition table says to do.
    pub async fn tick(&mut self) -> TickOutcome {
        let snapshot = match self.gateway.fetch_active_game(&self.identity).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, state = %self.state, "active game poll failed, skipping tick");
                return TickOutcome::Failed;
            }
        };

        match (self.state.on_poll(snapshot.is_some()), snapshot) {
            (Transition::GameStarted, Some(snapshot)) => self.on_game_started(snapshot).await,
            (Transition::GameEnded, _) => self.on_game_ended().await,
            _ => {
                debug!(state = %self.state, "no state change");
                TickOutcome::Unchanged(self.state)
            }
        }
    }

    async fn on_game_started(&mut self, snapshot: ActiveGameSnapshot) -> TickOutcome {
        info!(
            champion_id = ?snapshot.champion_id,
            queue = %snapshot.queue_type(),
            elapsed = %snapshot.clock(),
            "game start detected"
        );

        let rank = self.rank_for(snapshot.summoner_id.as_deref()).await;
        let champions = self.champions.table().await;
        let text = report::start_message(&self.report, &snapshot, rank.as_ref(), champions);

        self.state = MonitorState::InGame;
        self.deliver(&text).await;
        TickOutcome::Started
    }

    async fn on_game_ended(&mut self) -> TickOutcome {
        let result = match self.gateway.fetch_last_completed_game(&self.identity).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "completed match lookup failed, retrying next tick");
                return TickOutcome::Failed;
            }
        };

        let text = match &result {
            Some(result) => {
                info!(
                    match_id = %result.match_id,
                    win = result.win,
                    kda = %result.kda(),
                    "game end detected"
                );
                let rank = self.rank_for(result.summoner_id.as_deref()).await;
                let champions = self.champions.table().await;
                report::end_message(&self.report, result, rank.as_ref(), champions)
            }
            None => {
                warn!("game end detected but no completed match found");
                report::end_unavailable_message(&self.report)
            }
        };

        self.state = MonitorState::NotInGame;
        self.deliver(&text).await;
        TickOutcome::Ended {
            result_found: result.is_some(),
        }
    }

    /// Best-effort; `None` renders as "rank unavailable".
    async fn rank_for(&self, summoner_id: Option<&str>) -> Option<RankSummary> {
        let Some(summoner_id) = summoner_id.filter(|s| !s.is_empty()) else {
            debug!("no summoner id in payload, skipping rank lookup");
            return None;
        };
        match self.gateway.fetch_rank_summary(summoner_id).await {
            Ok(rank) => Some(rank),
            Err(e) => {
                warn!(error = %e, "rank lookup failed");
                None
            }
        }
    }

    /// Fire-and-forget.
    async fn deliver(&self, text: &str) {
        match self.notifier.send(&self.channel, text).await {
            Ok(()) => info!(channel = %self.channel, "notification sent"),
            Err(e) => warn!(channel = %self.channel, error = %e, "notification failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::champion::ChampionTable;
    use crate::notify::NotifyError;
    use crate::riot::{CompletedGameResult, Participant};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Clone, Copy)]
    enum Poll {
        Game,
        NoGame,
        Timeout,
    }

    #[derive(Default)]
    struct Script {
        polls: VecDeque<Poll>,
        completed: Option<CompletedGameResult>,
        completed_fails: bool,
        rank_fails: bool,
        identity_missing: bool,
        poll_calls: usize,
        completed_calls: usize,
        rank_calls: usize,
    }

    #[derive(Clone, Default)]
    struct ScriptedGateway(Arc<StdMutex<Script>>);

    fn snapshot() -> ActiveGameSnapshot {
        ActiveGameSnapshot {
            champion_id: Some(136),
            elapsed_seconds: 217,
            queue_id: Some(420),
            team_id: 100,
            summoner_id: Some("enc-me".into()),
            participants: (0..5)
                .map(|i| Participant {
                    team_id: 100,
                    riot_id: Some(format!("p{i}")),
                    champion_id: Some(136),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn completed() -> CompletedGameResult {
        CompletedGameResult {
            match_id: "KR_42".into(),
            win: true,
            kills: 10,
            deaths: 8,
            assists: 2,
            duration_seconds: 1712,
            queue_id: Some(440),
            champion_id: Some(136),
            team_id: 100,
            summoner_id: Some("enc-me".into()),
            participants: vec![
                Participant {
                    team_id: 100,
                    lane: Some("MIDDLE".into()),
                    riot_id: Some("Target".into()),
                    champion_id: Some(136),
                    kills: 10,
                    deaths: 8,
                    assists: 2,
                    ..Default::default()
                },
                Participant {
                    team_id: 100,
                    lane: Some("BOTTOM".into()),
                    role: Some("SUPPORT".into()),
                    riot_id: Some("Helper".into()),
                    kills: 1,
                    ..Default::default()
                },
            ],
        }
    }

    #[async_trait]
    impl MatchGateway for ScriptedGateway {
        async fn resolve_identity(
            &self,
            game_name: &str,
            tag_line: &str,
        ) -> Result<PlayerIdentity, RiotError> {
            if self.0.lock().unwrap().identity_missing {
                return Err(RiotError::NotFound(format!("{game_name}#{tag_line}")));
            }
            Ok(PlayerIdentity {
                game_name: game_name.into(),
                tag_line: tag_line.into(),
                puuid: "me".into(),
            })
        }

        async fn fetch_active_game(
            &self,
            _identity: &PlayerIdentity,
        ) -> Result<Option<ActiveGameSnapshot>, RiotError> {
            let poll = {
                let mut s = self.0.lock().unwrap();
                s.poll_calls += 1;
                s.polls.pop_front().unwrap_or(Poll::NoGame)
            };
            match poll {
                Poll::Game => Ok(Some(snapshot())),
                Poll::NoGame => Ok(None),
                Poll::Timeout => Err(RiotError::Api {
                    status: 504,
                    body: "gateway timeout".into(),
                }),
            }
        }

        async fn fetch_last_completed_game(
            &self,
            _identity: &PlayerIdentity,
        ) -> Result<Option<CompletedGameResult>, RiotError> {
            let mut s = self.0.lock().unwrap();
            s.completed_calls += 1;
            if s.completed_fails {
                return Err(RiotError::Api {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(s.completed.clone())
        }

        async fn fetch_rank_summary(&self, _summoner_id: &str) -> Result<RankSummary, RiotError> {
            let mut s = self.0.lock().unwrap();
            s.rank_calls += 1;
            if s.rank_fails {
                return Err(RiotError::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(RankSummary::from_record(Some("SILVER".into()), "IV".into(), 37, 7, 5))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<StdMutex<Vec<(String, String)>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push((channel.to_string(), text.to_string()));
            if self.fail {
                return Err(NotifyError::Rejected {
                    status: 500,
                    body: "down".into(),
                });
            }
            Ok(())
        }
    }

    fn settings(riot_id: &str) -> MonitorSettings {
        MonitorSettings {
            riot_id: riot_id.into(),
            display_name: Some("Smash".into()),
            channel: "lol-alerts".into(),
            poll_interval: Duration::from_secs(60),
            profile_url_base: "https://lol.ps/summoner".into(),
            region: "kr".into(),
        }
    }

    fn champions() -> Arc<ChampionResolver> {
        Arc::new(ChampionResolver::preloaded(ChampionTable::new(HashMap::from([(
            136,
            "Aurelion Sol".to_string(),
        )]))))
    }

    async fn monitor(
        script: Script,
        notifier: RecordingNotifier,
    ) -> (GameMonitor<ScriptedGateway, RecordingNotifier>, ScriptedGateway) {
        let gw = ScriptedGateway(Arc::new(StdMutex::new(script)));
        let m = GameMonitor::start(gw.clone(), notifier, champions(), settings("t1smash#KR3"))
            .await
            .unwrap();
        (m, gw)
    }

    fn script(polls: &[Poll]) -> Script {
        Script {
            polls: polls.iter().copied().collect(),
            completed: Some(completed()),
            ..Default::default()
        }
    }

    #[test]
    fn test_transition_table_is_total() {
        use MonitorState::*;
        assert_eq!(NotInGame.on_poll(true), Transition::GameStarted);
        assert_eq!(InGame.on_poll(false), Transition::GameEnded);
        assert_eq!(NotInGame.on_poll(false), Transition::Unchanged);
        assert_eq!(InGame.on_poll(true), Transition::Unchanged);
    }

    #[tokio::test]
    async fn test_start_rejects_malformed_riot_id() {
        let gw = ScriptedGateway::default();
        let err = GameMonitor::start(gw, RecordingNotifier::default(), champions(), settings("noseparator"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MonitorError::Config(ConfigError::MalformedRiotId(_))));
    }

    #[tokio::test]
    async fn test_start_fails_when_identity_unresolved() {
        let gw = ScriptedGateway(Arc::new(StdMutex::new(Script {
            identity_missing: true,
            ..Default::default()
        })));
        let err = GameMonitor::start(gw, RecordingNotifier::default(), champions(), settings("a#b"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MonitorError::Identity(RiotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_repeated_absent_polls_are_idempotent() {
        let notifier = RecordingNotifier::default();
        let (mut m, gw) = monitor(script(&[Poll::NoGame, Poll::NoGame]), notifier.clone()).await;

        assert_eq!(m.tick().await, TickOutcome::Unchanged(MonitorState::NotInGame));
        assert_eq!(m.tick().await, TickOutcome::Unchanged(MonitorState::NotInGame));
        assert_eq!(m.state(), MonitorState::NotInGame);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(gw.0.lock().unwrap().rank_calls, 0);
    }

    #[tokio::test]
    async fn test_game_start_sends_one_notification() {
        let notifier = RecordingNotifier::default();
        let (mut m, _gw) = monitor(script(&[Poll::Game, Poll::Game]), notifier.clone()).await;

        assert_eq!(m.tick().await, TickOutcome::Started);
        assert_eq!(m.state(), MonitorState::InGame);
        assert_eq!(m.tick().await, TickOutcome::Unchanged(MonitorState::InGame));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (channel, text) = &sent[0];
        assert_eq!(channel, "lol-alerts");
        assert!(text.contains("[Smash is in game!]"));
        assert!(text.contains("Champion : Aurelion Sol"));
        assert!(text.contains("Game time : 3m 37s"));
        assert!(text.contains("Rank : Silver IV 37 LP"));
        assert!(text.contains("  Top : p0 [Aurelion Sol, 0/0/0]"));
    }

    #[tokio::test]
    async fn test_game_end_with_completed_match() {
        let notifier = RecordingNotifier::default();
        let (mut m, _gw) = monitor(script(&[Poll::Game, Poll::NoGame]), notifier.clone()).await;

        m.tick().await;
        assert_eq!(m.tick().await, TickOutcome::Ended { result_found: true });
        assert_eq!(m.state(), MonitorState::NotInGame);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let text = &sent[1].1;
        assert!(text.contains("Result : Victory"));
        assert!(text.contains("KDA : 10/8/2"));
        assert!(text.contains("Queue : flex ranked"));
        assert!(text.contains("  Mid : Target [Aurelion Sol, 10/8/2]"));
        assert!(text.contains("  Support : Helper [unknown, 1/0/0]"));
        assert!(text.contains("Team kills : 11 (top: Target with 10 kills)"));
    }

    #[tokio::test]
    async fn test_game_end_without_completed_match_is_degraded() {
        let notifier = RecordingNotifier::default();
        let mut s = script(&[Poll::Game, Poll::NoGame]);
        s.completed = None;
        let (mut m, _gw) = monitor(s, notifier.clone()).await;

        m.tick().await;
        assert_eq!(m.tick().await, TickOutcome::Ended { result_found: false });
        assert_eq!(m.state(), MonitorState::NotInGame);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].1.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_state() {
        let notifier = RecordingNotifier::default();
        let (mut m, _gw) = monitor(
            script(&[Poll::Game, Poll::Timeout, Poll::Timeout, Poll::Game]),
            notifier.clone(),
        )
        .await;

        m.tick().await;
        assert_eq!(m.tick().await, TickOutcome::Failed);
        assert_eq!(m.state(), MonitorState::InGame);
        assert_eq!(m.tick().await, TickOutcome::Failed);
        assert_eq!(m.tick().await, TickOutcome::Unchanged(MonitorState::InGame));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_lookup_failure_retries_end_transition() {
        let notifier = RecordingNotifier::default();
        let mut s = script(&[Poll::Game, Poll::NoGame, Poll::NoGame]);
        s.completed_fails = true;
        let (mut m, gw) = monitor(s, notifier.clone()).await;

        m.tick().await;
        assert_eq!(m.tick().await, TickOutcome::Failed);
        assert_eq!(m.state(), MonitorState::InGame);

        gw.0.lock().unwrap().completed_fails = false;
        assert_eq!(m.tick().await, TickOutcome::Ended { result_found: true });
        assert_eq!(gw.0.lock().unwrap().completed_calls, 2);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rank_failure_does_not_block_notification() {
        let notifier = RecordingNotifier::default();
        let mut s = script(&[Poll::Game]);
        s.rank_fails = true;
        let (mut m, _gw) = monitor(s, notifier.clone()).await;

        assert_eq!(m.tick().await, TickOutcome::Started);
        let sent = notifier.sent.lock().unwrap();
        assert!(sent[0].1.contains("Rank : rank unavailable"));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_affect_state() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let (mut m, _gw) = monitor(script(&[Poll::Game, Poll::Game, Poll::NoGame]), notifier.clone()).await;

        assert_eq!(m.tick().await, TickOutcome::Started);
        assert_eq!(m.state(), MonitorState::InGame);
        assert_eq!(m.tick().await, TickOutcome::Unchanged(MonitorState::InGame));
        assert_eq!(m.tick().await, TickOutcome::Ended { result_found: true });
        // One attempt per transition, no retry.
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_notification_count_matches_transitions() {
        // Deterministic pseudo-random poll sequences.
        let mut seed: u64 = 0x5eed;
        for _ in 0..20 {
            let mut polls = Vec::new();
            for _ in 0..40 {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                polls.push(match (seed >> 33) % 3 {
                    0 => Poll::Game,
                    1 => Poll::NoGame,
                    _ => Poll::Timeout,
                });
            }

            let mut expected_starts = 0;
            let mut expected_ends = 0;
            let mut in_game = false;
            for p in &polls {
                match p {
                    Poll::Game if !in_game => {
                        expected_starts += 1;
                        in_game = true;
                    }
                    Poll::NoGame if in_game => {
                        expected_ends += 1;
                        in_game = false;
                    }
                    _ => {}
                }
            }

            let notifier = RecordingNotifier::default();
            let (mut m, _gw) = monitor(script(&polls), notifier.clone()).await;
            for _ in 0..polls.len() {
                m.tick().await;
            }

            let sent = notifier.sent.lock().unwrap();
            let starts = sent.iter().filter(|(_, t)| t.contains("is in game!")).count();
            let ends = sent.iter().filter(|(_, t)| t.contains("game has ended")).count();
            assert_eq!(starts, expected_starts);
            assert_eq!(ends, expected_ends);
            assert_eq!(m.state() == MonitorState::InGame, in_game);
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_poll_interval_between_ticks() {
        let notifier = RecordingNotifier::default();
        let (m, gw) = monitor(script(&[Poll::NoGame, Poll::Game]), notifier.clone()).await;
        let polls = || gw.0.lock().unwrap().poll_calls;

        let handle = tokio::spawn(m.run());
        settle().await;
        assert_eq!(polls(), 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(polls(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(polls(), 2);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(polls(), 3);

        handle.abort();
    }
}
