//! Notification text for game start and game end.

use crate::champion::ChampionTable;
use crate::riot::{ActiveGameSnapshot, CompletedGameResult, PlayerIdentity, RankSummary};
use crate::roster;
use reqwest::Url;

const RANK_UNAVAILABLE: &str = "rank unavailable";

/// Per-player constants embedded in every message.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Label used for the player in the text.
    pub player: String,
    pub profile_url: String,
}

impl ReportContext {
    pub fn new(player: String, identity: &PlayerIdentity, profile_base: &str, region: &str) -> Self {
        Self {
            player,
            profile_url: profile_url(profile_base, identity, region),
        }
    }
}

/// `<base>/<name>_<tag>?region=<region>`
pub fn profile_url(base: &str, identity: &PlayerIdentity, region: &str) -> String {
    let slug = format!("{}_{}", identity.game_name, identity.tag_line);
    match Url::parse(base) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(&slug);
            }
            url.query_pairs_mut().append_pair("region", region);
            url.to_string()
        }
        _ => format!("{}/{}?region={}", base.trim_end_matches('/'), slug, region),
    }
}

fn rank_line(rank: Option<&RankSummary>) -> (String, String) {
    match rank {
        Some(r) => (r.to_string(), r.record()),
        None => (RANK_UNAVAILABLE.to_string(), RANK_UNAVAILABLE.to_string()),
    }
}

fn push_team(out: &mut Vec<String>, lines: Vec<String>) {
    out.push("Team :".to_string());
    out.extend(lines.into_iter().map(|l| format!("  {l}")));
}

pub fn start_message(
    ctx: &ReportContext,
    snapshot: &ActiveGameSnapshot,
    rank: Option<&RankSummary>,
    champions: &ChampionTable,
) -> String {
    let (tier, record) = rank_line(rank);
    let team = roster::assemble(&snapshot.participants, snapshot.team_id).render(champions);

    let mut out = vec![
        format!("[{} is in game!]", ctx.player),
        format!("Rank : {tier}"),
        format!("Queue : {}", snapshot.queue_type()),
        format!("Game time : {}", snapshot.clock()),
        format!("Champion : {}", champions.name(snapshot.champion_id)),
    ];
    push_team(&mut out, team);
    out.push(format!("Season : {record}"));
    out.push(format!("Profile : {}", ctx.profile_url));
    out.join("\n")
}

pub fn end_message(
    ctx: &ReportContext,
    result: &CompletedGameResult,
    rank: Option<&RankSummary>,
    champions: &ChampionTable,
) -> String {
    let (tier, record) = rank_line(rank);
    let team = roster::assemble(&result.participants, result.team_id).render(champions);
    let outcome = if result.win { "Victory" } else { "Defeat" };

    let mut out = vec![
        format!("[{}'s game has ended.]", ctx.player),
        format!("Result : {outcome}"),
        format!("KDA : {}", result.kda()),
        format!("Rank : {tier}"),
        format!("Queue : {}", result.queue_type()),
        format!("Game time : {}", result.clock()),
        format!("Champion : {}", champions.name(result.champion_id)),
    ];
    push_team(&mut out, team);
    let top = result
        .top_killer()
        .map(|p| format!(" (top: {} with {} kills)", p.display_name(), p.kills))
        .unwrap_or_default();
    out.push(format!("Team kills : {}{}", result.team_total_kills(), top));
    out.push(format!("Season : {record}"));
    out.push(format!("Profile : {}", ctx.profile_url));
    out.join("\n")
}

/// Sent when the game ended but no completed match could be found.
pub fn end_unavailable_message(ctx: &ReportContext) -> String {
    [
        format!("[{}'s game has ended.]", ctx.player),
        "Result : unavailable (match result not found)".to_string(),
        format!("Profile : {}", ctx.profile_url),
    ]
    .join("\n")
}
