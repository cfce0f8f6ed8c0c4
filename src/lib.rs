//! Live-game watcher for a single League of Legends player.
//!
//! Polls the Riot API, detects when the player enters or leaves a match,
//! and relays a formatted start/end notification to a chat channel.

pub mod champion;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod report;
pub mod riot;
pub mod roster;
