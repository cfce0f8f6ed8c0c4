//! Five-role team breakdown.
//!
//! Given every participant in a match and the target's team id, place the
//! five teammates into Top / Jungle / Mid / Bot / Support. Always total:
//! any role nobody claims is filled with a placeholder participant.

use crate::champion::ChampionTable;
use crate::riot::Participant;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    BottomCarry,
    Support,
}

impl Role {
    /// Display and positional-fallback order.
    pub const ALL: [Role; 5] = [
        Role::Top,
        Role::Jungle,
        Role::Mid,
        Role::BottomCarry,
        Role::Support,
    ];

    fn index(self) -> usize {
        match self {
            Role::Top => 0,
            Role::Jungle => 1,
            Role::Mid => 2,
            Role::BottomCarry => 3,
            Role::Support => 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Top => write!(f, "Top"),
            Role::Jungle => write!(f, "Jungle"),
            Role::Mid => write!(f, "Mid"),
            Role::BottomCarry => write!(f, "Bot"),
            Role::Support => write!(f, "Support"),
        }
    }
}

/// Lane first; the secondary role only splits BOTTOM (carry unless it says
/// support) or stands in when the lane is missing.
pub fn classify(p: &Participant) -> Option<Role> {
    let lane = p.lane.as_deref().unwrap_or("").trim().to_ascii_uppercase();
    let role = p.role.as_deref().unwrap_or("").trim().to_ascii_uppercase();

    match lane.as_str() {
        "TOP" => Some(Role::Top),
        "JUNGLE" => Some(Role::Jungle),
        "MIDDLE" | "MID" => Some(Role::Mid),
        "BOTTOM" => match role.as_str() {
            "SUPPORT" => Some(Role::Support),
            _ => Some(Role::BottomCarry),
        },
        "UTILITY" => Some(Role::Support),
        _ => match role.as_str() {
            "SUPPORT" => Some(Role::Support),
            "CARRY" => Some(Role::BottomCarry),
            _ => None,
        },
    }
}

/// One participant per role; never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignment {
    slots: [Participant; 5],
}

impl RoleAssignment {
    pub fn get(&self, role: Role) -> &Participant {
        &self.slots[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &Participant)> {
        Role::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    /// `Top : name [Champion, k/d/a]`, one per role in display order.
    pub fn render(&self, champions: &ChampionTable) -> Vec<String> {
        self.iter()
            .map(|(role, p)| format!("{} : {}", role, render_line(p, champions)))
            .collect()
    }
}

/// `<name> [<champion>, <k>/<d>/<a>]`
pub fn render_line(p: &Participant, champions: &ChampionTable) -> String {
    format!(
        "{} [{}, {}]",
        p.display_name(),
        champions.name(p.champion_id),
        p.kda()
    )
}

pub fn assemble(participants: &[Participant], team_id: i64) -> RoleAssignment {
    let team: Vec<&Participant> = participants.iter().filter(|p| p.team_id == team_id).collect();

    let mut slots: [Option<&Participant>; 5] = [None; 5];

    // Live feeds often omit lanes entirely: keep arrival order.
    if team.len() == Role::ALL.len() && team.iter().all(|p| !p.has_lane()) {
        for (slot, p) in slots.iter_mut().zip(team.iter()) {
            *slot = Some(*p);
        }
    } else {
        for p in &team {
            if let Some(role) = classify(p) {
                slots[role.index()].get_or_insert(*p);
            }
        }
    }

    let slots = slots.map(|s| match s {
        Some(p) => p.clone(),
        None => placeholder(team_id),
    });
    RoleAssignment { slots }
}

fn placeholder(team_id: i64) -> Participant {
    Participant {
        team_id,
        ..Default::default()
    }
}
