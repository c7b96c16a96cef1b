//! Players
//!
//! The engine reports every participant once at handshake (identity, race,
//! ally flag) and refreshes only the local player's economy fields each
//! frame. Other players' mutable fields are stale by contract.

use crate::error::{BridgeError, Result};
use std::str::FromStr;

/// Maximum number of participant slots the engine supports.
pub const MAX_PLAYERS: usize = 12;

/// Player id the engine uses for neutral units (resources, critters).
pub const NEUTRAL_PLAYER_ID: u8 = 11;

/// Number of tech slots in the per-frame research progress vector.
pub const TECH_SLOTS: usize = 47;

/// Number of upgrade slots in the per-frame upgrade progress vector.
pub const UPGRADE_SLOTS: usize = 63;

/// Progress value meaning a research or upgrade has completed.
pub const PROGRESS_COMPLETE: u8 = 4;

/// Player races as the engine names them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Race {
    Zerg,
    Terran,
    Protoss,
    Random,
    Other,
    None,
    Unknown,
}

impl Race {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl FromStr for Race {
    type Err = BridgeError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "Zerg" => Ok(Race::Zerg),
            "Terran" => Ok(Race::Terran),
            "Protoss" => Ok(Race::Protoss),
            "Random" => Ok(Race::Random),
            "Other" => Ok(Race::Other),
            "None" => Ok(Race::None),
            "Unknown" => Ok(Race::Unknown),
            other => Err(BridgeError::MalformedProtocol(format!(
                "unknown race token: {other}"
            ))),
        }
    }
}

/// Per-frame refresh of the local player's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDelta {
    pub minerals: i32,
    pub gas: i32,
    pub supply_used: i32,
    pub supply_total: i32,
    pub research_progress: [u8; TECH_SLOTS],
    pub upgrade_progress: [u8; UPGRADE_SLOTS],
}

/// One game participant.
///
/// Supply fields are reported at twice the true unit count because the
/// engine represents small units as half supply. Economy and progress
/// fields are only accurate for the local player.
#[derive(Debug, Clone)]
pub struct PlayerStatus {
    id: u8,
    race: Race,
    name: String,
    /// Engine player-type code (human, computer, neutral, ...).
    player_type: i32,
    /// Fixed at session start.
    is_ally: bool,

    minerals: i32,
    gas: i32,
    supply_used: i32,
    supply_total: i32,
    research_progress: [u8; TECH_SLOTS],
    upgrade_progress: [u8; UPGRADE_SLOTS],
}

impl PlayerStatus {
    pub fn new(id: u8, race: Race, name: String, player_type: i32, is_ally: bool) -> Self {
        Self {
            id,
            race,
            name,
            player_type,
            is_ally,
            minerals: 0,
            gas: 0,
            supply_used: 0,
            supply_total: 0,
            research_progress: [0; TECH_SLOTS],
            upgrade_progress: [0; UPGRADE_SLOTS],
        }
    }

    /// Merge a frame refresh into the mutable fields.
    pub fn apply_delta(&mut self, delta: &PlayerDelta) {
        self.minerals = delta.minerals;
        self.gas = delta.gas;
        self.supply_used = delta.supply_used;
        self.supply_total = delta.supply_total;
        self.research_progress = delta.research_progress;
        self.upgrade_progress = delta.upgrade_progress;
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn race(&self) -> Race {
        self.race
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_type(&self) -> i32 {
        self.player_type
    }

    pub fn is_ally(&self) -> bool {
        self.is_ally
    }

    pub fn minerals(&self) -> i32 {
        self.minerals
    }

    pub fn gas(&self) -> i32 {
        self.gas
    }

    /// Supply in use, at 2x the true unit count.
    pub fn supply_used(&self) -> i32 {
        self.supply_used
    }

    /// Supply provided, at 2x the true unit count.
    pub fn supply_total(&self) -> i32 {
        self.supply_total
    }

    /// Whether the tech in the given slot has finished researching.
    pub fn researched(&self, tech_id: usize) -> bool {
        self.research_progress
            .get(tech_id)
            .is_some_and(|&p| p == PROGRESS_COMPLETE)
    }

    /// Whether the upgrade in the given slot has completed at least once.
    pub fn upgraded(&self, upgrade_id: usize) -> bool {
        self.upgrade_progress
            .get(upgrade_id)
            .is_some_and(|&p| p == PROGRESS_COMPLETE)
    }

    pub fn research_progress(&self) -> &[u8; TECH_SLOTS] {
        &self.research_progress
    }

    pub fn upgrade_progress(&self) -> &[u8; UPGRADE_SLOTS] {
        &self.upgrade_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_tokens_round_trip() {
        for token in ["Zerg", "Terran", "Protoss", "Random", "Other", "None", "Unknown"] {
            let race: Race = token.parse().unwrap();
            assert_eq!(format!("{race:?}"), token);
        }
        assert!("Xel'Naga".parse::<Race>().is_err());
    }

    #[test]
    fn delta_updates_mutable_fields_only() {
        let mut player = PlayerStatus::new(0, Race::Terran, "player".into(), 1, true);
        let mut delta = PlayerDelta {
            minerals: 50,
            gas: 25,
            supply_used: 10,
            supply_total: 20,
            research_progress: [0; TECH_SLOTS],
            upgrade_progress: [0; UPGRADE_SLOTS],
        };
        delta.research_progress[2] = PROGRESS_COMPLETE;

        player.apply_delta(&delta);

        assert_eq!(player.minerals(), 50);
        assert_eq!(player.supply_total(), 20);
        assert!(player.researched(2));
        assert!(!player.researched(3));
        assert_eq!(player.race(), Race::Terran);
        assert!(player.is_ally());
    }
}
