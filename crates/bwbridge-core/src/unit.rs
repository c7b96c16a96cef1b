//! Units
//!
//! Every frame the engine re-reports the full unit set. Each wire record is
//! decoded into a neutral [`UnitRecord`] first and then classified once into
//! the closed [`Unit`] sum; downstream filtering is a discriminant match.

use crate::catalog::{MINERAL_FIELD_TYPE_ID, VESPENE_GEYSER_TYPE_ID};
use crate::error::{BridgeError, Result};
use crate::player::{MAX_PLAYERS, PlayerStatus};
use tracing::debug;

/// Number of `;`-separated integer fields in a unit wire record.
pub const UNIT_RECORD_FIELDS: usize = 17;

/// A unit wire record, decoded but not yet classified.
///
/// Field order is fixed by the protocol; see [`UnitData`] for meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRecord {
    pub id: i32,
    pub player_id: i32,
    pub type_id: i32,
    pub x: i32,
    pub y: i32,
    pub hit_points: i32,
    pub shields: i32,
    pub energy: i32,
    pub build_timer: i32,
    pub train_timer: i32,
    pub research_timer: i32,
    pub upgrade_timer: i32,
    pub order_timer: i32,
    pub order: i32,
    pub resources: i32,
    pub addon_id: i32,
    pub mine_count: i32,
}

/// Attributes shared by every unit variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitData {
    /// Stable for as long as the unit exists; unique within a frame.
    pub id: i32,
    pub player_id: u8,
    /// References the unit type catalog.
    pub type_id: u16,
    /// Tile position.
    pub x: i32,
    pub y: i32,
    pub hit_points: i32,
    pub shields: i32,
    pub energy: i32,
    /// Remaining build time; 0 means fully constructed.
    pub build_timer: i32,
    pub train_timer: i32,
    pub research_timer: i32,
    pub upgrade_timer: i32,
    /// Internal engine timer for the current order.
    pub order_timer: i32,
    /// Id of the order the unit is currently executing.
    pub order: i32,
    /// Remaining resources; meaningful for mineral patches and geysers.
    pub resources: i32,
    /// Attached addon unit id, 0 if none.
    pub addon_id: i32,
    /// Special-ability counter (mines planted, for vultures).
    pub mine_count: i32,
}

impl UnitData {
    /// Whether construction has finished.
    pub fn is_built(&self) -> bool {
        self.build_timer == 0
    }

    /// Euclidean distance to a tile position.
    pub fn distance_to(&self, x: i32, y: i32) -> f64 {
        let dx = (self.x - x) as f64;
        let dy = (self.y - y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance to another unit.
    pub fn distance_to_unit(&self, other: &UnitData) -> f64 {
        self.distance_to(other.x, other.y)
    }
}

/// A classified unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Owned by the local player.
    Mine(UnitData),
    Enemy(UnitData),
    Ally(UnitData),
    MineralPatch(UnitData),
    VespeneGeyser(UnitData),
}

impl Unit {
    /// Classify a decoded record.
    ///
    /// Resource type ids always win, even when a resource is erroneously
    /// reported as owned by the local player. Records owned by a participant
    /// with no table entry (the neutral player) that are not resources have
    /// no ally flag to consult and are dropped.
    pub fn classify(
        record: &UnitRecord,
        local_player_id: u8,
        players: &[Option<PlayerStatus>],
    ) -> Result<Option<Unit>> {
        let type_id = u16::try_from(record.type_id).map_err(|_| {
            BridgeError::MalformedProtocol(format!("unit type id out of range: {}", record.type_id))
        })?;
        let player_id = u8::try_from(record.player_id)
            .ok()
            .filter(|&id| (id as usize) < MAX_PLAYERS)
            .ok_or_else(|| {
                BridgeError::MalformedProtocol(format!(
                    "unit player id out of range: {}",
                    record.player_id
                ))
            })?;

        let data = UnitData {
            id: record.id,
            player_id,
            type_id,
            x: record.x,
            y: record.y,
            hit_points: record.hit_points,
            shields: record.shields,
            energy: record.energy,
            build_timer: record.build_timer,
            train_timer: record.train_timer,
            research_timer: record.research_timer,
            upgrade_timer: record.upgrade_timer,
            order_timer: record.order_timer,
            order: record.order,
            resources: record.resources,
            addon_id: record.addon_id,
            mine_count: record.mine_count,
        };

        let unit = match type_id {
            MINERAL_FIELD_TYPE_ID => Unit::MineralPatch(data),
            VESPENE_GEYSER_TYPE_ID => Unit::VespeneGeyser(data),
            _ if player_id == local_player_id => Unit::Mine(data),
            _ => match players.get(player_id as usize).and_then(Option::as_ref) {
                Some(owner) if owner.is_ally() => Unit::Ally(data),
                Some(_) => Unit::Enemy(data),
                None => {
                    debug!(
                        unit_id = data.id,
                        player_id, "dropping unit with no owning player entry"
                    );
                    return Ok(None);
                }
            },
        };

        Ok(Some(unit))
    }

    /// The shared attribute payload.
    pub fn data(&self) -> &UnitData {
        match self {
            Unit::Mine(d)
            | Unit::Enemy(d)
            | Unit::Ally(d)
            | Unit::MineralPatch(d)
            | Unit::VespeneGeyser(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Race;

    fn record(player_id: i32, type_id: i32) -> UnitRecord {
        UnitRecord {
            id: 1,
            player_id,
            type_id,
            x: 10,
            y: 12,
            hit_points: 40,
            shields: 0,
            energy: 0,
            build_timer: 0,
            train_timer: 0,
            research_timer: 0,
            upgrade_timer: 0,
            order_timer: 0,
            order: 0,
            resources: 0,
            addon_id: 0,
            mine_count: 0,
        }
    }

    fn players() -> Vec<Option<PlayerStatus>> {
        let mut table: Vec<Option<PlayerStatus>> = (0..MAX_PLAYERS).map(|_| None).collect();
        table[0] = Some(PlayerStatus::new(0, Race::Terran, "me".into(), 1, false));
        table[1] = Some(PlayerStatus::new(1, Race::Zerg, "foe".into(), 1, false));
        table[2] = Some(PlayerStatus::new(2, Race::Protoss, "friend".into(), 1, true));
        table
    }

    #[test]
    fn owner_determines_variant() {
        let players = players();
        assert!(matches!(
            Unit::classify(&record(0, 7), 0, &players).unwrap(),
            Some(Unit::Mine(_))
        ));
        assert!(matches!(
            Unit::classify(&record(1, 37), 0, &players).unwrap(),
            Some(Unit::Enemy(_))
        ));
        assert!(matches!(
            Unit::classify(&record(2, 64), 0, &players).unwrap(),
            Some(Unit::Ally(_))
        ));
    }

    #[test]
    fn resource_types_win_over_ownership() {
        let players = players();
        // A mineral patch reported as locally owned still classifies as a patch.
        assert!(matches!(
            Unit::classify(&record(0, MINERAL_FIELD_TYPE_ID as i32), 0, &players).unwrap(),
            Some(Unit::MineralPatch(_))
        ));
        assert!(matches!(
            Unit::classify(&record(11, VESPENE_GEYSER_TYPE_ID as i32), 0, &players).unwrap(),
            Some(Unit::VespeneGeyser(_))
        ));
    }

    #[test]
    fn neutral_non_resource_is_dropped() {
        let players = players();
        // Player 11 (neutral) has no table entry; a critter record vanishes.
        assert_eq!(Unit::classify(&record(11, 90), 0, &players).unwrap(), None);
    }

    #[test]
    fn out_of_range_ids_are_malformed() {
        let players = players();
        assert!(Unit::classify(&record(12, 7), 0, &players).is_err());
        assert!(Unit::classify(&record(-1, 7), 0, &players).is_err());
        assert!(Unit::classify(&record(0, -5), 0, &players).is_err());
    }

    #[test]
    fn distance_is_euclidean() {
        let rec = record(0, 7);
        let unit = Unit::classify(&rec, 0, &players()).unwrap().unwrap();
        let d = unit.data().distance_to(13, 16);
        assert!((d - 5.0).abs() < 1e-9);
    }
}
