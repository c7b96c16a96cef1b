//! Frame-synchronized game state model
//!
//! One [`Game`] exists per session. The session loop is the only writer
//! (one [`Game::apply_frame_update`] per engine frame); the agent thread and
//! any visualization consumer read through snapshot accessors. Views are
//! clones of the current frame's data and go stale the instant the next
//! frame is applied.
//!
//! All coordinates are tile coordinates.

use crate::catalog::{Catalogs, UnitTypeInfo};
use crate::error::{BridgeError, Result};
use crate::map::{ChokePoint, MapGrid, TilePos};
use crate::player::{MAX_PLAYERS, PlayerDelta, PlayerStatus, Race};
use crate::queue::CommandQueue;
use crate::unit::{Unit, UnitData};
use std::sync::{Arc, RwLock};
use std::time::Instant;

struct FrameState {
    frame: u64,
    players: Vec<Option<PlayerStatus>>,
    units: Vec<Unit>,
    last_update: Option<Instant>,
}

/// The queryable world state one session maintains.
pub struct Game {
    map: MapGrid,
    starting_locations: Vec<TilePos>,
    base_locations: Vec<TilePos>,
    choke_points: Vec<ChokePoint>,
    catalogs: Arc<Catalogs>,
    local_player_id: u8,
    local_race: Race,
    state: RwLock<FrameState>,
    commands: CommandQueue,
}

impl Game {
    /// Builds the state model from the pre-game data. The unit set stays
    /// empty until the first frame update is applied.
    pub fn new(
        map: MapGrid,
        starting_locations: Vec<TilePos>,
        base_locations: Vec<TilePos>,
        choke_points: Vec<ChokePoint>,
        players: Vec<PlayerStatus>,
        local_player_id: u8,
        catalogs: Arc<Catalogs>,
    ) -> Result<Self> {
        let mut table: Vec<Option<PlayerStatus>> = (0..MAX_PLAYERS).map(|_| None).collect();
        for player in players {
            let slot = player.id() as usize;
            if slot >= MAX_PLAYERS {
                return Err(BridgeError::MalformedProtocol(format!(
                    "player id out of range: {}",
                    player.id()
                )));
            }
            table[slot] = Some(player);
        }

        let local_race = table
            .get(local_player_id as usize)
            .and_then(Option::as_ref)
            .map(PlayerStatus::race)
            .ok_or_else(|| {
                BridgeError::MalformedProtocol(format!(
                    "local player {local_player_id} missing from handshake"
                ))
            })?;

        Ok(Self {
            map,
            starting_locations,
            base_locations,
            choke_points,
            catalogs,
            local_player_id,
            local_race,
            state: RwLock::new(FrameState {
                frame: 0,
                players: table,
                units: Vec::new(),
                last_update: None,
            }),
            commands: CommandQueue::new(),
        })
    }

    /// Applies one engine frame: bumps the frame counter, merges the local
    /// player's delta, wholesale-replaces the unit set.
    pub fn apply_frame_update(&self, delta: &PlayerDelta, units: Vec<Unit>) {
        let mut state = self.state.write().unwrap();
        state.frame += 1;
        if let Some(local) = state.players[self.local_player_id as usize].as_mut() {
            local.apply_delta(delta);
        }
        state.units = units;
        state.last_update = Some(Instant::now());
    }

    /// The outgoing command queue. Agents enqueue through the typed methods.
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn map(&self) -> &MapGrid {
        &self.map
    }

    pub fn starting_locations(&self) -> &[TilePos] {
        &self.starting_locations
    }

    pub fn base_locations(&self) -> &[TilePos] {
        &self.base_locations
    }

    pub fn choke_points(&self) -> &[ChokePoint] {
        &self.choke_points
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn local_player_id(&self) -> u8 {
        self.local_player_id
    }

    pub fn local_race(&self) -> Race {
        self.local_race
    }

    /// Monotonic count of frames applied so far.
    pub fn frame(&self) -> u64 {
        self.state.read().unwrap().frame
    }

    /// When the last frame was applied, if any.
    pub fn last_update(&self) -> Option<Instant> {
        self.state.read().unwrap().last_update
    }

    /// Snapshot of the local player.
    pub fn player(&self) -> PlayerStatus {
        self.player_by_id(self.local_player_id)
            .expect("local player verified at construction")
    }

    /// Snapshot of any participant, if present.
    pub fn player_by_id(&self, id: u8) -> Option<PlayerStatus> {
        self.state
            .read()
            .unwrap()
            .players
            .get(id as usize)
            .and_then(Option::as_ref)
            .cloned()
    }

    /// Snapshot of the full participant table, indexed by player id.
    pub fn players(&self) -> Vec<Option<PlayerStatus>> {
        self.state.read().unwrap().players.clone()
    }

    /// Snapshot of the current frame's full unit set.
    pub fn units(&self) -> Vec<Unit> {
        self.state.read().unwrap().units.clone()
    }

    fn filtered<F>(&self, keep: F) -> Vec<UnitData>
    where
        F: Fn(&Unit) -> bool,
    {
        self.state
            .read()
            .unwrap()
            .units
            .iter()
            .filter(|u| keep(u))
            .map(|u| u.data().clone())
            .collect()
    }

    /// Units owned by the local player.
    pub fn my_units(&self) -> Vec<UnitData> {
        self.filtered(|u| matches!(u, Unit::Mine(_)))
    }

    pub fn enemy_units(&self) -> Vec<UnitData> {
        self.filtered(|u| matches!(u, Unit::Enemy(_)))
    }

    pub fn ally_units(&self) -> Vec<UnitData> {
        self.filtered(|u| matches!(u, Unit::Ally(_)))
    }

    pub fn minerals(&self) -> Vec<UnitData> {
        self.filtered(|u| matches!(u, Unit::MineralPatch(_)))
    }

    pub fn geysers(&self) -> Vec<UnitData> {
        self.filtered(|u| matches!(u, Unit::VespeneGeyser(_)))
    }

    /// Catalog descriptor for a unit, with the unknown sentinel for ids the
    /// catalog has no entry for.
    pub fn unit_type(&self, unit: &UnitData) -> &UnitTypeInfo {
        self.catalogs.unit_type(unit.type_id)
    }

    /// Whether a footprint of the given size can be built at `(tx, ty)`.
    /// Strict conjunction over the whole rectangle; see [`MapGrid`].
    pub fn can_build(&self, tx: i32, ty: i32, width: usize, height: usize) -> bool {
        self.map.is_buildable_rect(tx, ty, width, height)
    }

    /// Whether a building of the given catalog type fits at `(tx, ty)`,
    /// using the catalog's tile footprint.
    pub fn can_place(&self, type_id: u16, tx: i32, ty: i32) -> bool {
        let info = self.catalogs.unit_type(type_id);
        self.can_build(tx, ty, info.tile_width as usize, info.tile_height as usize)
    }
}

/// The unit in `units` closest to `(x, y)` by Euclidean tile distance.
pub fn nearest<'a>(units: &'a [UnitData], x: i32, y: i32) -> Option<&'a UnitData> {
    units
        .iter()
        .min_by(|a, b| a.distance_to(x, y).total_cmp(&b.distance_to(x, y)))
}
