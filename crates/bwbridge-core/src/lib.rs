//! # bwbridge-core
//!
//! Game state model and agent contract for the bwbridge proxy.
//!
//! This crate provides the I/O-free heart of the bridge:
//! - Static type catalogs (unit/tech/upgrade descriptors)
//! - The frame-synchronized [`Game`] state model (map, players, units)
//! - The thread-safe outgoing [`CommandQueue`]
//! - The [`Agent`] trait and cooperative cancellation token

pub mod agent;
pub mod catalog;
pub mod command;
pub mod error;
pub mod game;
pub mod map;
pub mod player;
pub mod queue;
pub mod unit;

pub use agent::{Agent, AgentFactory, NullAgent, StopToken};
pub use catalog::{Catalogs, TechTypeInfo, UnitTypeInfo, UpgradeTypeInfo};
pub use command::{Command, CommandKind};
pub use error::{BridgeError, Result};
pub use game::{Game, nearest};
pub use map::{ChokePoint, MapGrid, PIXELS_PER_TILE, TilePos};
pub use player::{
    MAX_PLAYERS, NEUTRAL_PLAYER_ID, PlayerDelta, PlayerStatus, Race, TECH_SLOTS, UPGRADE_SLOTS,
};
pub use queue::CommandQueue;
pub use unit::{UNIT_RECORD_FIELDS, Unit, UnitData, UnitRecord};
