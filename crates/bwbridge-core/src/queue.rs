//! Outgoing command queue
//!
//! The queue is the only shared-mutation boundary between the agent thread
//! (producer) and the session loop (consumer). `enqueue` is unbounded and
//! infallible; `drain_batch` removes a bounded batch atomically with respect
//! to producers. Drain order is FIFO: under sustained overflow older commands
//! are sent first rather than starving.

use crate::command::{Command, CommandKind};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Thread-safe queue of commands awaiting transmission to the engine.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands currently waiting.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a command. Always succeeds; producers are never rate-limited.
    pub fn enqueue(&self, command: Command) {
        self.queue.lock().unwrap().push_back(command);
    }

    /// Remove and return up to `max` commands, oldest first. Never blocks
    /// beyond the internal lock; returns exactly `min(max, len)` commands.
    pub fn drain_batch(&self, max: usize) -> Vec<Command> {
        let mut queue = self.queue.lock().unwrap();
        let count = max.min(queue.len());
        queue.drain(..count).collect()
    }

    fn push(&self, kind: CommandKind, unit_id: i32, arg0: i32, arg1: i32, arg2: i32) {
        self.enqueue(Command::new(kind, unit_id, arg0, arg1, arg2));
    }

    // Unit orders. One method per command kind, arity fixed by signature;
    // the engine validates legality per unit.

    /// Attack-move to a tile position.
    pub fn attack_move(&self, unit_id: i32, x: i32, y: i32) {
        self.push(CommandKind::AttackMove, unit_id, x, y, 0);
    }

    /// Attack a target unit.
    pub fn attack_unit(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::AttackUnit, unit_id, target_id, 0, 0);
    }

    /// Right-click a tile position (move, in most contexts).
    pub fn right_click(&self, unit_id: i32, x: i32, y: i32) {
        self.push(CommandKind::RightClick, unit_id, x, y, 0);
    }

    /// Right-click a target unit (gather, follow, attack — context-dependent).
    pub fn right_click_unit(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::RightClickUnit, unit_id, target_id, 0, 0);
    }

    /// Train a unit of the given type from a production building.
    pub fn train(&self, unit_id: i32, type_id: i32) {
        self.push(CommandKind::Train, unit_id, type_id, 0, 0);
    }

    /// Send a worker to construct a building at a tile position.
    pub fn build(&self, unit_id: i32, tx: i32, ty: i32, type_id: i32) {
        self.push(CommandKind::Build, unit_id, tx, ty, type_id);
    }

    /// Construct an addon on a building.
    pub fn build_addon(&self, unit_id: i32, type_id: i32) {
        self.push(CommandKind::BuildAddon, unit_id, type_id, 0, 0);
    }

    /// Research a tech type.
    pub fn research(&self, unit_id: i32, tech_id: i32) {
        self.push(CommandKind::Research, unit_id, tech_id, 0, 0);
    }

    /// Start an upgrade.
    pub fn upgrade(&self, unit_id: i32, upgrade_id: i32) {
        self.push(CommandKind::Upgrade, unit_id, upgrade_id, 0, 0);
    }

    /// Stop; the unit will still chase enemies entering its vision.
    pub fn stop(&self, unit_id: i32) {
        self.push(CommandKind::Stop, unit_id, 0, 0, 0);
    }

    /// Hold position; the unit will not chase.
    pub fn hold_position(&self, unit_id: i32) {
        self.push(CommandKind::HoldPosition, unit_id, 0, 0, 0);
    }

    /// Patrol between the current location and a tile position.
    pub fn patrol(&self, unit_id: i32, x: i32, y: i32) {
        self.push(CommandKind::Patrol, unit_id, x, y, 0);
    }

    /// Follow a target unit.
    pub fn follow(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::Follow, unit_id, target_id, 0, 0);
    }

    /// Set a building's rally point to a tile position.
    pub fn set_rally_position(&self, unit_id: i32, x: i32, y: i32) {
        self.push(CommandKind::SetRallyPosition, unit_id, x, y, 0);
    }

    /// Set a building's rally point to a target unit.
    pub fn set_rally_unit(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::SetRallyUnit, unit_id, target_id, 0, 0);
    }

    /// Repair a target unit.
    pub fn repair(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::Repair, unit_id, target_id, 0, 0);
    }

    /// Morph into a different unit type.
    pub fn morph(&self, unit_id: i32, type_id: i32) {
        self.push(CommandKind::Morph, unit_id, type_id, 0, 0);
    }

    pub fn burrow(&self, unit_id: i32) {
        self.push(CommandKind::Burrow, unit_id, 0, 0, 0);
    }

    pub fn unburrow(&self, unit_id: i32) {
        self.push(CommandKind::Unburrow, unit_id, 0, 0, 0);
    }

    pub fn siege(&self, unit_id: i32) {
        self.push(CommandKind::Siege, unit_id, 0, 0, 0);
    }

    pub fn unsiege(&self, unit_id: i32) {
        self.push(CommandKind::Unsiege, unit_id, 0, 0, 0);
    }

    pub fn cloak(&self, unit_id: i32) {
        self.push(CommandKind::Cloak, unit_id, 0, 0, 0);
    }

    pub fn decloak(&self, unit_id: i32) {
        self.push(CommandKind::Decloak, unit_id, 0, 0, 0);
    }

    /// Lift a building off the ground.
    pub fn lift(&self, unit_id: i32) {
        self.push(CommandKind::Lift, unit_id, 0, 0, 0);
    }

    /// Land a lifted building at a tile position.
    pub fn land(&self, unit_id: i32, tx: i32, ty: i32) {
        self.push(CommandKind::Land, unit_id, tx, ty, 0);
    }

    /// Load a target unit into a transport.
    pub fn load(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::Load, unit_id, target_id, 0, 0);
    }

    /// Unload a target unit from a transport.
    pub fn unload(&self, unit_id: i32, target_id: i32) {
        self.push(CommandKind::Unload, unit_id, target_id, 0, 0);
    }

    /// Unload everything at the current location.
    pub fn unload_all(&self, unit_id: i32) {
        self.push(CommandKind::UnloadAll, unit_id, 0, 0, 0);
    }

    /// Unload everything at a tile position.
    pub fn unload_all_position(&self, unit_id: i32, x: i32, y: i32) {
        self.push(CommandKind::UnloadAllPosition, unit_id, x, y, 0);
    }

    pub fn cancel_construction(&self, unit_id: i32) {
        self.push(CommandKind::CancelConstruction, unit_id, 0, 0, 0);
    }

    /// Pause construction without cancelling the building.
    pub fn halt_construction(&self, unit_id: i32) {
        self.push(CommandKind::HaltConstruction, unit_id, 0, 0, 0);
    }

    pub fn cancel_morph(&self, unit_id: i32) {
        self.push(CommandKind::CancelMorph, unit_id, 0, 0, 0);
    }

    /// Remove the last unit from a building's training queue.
    pub fn cancel_train(&self, unit_id: i32) {
        self.push(CommandKind::CancelTrain, unit_id, 0, 0, 0);
    }

    /// Remove a specific slot from a building's training queue.
    pub fn cancel_train_slot(&self, unit_id: i32, slot: i32) {
        self.push(CommandKind::CancelTrainSlot, unit_id, slot, 0, 0);
    }

    pub fn cancel_addon(&self, unit_id: i32) {
        self.push(CommandKind::CancelAddon, unit_id, 0, 0, 0);
    }

    pub fn cancel_research(&self, unit_id: i32) {
        self.push(CommandKind::CancelResearch, unit_id, 0, 0, 0);
    }

    pub fn cancel_upgrade(&self, unit_id: i32) {
        self.push(CommandKind::CancelUpgrade, unit_id, 0, 0, 0);
    }

    /// Use a tech with no target (stim packs).
    pub fn use_tech(&self, unit_id: i32, tech_id: i32) {
        self.push(CommandKind::UseTech, unit_id, tech_id, 0, 0);
    }

    /// Use a tech at a tile position (area spells such as plague).
    pub fn use_tech_position(&self, unit_id: i32, tech_id: i32, x: i32, y: i32) {
        self.push(CommandKind::UseTechPosition, unit_id, tech_id, x, y);
    }

    /// Use a tech on a target unit (targeted spells such as irradiate).
    pub fn use_tech_target(&self, unit_id: i32, tech_id: i32, target_id: i32) {
        self.push(CommandKind::UseTechTarget, unit_id, tech_id, target_id, 0);
    }

    /// Set the engine game speed. 0 is fastest.
    pub fn set_game_speed(&self, speed: i32) {
        self.push(CommandKind::GameSpeed, speed, 0, 0, 0);
    }
}
