//! Example agent: keeps the economy going
//!
//! Sends idle workers to the nearest mineral patch, trains (or morphs) more
//! workers while minerals allow, and adds supply when close to the cap.
//! Deliberately simple; it exists to exercise the bridge end to end.

use bwbridge_core::agent::{Agent, StopToken};
use bwbridge_core::catalog::{center_type, supply_type, worker_type};
use bwbridge_core::game::{Game, nearest};
use bwbridge_core::player::Race;
use bwbridge_core::unit::UnitData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Order id the engine reports for units idling under player control.
const ORDER_PLAYER_GUARD: i32 = 3;

/// Zerg larva unit type id; zerg production morphs larvae instead of
/// training from a building.
const TYPE_LARVA: u16 = 35;

/// Supply headroom (in 2x supply units) below which more supply is wanted.
const SUPPLY_MARGIN: i32 = 2;

#[derive(Debug, Default)]
pub struct MinerAgent;

impl MinerAgent {
    fn think(&self, game: &Game) {
        let player = game.player();
        let race = game.local_race();
        let my_units = game.my_units();
        let minerals = game.minerals();

        // Put idle workers on the nearest patch.
        for unit in my_units.iter().filter(|u| u.order == ORDER_PLAYER_GUARD) {
            if let Some(patch) = nearest(&minerals, unit.x, unit.y) {
                debug!(worker = unit.id, patch = patch.id, "sending idle worker to mine");
                game.commands().right_click_unit(unit.id, patch.id);
            }
        }

        // More workers while we can afford them.
        if player.minerals() >= 50 {
            let worker = worker_type(race);
            if race == Race::Zerg {
                for larva in my_units.iter().filter(|u| u.type_id == TYPE_LARVA) {
                    game.commands().morph(larva.id, worker as i32);
                }
            } else {
                let center = center_type(race);
                for building in my_units.iter().filter(|u| u.type_id == center) {
                    game.commands().train(building.id, worker as i32);
                }
            }
        }

        // More supply when close to the cap.
        if player.minerals() >= 100
            && player.supply_used() >= player.supply_total() - SUPPLY_MARGIN
        {
            let supply = supply_type(race);
            if race == Race::Zerg {
                for larva in my_units.iter().filter(|u| u.type_id == TYPE_LARVA) {
                    game.commands().morph(larva.id, supply as i32);
                }
            } else if let Some(worker) = my_units.iter().find(|u| u.type_id == worker_type(race)) {
                if let Some((tx, ty)) = find_build_spot(game, worker, supply) {
                    debug!(worker = worker.id, tx, ty, "placing supply building");
                    game.commands().build(worker.id, tx, ty, supply as i32);
                }
            }
        }
    }
}

/// First placement near the worker where the building's footprint fits,
/// scanning outward ring by ring.
fn find_build_spot(game: &Game, worker: &UnitData, type_id: u16) -> Option<(i32, i32)> {
    for radius in 1..=10i32 {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let (tx, ty) = (worker.x + dx, worker.y + dy);
                if game.can_place(type_id, tx, ty) {
                    return Some((tx, ty));
                }
            }
        }
    }
    None
}

impl Agent for MinerAgent {
    fn run(&mut self, game: Arc<Game>, stop: &StopToken) {
        while stop.sleep(Duration::from_secs(1)) {
            self.think(&game);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwbridge_core::player::{PlayerDelta, PlayerStatus, TECH_SLOTS, UPGRADE_SLOTS};
    use bwbridge_core::unit::{Unit, UnitRecord};
    use bwbridge_core::{Catalogs, CommandKind, MapGrid};

    fn game() -> Game {
        Game::new(
            MapGrid::new("m".into(), 16, 16, vec![0; 256], vec![true; 256], vec![true; 256]),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![PlayerStatus::new(0, Race::Terran, "me".into(), 1, false)],
            0,
            Arc::new(Catalogs::empty()),
        )
        .unwrap()
    }

    fn unit(game: &Game, id: i32, player_id: i32, type_id: i32, order: i32) -> Unit {
        let record = UnitRecord {
            id,
            player_id,
            type_id,
            x: 8,
            y: 8,
            hit_points: 100,
            shields: 0,
            energy: 0,
            build_timer: 0,
            train_timer: 0,
            research_timer: 0,
            upgrade_timer: 0,
            order_timer: 0,
            order,
            resources: 0,
            addon_id: 0,
            mine_count: 0,
        };
        Unit::classify(&record, 0, &game.players()).unwrap().unwrap()
    }

    fn delta(minerals: i32, supply_used: i32, supply_total: i32) -> PlayerDelta {
        PlayerDelta {
            minerals,
            gas: 0,
            supply_used,
            supply_total,
            research_progress: [0; TECH_SLOTS],
            upgrade_progress: [0; UPGRADE_SLOTS],
        }
    }

    #[test]
    fn idle_workers_are_sent_mining() {
        let game = game();
        let units = vec![
            unit(&game, 1, 0, 7, ORDER_PLAYER_GUARD),
            unit(&game, 2, 11, 176, 0),
        ];
        game.apply_frame_update(&delta(0, 8, 20), units);

        MinerAgent.think(&game);

        let batch = game.commands().drain_batch(10);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, CommandKind::RightClickUnit);
        assert_eq!((batch[0].unit_id, batch[0].arg0), (1, 2));
    }

    #[test]
    fn trains_workers_when_affordable() {
        let game = game();
        let units = vec![unit(&game, 5, 0, 106, 0)];
        game.apply_frame_update(&delta(50, 8, 20), units);

        MinerAgent.think(&game);

        let batch = game.commands().drain_batch(10);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, CommandKind::Train);
        assert_eq!((batch[0].unit_id, batch[0].arg0), (5, 7));
    }

    #[test]
    fn builds_supply_near_the_cap() {
        let game = game();
        let units = vec![unit(&game, 9, 0, 7, 0)];
        game.apply_frame_update(&delta(100, 18, 20), units);

        MinerAgent.think(&game);

        let batch = game.commands().drain_batch(10);
        // No center to train from, so the only command is the supply build.
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, CommandKind::Build);
        assert_eq!(batch[0].arg2, 109);
    }
}
