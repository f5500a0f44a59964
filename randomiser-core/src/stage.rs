use serde::Serialize;

use crate::catalog::{
    island_sector, Catalog, Category, Entrance, Exit, SpawnTarget, FIRE_MOUNTAIN_CAVE_ENTRANCE,
    FIRE_MOUNTAIN_SECRET_CAVE, ICE_RING_ISLE_CAVE_ENTRANCE, ICE_RING_ISLE_INNER_CAVE,
    ICE_RING_ISLE_SECRET_CAVE, SAVAGE_LABYRINTH, SAVAGE_LABYRINTH_SEA_EXIT_ROOMS,
};
use crate::{RandomiserError, Result};

/// Change applied to a player spawn point.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SpawnPatch {
    /// Spawn type 5 (arriving on the boat) becomes type 1. Other types are
    /// left alone. Leaving a dungeon onto a boat spawn crashes the game.
    DemoteShipSpawn,
}

/// The actor that throws the player out of the Fire Mountain and Ice Ring
/// Isle caves when their timer runs out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum KillTrigger {
    Heat,
    Cold,
    Removed,
}

/// One mutation of the stage data, in the order it should be applied.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageEdit {
    SceneChange {
        stage: &'static str,
        /// `None` addresses the stage-wide scene change table.
        room: Option<u8>,
        record_index: usize,
        dest: SpawnTarget,
    },
    SpawnPoint {
        stage: &'static str,
        room: u8,
        spawn_id: u8,
        patch: SpawnPatch,
    },
    WarpOutDestination {
        boss_stage: &'static str,
        dest: SpawnTarget,
    },
    RegionSector {
        stage: &'static str,
        room: u8,
        sector_x: i8,
        sector_y: i8,
    },
    RedirectSceneChanges {
        stage: &'static str,
        room: u8,
        from_stage: &'static str,
        dest: SpawnTarget,
    },
    KillTrigger {
        stage: &'static str,
        room: u8,
        trigger: KillTrigger,
    },
}

/// Persisted stage data, as far as entrance randomisation needs to touch it.
pub trait StageStore {
    fn set_scene_change(
        &mut self,
        stage: &str,
        room: Option<u8>,
        record_index: usize,
        dest: SpawnTarget,
    ) -> Result<()>;

    fn set_spawn_point(&mut self, stage: &str, room: u8, spawn_id: u8, patch: SpawnPatch)
        -> Result<()>;

    fn set_warp_out_destination(&mut self, boss_stage: &str, dest: SpawnTarget) -> Result<()>;

    fn set_region_sector(&mut self, stage: &str, room: u8, sector_x: i8, sector_y: i8)
        -> Result<()>;

    fn redirect_scene_changes(
        &mut self,
        stage: &str,
        room: u8,
        from_stage: &str,
        dest: SpawnTarget,
    ) -> Result<()>;

    fn set_kill_trigger(&mut self, stage: &str, room: u8, trigger: KillTrigger) -> Result<()>;
}

impl StageEdit {
    pub fn apply(&self, store: &mut dyn StageStore) -> Result<()> {
        match *self {
            StageEdit::SceneChange { stage, room, record_index, dest } => {
                store.set_scene_change(stage, room, record_index, dest)
            }
            StageEdit::SpawnPoint { stage, room, spawn_id, patch } => {
                store.set_spawn_point(stage, room, spawn_id, patch)
            }
            StageEdit::WarpOutDestination { boss_stage, dest } => {
                store.set_warp_out_destination(boss_stage, dest)
            }
            StageEdit::RegionSector { stage, room, sector_x, sector_y } => {
                store.set_region_sector(stage, room, sector_x, sector_y)
            }
            StageEdit::RedirectSceneChanges { stage, room, from_stage, dest } => {
                store.redirect_scene_changes(stage, room, from_stage, dest)
            }
            StageEdit::KillTrigger { stage, room, trigger } => {
                store.set_kill_trigger(stage, room, trigger)
            }
        }
    }
}

pub fn apply_edits(edits: &[StageEdit], store: &mut dyn StageStore) -> Result<()> {
    for edit in edits {
        edit.apply(store)?;
    }
    Ok(())
}

/// A store that only records what it was asked to do.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PatchLog {
    pub calls: Vec<String>,
}

impl PatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

fn fmt_target(dest: SpawnTarget) -> String {
    format!("{}/{}#{}", dest.stage, dest.room, dest.spawn)
}

impl StageStore for PatchLog {
    fn set_scene_change(
        &mut self,
        stage: &str,
        room: Option<u8>,
        record_index: usize,
        dest: SpawnTarget,
    ) -> Result<()> {
        let place = match room {
            Some(room) => format!("{stage}/Room{room}"),
            None => format!("{stage}/Stage"),
        };
        self.calls.push(format!(
            "scene_change {place} [{record_index}] -> {}",
            fmt_target(dest)
        ));
        Ok(())
    }

    fn set_spawn_point(
        &mut self,
        stage: &str,
        room: u8,
        spawn_id: u8,
        patch: SpawnPatch,
    ) -> Result<()> {
        self.calls
            .push(format!("spawn_point {stage}/Room{room} #{spawn_id} {patch:?}"));
        Ok(())
    }

    fn set_warp_out_destination(&mut self, boss_stage: &str, dest: SpawnTarget) -> Result<()> {
        self.calls
            .push(format!("warp_out {boss_stage} -> {}", fmt_target(dest)));
        Ok(())
    }

    fn set_region_sector(
        &mut self,
        stage: &str,
        room: u8,
        sector_x: i8,
        sector_y: i8,
    ) -> Result<()> {
        self.calls
            .push(format!("region_sector {stage}/Room{room} ({sector_x}, {sector_y})"));
        Ok(())
    }

    fn redirect_scene_changes(
        &mut self,
        stage: &str,
        room: u8,
        from_stage: &str,
        dest: SpawnTarget,
    ) -> Result<()> {
        self.calls.push(format!(
            "redirect {stage}/Room{room} {from_stage} -> {}",
            fmt_target(dest)
        ));
        Ok(())
    }

    fn set_kill_trigger(&mut self, stage: &str, room: u8, trigger: KillTrigger) -> Result<()> {
        self.calls
            .push(format!("kill_trigger {stage}/Room{room} {trigger:?}"));
        Ok(())
    }
}

fn missing_sector(island: &str) -> RandomiserError {
    RandomiserError::CatalogInvariantViolation(format!("island {island} is not on the sea chart"))
}

/// Edits that make `entrance` lead into `exit`, and leaving `exit` put the
/// player back outside `entrance`.
pub fn plan_connection_edits(
    catalog: &Catalog,
    entrance: &Entrance,
    exit: &Exit,
    outermost: &Entrance,
) -> Result<Vec<StageEdit>> {
    let mut edits = Vec::new();
    let back_outside = entrance.spawn_target();

    edits.push(StageEdit::SceneChange {
        stage: entrance.stage_name,
        room: Some(entrance.room_num),
        record_index: entrance.scls_exit_index,
        dest: exit.spawn_target(),
    });
    edits.push(StageEdit::SpawnPoint {
        stage: entrance.stage_name,
        room: entrance.room_num,
        spawn_id: entrance.spawn_id,
        patch: SpawnPatch::DemoteShipSpawn,
    });

    if catalog.exit_category(exit) == Some(Category::Boss) {
        // Saving and reloading in a boss room puts the player back at the
        // start of the dungeon that led there, or outside a sea entrance.
        let dest = match catalog.dungeon_exit_for_nested(entrance) {
            Some(dungeon_start) => dungeon_start.spawn_target(),
            None => back_outside,
        };
        edits.push(StageEdit::SceneChange {
            stage: exit.stage_name,
            room: None,
            record_index: exit.scls_exit_index,
            dest,
        });
    } else {
        edits.push(StageEdit::SceneChange {
            stage: exit.stage_name,
            room: Some(exit.room_num),
            record_index: exit.scls_exit_index,
            dest: back_outside,
        });
    }

    if exit.unique_name == SAVAGE_LABYRINTH {
        for (stage, room) in SAVAGE_LABYRINTH_SEA_EXIT_ROOMS {
            edits.push(StageEdit::RedirectSceneChanges {
                stage,
                room,
                from_stage: "sea",
                dest: back_outside,
            });
        }
    }

    let mut sector = None;
    if catalog.exit_category(exit) == Some(Category::SecretCave) {
        let island = outermost.island_name.ok_or_else(|| {
            RandomiserError::CatalogInvariantViolation(format!(
                "outermost entrance {} has no island",
                outermost.entrance_name
            ))
        })?;
        let (sector_x, sector_y) = island_sector(island).ok_or_else(|| missing_sector(island))?;
        sector = Some((sector_x, sector_y));
        edits.push(StageEdit::RegionSector {
            stage: exit.stage_name,
            room: exit.room_num,
            sector_x,
            sector_y,
        });
    }

    if let Some(trigger) = kill_trigger_for(entrance, exit) {
        edits.push(StageEdit::KillTrigger {
            stage: exit.stage_name,
            room: exit.room_num,
            trigger,
        });
    }

    if exit.unique_name == ICE_RING_ISLE_SECRET_CAVE {
        let (stage, room) = ICE_RING_ISLE_INNER_CAVE;
        edits.push(StageEdit::SceneChange {
            stage,
            room: Some(room),
            record_index: 0,
            dest: back_outside,
        });
        if let Some((sector_x, sector_y)) = sector {
            edits.push(StageEdit::RegionSector { stage, room, sector_x, sector_y });
        }
    }

    Ok(edits)
}

/// The timed caves keep their trigger only behind their own timed
/// entrance; behind the other timed island the trigger swaps element, and
/// anywhere else it would throw the player out on arrival.
fn kill_trigger_for(entrance: &Entrance, exit: &Exit) -> Option<KillTrigger> {
    let (vanilla, swapped, swapped_trigger) = match exit.unique_name {
        FIRE_MOUNTAIN_SECRET_CAVE => (
            FIRE_MOUNTAIN_CAVE_ENTRANCE,
            ICE_RING_ISLE_CAVE_ENTRANCE,
            KillTrigger::Cold,
        ),
        ICE_RING_ISLE_SECRET_CAVE => (
            ICE_RING_ISLE_CAVE_ENTRANCE,
            FIRE_MOUNTAIN_CAVE_ENTRANCE,
            KillTrigger::Heat,
        ),
        _ => return None,
    };

    if entrance.entrance_name == vanilla {
        None
    } else if entrance.entrance_name == swapped {
        Some(swapped_trigger)
    } else {
        Some(KillTrigger::Removed)
    }
}

/// Boss rooms warp the player back out to the island they came from.
pub fn plan_warp_out(boss_stage: &'static str, outermost: &Entrance) -> Result<StageEdit> {
    let dest = outermost.warp_out.ok_or_else(|| {
        RandomiserError::CatalogInvariantViolation(format!(
            "outermost entrance {} has no warp out destination",
            outermost.entrance_name
        ))
    })?;
    Ok(StageEdit::WarpOutDestination { boss_stage, dest })
}
