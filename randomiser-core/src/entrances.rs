use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::catalog::{Catalog, Category, CategorySet, Entrance, Exit};
use crate::nesting::{resolve_chain, resolve_outermost, ChainResolution, ExitsToEntrances};
use crate::stage::{plan_connection_edits, plan_warp_out, StageEdit};
use crate::{RandomiserError, RandomiserSettings, Result};

/// Entrance display name to exit unique name.
pub type EntranceConnections = BTreeMap<String, String>;
/// Exit zone name to the island its outermost entrance is on.
pub type IslandAttribution = BTreeMap<String, String>;
/// Entrance names from the sea down to a terminal exit, which ends the path.
pub type NestedPathReport = Vec<Vec<String>>;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceRandoMode {
    #[default]
    Disabled,
    Dungeons,
    NestedDungeons,
    SecretCaves,
    DungeonsAndSecretCavesSeparately,
    NestedDungeonsAndSecretCavesSeparately,
    DungeonsAndSecretCavesTogether,
    NestedDungeonsAndSecretCavesTogether,
}

impl EntranceRandoMode {
    /// The category sets randomised by this mode, one per pass.
    pub fn passes(self) -> Vec<CategorySet> {
        const DUNGEONS: CategorySet = CategorySet { dungeons: true, bosses: false, caves: false };
        const NESTED: CategorySet = CategorySet { dungeons: true, bosses: true, caves: false };
        const CAVES: CategorySet = CategorySet { dungeons: false, bosses: false, caves: true };

        match self {
            EntranceRandoMode::Disabled => vec![],
            EntranceRandoMode::Dungeons => vec![DUNGEONS],
            EntranceRandoMode::NestedDungeons => vec![NESTED],
            EntranceRandoMode::SecretCaves => vec![CAVES],
            EntranceRandoMode::DungeonsAndSecretCavesSeparately => vec![DUNGEONS, CAVES],
            EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately => vec![NESTED, CAVES],
            EntranceRandoMode::DungeonsAndSecretCavesTogether => {
                vec![CategorySet { caves: true, ..DUNGEONS }]
            }
            EntranceRandoMode::NestedDungeonsAndSecretCavesTogether => {
                vec![CategorySet { caves: true, ..NESTED }]
            }
        }
    }
}

/// Which kinds of location may hold progress items.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionSettings {
    pub dungeons: bool,
    pub puzzle_secret_caves: bool,
    pub combat_secret_caves: bool,
    pub savage_labyrinth: bool,
}

impl ProgressionSettings {
    fn any_secret_caves(&self) -> bool {
        self.puzzle_secret_caves || self.combat_secret_caves || self.savage_labyrinth
    }
}

/// Options that shape a single pass.
#[derive(Copy, Clone, Debug, Default)]
pub struct PassOptions {
    pub race_mode: bool,
    pub progression: ProgressionSettings,
    /// Nothing but these entrances is reachable at the start of the game.
    pub dungeons_and_caves_only_start: bool,
}

impl From<&RandomiserSettings> for PassOptions {
    fn from(settings: &RandomiserSettings) -> Self {
        Self {
            race_mode: settings.race_mode,
            progression: settings.progression,
            dungeons_and_caves_only_start: settings.dungeons_and_caves_only_start,
        }
    }
}

/// Everything one or more passes decided, ready for the stage store and
/// the hint/spoiler collaborators.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntranceRandomisation {
    pub entrance_connections: EntranceConnections,
    pub island_attribution: IslandAttribution,
    pub nested_entrance_paths: NestedPathReport,
    /// The entrance the player is steered to first on a restricted start.
    pub safety_entrances: Vec<String>,
    /// Entrance and exit names in the order they were connected.
    #[serde(skip)]
    pub placement_order: Vec<(String, String)>,
    #[serde(skip)]
    pub edits: Vec<StageEdit>,
}

impl EntranceRandomisation {
    fn merge(&mut self, other: EntranceRandomisation) {
        self.entrance_connections.extend(other.entrance_connections);
        self.island_attribution.extend(other.island_attribution);
        self.nested_entrance_paths.extend(other.nested_entrance_paths);
        self.safety_entrances.extend(other.safety_entrances);
        self.placement_order.extend(other.placement_order);
        self.edits.extend(other.edits);
    }
}

/// Runs every pass the mode asks for on the same random source.
pub fn randomize_entrances<R: Rng + ?Sized>(
    catalog: &Catalog,
    settings: &RandomiserSettings,
    rng: &mut R,
) -> Result<EntranceRandomisation> {
    let options = PassOptions::from(settings);
    let mut result = EntranceRandomisation::default();
    for categories in settings.randomize_entrances.passes() {
        let pass = randomize_one_set_of_entrances(catalog, categories, &options, rng)?;
        result.merge(pass);
    }
    Ok(result)
}

struct SafetyFilter<'c> {
    entrance: &'c Entrance,
    exit_names: Vec<&'static str>,
}

fn safety_filter<'c, R: Rng + ?Sized>(
    catalog: &'c Catalog,
    categories: CategorySet,
    options: &PassOptions,
    relevant_entrances: &[&'c Entrance],
    rng: &mut R,
) -> Result<Option<SafetyFilter<'c>>> {
    let progression = &options.progression;
    let dungeons = categories.dungeons && progression.dungeons;
    let caves = categories.caves && progression.any_secret_caves();
    if !options.dungeons_and_caves_only_start || !(dungeons || caves) {
        return Ok(None);
    }

    let lists = &catalog.no_requirements;
    let mut entrance_names: Vec<&'static str> = Vec::new();
    let mut exit_names: Vec<&'static str> = Vec::new();
    if dungeons {
        entrance_names.extend(&lists.dungeon_entrances);
        exit_names.extend(&lists.dungeon_exits);
    }
    if caves {
        entrance_names.extend(&lists.secret_cave_entrances);
    }
    if categories.caves && progression.puzzle_secret_caves {
        exit_names.extend(&lists.puzzle_secret_cave_exits);
    }
    if categories.caves && progression.combat_secret_caves {
        exit_names.extend(&lists.combat_secret_cave_exits);
    }
    // Nothing in Savage Labyrinth is free, so it adds no exits.

    let possible: Vec<&'c Entrance> = relevant_entrances
        .iter()
        .copied()
        .filter(|e| entrance_names.contains(&e.entrance_name))
        .collect();
    let entrance = *possible
        .choose(rng)
        .ok_or(RandomiserError::NoSafetyEntrance)?;

    Ok(Some(SafetyFilter { entrance, exit_names }))
}

/// Moves entrances on islands with more than one entrance to the front,
/// keeping their order. Those islands are the ones race mode can fail on.
fn group_shared_islands<'c>(entrances: Vec<&'c Entrance>) -> Vec<&'c Entrance> {
    let shares_island = |entrance: &Entrance| {
        entrance.island_name.is_some()
            && entrances
                .iter()
                .any(|other| *other != entrance && other.island_name == entrance.island_name)
    };
    let (mut shared, unique): (Vec<_>, Vec<_>) =
        entrances.iter().copied().partition(|e| shares_island(*e));
    shared.extend(unique);
    shared
}

/// Pairs every entrance of the selected categories with one exit of the
/// same categories.
pub fn randomize_one_set_of_entrances<R: Rng + ?Sized>(
    catalog: &Catalog,
    categories: CategorySet,
    options: &PassOptions,
    rng: &mut R,
) -> Result<EntranceRandomisation> {
    let mut relevant_entrances = catalog.entrances_for(categories);
    let relevant_exits = catalog.exits_for(categories);
    let mut remaining_exits = relevant_exits.clone();

    relevant_entrances.shuffle(rng);

    if options.race_mode {
        relevant_entrances = group_shared_islands(relevant_entrances);
    }

    let safety = safety_filter(catalog, categories, options, &relevant_entrances, rng)?;
    if let Some(safety) = &safety {
        relevant_entrances.retain(|e| *e != safety.entrance);
        relevant_entrances.insert(0, safety.entrance);
    }

    let is_category =
        |exit: &Exit, category: Category| catalog.exit_category(exit) == Some(category);

    let mut pending: VecDeque<&Entrance> = relevant_entrances.into();
    let mut done_entrances_to_exits: Vec<(&Entrance, &Exit)> = Vec::new();
    let mut done_exits_to_entrances = ExitsToEntrances::new();
    let mut deferred_in_a_row = 0usize;

    while let Some(zone_entrance) = pending.pop_front() {
        if resolve_outermost(zone_entrance, &done_exits_to_entrances, catalog)?.is_none() {
            // A boss entrance not yet reachable from the sea. Connecting it
            // now risks a loop, so it waits until its dungeon is placed.
            debug!("deferring {}", zone_entrance.entrance_name);
            pending.push_back(zone_entrance);
            deferred_in_a_row += 1;
            if deferred_in_a_row >= pending.len() {
                let names: Vec<&str> = pending.iter().map(|e| e.entrance_name).collect();
                return Err(RandomiserError::CatalogInvariantViolation(format!(
                    "no remaining entrance is reachable from the sea: {}",
                    names.join(", ")
                )));
            }
            continue;
        }
        deferred_in_a_row = 0;

        let mut possible_exits: Vec<&Exit> = match &safety {
            Some(safety) if safety.entrance == zone_entrance => remaining_exits
                .iter()
                .copied()
                .filter(|ex| safety.exit_names.contains(&ex.unique_name))
                .collect(),
            _ => remaining_exits.clone(),
        };

        if remaining_exits.iter().any(|ex| !is_category(*ex, Category::Boss)) {
            // Boss exits go last, once everything else is placed.
            possible_exits.retain(|ex| !is_category(*ex, Category::Boss));
        }

        if options.race_mode {
            // Race mode only marks which island a required dungeon is on, so
            // one island must not hold two dungeons.
            let island_has_dungeon = done_entrances_to_exits.iter().any(|&(entr, ex)| {
                entr.island_name.is_some()
                    && entr.island_name == zone_entrance.island_name
                    && !is_category(ex, Category::SecretCave)
            });
            if island_has_dungeon {
                possible_exits.retain(|ex| is_category(*ex, Category::SecretCave));
            }
        }

        let zone_exit = *possible_exits.choose(rng).ok_or_else(|| {
            RandomiserError::UnsatisfiableConfiguration {
                entrance: zone_entrance.entrance_name.to_string(),
            }
        })?;
        remaining_exits.retain(|ex| *ex != zone_exit);

        debug!("{} -> {}", zone_entrance.entrance_name, zone_exit.unique_name);
        done_entrances_to_exits.push((zone_entrance, zone_exit));
        done_exits_to_entrances.insert(zone_exit, zone_entrance);
    }

    let mut result = EntranceRandomisation::default();
    if let Some(safety) = &safety {
        result.safety_entrances.push(safety.entrance.entrance_name.to_string());
    }

    for &(zone_entrance, zone_exit) in &done_entrances_to_exits {
        let names = (
            zone_entrance.entrance_name.to_string(),
            zone_exit.unique_name.to_string(),
        );
        result.entrance_connections.insert(names.0.clone(), names.1.clone());
        result.placement_order.push(names);

        let outermost = outermost_island_entrance(zone_entrance, &done_exits_to_entrances, catalog)?;
        let island = outermost.island_name.unwrap_or_default();
        result
            .island_attribution
            .insert(zone_exit.zone_name.to_string(), island.to_string());

        result.edits.extend(plan_connection_edits(
            catalog,
            zone_entrance,
            zone_exit,
            outermost,
        )?);
    }

    if categories.bosses {
        for boss_exit in &catalog.boss_exits {
            if let Some(&zone_entrance) = done_exits_to_entrances.get(boss_exit) {
                let outermost =
                    outermost_island_entrance(zone_entrance, &done_exits_to_entrances, catalog)?;
                result.edits.push(plan_warp_out(boss_exit.stage_name, outermost)?);
            }
        }
    } else if categories.dungeons {
        for dungeon_exit in &catalog.dungeon_exits {
            let Some(boss_stage) = dungeon_exit.boss_stage_name else {
                continue;
            };
            let Some(&outermost) = done_exits_to_entrances.get(dungeon_exit) else {
                continue;
            };
            result.edits.push(plan_warp_out(boss_stage, outermost)?);

            // Hints about the boss still need to know its island even though
            // the boss door itself stays where it was.
            if let (Some(boss_exit), Some(island)) =
                (catalog.boss_exit_for_stage(boss_stage), outermost.island_name)
            {
                result
                    .island_attribution
                    .insert(boss_exit.zone_name.to_string(), island.to_string());
            }
        }
    }

    // Only passes that move boss doors report paths.
    if categories.bosses {
        for terminal_exit in relevant_exits
            .iter()
            .filter(|ex| !is_category(**ex, Category::Dungeon))
        {
            let Some(&zone_entrance) = done_exits_to_entrances.get(*terminal_exit) else {
                continue;
            };
            let ChainResolution::Complete(seen) =
                resolve_chain(zone_entrance, &done_exits_to_entrances, catalog)?
            else {
                return Err(unresolved(zone_entrance));
            };
            let mut path = vec![terminal_exit.unique_name.to_string()];
            path.extend(seen.iter().map(|e| e.entrance_name.to_string()));
            path.reverse();
            result.nested_entrance_paths.push(path);
        }
    }

    info!(
        "placed {} entrances (dungeons: {}, bosses: {}, caves: {})",
        done_entrances_to_exits.len(),
        categories.dungeons,
        categories.bosses,
        categories.caves
    );

    Ok(result)
}

fn unresolved(entrance: &Entrance) -> RandomiserError {
    RandomiserError::CatalogInvariantViolation(format!(
        "entrance {} is not reachable from the sea after placement",
        entrance.entrance_name
    ))
}

fn outermost_island_entrance<'c>(
    entrance: &'c Entrance,
    done_exits_to_entrances: &ExitsToEntrances<'c>,
    catalog: &'c Catalog,
) -> Result<&'c Entrance> {
    resolve_outermost(entrance, done_exits_to_entrances, catalog)?
        .ok_or_else(|| unresolved(entrance))
}

/// Groups placements by the island of their entrance, for the spoiler's
/// per-island listing. Nested entrances are left out.
pub fn connections_by_island<'c>(
    catalog: &'c Catalog,
    connections: &EntranceConnections,
) -> HashMap<&'c str, Vec<(&'c Entrance, &'c Exit)>> {
    let mut by_island: HashMap<&str, Vec<(&Entrance, &Exit)>> = HashMap::new();
    for (entrance_name, exit_name) in connections {
        let (Some(entrance), Some(exit)) = (
            catalog.entrance_by_name(entrance_name),
            catalog.exit_by_name(exit_name),
        ) else {
            continue;
        };
        if let Some(island) = entrance.island_name {
            by_island.entry(island).or_default().push((entrance, exit));
        }
    }
    by_island
}
