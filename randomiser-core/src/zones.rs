use std::collections::{BTreeSet, HashSet};

use crate::catalog::{Catalog, TOWER_OF_THE_GODS, TOWER_OF_THE_GODS_SECTOR, TOWER_OF_THE_GODS_SUNKEN_TREASURE};
use crate::entrances::IslandAttribution;

/// Tells dungeon and cave locations apart from everything else. The item
/// logic owns this knowledge, so it is passed in.
pub trait LocationKinds {
    fn is_dungeon_or_cave(&self, location_name: &str) -> bool;
}

impl<F> LocationKinds for F
where
    F: Fn(&str) -> bool,
{
    fn is_dungeon_or_cave(&self, location_name: &str) -> bool {
        self(location_name)
    }
}

impl LocationKinds for HashSet<String> {
    fn is_dungeon_or_cave(&self, location_name: &str) -> bool {
        self.contains(location_name)
    }
}

impl LocationKinds for BTreeSet<String> {
    fn is_dungeon_or_cave(&self, location_name: &str) -> bool {
        self.contains(location_name)
    }
}

/// Splits `"Zone - Specific Location"`. Names without a separator are their
/// own zone.
pub fn split_location_name_by_zone(location_name: &str) -> (&str, &str) {
    location_name
        .split_once(" - ")
        .unwrap_or((location_name, location_name))
}

/// The zone a hint should name for an item location.
///
/// Outside dungeons and caves that is just the location's own zone. Inside
/// them it is the island the randomised entrance sits on. Tower of the
/// Gods is called "Tower of the Gods Sector" whenever the sea area rather
/// than the dungeon is meant.
pub fn entrance_zone_for_location(
    location_name: &str,
    island_attribution: &IslandAttribution,
    catalog: &Catalog,
    kinds: &impl LocationKinds,
) -> String {
    let (mut zone_name, _specific) = split_location_name_by_zone(location_name);
    if let Some(overridden) = catalog.location_zone_override(location_name) {
        zone_name = overridden;
    }

    if let Some(island) = island_attribution.get(zone_name) {
        if kinds.is_dungeon_or_cave(location_name) {
            if island == TOWER_OF_THE_GODS {
                return TOWER_OF_THE_GODS_SECTOR.to_string();
            }
            return island.clone();
        }
    }

    // Forsaken Fortress - Sunken Treasure has the same ambiguity, but no
    // entrance on Forsaken Fortress is ever randomised.
    if location_name == TOWER_OF_THE_GODS_SUNKEN_TREASURE {
        return TOWER_OF_THE_GODS_SECTOR.to_string();
    }
    zone_name.to_string()
}
