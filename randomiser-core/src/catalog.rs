use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Where a stage transition drops the player.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct SpawnTarget {
    pub stage: &'static str,
    pub room: u8,
    pub spawn: u8,
}

impl SpawnTarget {
    pub const fn new(stage: &'static str, room: u8, spawn: u8) -> Self {
        Self { stage, room, spawn }
    }
}

/// A point where the player walks into a dungeon, boss room or cave.
///
/// Entrances are identified by `entrance_name` alone.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Entrance {
    pub stage_name: &'static str,
    pub room_num: u8,
    pub scls_exit_index: usize,
    pub spawn_id: u8,
    pub entrance_name: &'static str,
    pub island_name: Option<&'static str>,
    pub warp_out: Option<SpawnTarget>,
}

impl Entrance {
    const fn island(
        stage_name: &'static str,
        room_num: u8,
        scls_exit_index: usize,
        spawn_id: u8,
        entrance_name: &'static str,
        island_name: &'static str,
        warp_out: SpawnTarget,
    ) -> Self {
        Self {
            stage_name,
            room_num,
            scls_exit_index,
            spawn_id,
            entrance_name,
            island_name: Some(island_name),
            warp_out: Some(warp_out),
        }
    }

    const fn nested(
        stage_name: &'static str,
        room_num: u8,
        scls_exit_index: usize,
        spawn_id: u8,
        entrance_name: &'static str,
    ) -> Self {
        Self {
            stage_name,
            room_num,
            scls_exit_index,
            spawn_id,
            entrance_name,
            island_name: None,
            warp_out: None,
        }
    }

    /// Nested entrances can only be reached by going through another exit.
    pub fn is_nested(&self) -> bool {
        self.island_name.is_none()
    }

    pub fn spawn_target(&self) -> SpawnTarget {
        SpawnTarget::new(self.stage_name, self.room_num, self.spawn_id)
    }
}

impl PartialEq for Entrance {
    fn eq(&self, other: &Self) -> bool {
        self.entrance_name == other.entrance_name
    }
}

impl Eq for Entrance {}

impl Hash for Entrance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entrance_name.hash(state);
    }
}

/// The inside of a dungeon, boss room or cave. Identified by `unique_name`.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Exit {
    pub stage_name: &'static str,
    pub room_num: u8,
    pub scls_exit_index: usize,
    pub spawn_id: u8,
    pub zone_name: &'static str,
    pub unique_name: &'static str,
    pub boss_stage_name: Option<&'static str>,
}

impl Exit {
    const fn new(
        stage_name: &'static str,
        room_num: u8,
        scls_exit_index: usize,
        spawn_id: u8,
        zone_name: &'static str,
        unique_name: &'static str,
    ) -> Self {
        Self {
            stage_name,
            room_num,
            scls_exit_index,
            spawn_id,
            zone_name,
            unique_name,
            boss_stage_name: None,
        }
    }

    const fn dungeon(
        stage_name: &'static str,
        room_num: u8,
        scls_exit_index: usize,
        spawn_id: u8,
        name: &'static str,
        boss_stage_name: &'static str,
    ) -> Self {
        Self {
            stage_name,
            room_num,
            scls_exit_index,
            spawn_id,
            zone_name: name,
            unique_name: name,
            boss_stage_name: Some(boss_stage_name),
        }
    }

    pub fn spawn_target(&self) -> SpawnTarget {
        SpawnTarget::new(self.stage_name, self.room_num, self.spawn_id)
    }
}

impl PartialEq for Exit {
    fn eq(&self, other: &Self) -> bool {
        self.unique_name == other.unique_name
    }
}

impl Eq for Exit {}

impl Hash for Exit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_name.hash(state);
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Category {
    Dungeon,
    Boss,
    SecretCave,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Dungeon, Category::Boss, Category::SecretCave];
}

/// Which categories take part in one randomisation pass.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CategorySet {
    pub dungeons: bool,
    pub bosses: bool,
    pub caves: bool,
}

impl CategorySet {
    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::Dungeon => self.dungeons,
            Category::Boss => self.bosses,
            Category::SecretCave => self.caves,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

pub const SAVAGE_LABYRINTH: &str = "Savage Labyrinth";
pub const FIRE_MOUNTAIN_SECRET_CAVE: &str = "Fire Mountain Secret Cave";
pub const ICE_RING_ISLE_SECRET_CAVE: &str = "Ice Ring Isle Secret Cave";
pub const FIRE_MOUNTAIN_CAVE_ENTRANCE: &str = "Secret Cave Entrance on Fire Mountain";
pub const ICE_RING_ISLE_CAVE_ENTRANCE: &str = "Secret Cave Entrance on Ice Ring Isle";

/// Rooms inside Savage Labyrinth whose exits lead straight back to the sea.
pub const SAVAGE_LABYRINTH_SEA_EXIT_ROOMS: [(&str, u8); 3] =
    [("Cave10", 0), ("Cave10", 20), ("Cave11", 0)];
/// Inner room of the Ice Ring Isle cave, reached through its own exit.
pub const ICE_RING_ISLE_INNER_CAVE: (&str, u8) = ("ITest62", 0);

pub const TOWER_OF_THE_GODS: &str = "Tower of the Gods";
pub const TOWER_OF_THE_GODS_SECTOR: &str = "Tower of the Gods Sector";
pub const TOWER_OF_THE_GODS_SUNKEN_TREASURE: &str = "Tower of the Gods - Sunken Treasure";

/// Sea chart order; an island's number is its index plus one.
pub const ISLAND_NAMES: [&str; 49] = [
    "Forsaken Fortress",
    "Star Island",
    "Northern Fairy Island",
    "Gale Isle",
    "Crescent Moon Island",
    "Seven-Star Isles",
    "Overlook Island",
    "Four-Eye Reef",
    "Mother and Child Isles",
    "Spectacle Island",
    "Windfall Island",
    "Pawprint Isle",
    "Dragon Roost Island",
    "Flight Control Platform",
    "Western Fairy Island",
    "Rock Spire Isle",
    "Tingle Island",
    "Northern Triangle Island",
    "Eastern Fairy Island",
    "Fire Mountain",
    "Star Belt Archipelago",
    "Three-Eye Reef",
    "Greatfish Isle",
    "Cyclops Reef",
    "Six-Eye Reef",
    "Tower of the Gods",
    "Eastern Triangle Island",
    "Thorned Fairy Island",
    "Needle Rock Isle",
    "Islet of Steel",
    "Stone Watcher Island",
    "Southern Triangle Island",
    "Private Oasis",
    "Bomb Island",
    "Bird's Peak Rock",
    "Diamond Steppe Island",
    "Five-Eye Reef",
    "Shark Island",
    "Southern Fairy Island",
    "Ice Ring Isle",
    "Forest Haven",
    "Cliff Plateau Isles",
    "Horseshoe Island",
    "Outset Island",
    "Headstone Island",
    "Two-Eye Reef",
    "Angular Isles",
    "Boating Course",
    "Five-Star Isles",
];

const SEA_CHART_COLUMNS: i16 = 7;

pub fn island_number(island_name: &str) -> Option<u8> {
    ISLAND_NAMES
        .iter()
        .position(|name| *name == island_name)
        .map(|idx| idx as u8 + 1)
}

/// Sector coordinates of an island, relative to the centre of the sea chart.
pub fn island_sector(island_name: &str) -> Option<(i8, i8)> {
    let number = i16::from(island_number(island_name)?);
    let x = (number - 1) % SEA_CHART_COLUMNS - 3;
    let y = (number - 1) / SEA_CHART_COLUMNS - 3;
    Some((x as i8, y as i8))
}

const DUNGEON_ENTRANCES: [Entrance; 5] = [
    Entrance::island("Adanmae", 0, 2, 2, "Dungeon Entrance on Dragon Roost Island", "Dragon Roost Island", SpawnTarget::new("sea", 13, 211)),
    Entrance::island("sea", 41, 6, 6, "Dungeon Entrance in Forest Haven Sector", "Forest Haven", SpawnTarget::new("Omori", 0, 215)),
    Entrance::island("sea", 26, 0, 2, "Dungeon Entrance in Tower of the Gods Sector", "Tower of the Gods", SpawnTarget::new("sea", 26, 1)),
    Entrance::island("Edaichi", 0, 0, 1, "Dungeon Entrance on Headstone Island", "Headstone Island", SpawnTarget::new("sea", 45, 229)),
    Entrance::island("Ekaze", 0, 0, 1, "Dungeon Entrance on Gale Isle", "Gale Isle", SpawnTarget::new("sea", 4, 232)),
];

const BOSS_ENTRANCES: [Entrance; 5] = [
    Entrance::nested("M_NewD2", 10, 1, 27, "Boss Entrance in Dragon Roost Cavern"),
    Entrance::nested("kindan", 16, 0, 1, "Boss Entrance in Forbidden Woods"),
    Entrance::nested("Siren", 18, 0, 27, "Boss Entrance in Tower of the Gods"),
    Entrance::nested("M_Dai", 15, 0, 27, "Boss Entrance in Earth Temple"),
    Entrance::nested("kaze", 12, 0, 27, "Boss Entrance in Wind Temple"),
];

// Fire Mountain and Ice Ring Isle spawn the player on the sea next to the
// boat, since the island itself burns or freezes them while it is active.
const SECRET_CAVE_ENTRANCES: [Entrance; 20] = [
    Entrance::island("sea", 44, 8, 10, "Secret Cave Entrance on Outset Island", "Outset Island", SpawnTarget::new("sea", 44, 10)),
    Entrance::island("sea", 13, 2, 5, "Secret Cave Entrance on Dragon Roost Island", "Dragon Roost Island", SpawnTarget::new("sea", 13, 5)),
    Entrance::island("sea", 20, 0, 0, "Secret Cave Entrance on Fire Mountain", "Fire Mountain", SpawnTarget::new("sea", 20, 0)),
    Entrance::island("sea", 40, 0, 0, "Secret Cave Entrance on Ice Ring Isle", "Ice Ring Isle", SpawnTarget::new("sea", 40, 0)),
    Entrance::island("Abesso", 0, 1, 1, "Secret Cave Entrance on Private Oasis", "Private Oasis", SpawnTarget::new("Abesso", 0, 1)),
    Entrance::island("sea", 29, 0, 5, "Secret Cave Entrance on Needle Rock Isle", "Needle Rock Isle", SpawnTarget::new("sea", 29, 5)),
    Entrance::island("sea", 47, 1, 5, "Secret Cave Entrance on Angular Isles", "Angular Isles", SpawnTarget::new("sea", 47, 5)),
    Entrance::island("sea", 48, 0, 5, "Secret Cave Entrance on Boating Course", "Boating Course", SpawnTarget::new("sea", 48, 5)),
    Entrance::island("sea", 31, 0, 1, "Secret Cave Entrance on Stone Watcher Island", "Stone Watcher Island", SpawnTarget::new("sea", 31, 1)),
    Entrance::island("sea", 7, 0, 1, "Secret Cave Entrance on Overlook Island", "Overlook Island", SpawnTarget::new("sea", 7, 1)),
    Entrance::island("sea", 35, 0, 1, "Secret Cave Entrance on Bird's Peak Rock", "Bird's Peak Rock", SpawnTarget::new("sea", 35, 1)),
    Entrance::island("sea", 12, 0, 1, "Secret Cave Entrance on Pawprint Isle", "Pawprint Isle", SpawnTarget::new("sea", 12, 1)),
    Entrance::island("sea", 12, 1, 5, "Secret Cave Entrance on Pawprint Isle Side Isle", "Pawprint Isle", SpawnTarget::new("sea", 12, 5)),
    Entrance::island("sea", 36, 0, 1, "Secret Cave Entrance on Diamond Steppe Island", "Diamond Steppe Island", SpawnTarget::new("sea", 36, 1)),
    Entrance::island("sea", 34, 0, 1, "Secret Cave Entrance on Bomb Island", "Bomb Island", SpawnTarget::new("sea", 34, 1)),
    Entrance::island("sea", 16, 0, 1, "Secret Cave Entrance on Rock Spire Isle", "Rock Spire Isle", SpawnTarget::new("sea", 16, 1)),
    Entrance::island("sea", 38, 0, 5, "Secret Cave Entrance on Shark Island", "Shark Island", SpawnTarget::new("sea", 38, 5)),
    Entrance::island("sea", 42, 0, 2, "Secret Cave Entrance on Cliff Plateau Isles", "Cliff Plateau Isles", SpawnTarget::new("sea", 42, 2)),
    Entrance::island("sea", 43, 0, 5, "Secret Cave Entrance on Horseshoe Island", "Horseshoe Island", SpawnTarget::new("sea", 43, 5)),
    Entrance::island("sea", 2, 0, 1, "Secret Cave Entrance on Star Island", "Star Island", SpawnTarget::new("sea", 2, 1)),
];

const DUNGEON_EXITS: [Exit; 5] = [
    Exit::dungeon("M_NewD2", 0, 0, 0, "Dragon Roost Cavern", "M_DragB"),
    Exit::dungeon("kindan", 0, 0, 0, "Forbidden Woods", "kinBOSS"),
    Exit::dungeon("Siren", 0, 1, 0, "Tower of the Gods", "SirenB"),
    Exit::dungeon("M_Dai", 0, 0, 0, "Earth Temple", "M_DaiB"),
    Exit::dungeon("kaze", 15, 0, 15, "Wind Temple", "kazeB"),
];

const BOSS_EXITS: [Exit; 5] = [
    Exit::new("M_DragB", 0, 0, 0, "Gohma Boss Arena", "Gohma Boss Arena"),
    Exit::new("kinBOSS", 0, 0, 0, "Kalle Demos Boss Arena", "Kalle Demos Boss Arena"),
    Exit::new("SirenB", 0, 0, 0, "Gohdan Boss Arena", "Gohdan Boss Arena"),
    Exit::new("M_DaiB", 0, 0, 0, "Jalhalla Boss Arena", "Jalhalla Boss Arena"),
    Exit::new("kazeB", 0, 0, 0, "Molgera Boss Arena", "Molgera Boss Arena"),
];

const SECRET_CAVE_EXITS: [Exit; 20] = [
    Exit::new("Cave09", 0, 1, 0, "Outset Island", "Savage Labyrinth"),
    Exit::new("TF_06", 0, 0, 0, "Dragon Roost Island", "Dragon Roost Island Secret Cave"),
    Exit::new("MiniKaz", 0, 0, 0, "Fire Mountain", "Fire Mountain Secret Cave"),
    Exit::new("MiniHyo", 0, 0, 0, "Ice Ring Isle", "Ice Ring Isle Secret Cave"),
    Exit::new("TF_04", 0, 0, 0, "Private Oasis", "Cabana Labyrinth"),
    Exit::new("SubD42", 0, 0, 0, "Needle Rock Isle", "Needle Rock Isle Secret Cave"),
    Exit::new("SubD43", 0, 0, 0, "Angular Isles", "Angular Isles Secret Cave"),
    Exit::new("SubD71", 0, 0, 0, "Boating Course", "Boating Course Secret Cave"),
    Exit::new("TF_01", 0, 0, 0, "Stone Watcher Island", "Stone Watcher Island Secret Cave"),
    Exit::new("TF_02", 0, 0, 0, "Overlook Island", "Overlook Island Secret Cave"),
    Exit::new("TF_03", 0, 0, 0, "Bird's Peak Rock", "Bird's Peak Rock Secret Cave"),
    Exit::new("TyuTyu", 0, 0, 0, "Pawprint Isle", "Pawprint Isle Chuchu Cave"),
    Exit::new("Cave07", 0, 0, 0, "Pawprint Isle Side Isle", "Pawprint Isle Wizzrobe Cave"),
    Exit::new("WarpD", 0, 0, 0, "Diamond Steppe Island", "Diamond Steppe Island Warp Maze Cave"),
    Exit::new("Cave01", 0, 0, 0, "Bomb Island", "Bomb Island Secret Cave"),
    Exit::new("Cave04", 0, 0, 0, "Rock Spire Isle", "Rock Spire Isle Secret Cave"),
    Exit::new("ITest63", 0, 0, 0, "Shark Island", "Shark Island Secret Cave"),
    Exit::new("Cave03", 0, 0, 0, "Cliff Plateau Isles", "Cliff Plateau Isles Secret Cave"),
    Exit::new("Cave05", 0, 0, 0, "Horseshoe Island", "Horseshoe Island Secret Cave"),
    Exit::new("Cave02", 0, 0, 0, "Star Island", "Star Island Secret Cave"),
];

/// Names of entrances and exits that can be entered and completed with
/// nothing but the starting items.
#[derive(Clone, Debug, Default)]
pub struct NoRequirementLists {
    pub dungeon_entrances: Vec<&'static str>,
    pub secret_cave_entrances: Vec<&'static str>,
    pub dungeon_exits: Vec<&'static str>,
    pub puzzle_secret_cave_exits: Vec<&'static str>,
    pub combat_secret_cave_exits: Vec<&'static str>,
}

/// The full registry of randomisable entrances and exits.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub dungeon_entrances: Vec<Entrance>,
    pub boss_entrances: Vec<Entrance>,
    pub secret_cave_entrances: Vec<Entrance>,
    pub dungeon_exits: Vec<Exit>,
    pub boss_exits: Vec<Exit>,
    pub secret_cave_exits: Vec<Exit>,
    pub no_requirements: NoRequirementLists,
    /// Item locations that live under a different exit zone than the one
    /// their name starts with (mostly boss arenas).
    pub location_zone_overrides: Vec<(&'static str, &'static str)>,
}

impl Catalog {
    /// The game's own entrance and exit tables. Built on first use.
    pub fn standard() -> &'static Catalog {
        static STANDARD: OnceLock<Catalog> = OnceLock::new();
        STANDARD.get_or_init(|| Catalog {
            dungeon_entrances: DUNGEON_ENTRANCES.to_vec(),
            boss_entrances: BOSS_ENTRANCES.to_vec(),
            secret_cave_entrances: SECRET_CAVE_ENTRANCES.to_vec(),
            dungeon_exits: DUNGEON_EXITS.to_vec(),
            boss_exits: BOSS_EXITS.to_vec(),
            secret_cave_exits: SECRET_CAVE_EXITS.to_vec(),
            no_requirements: NoRequirementLists {
                dungeon_entrances: vec!["Dungeon Entrance on Dragon Roost Island"],
                secret_cave_entrances: vec![
                    "Secret Cave Entrance on Pawprint Isle",
                    "Secret Cave Entrance on Cliff Plateau Isles",
                ],
                dungeon_exits: vec!["Dragon Roost Cavern"],
                puzzle_secret_cave_exits: vec![
                    "Pawprint Isle Chuchu Cave",
                    "Ice Ring Isle Secret Cave",
                    // Needs Wind Waker and Wind's Requiem, which the player always has here.
                    "Bird's Peak Rock Secret Cave",
                    "Diamond Steppe Island Warp Maze Cave",
                ],
                combat_secret_cave_exits: vec!["Rock Spire Isle Secret Cave"],
            },
            location_zone_overrides: vec![
                ("Pawprint Isle - Wizzrobe Cave", "Pawprint Isle Side Isle"),
                ("Dragon Roost Cavern - Gohma Heart Container", "Gohma Boss Arena"),
                ("Forbidden Woods - Kalle Demos Heart Container", "Kalle Demos Boss Arena"),
                ("Tower of the Gods - Gohdan Heart Container", "Gohdan Boss Arena"),
                ("Earth Temple - Jalhalla Heart Container", "Jalhalla Boss Arena"),
                ("Wind Temple - Molgera Heart Container", "Molgera Boss Arena"),
            ],
        })
    }

    pub fn entrances(&self, category: Category) -> &[Entrance] {
        match category {
            Category::Dungeon => &self.dungeon_entrances,
            Category::Boss => &self.boss_entrances,
            Category::SecretCave => &self.secret_cave_entrances,
        }
    }

    pub fn exits(&self, category: Category) -> &[Exit] {
        match category {
            Category::Dungeon => &self.dungeon_exits,
            Category::Boss => &self.boss_exits,
            Category::SecretCave => &self.secret_cave_exits,
        }
    }

    pub fn entrances_for(&self, categories: CategorySet) -> Vec<&Entrance> {
        categories
            .iter()
            .flat_map(|c| self.entrances(c).iter())
            .collect()
    }

    pub fn exits_for(&self, categories: CategorySet) -> Vec<&Exit> {
        categories
            .iter()
            .flat_map(|c| self.exits(c).iter())
            .collect()
    }

    pub fn entrance_category(&self, entrance: &Entrance) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| self.entrances(*c).contains(entrance))
    }

    pub fn exit_category(&self, exit: &Exit) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| self.exits(*c).contains(exit))
    }

    pub fn entrance_by_name(&self, name: &str) -> Option<&Entrance> {
        Category::ALL
            .into_iter()
            .flat_map(|c| self.entrances(c).iter())
            .find(|e| e.entrance_name == name)
    }

    pub fn exit_by_name(&self, name: &str) -> Option<&Exit> {
        Category::ALL
            .into_iter()
            .flat_map(|c| self.exits(c).iter())
            .find(|e| e.unique_name == name)
    }

    /// The dungeon whose completion leads to a nested entrance. A boss
    /// entrance sits inside its dungeon's stage, so the owner is the
    /// dungeon exit on that same stage.
    pub fn dungeon_exit_for_nested(&self, entrance: &Entrance) -> Option<&Exit> {
        if !entrance.is_nested() {
            return None;
        }
        self.dungeon_exits
            .iter()
            .find(|ex| ex.stage_name == entrance.stage_name && ex.boss_stage_name.is_some())
    }

    pub fn boss_exit_for_stage(&self, boss_stage_name: &str) -> Option<&Exit> {
        self.boss_exits
            .iter()
            .find(|ex| ex.stage_name == boss_stage_name)
    }

    pub fn location_zone_override(&self, location_name: &str) -> Option<&'static str> {
        self.location_zone_overrides
            .iter()
            .find(|(location, _)| *location == location_name)
            .map(|(_, zone)| *zone)
    }
}
