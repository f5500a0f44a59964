use log::info;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod catalog;
pub mod entrances;
pub mod nesting;
pub mod stage;
pub mod zones;

pub use catalog::{Catalog, Category, CategorySet, Entrance, Exit, SpawnTarget};
pub use entrances::{
    connections_by_island, randomize_entrances, randomize_one_set_of_entrances, EntranceConnections,
    EntranceRandoMode, EntranceRandomisation, IslandAttribution, NestedPathReport, PassOptions,
    ProgressionSettings,
};
pub use stage::{PatchLog, StageEdit, StageStore};
pub use zones::{entrance_zone_for_location, LocationKinds};

/// Mixed into the seed so entrance rolls do not line up with other
/// randomisers seeded from the same number.
const ENTRANCE_SEED_SALT: u64 = 0x0E17_A9CE_u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub randomize_entrances: EntranceRandoMode,
    pub race_mode: bool,
    pub progression: ProgressionSettings,
    /// The player starts with access to nothing but dungeon and cave entrances.
    pub dungeons_and_caves_only_start: bool,
    /// Decide everything but leave the stage data alone.
    pub dry_run: bool,
}

impl RandomiserSettings {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("no valid exits to place for entrance: {entrance}")]
    UnsatisfiableConfiguration { entrance: String },
    #[error("no entrance without requirements is available to start from")]
    NoSafetyEntrance,
    #[error("catalog invariant violated: {0}")]
    CatalogInvariantViolation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl RandomiserError {
    /// Whether changing the options, rather than fixing data, is the remedy.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            RandomiserError::UnsatisfiableConfiguration { .. }
                | RandomiserError::NoSafetyEntrance
                | RandomiserError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

/// Randomises entrances with the standard catalog and, unless this is a
/// dry run, writes the result into `store`. The store is only touched once
/// every pass has succeeded.
pub fn run(settings: &RandomiserSettings, store: &mut dyn StageStore) -> Result<EntranceRandomisation> {
    run_with_catalog(Catalog::standard(), settings, store)
}

pub fn run_with_catalog(
    catalog: &Catalog,
    settings: &RandomiserSettings,
    store: &mut dyn StageStore,
) -> Result<EntranceRandomisation> {
    let mut rng = StdRng::seed_from_u64(settings.seed ^ ENTRANCE_SEED_SALT);
    let randomisation = randomize_entrances(catalog, settings, &mut rng)?;

    if settings.dry_run {
        info!(
            "dry run: skipping {} stage edits",
            randomisation.edits.len()
        );
    } else {
        stage::apply_edits(&randomisation.edits, store)?;
        info!("applied {} stage edits", randomisation.edits.len());
    }

    Ok(randomisation)
}
