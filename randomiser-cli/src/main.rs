use clap::{Parser, ValueEnum};
use log::error;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use entrance_randomiser_core::{
    connections_by_island, run, Catalog, EntranceConnections, EntranceRandoMode,
    EntranceRandomisation, PatchLog, ProgressionSettings, RandomiserError, RandomiserSettings,
    StageEdit,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    Disabled,
    Dungeons,
    NestedDungeons,
    SecretCaves,
    DungeonsAndCavesSeparately,
    NestedDungeonsAndCavesSeparately,
    DungeonsAndCavesTogether,
    NestedDungeonsAndCavesTogether,
}

impl From<Mode> for EntranceRandoMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Disabled => EntranceRandoMode::Disabled,
            Mode::Dungeons => EntranceRandoMode::Dungeons,
            Mode::NestedDungeons => EntranceRandoMode::NestedDungeons,
            Mode::SecretCaves => EntranceRandoMode::SecretCaves,
            Mode::DungeonsAndCavesSeparately => EntranceRandoMode::DungeonsAndSecretCavesSeparately,
            Mode::NestedDungeonsAndCavesSeparately => {
                EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately
            }
            Mode::DungeonsAndCavesTogether => EntranceRandoMode::DungeonsAndSecretCavesTogether,
            Mode::NestedDungeonsAndCavesTogether => {
                EntranceRandoMode::NestedDungeonsAndSecretCavesTogether
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "entrance-rando", version, about = "Dungeon and secret cave entrance randomiser")]
struct Args {
    /// Load every option from a JSON settings file instead of the flags below.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["seed", "mode"])]
    settings: Option<PathBuf>,

    #[arg(long, required_unless_present = "settings")]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Mode::Dungeons)]
    mode: Mode,

    #[arg(long, default_value_t = false)]
    race_mode: bool,

    #[arg(long, default_value_t = false)]
    progression_dungeons: bool,

    #[arg(long, default_value_t = false)]
    progression_puzzle_secret_caves: bool,

    #[arg(long, default_value_t = false)]
    progression_combat_secret_caves: bool,

    #[arg(long, default_value_t = false)]
    progression_savage_labyrinth: bool,

    #[arg(long, default_value_t = false)]
    dungeons_and_caves_only_start: bool,

    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Where to write the JSON spoiler. Printed to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Args {
    fn settings(&self) -> Result<RandomiserSettings, RandomiserError> {
        if let Some(path) = &self.settings {
            return RandomiserSettings::from_json_file(path);
        }

        let seed = self
            .seed
            .ok_or_else(|| RandomiserError::Config("a seed is required".to_string()))?;
        Ok(RandomiserSettings {
            seed,
            randomize_entrances: self.mode.into(),
            race_mode: self.race_mode,
            progression: ProgressionSettings {
                dungeons: self.progression_dungeons,
                puzzle_secret_caves: self.progression_puzzle_secret_caves,
                combat_secret_caves: self.progression_combat_secret_caves,
                savage_labyrinth: self.progression_savage_labyrinth,
            },
            dungeons_and_caves_only_start: self.dungeons_and_caves_only_start,
            dry_run: self.dry_run,
        })
    }
}

#[derive(Serialize)]
struct Spoiler<'a> {
    settings: &'a RandomiserSettings,
    #[serde(flatten)]
    randomisation: &'a EntranceRandomisation,
    islands: BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>,
    planned_edits: &'a [StageEdit],
    applied_edits: &'a [String],
}

/// Island name to the entrances on it and where each now leads.
fn islands<'c>(
    catalog: &'c Catalog,
    connections: &EntranceConnections,
) -> BTreeMap<&'c str, BTreeMap<&'c str, &'c str>> {
    connections_by_island(catalog, connections)
        .into_iter()
        .map(|(island, pairs)| {
            let doors = pairs
                .into_iter()
                .map(|(entrance, exit)| (entrance.entrance_name, exit.unique_name))
                .collect();
            (island, doors)
        })
        .collect()
}

fn run_cli(args: &Args) -> Result<(), RandomiserError> {
    let settings = args.settings()?;
    let mut store = PatchLog::new();
    let randomisation = run(&settings, &mut store)?;

    let spoiler = Spoiler {
        settings: &settings,
        randomisation: &randomisation,
        islands: islands(Catalog::standard(), &randomisation.entrance_connections),
        planned_edits: &randomisation.edits,
        applied_edits: &store.calls,
    };
    let json = serde_json::to_string_pretty(&spoiler)?;

    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(err) = run_cli(&args) {
        if err.is_user_facing() {
            error!("{err}; try different options");
        } else {
            error!("{err}");
        }
        std::process::exit(1);
    }
}
