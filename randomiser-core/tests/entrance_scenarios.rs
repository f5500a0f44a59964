use std::collections::HashSet;

use entrance_randomiser_core::catalog::NoRequirementLists;
use entrance_randomiser_core::nesting::{resolve_chain, ChainResolution, ExitsToEntrances};
use entrance_randomiser_core::{
    randomize_entrances, run, run_with_catalog, Catalog, Category, EntranceRandoMode,
    EntranceRandomisation, Entrance, Exit, PatchLog, ProgressionSettings, RandomiserError,
    RandomiserSettings, SpawnTarget, StageEdit,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ALL_MODES: [EntranceRandoMode; 7] = [
    EntranceRandoMode::Dungeons,
    EntranceRandoMode::NestedDungeons,
    EntranceRandoMode::SecretCaves,
    EntranceRandoMode::DungeonsAndSecretCavesSeparately,
    EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately,
    EntranceRandoMode::DungeonsAndSecretCavesTogether,
    EntranceRandoMode::NestedDungeonsAndSecretCavesTogether,
];

fn settings(seed: u64, mode: EntranceRandoMode) -> RandomiserSettings {
    RandomiserSettings {
        seed,
        randomize_entrances: mode,
        ..Default::default()
    }
}

fn randomise(settings: &RandomiserSettings) -> EntranceRandomisation {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    randomize_entrances(Catalog::standard(), settings, &mut rng).unwrap()
}

fn placed_exits<'c>(
    catalog: &'c Catalog,
    result: &EntranceRandomisation,
) -> ExitsToEntrances<'c> {
    result
        .entrance_connections
        .iter()
        .map(|(entrance, exit)| {
            (
                catalog.exit_by_name(exit).unwrap(),
                catalog.entrance_by_name(entrance).unwrap(),
            )
        })
        .collect()
}

fn expected_size(mode: EntranceRandoMode) -> usize {
    mode.passes()
        .iter()
        .map(|categories| Catalog::standard().entrances_for(*categories).len())
        .sum()
}

#[test]
fn every_mode_produces_a_bijection() {
    for mode in ALL_MODES {
        for seed in 0..20 {
            let result = randomise(&settings(seed, mode));
            let connections = &result.entrance_connections;
            assert_eq!(connections.len(), expected_size(mode), "{mode:?} seed {seed}");

            let exits: HashSet<&String> = connections.values().collect();
            assert_eq!(exits.len(), connections.len(), "{mode:?} seed {seed}");
        }
    }
}

#[test]
fn separate_passes_keep_categories_apart() {
    let catalog = Catalog::standard();
    for seed in 0..20 {
        let result = randomise(&settings(
            seed,
            EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately,
        ));
        for (entrance, exit) in &result.entrance_connections {
            let entrance = catalog.entrance_by_name(entrance).unwrap();
            let exit = catalog.exit_by_name(exit).unwrap();
            let entrance_is_cave =
                catalog.entrance_category(entrance) == Some(Category::SecretCave);
            let exit_is_cave = catalog.exit_category(exit) == Some(Category::SecretCave);
            assert_eq!(entrance_is_cave, exit_is_cave, "seed {seed}");
        }
    }
}

#[test]
fn same_seed_same_result() {
    let mut settings = settings(1234, EntranceRandoMode::NestedDungeonsAndSecretCavesTogether);
    settings.race_mode = true;
    settings.progression.dungeons = true;

    let first = randomise(&settings);
    let second = randomise(&settings);
    assert_eq!(first, second);

    let mut first_log = PatchLog::new();
    let mut second_log = PatchLog::new();
    run(&settings, &mut first_log).unwrap();
    run(&settings, &mut second_log).unwrap();
    assert_eq!(first_log.calls, second_log.calls);
}

#[test]
fn race_mode_never_puts_two_dungeons_on_one_island() {
    let catalog = Catalog::standard();
    for mode in [
        EntranceRandoMode::DungeonsAndSecretCavesTogether,
        EntranceRandoMode::NestedDungeonsAndSecretCavesTogether,
    ] {
        for seed in 0..50 {
            let mut settings = settings(seed, mode);
            settings.race_mode = true;
            let result = randomise(&settings);

            let by_island = entrance_randomiser_core::entrances::connections_by_island(
                catalog,
                &result.entrance_connections,
            );
            for (island, pairs) in by_island {
                let dungeons = pairs
                    .iter()
                    .filter(|(_, exit)| catalog.exit_category(exit) != Some(Category::SecretCave))
                    .count();
                assert!(dungeons <= 1, "{island} holds {dungeons} dungeons, seed {seed}");
            }
        }
    }
}

#[test]
fn every_chain_ends_on_an_island() {
    let catalog = Catalog::standard();
    for seed in 0..30 {
        let result = randomise(&settings(seed, EntranceRandoMode::NestedDungeonsAndSecretCavesTogether));
        let placed = placed_exits(catalog, &result);

        for &entrance in placed.values() {
            let ChainResolution::Complete(chain) = resolve_chain(entrance, &placed, catalog).unwrap()
            else {
                panic!("{} is unresolved, seed {seed}", entrance.entrance_name);
            };
            assert!(chain.last().unwrap().island_name.is_some());
        }
    }
}

#[test]
fn island_attribution_follows_the_outermost_entrance() {
    let catalog = Catalog::standard();
    for seed in 0..30 {
        let result = randomise(&settings(seed, EntranceRandoMode::NestedDungeons));
        let placed = placed_exits(catalog, &result);

        assert_eq!(result.island_attribution.len(), 10);
        for (&exit, &entrance) in &placed {
            let chain = resolve_chain(entrance, &placed, catalog).unwrap();
            let island = chain.outermost().unwrap().island_name.unwrap();
            assert_eq!(result.island_attribution[exit.zone_name], island);
        }
    }
}

fn listed(names: &[&str], name: &str) -> bool {
    names.iter().any(|n| *n == name)
}

#[test]
fn restricted_start_sends_the_safety_entrance_somewhere_free() {
    let catalog = Catalog::standard();
    let free = &catalog.no_requirements;
    for seed in 0..30 {
        let mut settings = settings(seed, EntranceRandoMode::DungeonsAndSecretCavesTogether);
        settings.dungeons_and_caves_only_start = true;
        settings.progression = ProgressionSettings {
            dungeons: true,
            puzzle_secret_caves: true,
            ..Default::default()
        };
        let result = randomise(&settings);

        assert_eq!(result.safety_entrances.len(), 1);
        let safety = &result.safety_entrances[0];
        assert!(listed(&free.dungeon_entrances, safety) || listed(&free.secret_cave_entrances, safety));

        let exit = result.entrance_connections[safety].as_str();
        assert!(
            listed(&free.dungeon_exits, exit) || listed(&free.puzzle_secret_cave_exits, exit),
            "{safety} -> {exit}, seed {seed}"
        );
        assert_eq!(result.placement_order[0].0, *safety);
    }
}

#[test]
fn boss_exits_are_placed_last() {
    let catalog = Catalog::standard();
    for seed in 0..30 {
        let result = randomise(&settings(seed, EntranceRandoMode::NestedDungeonsAndSecretCavesTogether));
        let is_boss: Vec<bool> = result
            .placement_order
            .iter()
            .map(|(_, exit)| {
                catalog.exit_category(catalog.exit_by_name(exit).unwrap()) == Some(Category::Boss)
            })
            .collect();
        let first_boss = is_boss.iter().position(|b| *b).unwrap();
        assert!(is_boss[first_boss..].iter().all(|b| *b), "seed {seed}");
    }
}

#[test]
fn five_dungeons_without_bosses() {
    let result = randomise(&settings(42, EntranceRandoMode::Dungeons));
    let catalog = Catalog::standard();

    assert_eq!(result.entrance_connections.len(), 5);
    for dungeon in &catalog.dungeon_exits {
        assert!(result.island_attribution.contains_key(dungeon.zone_name));
    }
    // Boss arenas still get their dungeon's island for hints.
    for boss in &catalog.boss_exits {
        assert!(result.island_attribution.contains_key(boss.zone_name));
    }
    let warp_outs = result
        .edits
        .iter()
        .filter(|e| matches!(e, StageEdit::WarpOutDestination { .. }))
        .count();
    assert_eq!(warp_outs, 5);
    assert!(result.nested_entrance_paths.is_empty());
}

#[test]
fn nested_paths_run_from_the_sea_to_the_terminal_exit() {
    let catalog = Catalog::standard();
    let result = randomise(&settings(7, EntranceRandoMode::NestedDungeons));
    assert_eq!(result.nested_entrance_paths.len(), 5);

    for path in &result.nested_entrance_paths {
        let first = catalog.entrance_by_name(&path[0]).unwrap();
        assert!(!first.is_nested());
        let last = catalog.exit_by_name(path.last().unwrap()).unwrap();
        assert_eq!(catalog.exit_category(last), Some(Category::Boss));
    }
}

fn one_dungeon_catalog() -> Catalog {
    Catalog {
        dungeon_entrances: vec![Entrance {
            stage_name: "sea",
            room_num: 1,
            scls_exit_index: 0,
            spawn_id: 0,
            entrance_name: "Door on Test Island",
            island_name: Some("Outset Island"),
            warp_out: Some(SpawnTarget::new("sea", 1, 0)),
        }],
        boss_entrances: vec![Entrance {
            stage_name: "Dun",
            room_num: 3,
            scls_exit_index: 0,
            spawn_id: 1,
            entrance_name: "Boss Door in Test Dungeon",
            island_name: None,
            warp_out: None,
        }],
        secret_cave_entrances: vec![],
        dungeon_exits: vec![Exit {
            stage_name: "Dun",
            room_num: 0,
            scls_exit_index: 0,
            spawn_id: 0,
            zone_name: "Test Dungeon",
            unique_name: "Test Dungeon",
            boss_stage_name: Some("DunB"),
        }],
        boss_exits: vec![Exit {
            stage_name: "DunB",
            room_num: 0,
            scls_exit_index: 0,
            spawn_id: 0,
            zone_name: "Test Arena",
            unique_name: "Test Arena",
            boss_stage_name: None,
        }],
        secret_cave_exits: vec![],
        no_requirements: NoRequirementLists::default(),
        location_zone_overrides: vec![],
    }
}

#[test]
fn boss_entrance_waits_for_its_dungeon() {
    let catalog = one_dungeon_catalog();
    // Half of the shuffles put the boss door first, so it has to be deferred.
    for seed in 0..16 {
        let mut log = PatchLog::new();
        let result = run_with_catalog(
            &catalog,
            &settings(seed, EntranceRandoMode::NestedDungeons),
            &mut log,
        )
        .unwrap();

        assert_eq!(result.entrance_connections["Door on Test Island"], "Test Dungeon");
        assert_eq!(result.entrance_connections["Boss Door in Test Dungeon"], "Test Arena");
        assert_eq!(result.island_attribution["Test Arena"], "Outset Island");
        assert_eq!(
            result.nested_entrance_paths,
            vec![vec![
                "Door on Test Island".to_string(),
                "Boss Door in Test Dungeon".to_string(),
                "Test Arena".to_string(),
            ]]
        );
        assert!(log
            .calls
            .contains(&"warp_out DunB -> sea/1#0".to_string()));
    }
}

fn crowded_island_catalog() -> Catalog {
    let door = |name: &'static str, room_num: u8| Entrance {
        stage_name: "sea",
        room_num,
        scls_exit_index: 0,
        spawn_id: 0,
        entrance_name: name,
        island_name: Some("Dragon Roost Island"),
        warp_out: Some(SpawnTarget::new("sea", room_num, 0)),
    };
    let dungeon = |name: &'static str, stage_name: &'static str| Exit {
        stage_name,
        room_num: 0,
        scls_exit_index: 0,
        spawn_id: 0,
        zone_name: name,
        unique_name: name,
        boss_stage_name: None,
    };
    Catalog {
        dungeon_entrances: vec![door("Upper Door", 13), door("Lower Door", 14)],
        boss_entrances: vec![],
        secret_cave_entrances: vec![],
        dungeon_exits: vec![dungeon("First Dungeon", "D1"), dungeon("Second Dungeon", "D2")],
        boss_exits: vec![],
        secret_cave_exits: vec![],
        no_requirements: NoRequirementLists::default(),
        location_zone_overrides: vec![],
    }
}

#[test]
fn stranded_entrance_fails_without_touching_the_store() {
    let catalog = crowded_island_catalog();
    let mut settings = settings(9, EntranceRandoMode::Dungeons);
    settings.race_mode = true;

    let mut log = PatchLog::new();
    let err = run_with_catalog(&catalog, &settings, &mut log).unwrap_err();
    match err {
        RandomiserError::UnsatisfiableConfiguration { entrance } => {
            assert!(entrance == "Upper Door" || entrance == "Lower Door", "{entrance}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(log.is_empty());
}

#[test]
fn restricted_start_without_a_free_entrance_is_rejected() {
    let catalog = crowded_island_catalog();
    let mut settings = settings(4, EntranceRandoMode::Dungeons);
    settings.dungeons_and_caves_only_start = true;
    settings.progression.dungeons = true;

    let mut log = PatchLog::new();
    let err = run_with_catalog(&catalog, &settings, &mut log).unwrap_err();
    assert!(matches!(err, RandomiserError::NoSafetyEntrance), "{err}");
    assert!(err.is_user_facing());
    assert!(log.is_empty());
}

/// A boss door whose dungeon has no way in from the sea.
fn unreachable_boss_catalog() -> Catalog {
    Catalog {
        dungeon_entrances: vec![],
        boss_entrances: vec![Entrance {
            stage_name: "Dun",
            room_num: 2,
            scls_exit_index: 0,
            spawn_id: 1,
            entrance_name: "Boss Door",
            island_name: None,
            warp_out: None,
        }],
        secret_cave_entrances: vec![],
        dungeon_exits: vec![Exit {
            stage_name: "Dun",
            room_num: 0,
            scls_exit_index: 0,
            spawn_id: 0,
            zone_name: "Sealed Dungeon",
            unique_name: "Sealed Dungeon",
            boss_stage_name: Some("DunB"),
        }],
        boss_exits: vec![],
        secret_cave_exits: vec![],
        no_requirements: NoRequirementLists::default(),
        location_zone_overrides: vec![],
    }
}

#[test]
fn endless_deferral_is_a_catalog_error() {
    let catalog = unreachable_boss_catalog();
    let mut log = PatchLog::new();
    let err = run_with_catalog(
        &catalog,
        &settings(0, EntranceRandoMode::NestedDungeons),
        &mut log,
    )
    .unwrap_err();

    match &err {
        RandomiserError::CatalogInvariantViolation(message) => {
            assert!(message.contains("Boss Door"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_user_facing());
    assert!(log.is_empty());
}

#[test]
fn only_nested_passes_report_paths() {
    let caves = randomise(&settings(11, EntranceRandoMode::SecretCaves));
    assert!(caves.nested_entrance_paths.is_empty());

    let separate = randomise(&settings(
        11,
        EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately,
    ));
    assert_eq!(separate.nested_entrance_paths.len(), 5);

    let catalog = Catalog::standard();
    let together = randomise(&settings(
        11,
        EntranceRandoMode::NestedDungeonsAndSecretCavesTogether,
    ));
    assert_eq!(
        together.nested_entrance_paths.len(),
        catalog.boss_exits.len() + catalog.secret_cave_exits.len()
    );
}

#[test]
fn applied_edits_match_the_plan() {
    let settings = settings(3, EntranceRandoMode::NestedDungeonsAndSecretCavesSeparately);
    let mut log = PatchLog::new();
    let result = run(&settings, &mut log).unwrap();

    assert_eq!(log.calls.len(), result.edits.len());
    let warp_outs = log.calls.iter().filter(|c| c.starts_with("warp_out ")).count();
    assert_eq!(warp_outs, 5);
    let sectors = log.calls.iter().filter(|c| c.starts_with("region_sector ")).count();
    // One per cave, plus the inner room of the Ice Ring Isle cave.
    assert_eq!(sectors, 21);
}
