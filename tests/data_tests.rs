use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dmd_stats::data::validate::{validate_dataset, ValidationSeverity};
use dmd_stats::data::{Catalog, CommonPowerName, PowerKind};
use dmd_stats::{DataError, EngineError};

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("dmd-stats-{name}-{stamp}.{extension}"))
}

#[test]
fn bundled_dataset_loads() {
    let catalog = Catalog::load(data_path("powers.yaml"), data_path("characters.yaml")).unwrap();
    assert_eq!(catalog.characters().len(), 3);

    let commons: Vec<CommonPowerName> = catalog.powers().filter_map(|power| power.common_name()).collect();
    assert_eq!(commons.len(), CommonPowerName::ALL.len());
    assert!(catalog
        .powers()
        .filter(|power| power.kind() == PowerKind::Special)
        .all(|power| power.levels().len() == 4));

    let marksman = catalog.power("marksman").unwrap();
    assert_eq!(marksman.name(), "Marksman");
    assert_eq!(marksman.effects_up_to(4).unwrap().len(), 4);
}

#[test]
fn bundled_dataset_validates_cleanly() {
    let report = validate_dataset(data_path("powers.yaml"), data_path("characters.yaml")).unwrap();
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    assert_eq!(report.count(ValidationSeverity::Warning), 0);
    assert_eq!(report.count(ValidationSeverity::Info), 1);
}

#[test]
fn json_definitions_load_like_yaml() {
    let powers = unique_temp_path("powers", "json");
    let characters = unique_temp_path("characters", "json");
    fs::write(
        &powers,
        r#"{"powers": [
            {"name": "Gift", "kind": "special", "levels": [
                {"level": 1, "effects": [{"type": "reroll", "dice": 2}]}
            ]},
            {"name": "Toughness", "levels": [
                {"level": 1, "effects": [{"type": "defensive_reduction", "wounds": 1}]}
            ]}
        ]}"#,
    )
    .unwrap();
    fs::write(
        &characters,
        r#"{"characters": [
            {"id": "solo", "special_power": {"name": "Gift"},
             "common_powers": [{"name": "Toughness"}, {"name": "Toughness", "level": 1}]}
        ]}"#,
    )
    .unwrap();

    let catalog = Catalog::load(&powers, &characters).unwrap();
    let solo = catalog.character("solo").unwrap();
    assert_eq!(solo.name, "solo");
    assert_eq!(solo.health, 5);
    assert_eq!(catalog.power("gift").unwrap().kind(), PowerKind::Special);

    let _ = fs::remove_file(powers);
    let _ = fs::remove_file(characters);
}

#[test]
fn unknown_effect_type_fails_loudly() {
    let powers = unique_temp_path("unknown-effect", "yaml");
    fs::write(
        &powers,
        "powers:\n  - name: Odd\n    levels:\n      - level: 1\n        effects:\n          - { type: teleport }\n",
    )
    .unwrap();
    let err = Catalog::load(&powers, data_path("characters.yaml")).unwrap_err();
    assert!(matches!(err, DataError::Engine(EngineError::UnrecognizedEffect(_))));
    let _ = fs::remove_file(powers);
}

#[test]
fn missing_files_surface_io_errors() {
    let err = Catalog::load(unique_temp_path("absent", "yaml"), data_path("characters.yaml")).unwrap_err();
    assert!(matches!(err, DataError::Io(_)));
}

#[test]
fn unknown_character_is_not_found() {
    let catalog = Catalog::load(data_path("powers.yaml"), data_path("characters.yaml")).unwrap();
    assert!(matches!(catalog.character("nobody"), Err(DataError::NotFound(_))));
}
