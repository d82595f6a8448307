//! Verifies the bundled world geometry loads and covers common countries.

use std::path::PathBuf;

use geolens_core::{CountryStat, WorldFeatures};

fn world_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("data")
        .join("world_countries.json")
}

#[test]
fn bundled_world_loads() {
    let world = WorldFeatures::from_path(&world_path()).expect("load world geometry");
    assert!(!world.is_empty());
    let ids = world.feature_ids();
    for country in ["USA", "DEU", "IND", "CHN", "BRA"] {
        assert!(ids.contains(country), "world geometry missing {country}");
    }
}

#[test]
fn bundled_world_flags_unknown_codes() {
    let world = WorldFeatures::from_path(&world_path()).expect("load world geometry");
    let records = vec![
        CountryStat::new("USA").with_commits(1, 0.5),
        CountryStat::new("ATL").with_commits(1, 0.5),
    ];
    assert_eq!(world.unmatched_countries(&records), vec!["ATL".to_string()]);
}
