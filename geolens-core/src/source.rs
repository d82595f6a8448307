//! Data sources for country statistics.

use std::path::Path;

use crate::domain::{CountryStat, RepoRef, validate_records};
use crate::error::Result;
use crate::geo::WorldFeatures;

/// Where a host gets its statistics and geometry from.
#[cfg_attr(test, mockall::automock)]
pub trait StatsSource {
    /// Per-country statistics of a repository, in no particular order.
    fn fetch_country_stats(&self, repo: &RepoRef) -> Result<Vec<CountryStat>>;
    /// World geometry the choropleth is drawn on.
    fn fetch_world_features(&self) -> Result<WorldFeatures>;
}

/// Parse and validate a JSON array of country statistics.
pub fn parse_country_stats(text: &str) -> Result<Vec<CountryStat>> {
    let records: Vec<CountryStat> = serde_json::from_str(text)?;
    validate_records(&records)?;
    Ok(records)
}

/// Read, parse, and validate a statistics file.
pub fn read_country_stats(path: &Path) -> Result<Vec<CountryStat>> {
    let text = std::fs::read_to_string(path)?;
    parse_country_stats(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoLensError;
    use std::path::PathBuf;

    #[test]
    fn parses_records_with_unknown_country() {
        let records = parse_country_stats(
            r#"[
                {"country": "USA", "commits_count": 10, "commits_perc": 0.5},
                {"country": null, "commits_count": 10, "commits_perc": 0.5}
            ]"#,
        )
        .expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].country, None);
    }

    #[test]
    fn rejects_percent_scale_fractions() {
        let err = parse_country_stats(r#"[{"country": "USA", "commits_perc": 50.0}]"#)
            .expect_err("invalid");
        assert!(matches!(err, GeoLensError::InvalidRecord(_)));
    }

    #[test]
    fn rejects_negative_counts() {
        let err = parse_country_stats(r#"[{"country": "USA", "commits_count": -1}]"#)
            .expect_err("invalid");
        assert!(matches!(err, GeoLensError::Json(_)));
    }

    #[test]
    fn reads_records_from_file() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create temp dir");
        let path = root.join("countries.json");
        std::fs::write(&path, r#"[{"country": "JPN", "contributors_count": 3}]"#)
            .expect("write stats");

        let records = read_country_stats(&path).expect("read");
        assert_eq!(records, vec![CountryStat {
            contributors_count: Some(3),
            ..CountryStat::new("JPN")
        }]);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_country_stats(&PathBuf::from("/nonexistent/geolens/countries.json"))
            .expect_err("missing");
        assert!(matches!(err, GeoLensError::Io(_)));
    }

    #[test]
    fn mock_source_serves_world_features() {
        let mut source = MockStatsSource::new();
        source.expect_fetch_world_features().returning(|| {
            WorldFeatures::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#)
        });
        let world = source.fetch_world_features().expect("world");
        assert!(world.is_empty());
    }

    fn unique_dir_name() -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        format!("geolens-source-{nanos}")
    }
}
