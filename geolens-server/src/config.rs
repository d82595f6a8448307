//! Environment configuration for GeoLens server.

use std::path::PathBuf;
use std::str::FromStr;

use geolens_core::DEFAULT_TOP_N;

/// Settings read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub ui_origins: Vec<String>,
    /// Path of the world GeoJSON file.
    pub world_geojson: PathBuf,
    /// Default number of table countries.
    pub top_n: usize,
}

impl ServerConfig {
    /// Load settings from the environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`, applying defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| "DATABASE_URL must be set to a PostgreSQL connection string".to_string())?;
        let host = lookup("GEOLENS_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "GEOLENS_PORT", 8080u16)?;
        let top_n = parse_var(&lookup, "GEOLENS_TOP_N", DEFAULT_TOP_N)?;
        let ui_origins = lookup("GEOLENS_UI_ORIGINS")
            .unwrap_or_else(|| "http://127.0.0.1:4200,http://localhost:4200".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
        let world_geojson = lookup("GEOLENS_WORLD_GEOJSON")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/world_countries.json"));

        Ok(Self {
            database_url,
            host,
            port,
            ui_origins,
            world_geojson,
            top_n,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, String> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value: {value}")),
        None => Ok(default),
    }
}
