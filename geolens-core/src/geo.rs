//! World geometry and choropleth records.
//!
//! The feature collection is opaque to the ranking pipeline: it is loaded,
//! checked for shape, and handed to the map as-is.

use std::collections::BTreeSet;
use std::path::Path;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CountryStat, Metric};
use crate::error::{GeoLensError, Result};
use crate::rank::located;

/// One `{id, value}` record consumed by the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChoroplethDatum {
    /// Country identifier, matched against feature ids.
    pub id: String,
    /// Metric value for the country.
    pub value: f64,
}

/// Choropleth records for `metric`, one per record with a country.
pub fn choropleth_data(records: &[CountryStat], metric: Metric) -> Result<Vec<ChoroplethDatum>> {
    Ok(located(records, metric)?
        .into_iter()
        .map(|entry| ChoroplethDatum {
            id: entry.country.to_string(),
            value: entry.value.as_f64(),
        })
        .collect())
}

/// Static world geometry served alongside the statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct WorldFeatures {
    collection: FeatureCollection,
}

impl WorldFeatures {
    /// Parse a GeoJSON document that must be a `FeatureCollection`.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let geojson: GeoJson = text.parse()?;
        match geojson {
            GeoJson::FeatureCollection(collection) => Ok(Self { collection }),
            GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(GeoLensError::Other(
                "world geometry must be a GeoJSON FeatureCollection".to_string(),
            )),
        }
    }

    /// Read and parse a GeoJSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&text)
    }

    /// Features in file order.
    pub fn features(&self) -> &[Feature] {
        &self.collection.features
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    /// Whether the collection has no features.
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    /// Ids of every feature that carries one.
    pub fn feature_ids(&self) -> BTreeSet<String> {
        self.collection.features.iter().filter_map(feature_id).collect()
    }

    /// Countries in `records` with no feature of the same id.
    ///
    /// Such countries are ranked and listed but leave no color on the map.
    pub fn unmatched_countries(&self, records: &[CountryStat]) -> Vec<String> {
        let ids = self.feature_ids();
        let mut seen = BTreeSet::new();
        records
            .iter()
            .filter_map(|record| record.country.as_deref())
            .filter(|country| !ids.contains(*country))
            .filter(|country| seen.insert(country.to_string()))
            .map(str::to_string)
            .collect()
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::String(id) => Some(id.clone()),
        Id::Number(id) => Some(id.to_string()),
    }
}
