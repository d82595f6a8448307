//! Domain entities for GeoLens.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{GeoLensError, Result};

/// Numeric field of a [`CountryStat`] that can be ranked or mapped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Number of commits authored from the country.
    CommitsCount,
    /// Number of distinct contributors located in the country.
    ContributorsCount,
    /// Share of the repository's commits, as a fraction in `[0, 1]`.
    CommitsPerc,
    /// Share of the repository's contributors, as a fraction in `[0, 1]`.
    ContributorsPerc,
}

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Metric; 4] = [
        Metric::CommitsCount,
        Metric::ContributorsCount,
        Metric::CommitsPerc,
        Metric::ContributorsPerc,
    ];

    /// Wire name of the metric.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::CommitsCount => "commits_count",
            Metric::ContributorsCount => "contributors_count",
            Metric::CommitsPerc => "commits_perc",
            Metric::ContributorsPerc => "contributors_perc",
        }
    }

    /// Whether the metric name carries the percentage marker.
    pub fn is_percentage(self) -> bool {
        self.as_str().contains("perc")
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = GeoLensError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == trimmed)
            .ok_or_else(|| GeoLensError::Other(format!("unknown metric: {trimmed}")))
    }
}

/// Raw value of a metric on a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// A count metric.
    Count(u64),
    /// A percentage metric, stored as a fraction.
    Fraction(f64),
}

impl MetricValue {
    /// Value as a float for ordering and color scaling.
    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Count(count) => count as f64,
            MetricValue::Fraction(fraction) => fraction,
        }
    }
}

/// Aggregated statistics for one country of a repository.
///
/// A record without a `country` is the data service's "unknown location"
/// bucket. It stays in the raw collection but is skipped by every ranking,
/// domain, and insight computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountryStat {
    /// Country identifier (matches the world geometry feature ids).
    #[serde(default)]
    pub country: Option<String>,
    /// Commits authored from the country.
    #[serde(default)]
    pub commits_count: Option<u64>,
    /// Contributors located in the country.
    #[serde(default)]
    pub contributors_count: Option<u64>,
    /// Fraction of the repository's commits.
    #[serde(default)]
    pub commits_perc: Option<f64>,
    /// Fraction of the repository's contributors.
    #[serde(default)]
    pub contributors_perc: Option<f64>,
}

impl CountryStat {
    /// Create a record for a country with every metric unset.
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::default()
        }
    }

    /// Create a record for the unknown-location bucket.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Set the commit count and share.
    pub fn with_commits(mut self, count: u64, perc: f64) -> Self {
        self.commits_count = Some(count);
        self.commits_perc = Some(perc);
        self
    }

    /// Set the contributor count and share.
    pub fn with_contributors(mut self, count: u64, perc: f64) -> Self {
        self.contributors_count = Some(count);
        self.contributors_perc = Some(perc);
        self
    }

    /// Look up a metric, if present.
    pub fn value(&self, metric: Metric) -> Option<MetricValue> {
        match metric {
            Metric::CommitsCount => self.commits_count.map(MetricValue::Count),
            Metric::ContributorsCount => self.contributors_count.map(MetricValue::Count),
            Metric::CommitsPerc => self.commits_perc.map(MetricValue::Fraction),
            Metric::ContributorsPerc => self.contributors_perc.map(MetricValue::Fraction),
        }
    }

    /// Look up a metric, failing with [`GeoLensError::MissingMetric`].
    pub fn require(&self, metric: Metric) -> Result<MetricValue> {
        self.value(metric).ok_or_else(|| GeoLensError::MissingMetric {
            country: self.country.clone().unwrap_or_else(|| "unknown".to_string()),
            metric,
        })
    }
}

/// Check records at the data-fetching boundary.
///
/// Fractions must be finite and inside `[0, 1]`. Records without a country
/// are accepted as-is.
pub fn validate_records(records: &[CountryStat]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if record.country.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(GeoLensError::InvalidRecord(format!(
                "record {index} has an empty country"
            )));
        }
        for metric in [Metric::CommitsPerc, Metric::ContributorsPerc] {
            if let Some(MetricValue::Fraction(value)) = record.value(metric) {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(GeoLensError::InvalidRecord(format!(
                        "record {index} has {metric} = {value}, expected a fraction in [0, 1]"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Owner and name of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct RepoRef {
    /// Organization or user owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoRef {
    /// Build a repository reference.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Fixed lookup from a selectable metric to the metric shown in the table.
///
/// The map toggle selects a count; the table ranks by the matching share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricMapping {
    pairs: BTreeMap<Metric, Metric>,
}

impl MetricMapping {
    /// Build a mapping from explicit pairs.
    pub fn new(pairs: impl IntoIterator<Item = (Metric, Metric)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Metric to rank the table by when `selected` is chosen.
    ///
    /// Unmapped metrics rank by themselves.
    pub fn table_metric(&self, selected: Metric) -> Metric {
        self.pairs.get(&selected).copied().unwrap_or(selected)
    }
}

impl Default for MetricMapping {
    fn default() -> Self {
        Self::new([
            (Metric::CommitsCount, Metric::CommitsPerc),
            (Metric::ContributorsCount, Metric::ContributorsPerc),
        ])
    }
}
