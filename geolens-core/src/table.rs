//! Ranked country table.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CountryStat, Metric, MetricMapping, MetricValue};
use crate::error::Result;
use crate::rank::ranked;

/// Default number of countries requested for the table.
pub const DEFAULT_TOP_N: usize = 5;

/// Text shown in place of the table when a repository has no records.
pub const NO_DATA_LABEL: &str = "NO DATA FOR THIS REPO";

/// Value cell of a table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DisplayValue {
    /// Raw count, passed through unformatted.
    Count(u64),
    /// Percentage rendered as `"<digits>.<digit>%"`.
    Percent(String),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Count(count) => write!(f, "{count}"),
            DisplayValue::Percent(text) => f.write_str(text),
        }
    }
}

/// One row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayRow {
    /// A ranked country.
    Country {
        /// Country identifier.
        country: String,
        /// Formatted metric value.
        value: DisplayValue,
    },
    /// Placeholder for a repository without any records.
    NoData,
}

impl DisplayRow {
    /// Country label, or the no-data text for the placeholder.
    pub fn label(&self) -> &str {
        match self {
            DisplayRow::Country { country, .. } => country,
            DisplayRow::NoData => NO_DATA_LABEL,
        }
    }

    /// Value cell text; empty for the placeholder.
    pub fn value_text(&self) -> String {
        match self {
            DisplayRow::Country { value, .. } => value.to_string(),
            DisplayRow::NoData => String::new(),
        }
    }
}

/// Format a fraction as a percentage with one decimal, en-US style.
///
/// Ties round half away from zero, so `0.0125` renders as `"1.3%"`.
pub fn format_percentage(fraction: f64) -> String {
    let tenths = (fraction * 1000.0).round();
    format!("{:.1}%", tenths / 10.0)
}

/// Rank records by `metric` and keep the leading rows.
///
/// Empty input yields a single [`DisplayRow::NoData`]. Otherwise records
/// without a country are dropped, the rest are sorted descending (ties keep
/// input order), and the first `n + 1` rows are kept. Percentage metrics are
/// rendered with [`format_percentage`].
pub fn top_n_table(records: &[CountryStat], metric: Metric, n: usize) -> Result<Vec<DisplayRow>> {
    if records.is_empty() {
        return Ok(vec![DisplayRow::NoData]);
    }

    // Keeps n + 1 rows, one more than requested.
    let rows = ranked(records, metric)?
        .into_iter()
        .take(n.saturating_add(1))
        .map(|entry| DisplayRow::Country {
            country: entry.country.to_string(),
            value: display_value(metric, entry.value),
        })
        .collect();
    Ok(rows)
}

fn display_value(metric: Metric, value: MetricValue) -> DisplayValue {
    match value {
        MetricValue::Count(count) if !metric.is_percentage() => DisplayValue::Count(count),
        other => DisplayValue::Percent(format_percentage(other.as_f64())),
    }
}

/// Builds the table for the metric selected on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTableBuilder {
    mapping: MetricMapping,
    top_n: usize,
}

impl RankedTableBuilder {
    /// Create a builder with an explicit mapping and row budget.
    pub fn new(mapping: MetricMapping, top_n: usize) -> Self {
        Self { mapping, top_n }
    }

    /// Number of countries requested.
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Metric the table ranks by when `selected` is shown on the map.
    pub fn table_metric(&self, selected: Metric) -> Metric {
        self.mapping.table_metric(selected)
    }

    /// Build the table for the map's `selected` metric.
    pub fn build(&self, records: &[CountryStat], selected: Metric) -> Result<Vec<DisplayRow>> {
        top_n_table(records, self.table_metric(selected), self.top_n)
    }
}

impl Default for RankedTableBuilder {
    fn default() -> Self {
        Self::new(MetricMapping::default(), DEFAULT_TOP_N)
    }
}
