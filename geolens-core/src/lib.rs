#![deny(missing_docs)]
//! GeoLens core library.
//!
//! This crate ranks per-country repository statistics, bounds the choropleth
//! color scale, and classifies how concentrated a repository's commits are.

pub mod color;
pub mod domain;
pub mod error;
pub mod geo;
pub mod insight;
mod rank;
pub mod report;
pub mod section;
pub mod source;
pub mod table;

pub use color::{ColorDomain, color_domain, max_value};
pub use domain::{CountryStat, Metric, MetricMapping, MetricValue, RepoRef, validate_records};
pub use error::{GeoLensError, Result};
pub use geo::{ChoroplethDatum, WorldFeatures, choropleth_data};
pub use insight::{
    INSIGHT_METRIC, Insight, InsightKind, InsightThresholds, Tone, classify, concentration_insight,
    spread_insight,
};
pub use report::{render_json, render_section_markdown, render_section_text};
pub use section::{GeoSectionView, SectionConfig, build_section, load_section};
pub use source::{StatsSource, parse_country_stats, read_country_stats};
pub use table::{
    DEFAULT_TOP_N, DisplayRow, DisplayValue, NO_DATA_LABEL, RankedTableBuilder, format_percentage,
    top_n_table,
};
