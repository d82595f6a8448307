//! Assembly of the geographic section for one repository.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::color::{ColorDomain, color_domain};
use crate::domain::{CountryStat, Metric, MetricMapping, RepoRef};
use crate::error::Result;
use crate::geo::{ChoroplethDatum, choropleth_data};
use crate::insight::{Insight, InsightThresholds, classify};
use crate::source::StatsSource;
use crate::table::{DEFAULT_TOP_N, DisplayRow, RankedTableBuilder};

/// Knobs shared by every section build.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionConfig {
    /// Map metric to table metric lookup.
    pub mapping: MetricMapping,
    /// Number of countries requested for the table.
    pub top_n: usize,
    /// Insight cut-offs.
    pub thresholds: InsightThresholds,
}

impl SectionConfig {
    /// Same configuration with a different table size.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    fn table_builder(&self) -> RankedTableBuilder {
        RankedTableBuilder::new(self.mapping.clone(), self.top_n)
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            mapping: MetricMapping::default(),
            top_n: DEFAULT_TOP_N,
            thresholds: InsightThresholds::default(),
        }
    }
}

/// Everything a host needs to draw the section for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoSectionView {
    /// Metric selected on the map.
    pub metric: Metric,
    /// Metric the table ranks by.
    pub table_metric: Metric,
    /// Number of countries requested for the table.
    pub top_n: usize,
    /// Color scale bounds.
    pub domain: ColorDomain,
    /// Choropleth records.
    pub map_data: Vec<ChoroplethDatum>,
    /// Ranked table rows.
    pub table: Vec<DisplayRow>,
    /// Concentration and spread verdicts.
    pub insights: Vec<Insight>,
}

/// Run the domain, table, and insight stages over the same records.
pub fn build_section(
    records: &[CountryStat],
    metric: Metric,
    config: &SectionConfig,
) -> Result<GeoSectionView> {
    let builder = config.table_builder();
    let table_metric = builder.table_metric(metric);
    let view = GeoSectionView {
        metric,
        table_metric,
        top_n: builder.top_n(),
        domain: color_domain(records, metric)?,
        map_data: choropleth_data(records, metric)?,
        table: builder.build(records, metric)?,
        insights: classify(records, &config.thresholds)?,
    };
    log::debug!(
        "built section for {metric}: {} records, {} rows, {} insights",
        records.len(),
        view.table.len(),
        view.insights.len()
    );
    Ok(view)
}

/// Fetch a repository's records from `source` and build its section.
pub fn load_section<S: StatsSource + ?Sized>(
    source: &S,
    repo: &RepoRef,
    metric: Metric,
    config: &SectionConfig,
) -> Result<GeoSectionView> {
    let records = source.fetch_country_stats(repo)?;
    if records.is_empty() {
        log::warn!("no country statistics for {repo}");
    }
    build_section(&records, metric, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoLensError;
    use crate::insight::Tone;
    use crate::source::MockStatsSource;
    use mockall::predicate::eq;

    fn sample() -> Vec<CountryStat> {
        vec![
            CountryStat::new("USA")
                .with_commits(60, 0.6)
                .with_contributors(4, 0.4),
            CountryStat::unknown()
                .with_commits(5, 0.05)
                .with_contributors(1, 0.1),
            CountryStat::new("DEU")
                .with_commits(35, 0.35)
                .with_contributors(5, 0.5),
        ]
    }

    #[test]
    fn builds_every_stage_for_selected_metric() {
        let view = build_section(&sample(), Metric::CommitsCount, &SectionConfig::default())
            .expect("section");
        assert_eq!(view.metric, Metric::CommitsCount);
        assert_eq!(view.table_metric, Metric::CommitsPerc);
        assert_eq!(view.top_n, DEFAULT_TOP_N);
        assert_eq!(view.domain.upper, Some(60.0));
        assert_eq!(view.map_data.len(), 2);
        assert_eq!(view.table[0].label(), "USA");
        assert_eq!(view.table[0].value_text(), "60.0%");
        assert_eq!(view.insights.len(), 2);
        assert_eq!(view.insights[0].color, Tone::Negative);
    }

    #[test]
    fn contributor_toggle_ranks_by_contributor_share() {
        let view = build_section(
            &sample(),
            Metric::ContributorsCount,
            &SectionConfig::default(),
        )
        .expect("section");
        assert_eq!(view.table_metric, Metric::ContributorsPerc);
        assert_eq!(view.table[0].label(), "DEU");
        assert_eq!(view.domain.upper, Some(5.0));
    }

    #[test]
    fn empty_records_use_every_fallback() {
        let view = build_section(&[], Metric::CommitsCount, &SectionConfig::default())
            .expect("section");
        assert!(!view.domain.has_legend());
        assert!(view.map_data.is_empty());
        assert_eq!(view.table, vec![DisplayRow::NoData]);
        assert!(view.insights.is_empty());
    }

    #[test]
    fn top_n_override_is_applied() {
        let config = SectionConfig::default().with_top_n(0);
        let view = build_section(&sample(), Metric::CommitsCount, &config).expect("section");
        assert_eq!(view.top_n, 0);
        assert_eq!(view.table.len(), 1);
    }

    #[test]
    fn load_section_reads_from_source() {
        let repo = RepoRef::new("octo", "geo");
        let mut source = MockStatsSource::new();
        source
            .expect_fetch_country_stats()
            .with(eq(repo.clone()))
            .times(1)
            .returning(|_| Ok(sample()));

        let view = load_section(
            &source,
            &repo,
            Metric::CommitsCount,
            &SectionConfig::default(),
        )
        .expect("section");
        assert_eq!(view.table.len(), 2);
    }

    #[test]
    fn load_section_propagates_source_errors() {
        let mut source = MockStatsSource::new();
        source
            .expect_fetch_country_stats()
            .returning(|_| Err(GeoLensError::Other("offline".to_string())));

        let err = load_section(
            &source,
            &RepoRef::new("octo", "geo"),
            Metric::CommitsCount,
            &SectionConfig::default(),
        )
        .expect_err("offline");
        assert_eq!(err.to_string(), "offline");
    }
}
