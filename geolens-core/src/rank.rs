//! Filtering and ordering shared by the table, domain, and insight stages.

use crate::domain::{CountryStat, Metric, MetricValue};
use crate::error::Result;

/// A record with a known country and its value for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RankedCountry<'a> {
    pub country: &'a str,
    pub value: MetricValue,
}

/// Records with a country, paired with `metric`, in input order.
///
/// Records without a country are skipped before the metric is read, so an
/// unknown-location row never fails the lookup.
pub(crate) fn located<'a>(
    records: &'a [CountryStat],
    metric: Metric,
) -> Result<Vec<RankedCountry<'a>>> {
    records
        .iter()
        .filter_map(|record| record.country.as_deref().map(|country| (record, country)))
        .map(|(record, country)| {
            record
                .require(metric)
                .map(|value| RankedCountry { country, value })
        })
        .collect()
}

/// Records with a country, sorted by `metric` descending.
///
/// The sort is stable, so ties keep their input order. The caller's slice is
/// never reordered.
pub(crate) fn ranked<'a>(
    records: &'a [CountryStat],
    metric: Metric,
) -> Result<Vec<RankedCountry<'a>>> {
    let mut entries = located(records, metric)?;
    entries.sort_by(|a, b| b.value.as_f64().total_cmp(&a.value.as_f64()));
    Ok(entries)
}
