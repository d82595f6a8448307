//! Qualitative judgments over the commit distribution.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CountryStat, Metric};
use crate::error::Result;
use crate::rank::{RankedCountry, ranked};

/// Metric every insight is computed from.
pub const INSIGHT_METRIC: Metric = Metric::CommitsPerc;

/// Badge color of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Healthy signal.
    Positive,
    /// Warning signal.
    Negative,
}

/// Which rule produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Whether a single country dominates commits.
    Concentration,
    /// Whether commits are spread across several countries.
    Spread,
}

/// A qualitative verdict shown as a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Insight {
    /// Rule that produced the verdict.
    pub kind: InsightKind,
    /// Badge color.
    pub color: Tone,
    /// Human-readable message.
    pub message: String,
}

/// Cut-offs used by the concentration and spread rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightThresholds {
    /// Share above which one country is said to dominate.
    pub dominance_share: f64,
    /// Share a country must reach (inclusive) to count towards spread.
    pub notable_share: f64,
    /// Number of notable countries needed for a positive spread verdict.
    pub min_notable_countries: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            dominance_share: 0.5,
            notable_share: 0.03,
            min_notable_countries: 3,
        }
    }
}

/// Concentration verdict, or `None` when no record has a country.
pub fn concentration_insight(
    records: &[CountryStat],
    thresholds: &InsightThresholds,
) -> Result<Option<Insight>> {
    let distribution = ranked(records, INSIGHT_METRIC)?;
    Ok(judge_concentration(&distribution, thresholds))
}

/// Spread verdict, or `None` when no record has a country.
pub fn spread_insight(
    records: &[CountryStat],
    thresholds: &InsightThresholds,
) -> Result<Option<Insight>> {
    let distribution = ranked(records, INSIGHT_METRIC)?;
    Ok(judge_spread(&distribution, thresholds))
}

/// Both verdicts, concentration first. Empty when no record has a country.
pub fn classify(records: &[CountryStat], thresholds: &InsightThresholds) -> Result<Vec<Insight>> {
    let distribution = ranked(records, INSIGHT_METRIC)?;
    Ok(judge_concentration(&distribution, thresholds)
        .into_iter()
        .chain(judge_spread(&distribution, thresholds))
        .collect())
}

fn judge_concentration(
    distribution: &[RankedCountry<'_>],
    thresholds: &InsightThresholds,
) -> Option<Insight> {
    let top = distribution.first()?;
    let limit = format_share(thresholds.dominance_share);
    let insight = if top.value.as_f64() > thresholds.dominance_share {
        Insight {
            kind: InsightKind::Concentration,
            color: Tone::Negative,
            message: format!(
                "More than {limit} of commits come from one country ({})",
                top.country
            ),
        }
    } else {
        Insight {
            kind: InsightKind::Concentration,
            color: Tone::Positive,
            message: format!("None of the countries has more than {limit} of commits"),
        }
    };
    Some(insight)
}

fn judge_spread(
    distribution: &[RankedCountry<'_>],
    thresholds: &InsightThresholds,
) -> Option<Insight> {
    if distribution.is_empty() {
        return None;
    }
    let notable = distribution
        .iter()
        .filter(|entry| entry.value.as_f64() >= thresholds.notable_share)
        .count();
    let needed = thresholds.min_notable_countries;
    let share = format_share(thresholds.notable_share);
    let insight = if notable >= needed {
        Insight {
            kind: InsightKind::Spread,
            color: Tone::Positive,
            message: format!("At least {needed} countries have {share} or more of commits"),
        }
    } else {
        Insight {
            kind: InsightKind::Spread,
            color: Tone::Negative,
            message: format!("Fewer than {needed} countries have {share} or more of commits"),
        }
    };
    Some(insight)
}

/// `0.5` -> `"50%"`, `0.025` -> `"2.5%"`.
fn format_share(share: f64) -> String {
    let text = format!("{:.1}", share * 100.0);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}%")
}
