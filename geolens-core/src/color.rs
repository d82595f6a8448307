//! Color-scale bounds for the choropleth map.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CountryStat, Metric};
use crate::error::Result;
use crate::rank::located;

/// Value range fed to the map's color scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ColorDomain {
    /// Lower end of the scale, always zero.
    pub lower: f64,
    /// Upper end of the scale; `None` when no country has data.
    pub upper: Option<f64>,
}

impl ColorDomain {
    /// Whether the map should draw a legend.
    pub fn has_legend(&self) -> bool {
        self.upper.is_some()
    }
}

/// Maximum of `metric` across records that have a country.
///
/// Returns `Ok(None)` when no record has a country; callers treat that as
/// "no bound" and draw an empty legend.
pub fn max_value(records: &[CountryStat], metric: Metric) -> Result<Option<f64>> {
    Ok(located(records, metric)?
        .into_iter()
        .map(|entry| entry.value.as_f64())
        .reduce(f64::max))
}

/// Color domain `[0, max]` for `metric`.
pub fn color_domain(records: &[CountryStat], metric: Metric) -> Result<ColorDomain> {
    Ok(ColorDomain {
        lower: 0.0,
        upper: max_value(records, metric)?,
    })
}
