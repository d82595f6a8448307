//! OpenAPI specification for GeoLens server.

use utoipa::OpenApi;

use geolens_core::{
    ChoroplethDatum, ColorDomain, CountryStat, DisplayRow, DisplayValue, GeoSectionView, Insight,
    InsightKind, Metric, Tone,
};

use crate::routes::{CountryStatsUpdated, ErrorResponse, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::repo_countries,
        crate::routes::replace_repo_countries,
        crate::routes::repo_geo,
        crate::routes::geo_features,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            ChoroplethDatum,
            ColorDomain,
            CountryStat,
            CountryStatsUpdated,
            DisplayRow,
            DisplayValue,
            ErrorResponse,
            GeoSectionView,
            HealthResponse,
            Insight,
            InsightKind,
            Metric,
            Tone
        )
    ),
    tags(
        (name = "stats", description = "Per-country repository statistics"),
        (name = "geo", description = "Geographic section and world geometry"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the GeoLens server.
pub struct ApiDoc;
