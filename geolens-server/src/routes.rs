//! HTTP handlers for GeoLens server.

use std::sync::Arc;

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, Responder, get, put, web};
use geolens_core::{
    CountryStat, GeoLensError, GeoSectionView, Metric, RepoRef, SectionConfig, WorldFeatures,
    build_section, validate_records,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::openapi::ApiDoc;
use crate::store::CountryStatsStore;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Country statistics storage.
    pub store: Arc<dyn CountryStatsStore>,
    /// World geometry loaded at startup.
    pub world: Arc<WorldFeatures>,
    /// Section defaults.
    pub config: SectionConfig,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Liveness payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
}

/// Result of replacing a repository's statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountryStatsUpdated {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Number of records stored.
    pub stored: usize,
}

/// Query parameters for the section endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeoQuery {
    /// Metric shown on the map (`commits_count` when omitted).
    pub metric: Option<String>,
    /// Number of countries requested for the table.
    pub top: Option<usize>,
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        message: message.into(),
    })
}

fn error_response(err: &GeoLensError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        GeoLensError::MissingMetric { .. } => HttpResponse::UnprocessableEntity().json(body),
        GeoLensError::InvalidRecord(_) | GeoLensError::Json(_) => {
            HttpResponse::BadRequest().json(body)
        }
        _ => {
            log::error!("request failed: {err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn task_failed(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        message: format!("storage task failed: {err}"),
    })
}

/// JSON extractor settings that report malformed bodies as [`ErrorResponse`].
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let response = bad_request(format!("invalid payload: {err}"));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    ),
    tag = "system"
)]
#[get("/api/health")]
/// Liveness probe.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/repos/{owner}/{repo}/countries",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name")
    ),
    responses(
        (status = 200, description = "Stored country statistics", body = [CountryStat]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "stats"
)]
#[get("/api/repos/{owner}/{repo}/countries")]
/// Raw country statistics of a repository.
pub async fn repo_countries(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (owner, repo) = path.into_inner();
    let repo = RepoRef::new(owner, repo);
    let store = state.store.clone();
    match web::block(move || store.fetch_country_stats(&repo)).await {
        Ok(Ok(records)) => HttpResponse::Ok().json(records),
        Ok(Err(err)) => error_response(&err),
        Err(err) => task_failed(err),
    }
}

#[utoipa::path(
    put,
    path = "/repos/{owner}/{repo}/countries",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name")
    ),
    request_body = [CountryStat],
    responses(
        (status = 200, description = "Statistics replaced", body = CountryStatsUpdated),
        (status = 400, description = "Invalid records", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "stats"
)]
#[put("/api/repos/{owner}/{repo}/countries")]
/// Replace the country statistics of a repository.
pub async fn replace_repo_countries(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<Vec<CountryStat>>,
) -> impl Responder {
    let (owner, repo) = path.into_inner();
    let records = payload.into_inner();
    if let Err(err) = validate_records(&records) {
        return error_response(&err);
    }
    let repo = RepoRef::new(owner, repo);
    let store = state.store.clone();
    let stored = records.len();
    let target = repo.clone();
    match web::block(move || store.replace_country_stats(&target, &records)).await {
        Ok(Ok(())) => HttpResponse::Ok().json(CountryStatsUpdated {
            owner: repo.owner,
            repo: repo.repo,
            stored,
        }),
        Ok(Err(err)) => error_response(&err),
        Err(err) => task_failed(err),
    }
}

#[utoipa::path(
    get,
    path = "/repos/{owner}/{repo}/geo",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name"),
        GeoQuery
    ),
    responses(
        (status = 200, description = "Geographic section", body = GeoSectionView),
        (status = 400, description = "Unknown metric", body = ErrorResponse),
        (status = 422, description = "A located record lacks the metric", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "geo"
)]
#[get("/api/repos/{owner}/{repo}/geo")]
/// Map domain, ranked table, and insights for a repository.
pub async fn repo_geo(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<GeoQuery>,
) -> impl Responder {
    let (owner, repo) = path.into_inner();
    let query = query.into_inner();
    let metric = match query.metric.as_deref().map(str::parse::<Metric>) {
        None => Metric::CommitsCount,
        Some(Ok(metric)) => metric,
        Some(Err(err)) => return bad_request(err.to_string()),
    };
    let config = match query.top {
        Some(top) => state.config.clone().with_top_n(top),
        None => state.config.clone(),
    };

    let repo = RepoRef::new(owner, repo);
    let store = state.store.clone();
    let target = repo.clone();
    let records = match web::block(move || store.fetch_country_stats(&target)).await {
        Ok(Ok(records)) => records,
        Ok(Err(err)) => return error_response(&err),
        Err(err) => return task_failed(err),
    };

    let unmatched = state.world.unmatched_countries(&records);
    if !unmatched.is_empty() {
        log::warn!(
            "{repo}: no world feature for countries {}",
            unmatched.join(", ")
        );
    }

    match build_section(&records, metric, &config) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/geo/features",
    responses(
        (status = 200, description = "World GeoJSON feature collection", body = serde_json::Value)
    ),
    tag = "geo"
)]
#[get("/api/geo/features")]
/// Serve the world geometry.
pub async fn geo_features(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.world.as_ref())
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
