#![deny(missing_docs)]
//! GeoLens server executable.
//!
//! Stores per-country repository statistics and serves the geographic
//! dashboard section built from them.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use geolens_core::{SectionConfig, WorldFeatures};

#[cfg(not(test))]
use crate::config::ServerConfig;
#[cfg(not(test))]
use crate::db::init_pool;
#[cfg(not(test))]
use crate::routes::{
    AppState, geo_features, health, json_config, openapi_json, replace_repo_countries,
    repo_countries, repo_geo,
};
#[cfg(not(test))]
use crate::store::PgStatsStore;

#[cfg(not(test))]
fn startup_error(message: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(message.to_string())
}

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(startup_error)?;
    let world = WorldFeatures::from_path(&config.world_geojson).map_err(|err| {
        startup_error(format!(
            "failed to load world geometry from {}: {err}",
            config.world_geojson.display()
        ))
    })?;
    log::info!(
        "loaded {} world features from {}",
        world.len(),
        config.world_geojson.display()
    );
    let world = Arc::new(world);
    let pool = init_pool(&config.database_url)
        .map_err(|err| startup_error(format!("database setup failed: {err}")))?;

    let state = web::Data::new(AppState {
        store: Arc::new(PgStatsStore::new(pool, world.clone())),
        world,
        config: SectionConfig::default().with_top_n(config.top_n),
    });

    let allowed_origins = config.ui_origins.clone();
    let listen = (config.host.clone(), config.port);
    log::info!("listening on {}:{}", listen.0, listen.1);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "PUT", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .app_data(json_config())
                .service(health)
                .service(repo_countries)
                .service(replace_repo_countries)
                .service(repo_geo)
                .service(geo_features)
                .service(openapi_json)
        })
        .bind(listen)?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
