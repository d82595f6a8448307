//! Country statistics storage.

use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use geolens_core::{
    CountryStat, GeoLensError, RepoRef, Result, StatsSource, WorldFeatures, validate_records,
};

use crate::db::DbPool;
use crate::models::{CountryStatRow, NewCountryStatRow};
use crate::schema::repo_country_stats;

/// Stats source that can also be written to.
pub trait CountryStatsStore: StatsSource + Send + Sync {
    /// Replace every stored record of `repo` with `records`, keeping their order.
    fn replace_country_stats(&self, repo: &RepoRef, records: &[CountryStat]) -> Result<()>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStatsStore {
    pool: DbPool,
    world: Arc<WorldFeatures>,
}

impl PgStatsStore {
    /// Create a store over `pool` that serves `world` as its geometry.
    pub fn new(pool: DbPool, world: Arc<WorldFeatures>) -> Self {
        Self { pool, world }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>>
    {
        self.pool.get().map_err(storage_error)
    }
}

impl StatsSource for PgStatsStore {
    fn fetch_country_stats(&self, repo: &RepoRef) -> Result<Vec<CountryStat>> {
        let mut conn = self.connection()?;
        let rows = repo_country_stats::table
            .filter(repo_country_stats::owner.eq(&repo.owner))
            .filter(repo_country_stats::repo.eq(&repo.repo))
            .order(repo_country_stats::position.asc())
            .select(CountryStatRow::as_select())
            .load(&mut conn)
            .map_err(storage_error)?;
        rows.into_iter()
            .map(CountryStatRow::into_country_stat)
            .collect()
    }

    fn fetch_world_features(&self) -> Result<WorldFeatures> {
        Ok(self.world.as_ref().clone())
    }
}

impl CountryStatsStore for PgStatsStore {
    fn replace_country_stats(&self, repo: &RepoRef, records: &[CountryStat]) -> Result<()> {
        validate_records(records)?;
        let now = Utc::now().naive_utc();
        let rows = records
            .iter()
            .enumerate()
            .map(|(position, record)| NewCountryStatRow::from_country_stat(repo, position, record, now))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.connection()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                repo_country_stats::table
                    .filter(repo_country_stats::owner.eq(&repo.owner))
                    .filter(repo_country_stats::repo.eq(&repo.repo)),
            )
            .execute(conn)?;
            if !rows.is_empty() {
                diesel::insert_into(repo_country_stats::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(storage_error)?;
        log::info!("stored {} country records for {repo}", rows.len());
        Ok(())
    }
}

fn storage_error(err: impl std::fmt::Display) -> GeoLensError {
    GeoLensError::Other(format!("storage error: {err}"))
}

#[cfg(test)]
mockall::mock! {
    pub Store {}

    impl StatsSource for Store {
        fn fetch_country_stats(&self, repo: &RepoRef) -> Result<Vec<CountryStat>>;
        fn fetch_world_features(&self) -> Result<WorldFeatures>;
    }

    impl CountryStatsStore for Store {
        fn replace_country_stats(&self, repo: &RepoRef, records: &[CountryStat]) -> Result<()>;
    }
}
