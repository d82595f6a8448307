//! Database models for GeoLens server.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use geolens_core::{CountryStat, GeoLensError, RepoRef, Result};
use uuid::Uuid;

use crate::schema::repo_country_stats;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = repo_country_stats)]
/// Stored country statistics row.
pub struct CountryStatRow {
    /// Row identifier.
    pub id: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Country identifier; `None` for the unknown-location bucket.
    pub country: Option<String>,
    /// Commits authored from the country.
    pub commits_count: Option<i64>,
    /// Contributors located in the country.
    pub contributors_count: Option<i64>,
    /// Fraction of the repository's commits.
    pub commits_perc: Option<f64>,
    /// Fraction of the repository's contributors.
    pub contributors_perc: Option<f64>,
    /// Position of the record in the uploaded list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

impl CountryStatRow {
    /// Convert back into the core record.
    pub fn into_country_stat(self) -> Result<CountryStat> {
        Ok(CountryStat {
            commits_count: count_from_column(self.commits_count, "commits_count")?,
            contributors_count: count_from_column(self.contributors_count, "contributors_count")?,
            commits_perc: self.commits_perc,
            contributors_perc: self.contributors_perc,
            country: self.country,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repo_country_stats)]
/// Insertable country statistics row.
pub struct NewCountryStatRow {
    /// Row identifier.
    pub id: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Country identifier.
    pub country: Option<String>,
    /// Commits authored from the country.
    pub commits_count: Option<i64>,
    /// Contributors located in the country.
    pub contributors_count: Option<i64>,
    /// Fraction of the repository's commits.
    pub commits_perc: Option<f64>,
    /// Fraction of the repository's contributors.
    pub contributors_perc: Option<f64>,
    /// Position of the record in the uploaded list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

impl NewCountryStatRow {
    /// Build the row for the record at `position` of a repository's list.
    pub fn from_country_stat(
        repo: &RepoRef,
        position: usize,
        record: &CountryStat,
        created_at: NaiveDateTime,
    ) -> Result<Self> {
        let position = i32::try_from(position)
            .map_err(|_| GeoLensError::InvalidRecord(format!("too many records ({position})")))?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner: repo.owner.clone(),
            repo: repo.repo.clone(),
            country: record.country.clone(),
            commits_count: count_to_column(record.commits_count, "commits_count")?,
            contributors_count: count_to_column(record.contributors_count, "contributors_count")?,
            commits_perc: record.commits_perc,
            contributors_perc: record.contributors_perc,
            position,
            created_at,
        })
    }
}

fn count_to_column(value: Option<u64>, column: &str) -> Result<Option<i64>> {
    value
        .map(|count| {
            i64::try_from(count).map_err(|_| {
                GeoLensError::InvalidRecord(format!("{column} = {count} does not fit in BIGINT"))
            })
        })
        .transpose()
}

fn count_from_column(value: Option<i64>, column: &str) -> Result<Option<u64>> {
    value
        .map(|count| {
            u64::try_from(count)
                .map_err(|_| GeoLensError::Other(format!("stored {column} is negative: {count}")))
        })
        .transpose()
}
