//! HTTP client for the GeoLens server.

use geolens_core::{CountryStat, RepoRef, validate_records};
use reqwest::Client;
use serde::Deserialize;

use crate::CliResult;

/// Server used when neither `--server` nor `GEOLENS_API_URL` is given.
pub(crate) const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Reads repository statistics from a GeoLens server.
pub(crate) struct StatsClient {
    client: Client,
    server_url: String,
}

impl StatsClient {
    /// Build a client for `server_url`.
    pub(crate) fn new(server_url: &str) -> CliResult<Self> {
        let client = Client::builder().user_agent("geolens-cli").build()?;
        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn countries_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/api/repos/{}/{}/countries",
            self.server_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo)
        )
    }

    /// Fetch and validate the stored statistics of `repo`.
    pub(crate) async fn fetch_country_stats(&self, repo: &RepoRef) -> CliResult<Vec<CountryStat>> {
        let response = self.client.get(self.countries_url(repo)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(format!("server returned {status} for {repo}: {message}").into());
        }
        let records = response.json::<Vec<CountryStat>>().await?;
        validate_records(&records)?;
        Ok(records)
    }
}
