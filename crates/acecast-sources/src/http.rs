// Shared reqwest plumbing for the provider clients.

use std::time::Duration;

use acecast_core::config::SourcesConfig;
use acecast_core::gateway::SourceError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Build the HTTP client used by every provider. The transport owns
/// timeouts; callers above never impose their own.
pub fn build_client(sources: &SourcesConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(sources.request_timeout_secs))
        .user_agent(sources.user_agent.clone())
        .build()
        .context("failed to create HTTP client")
}

/// GET `url` with `query` and decode the JSON body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, SourceError> {
    debug!(url, "GET");
    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| SourceError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            code: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| SourceError::Decode(e.to_string()))
}

/// Join a base URL and a path without doubling or dropping the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
