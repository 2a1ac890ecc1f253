//! Remote repository indexes.
//!
//! A bundle repository publishes `index.json` at its root. Fetches are retried
//! with exponential backoff on transport errors and 5xx responses; client
//! errors and malformed documents fail immediately.

use anyhow::Result;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use super::session::DuffleSession;
use crate::core::DuffleError;
use crate::models::{RepoBundle, RepoIndex};

/// File name of a repository's index document.
pub const INDEX_FILE: &str = "index.json";

/// Retries after the first attempt.
const FETCH_RETRIES: usize = 2;

#[derive(Debug)]
enum FetchError {
    Transient(String),
    Permanent(String),
}

impl FetchError {
    const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn into_reason(self) -> String {
        match self {
            Self::Transient(reason) | Self::Permanent(reason) => reason,
        }
    }
}

/// URL of the index for `repository` (a host optionally followed by a path).
pub fn index_url(scheme: &str, repository: &str) -> String {
    format!("{scheme}://{}/{INDEX_FILE}", repository.trim_end_matches('/'))
}

/// Download and decode the index of `repository`.
///
/// # Errors
///
/// - [`DuffleError::IndexFetchFailed`] when the server is unreachable after
///   retries or answers with a non-success status
/// - [`DuffleError::IndexParseFailed`] when the body is not an index document
pub async fn read_repo_index(session: &DuffleSession, repository: &str) -> Result<RepoIndex> {
    let client = session.http_client()?;
    let url = index_url(&session.config().index_scheme, repository);
    tracing::debug!(target: "duffle::repo", "Fetching {}", url);

    let strategy = ExponentialBackoff::from_millis(50)
        .max_delay(Duration::from_secs(1))
        .take(FETCH_RETRIES);

    let body = RetryIf::spawn(strategy, || fetch_once(&client, &url), FetchError::is_transient)
        .await
        .map_err(|e| DuffleError::IndexFetchFailed {
            repository: repository.to_string(),
            reason: e.into_reason(),
        })?;

    let index: RepoIndex =
        serde_json::from_str(&body).map_err(|e| DuffleError::IndexParseFailed {
            repository: repository.to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!(
        target: "duffle::repo",
        "Repository {} lists {} bundle(s)",
        repository,
        index.len()
    );
    Ok(index)
}

/// Every (name, version) published by `repository`, tagged with it.
///
/// # Errors
///
/// See [`read_repo_index`].
pub async fn read_repo_bundles(session: &DuffleSession, repository: &str) -> Result<Vec<RepoBundle>> {
    Ok(read_repo_index(session, repository).await?.bundles(repository))
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(|e| {
        tracing::debug!(target: "duffle::repo", "Request to {} failed: {}", url, e);
        FetchError::Transient(e.to_string())
    })?;

    let status = response.status();
    if status.is_server_error() {
        tracing::debug!(target: "duffle::repo", "{} answered {}", url, status);
        return Err(FetchError::Transient(format!("HTTP {status}")));
    }
    if !status.is_success() {
        return Err(FetchError::Permanent(format!("HTTP {status}")));
    }

    response.text().await.map_err(|e| FetchError::Transient(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> (DuffleSession, String) {
        let session = DuffleSession::new(ExplorerConfig {
            index_scheme: "http".to_string(),
            ..Default::default()
        });
        let repository = server.uri().trim_start_matches("http://").to_string();
        (session, repository)
    }

    #[test]
    fn test_index_url() {
        assert_eq!(index_url("https", "hub.example.com"), "https://hub.example.com/index.json");
        assert_eq!(index_url("https", "hub.example.com/team/"), "https://hub.example.com/team/index.json");
    }

    #[tokio::test]
    async fn test_reads_and_flattens_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"hello": {"0.1.0": "sha256:aa", "latest": "sha256:aa"}, "ns/web": {"1.0.0": "sha256:bb"}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (session, repository) = session_for(&server);
        let bundles = read_repo_bundles(&session, &repository).await.unwrap();

        let names: Vec<_> = bundles.iter().map(|b| format!("{}:{}", b.name, b.version)).collect();
        assert_eq!(names, vec!["hello:0.1.0", "hello:latest", "ns/web:1.0.0"]);
        assert!(bundles.iter().all(|b| b.repository.as_deref() == Some(repository.as_str())));
    }

    #[tokio::test]
    async fn test_repository_with_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let (session, host) = session_for(&server);
        let index = read_repo_index(&session, &format!("{host}/team")).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let (session, repository) = session_for(&server);
        let err = read_repo_index(&session, &repository).await.unwrap_err();

        match err.downcast_ref::<DuffleError>() {
            Some(DuffleError::IndexFetchFailed {
                reason, ..
            }) => assert!(reason.contains("404")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1 + FETCH_RETRIES as u64)
            .mount(&server)
            .await;

        let (session, repository) = session_for(&server);
        let err = read_repo_index(&session, &repository).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DuffleError>(),
            Some(DuffleError::IndexFetchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_document_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["not", "an", "index"]"#))
            .mount(&server)
            .await;

        let (session, repository) = session_for(&server);
        let err = read_repo_index(&session, &repository).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DuffleError>(),
            Some(DuffleError::IndexParseFailed { .. })
        ));
    }
}
