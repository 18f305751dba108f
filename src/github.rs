use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::config::GitHubConfig;
use crate::error::{GfiError, Result};
use crate::ratelimit;
use crate::types::{Issue, SearchIssuesResponse, SearchPage};

const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.text-match+json";
const DEFAULT_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Parameters of a single issue search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery<'a> {
    pub query: &'a str,
    pub sort: &'a str,
    pub order: &'a str,
    pub text_match: bool,
}

/// Issue search against a remote tracker.
///
/// Implementations wait out rate limiting themselves: a caller only ever
/// sees a page or a non-rate-limit failure.
#[async_trait]
pub trait IssueSearch: Send + Sync + std::fmt::Debug {
    async fn search_issues(&self, query: &SearchQuery<'_>) -> Result<SearchPage>;
}

pub struct GitHub {
    client: reqwest::Client,
    api_url: String,
    max_wait: Option<Duration>,
    fallback_wait: Duration,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for GfiError {
    fn from(err: reqwest::Error) -> Self {
        GfiError::Search(err.to_string())
    }
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        Self::with_token(config, config.token())
    }

    pub fn with_token(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| GfiError::Client(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("gfi/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| GfiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            max_wait: config.max_rate_limit_wait(),
            fallback_wait: config.rate_limit_fallback(),
        })
    }

    async fn send_search(&self, query: &SearchQuery<'_>) -> Result<reqwest::Response> {
        let accept = if query.text_match {
            TEXT_MATCH_MEDIA_TYPE
        } else {
            DEFAULT_MEDIA_TYPE
        };

        let response = self
            .client
            .get(format!("{}/search/issues", self.api_url))
            .header(ACCEPT, accept)
            .query(&[
                ("q", query.query),
                ("sort", query.sort),
                ("order", query.order),
            ])
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl IssueSearch for GitHub {
    async fn search_issues(&self, query: &SearchQuery<'_>) -> Result<SearchPage> {
        // The body decides whether a 403 is a secondary limit, so it is read
        // before the retry decision.
        let (status, text) = loop {
            let response = self.send_search(query).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let text = response.text().await?;

            let Some(wait) = ratelimit::retry_delay(
                status,
                &headers,
                &text,
                chrono::Utc::now(),
                self.fallback_wait,
            ) else {
                break (status, text);
            };

            if let Some(max) = self.max_wait {
                if wait > max {
                    return Err(GfiError::Search(format!(
                        "rate limited for {}s, longer than the configured {}s limit",
                        wait.as_secs(),
                        max.as_secs()
                    )));
                }
            }

            tracing::warn!(
                status = status.as_u16(),
                wait_secs = wait.as_secs(),
                "rate limited by GitHub, waiting before retrying"
            );
            tokio::time::sleep(wait).await;
        };

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(GfiError::Search(format!("{}: {}", status, message)));
        }

        let body: SearchIssuesResponse = serde_json::from_str(&text)
            .map_err(|e| GfiError::Search(format!("invalid response body: {}", e)))?;
        if body.incomplete_results {
            tracing::debug!("search results are incomplete");
        }

        Ok(SearchPage {
            status: status.as_u16(),
            total_count: body.total_count,
            items: body.items.into_iter().map(Issue::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY: SearchQuery<'static> = SearchQuery {
        query: "language:go is:issue",
        sort: "reactions",
        order: "desc",
        text_match: true,
    };

    fn config(server: &MockServer) -> GitHubConfig {
        GitHubConfig {
            api_url: server.uri(),
            token_env: None,
            rate_limit_fallback_secs: 0,
            ..GitHubConfig::default()
        }
    }

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {
                    "number": 1,
                    "title": "A",
                    "reactions": {"total_count": 5},
                    "labels": [{"name": "bug"}],
                    "repository_url": "https://api.github.com/repos/acme/widgets"
                },
                {
                    "number": 2,
                    "title": "B",
                    "reactions": {"total_count": 0},
                    "labels": [],
                    "repository_url": "https://api.github.com/repos/acme/gadgets"
                }
            ]
        })
    }

    #[tokio::test]
    async fn search_sends_query_and_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "language:go is:issue"))
            .and(query_param("sort", "reactions"))
            .and(query_param("order", "desc"))
            .and(header("accept", TEXT_MATCH_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let page = github.search_issues(&QUERY).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "A");
        assert_eq!(page.items[0].repository, "acme/widgets");
        assert_eq!(page.items[1].number, 2);
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let github =
            GitHub::with_token(&config(&server), Some("s3cret".to_string())).unwrap();
        assert!(github.search_issues(&QUERY).await.is_ok());
    }

    #[tokio::test]
    async fn secondary_rate_limit_is_waited_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("retry-after", "0")
                    .set_body_json(serde_json::json!({
                        "message": "You have exceeded a secondary rate limit."
                    })),
            )
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let page = github.search_issues(&QUERY).await.unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn headerless_secondary_rate_limit_is_waited_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "You have exceeded a secondary rate limit. Please wait a few minutes before you try again.",
                "documentation_url": "https://docs.github.com/rest/overview/rate-limits-for-the-rest-api#about-secondary-rate-limits"
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let page = github.search_issues(&QUERY).await.unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn headerless_secondary_limit_respects_the_wait_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "You have exceeded a secondary rate limit."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = config(&server);
        cfg.rate_limit_fallback_secs = 60;
        cfg.max_rate_limit_wait_secs = Some(10);
        let github = GitHub::new(&cfg).unwrap();

        let err = github.search_issues(&QUERY).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to search issues: rate limited for 60s, longer than the configured 10s limit"
        );
    }

    #[tokio::test]
    async fn rate_limit_longer_than_limit_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3600"))
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = config(&server);
        cfg.max_rate_limit_wait_secs = Some(60);
        let github = GitHub::new(&cfg).unwrap();

        let err = github.search_issues(&QUERY).await.unwrap_err();
        assert!(matches!(err, GfiError::Search(_)));
        assert!(err.to_string().contains("3600s"));
    }

    #[tokio::test]
    async fn error_status_carries_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Validation Failed"
            })))
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let err = github.search_issues(&QUERY).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to search issues: 422 Unprocessable Entity: Validation Failed"
        );
    }

    #[tokio::test]
    async fn plain_forbidden_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
            .expect(1)
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let err = github.search_issues(&QUERY).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to search issues: 403 Forbidden: nope");
    }

    #[tokio::test]
    async fn malformed_body_is_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let github = GitHub::new(&config(&server)).unwrap();
        let err = github.search_issues(&QUERY).await.unwrap_err();
        assert!(matches!(err, GfiError::Search(_)));
    }

    #[test]
    fn unusable_token_fails_client_construction() {
        let err = GitHub::with_token(&GitHubConfig::default(), Some("bad\ntoken".to_string()))
            .unwrap_err();
        assert!(matches!(err, GfiError::Client(_)));
        assert!(err
            .to_string()
            .starts_with("failed to create GitHub client: invalid token"));
    }
}
