use crate::config::GitHubConfig;
use crate::error::GfiError;
use crate::github::{GitHub, IssueSearch, SearchQuery};
use crate::message::Message;

/// Open, unassigned, beginner-labelled Go issues created since 2023.
pub const ISSUE_QUERY: &str = "language:go is:issue is:public is:open no:assignee label:beginner,easy,first-timers-only,good-first-bug,good-first-issue,starter created:>2023-01-01";

pub const SEARCH: SearchQuery<'static> = SearchQuery {
    query: ISSUE_QUERY,
    sort: "reactions",
    order: "desc",
    text_match: true,
};

/// Build a client from config and run the search. Never fails: every
/// outcome is turned into a message for the state machine.
pub async fn run(config: &GitHubConfig) -> Message {
    match GitHub::new(config) {
        Ok(github) => fetch_issues(&github).await,
        Err(e) => {
            tracing::error!(error = %e, "could not build GitHub client");
            e.into()
        }
    }
}

pub async fn fetch_issues(search: &dyn IssueSearch) -> Message {
    tracing::info!("searching for issues");

    let page = match search.search_issues(&SEARCH).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(error = %e, "issue search failed");
            return e.into();
        }
    };

    if page.status != 200 {
        tracing::error!(status = page.status, "issue search returned unexpected status");
        return GfiError::UnexpectedStatus(page.status).into();
    }

    tracing::info!(
        returned = page.items.len(),
        total = page.total_count,
        "issue search finished"
    );
    if let Some(first) = page.items.first() {
        tracing::debug!(repository = %first.repository, "first issue");
    }

    Message::FetchSucceeded {
        issues: page.items,
        total: page.total_count,
    }
}
