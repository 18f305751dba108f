use serde::Deserialize;

/// Issue returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub reactions: u64,
    /// Label names in server order. `None` marks a null label entry.
    pub labels: Vec<Option<String>>,
    pub repository: String,
}

impl Issue {
    /// Grid row: number, title, reaction count, joined labels
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.title.clone(),
            self.reactions.to_string(),
            join_labels(self.labels.iter().map(Option::as_deref)),
        ]
    }
}

/// One page of search results as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub status: u16,
    pub total_count: u64,
    pub items: Vec<Issue>,
}

/// Join present label names with ", ", skipping absent entries
pub fn join_labels<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    labels.into_iter().flatten().collect::<Vec<_>>().join(", ")
}

/// "owner/name" from an API repository URL such as
/// https://api.github.com/repos/owner/name
pub fn repository_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/repos/")?;
    let mut parts = rest.trim_end_matches('/').splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("{}/{}", owner, name))
}

// Wire format of GET /search/issues

#[derive(Debug, Deserialize)]
pub(crate) struct SearchIssuesResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub reactions: Option<Reactions>,
    #[serde(default)]
    pub labels: Vec<Option<LabelItem>>,
    #[serde(default)]
    pub repository_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reactions {
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelItem {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<SearchItem> for Issue {
    fn from(item: SearchItem) -> Self {
        Issue {
            number: item.number,
            title: item.title.unwrap_or_default(),
            reactions: item.reactions.map(|r| r.total_count).unwrap_or(0),
            labels: item
                .labels
                .into_iter()
                .map(|label| label.and_then(|l| l.name))
                .collect(),
            repository: item
                .repository_url
                .as_deref()
                .and_then(repository_from_url)
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}
