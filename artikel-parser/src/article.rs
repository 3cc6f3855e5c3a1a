use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use url::Url;

/// One parsed article page. Field renames give the export its
/// `Link,Published,Title,Preamble,Summary` column header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "Link")]
    pub url: Url,
    #[serde(rename = "Published")]
    pub published_at: Option<NaiveDateTime>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Preamble")]
    pub preamble: String,
    #[serde(rename = "Summary")]
    pub summary: Option<String>,
    /// Hops from the seed page, seed = 0. Not exported.
    #[serde(skip)]
    pub depth: i64,
}

impl Article {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            published_at: None,
            title: String::new(),
            preamble: String::new(),
            summary: None,
            depth: 0,
        }
    }
}
