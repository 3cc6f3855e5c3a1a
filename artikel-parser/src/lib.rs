pub mod article;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;

pub use article::Article;
pub use crawler::{CrawlOutcome, CrawlStatus, Crawler};
pub use error::ParseError;
pub use extract::{ArticleExtractor, Extract};
pub use fetch::{Fetch, HttpFetcher};

/// Seed of every crawl started by the CLI.
pub const START_URL: &str = "https://breakit.se";
