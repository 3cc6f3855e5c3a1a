use crate::article::Article;
use crate::error::{ParseError, Result};
use crate::extract::{ArticleExtractor, Extract};
use crate::fetch::{Fetch, HttpFetcher};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// How a crawl ended. Partial articles are kept in every case.
#[derive(Debug)]
pub enum CrawlStatus {
    /// Every admitted page was fetched and the tree quiesced.
    Completed,
    /// The caller's token fired; whatever was collected is returned.
    Cancelled,
    /// A fetch failed. First error wins; later ones are discarded.
    Failed(ParseError),
}

#[derive(Debug)]
pub struct CrawlOutcome {
    pub articles: Vec<Article>,
    pub status: CrawlStatus,
}

impl CrawlOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, CrawlStatus::Completed)
    }
}

/// Recursive article crawler.
///
/// The fetcher and extractor are swappable so tests can drive the
/// traversal with scripted pages instead of the network.
pub struct Crawler {
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<dyn Extract>,
    start_url: Url,
}

impl Crawler {
    pub fn new(start_url: Url) -> Self {
        Self {
            fetcher: Arc::new(HttpFetcher::new()),
            extractor: Arc::new(ArticleExtractor::new()),
            start_url,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extract>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Crawls from the seed, following article links `depth` hops out,
    /// with at most `concurrency` fetches in flight at once.
    pub async fn parse(&self, depth: u32, concurrency: usize) -> Result<CrawlOutcome> {
        self.parse_with_cancellation(depth, concurrency, CancellationToken::new())
            .await
    }

    /// Like [`Crawler::parse`], but stops admitting new fetches once
    /// `cancel` fires and returns the records collected so far.
    /// Cancellation is not an error.
    pub async fn parse_with_cancellation(
        &self,
        depth: u32,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome> {
        if concurrency < 1 {
            return Err(ParseError::Config(format!(
                "concurrency must be at least 1, got {concurrency}"
            )));
        }

        info!(
            "crawling {} with depth {} and concurrency {}",
            self.start_url, depth, concurrency
        );

        // Child token: a fatal error cancels the run's own branches
        // without cancelling the token the caller handed in.
        let run = cancel.child_token();
        let (events_tx, mut events_rx) = mpsc::channel(concurrency * 4);

        let walker = Arc::new(Walker {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            visited: Mutex::new(HashSet::new()),
            gate: Arc::new(Semaphore::new(concurrency)),
            events: events_tx,
            cancel: run.clone(),
        });

        walker.clone().spawn_visit(i64::from(depth), 0, self.start_url.clone());

        // The walker above was the coordinator's only reference; once
        // every spawned visit finishes, the last sender drops and the
        // channel closes. That is the quiescence signal.
        drop(walker);

        let mut articles = Vec::new();
        loop {
            tokio::select! {
                _ = run.cancelled() => {
                    info!("crawl cancelled after {} articles", articles.len());
                    return Ok(CrawlOutcome {
                        articles,
                        status: CrawlStatus::Cancelled,
                    });
                }
                event = events_rx.recv() => match event {
                    None => {
                        info!("crawl complete, {} articles", articles.len());
                        return Ok(CrawlOutcome {
                            articles,
                            status: CrawlStatus::Completed,
                        });
                    }
                    Some(Event::Article(article)) => articles.push(article),
                    Some(Event::Failed(err)) => {
                        warn!("crawl failed: {}", err);
                        // Stop the branches still in flight; dropping
                        // the receiver discards any later errors.
                        run.cancel();
                        return Ok(CrawlOutcome {
                            articles,
                            status: CrawlStatus::Failed(err),
                        });
                    }
                },
            }
        }
    }
}

enum Event {
    Article(Article),
    Failed(ParseError),
}

/// Per-run shared state, passed by `Arc` into every spawned visit.
struct Walker {
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<dyn Extract>,
    visited: Mutex<HashSet<String>>,
    gate: Arc<Semaphore>,
    events: mpsc::Sender<Event>,
    cancel: CancellationToken,
}

impl Walker {
    fn spawn_visit(self: Arc<Self>, depth_remaining: i64, distance: i64, url: Url) {
        tokio::spawn(async move {
            self.visit(depth_remaining, distance, url).await;
        });
    }

    /// Check-and-mark is a single `insert` under the lock, so two
    /// branches discovering the same URL race for one admission.
    async fn try_admit(&self, url: &Url) -> bool {
        self.visited.lock().await.insert(url.to_string())
    }

    async fn visit(self: &Arc<Self>, depth_remaining: i64, distance: i64, url: Url) {
        if depth_remaining < 0 {
            return;
        }

        if !self.try_admit(&url).await {
            return;
        }

        let permit = tokio::select! {
            _ = self.cancel.cancelled() => return,
            permit = self.gate.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        debug!("visiting {} at distance {}", url, distance);

        let body = tokio::select! {
            // Dropping the fetch future aborts the request in flight.
            _ = self.cancel.cancelled() => return,
            fetched = self.fetcher.fetch(&url) => match fetched {
                Ok(body) => body,
                Err(err) => {
                    drop(permit);
                    let _ = self.events.send(Event::Failed(err)).await;
                    return;
                }
            },
        };

        let (article, links) = self.extractor.extract(&url, &body);

        // The slot covers fetch+extract only. Children must not
        // inherit it, or the traversal degrades to sequential as the
        // tree deepens.
        drop(permit);

        if let Some(mut article) = article {
            article.depth = distance;
            if self.events.send(Event::Article(article)).await.is_err() {
                // Coordinator is gone; nothing left to do.
                return;
            }
        }

        for link in links {
            self.clone().spawn_visit(depth_remaining - 1, distance + 1, link);
        }
    }
}
