use crate::article::Article;
use chrono::NaiveDateTime;
use scraper::{Html, Selector};
use url::Url;

/// Markup-to-structured-data step. Pure, no I/O: raw page bytes in,
/// at most one article record and the outbound article links out.
pub trait Extract: Send + Sync {
    fn extract(&self, source: &Url, body: &[u8]) -> (Option<Article>, Vec<Url>);
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extractor for the breakit.se article shape.
pub struct ArticleExtractor {
    title: Selector,
    preamble: Selector,
    body: Selector,
    date: Selector,
    links: Selector,
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self {
            title: Selector::parse(".article__title").unwrap(),
            preamble: Selector::parse(".article__preamble").unwrap(),
            body: Selector::parse(".article__body").unwrap(),
            date: Selector::parse(".article__date").unwrap(),
            links: Selector::parse("a[href]").unwrap(),
        }
    }

    fn extract_article(&self, source: &Url, document: &Html) -> Option<Article> {
        let title = select_text(document, &self.title);
        if title.is_empty() {
            // Not an article page (e.g. the front page).
            return None;
        }

        let mut article = Article::new(source.clone());
        article.title = title;
        article.preamble = select_text(document, &self.preamble);

        let summary = document
            .select(&self.body)
            .next()
            .map(|element| element.text().collect::<String>())
            .filter(|text| !text.is_empty());
        article.summary = summary;

        article.published_at = document
            .select(&self.date)
            .next()
            .and_then(|element| element.value().attr("datetime"))
            .and_then(|datetime| NaiveDateTime::parse_from_str(datetime, DATETIME_FORMAT).ok());

        Some(article)
    }

    fn extract_links(&self, source: &Url, document: &Html) -> Vec<Url> {
        document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| normalize_article_link(source, href))
            .collect()
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extract for ArticleExtractor {
    fn extract(&self, source: &Url, body: &[u8]) -> (Option<Article>, Vec<Url>) {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let article = self.extract_article(source, &document);
        let links = self.extract_links(source, &document);

        (article, links)
    }
}

fn select_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .collect()
}

/// Resolves an href against the page it was found on and keeps it only
/// if it points at an article on the same site. Scheme and host are
/// rewritten to the source's so relative and protocol-relative links
/// dedup to the same canonical string; fragments never reach the
/// visited set.
fn normalize_article_link(source: &Url, href: &str) -> Option<Url> {
    let mut link = source.join(href).ok()?;

    if !link.path().starts_with("/artikel/") {
        return None;
    }

    let same_site = matches!(link.host_str(), Some("breakit.se") | Some("www.breakit.se"))
        || link.host_str() == source.host_str();
    if !same_site {
        return None;
    }

    link.set_scheme(source.scheme()).ok()?;
    link.set_host(source.host_str()).ok()?;
    link.set_port(source.port()).ok()?;
    link.set_fragment(None);

    Some(link)
}
