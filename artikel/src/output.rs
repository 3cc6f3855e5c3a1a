use artikel_parser::Article;
use std::io::Write;

const HEADER: [&str; 5] = ["Link", "Published", "Title", "Preamble", "Summary"];

/// Writes one row per article. The header is written unconditionally
/// so an empty crawl still produces a valid CSV.
pub fn write_csv<W: Write>(writer: W, articles: &[Article]) -> anyhow::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for article in articles {
        csv_writer.serialize(article)?;
    }
    csv_writer.flush()?;

    Ok(())
}
