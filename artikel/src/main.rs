use anyhow::Context;
use artikel_parser::{CrawlStatus, Crawler, START_URL};
use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

mod output;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, styles = CLAP_STYLING)]
struct Args {
    /// Recursion depth. If set to 1, every page linked from a found
    /// page is also parsed
    #[arg(short, long, default_value_t = 0)]
    depth: u32,

    /// How many pages to fetch concurrently
    #[arg(short = 'p', long, default_value_t = 1)]
    concurrency: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output filename, `-` writes to stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    // Ctrl-C stops admitting new fetches; whatever was collected is
    // still written out below.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let seed = Url::parse(START_URL).context("invalid start URL")?;
    let outcome = Crawler::new(seed)
        .parse_with_cancellation(args.depth, args.concurrency, cancel)
        .await?;

    let writer: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            File::create(&args.output)
                .with_context(|| format!("failed to create '{}'", args.output))?,
        )
    };
    output::write_csv(writer, &outcome.articles)?;

    if let CrawlStatus::Failed(err) = outcome.status {
        return Err(err.into());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
