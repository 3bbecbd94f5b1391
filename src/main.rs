//! seomoz CLI - query Mozscape URL metrics.
//!
//! Run `seomoz --help` for usage information.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use seomoz::response::synthesize_url;
use seomoz::{Args, Config, MetricsMap, MozClient, UrlMetrics};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let args = Args::parse_args();
    setup_logging(&args);

    let config = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        println!("\n{}", style("DRY RUN MODE").yellow().bold());
        println!("Configuration validated successfully.\n");
        print_config_summary(&args, &config);
        return Ok(());
    }

    if args.verbose && !args.json_logs {
        print_config_summary(&args, &config);
    }

    let client = MozClient::new(config)?;

    info!(urls = args.urls.len(), cols = args.cols, "Starting query");

    let spinner = (!args.no_progress && !args.json_logs && !args.json)
        .then(|| start_spinner(args.urls.len()));
    let start = Instant::now();

    let result = if let [link] = args.urls.as_slice() {
        client
            .url_metrics(link, args.cols())
            .await
            .map(|m| MetricsMap::from([(link.clone(), m)]))
    } else {
        client.bulk_url_metrics(&args.urls, args.cols()).await
    };

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let metrics = match result {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Query failed: {}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    info!(
        results = metrics.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Query complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print_metrics(&args.urls, &metrics);
    }

    Ok(())
}

fn setup_logging(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("seomoz={level}")));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .init();
    }
}

fn start_spinner(urls: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Querying {urls} URL(s)..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One line per requested URL, in input order, duplicates printed once.
fn print_metrics(urls: &[String], metrics: &MetricsMap) {
    let mut seen = HashSet::new();
    for url in urls {
        if !seen.insert(url.as_str()) {
            continue;
        }
        if let Some(m) = metrics.get(url) {
            println!("{}", format_line(url, m));
        }
    }
}

/// Output line for one URL. Falls back to the requested URL when the API
/// left `uu` empty.
fn format_line(requested: &str, m: &UrlMetrics) -> String {
    let url = if m.url.is_empty() {
        synthesize_url(requested)
    } else {
        m.url.clone()
    };
    format!(
        "{url}\tLinks: {:.0}\tPage Authority: {:.0}\tDomain Authority: {:.0}",
        m.links, m.page_authority, m.domain_authority
    )
}

fn print_config_summary(args: &Args, config: &Config) {
    println!("{}", style("Configuration:").bold());
    println!("  Endpoint:       {}", config.endpoint);
    println!("  Access ID:      {}", config.credentials.access_id);
    println!("  Cols:           {}", args.cols);
    println!("  URLs:           {}", args.urls.len());
    println!("  Batch Size:     {}", config.request.max_batch_urls);
    match config.request.max_in_flight {
        Some(n) => println!("  Max In Flight:  {n}"),
        None => println!("  Max In Flight:  unbounded"),
    }
    println!("  Timeout:        {:?}", config.request.timeout);
    println!(
        "  Batch Calls:    {}",
        args.urls.len().div_ceil(config.request.max_batch_urls)
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(url: &str) -> UrlMetrics {
        UrlMetrics {
            url: url.to_string(),
            links: 5.0,
            page_authority: 21.4,
            domain_authority: 42.6,
            ..UrlMetrics::default()
        }
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("https://example.com", &metrics("example.com/")),
            "example.com/\tLinks: 5\tPage Authority: 21\tDomain Authority: 43"
        );
    }

    #[test]
    fn test_format_line_fills_missing_url() {
        let line = format_line("https://example.com/a?b=1", &metrics(""));
        assert!(line.starts_with("example.com/a?b=1\t"));

        let line = format_line("example.org/%zz", &metrics(""));
        assert!(line.starts_with("example.org/%zz\t"));
    }
}
