//! Batch geocoding driver.
//!
//! Reads a CSV of raw addresses, resolves each through the shared cascade
//! with a bounded worker pool, and writes the row-level geocode output, a
//! not-found listing, and the persisted address cache. A failed address
//! never aborts the batch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tamarack::resolver::Resolver;
use tamarack::Config;

/// Column names probed, in order, when `--address-column` is not given.
const ADDRESS_COLUMNS: &[&str] = &["address", "raw_address", "stop_address", "location"];

#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(about = "Geocode a CSV of raw addresses")]
struct Args {
    /// Input CSV with one address per row
    #[arg(short, long)]
    input: PathBuf,

    /// Row-level geocode output
    #[arg(short, long, default_value = "data_geocode.csv")]
    output: PathBuf,

    /// Listing of addresses without usable coordinates
    #[arg(long, default_value = "addresses_not_found.csv")]
    not_found: PathBuf,

    /// Run summary (counts plus the not-found list)
    #[arg(long, default_value = "geocode_summary.txt")]
    summary: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persisted address cache (read at start, rewritten at end); falls
    /// back to the configured path, then to geocode_address_cache.csv
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Skip reading and writing the persisted cache
    #[arg(long)]
    no_cache: bool,

    /// Known-bad-address rewrite table
    #[arg(long)]
    bad_addresses: Option<PathBuf>,

    /// Concurrent resolutions
    #[arg(long)]
    workers: Option<usize>,

    /// Address column name (autodetected when omitted)
    #[arg(long)]
    address_column: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Tamarack batch geocoder");
    info!("Input: {}", args.input.display());

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::from_env(),
    };
    if let Some(path) = &args.bad_addresses {
        config.resolver.bad_address_path = Some(path.display().to_string());
    }
    let workers = args.workers.unwrap_or(config.resolver.workers).max(1);
    let cache_path = args
        .cache
        .clone()
        .or_else(|| config.resolver.cache_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("geocode_address_cache.csv"));

    let resolver = Arc::new(Resolver::new(&config)?);
    if !args.no_cache {
        match resolver.load_persisted_cache(&cache_path) {
            Ok(count) => info!("Cache entries loaded: {}", count),
            Err(err) => warn!(%err, "could not load persisted cache; starting cold"),
        }
    }

    // Read the whole input up front; batches are small enough (tens of
    // thousands of rows) that streaming buys nothing here.
    let mut reader = csv::Reader::from_path(&args.input)
        .with_context(|| format!("Failed to open input: {}", args.input.display()))?;
    let headers = reader.headers()?.clone();
    let address_idx = find_address_column(&headers, args.address_column.as_deref())?;
    info!(
        "Address column: {:?}",
        headers.get(address_idx).unwrap_or("")
    );

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<std::result::Result<_, _>>()
        .context("Failed to read input rows")?;
    let total = rows.len();
    info!("Processing {} rows with {} workers...", total, workers);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut results: Vec<(usize, csv::StringRecord, Arc<tamarack::Resolution>)> =
        Vec::with_capacity(total);
    {
        let mut in_flight = stream::iter(rows.into_iter().enumerate())
            .map(|(index, record)| {
                let resolver = resolver.clone();
                async move {
                    let address = record.get(address_idx).unwrap_or("").to_string();
                    let resolution = resolver.resolve(&address).await;
                    (index, record, resolution)
                }
            })
            .buffer_unordered(workers);

        while let Some(result) = in_flight.next().await {
            pb.inc(1);
            results.push(result);
        }
    }
    pb.finish();
    results.sort_by_key(|(index, _, _)| *index);

    // Row-level output: input columns plus the resolution columns.
    let mut output = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to write output: {}", args.output.display()))?;
    let mut output_headers = headers.clone();
    for extra in ["latitude", "longitude", "geocode_method", "geocode_error"] {
        output_headers.push_field(extra);
    }
    output.write_record(&output_headers)?;

    let mut not_found = csv::Writer::from_path(&args.not_found)
        .with_context(|| format!("Failed to write not-found list: {}", args.not_found.display()))?;
    not_found.write_record(["raw_address", "error"])?;

    let mut found_count = 0usize;
    let mut failures: Vec<(String, String)> = Vec::new();
    for (_, record, resolution) in &results {
        let mut row = record.clone();
        row.push_field(resolution.latitude.as_deref().unwrap_or(""));
        row.push_field(resolution.longitude.as_deref().unwrap_or(""));
        row.push_field(&resolution.method);
        row.push_field(resolution.error.as_deref().unwrap_or(""));
        output.write_record(&row)?;

        if resolution.found() {
            found_count += 1;
        } else {
            not_found.write_record([
                resolution.raw_address.as_str(),
                resolution.error.as_deref().unwrap_or(""),
            ])?;
            failures.push((
                resolution.raw_address.clone(),
                resolution.error.clone().unwrap_or_default(),
            ));
        }
    }
    output.flush()?;
    not_found.flush()?;

    let mut summary = format!(
        "Run: {}\nRows: {}\nGeocoded: {}\nAddresses not geocoded: {}\n",
        Utc::now().to_rfc3339(),
        total,
        found_count,
        failures.len()
    );
    for (address, error) in &failures {
        summary.push_str(&format!("  {address}  [{error}]\n"));
    }
    std::fs::write(&args.summary, summary)
        .with_context(|| format!("Failed to write summary: {}", args.summary.display()))?;

    if !args.no_cache {
        let saved = resolver.save_persisted_cache(&cache_path)?;
        info!("Cache entries saved: {}", saved);
    }

    info!(
        "Done: {} geocoded, {} not found, output {}",
        found_count,
        total - found_count,
        args.output.display()
    );
    Ok(())
}

/// Pick the address column: the explicit name when given, otherwise the
/// first known candidate present in the header row.
fn find_address_column(headers: &csv::StringRecord, explicit: Option<&str>) -> Result<usize> {
    if let Some(name) = explicit {
        return headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("Column '{}' not found in input", name));
    }
    for candidate in ADDRESS_COLUMNS {
        if let Some(index) = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(candidate))
        {
            return Ok(index);
        }
    }
    anyhow::bail!(
        "No address column found in input; expected one of {:?} or use --address-column",
        ADDRESS_COLUMNS
    )
}
