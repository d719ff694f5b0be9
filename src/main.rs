use indication_resolver::{Pipeline, ResolverConfig, Result, SnapshotSource};
use indication_resolver::source::JsonSnapshotSource;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let snapshot_dir = args.next().map_or_else(|| PathBuf::from("snapshots"), PathBuf::from);
    let output_dir = args.next().map_or_else(|| PathBuf::from("output"), PathBuf::from);

    if !snapshot_dir.exists() {
        warn!("Snapshot directory not found: {}", snapshot_dir.display());
        return Ok(());
    }

    let source = JsonSnapshotSource::new(&snapshot_dir);
    info!(
        "Loading snapshots from {} ({})",
        snapshot_dir.display(),
        source.source_name()
    );
    let start = Instant::now();
    let snapshots = source.load()?;
    info!("Loaded {} snapshots in {:?}", snapshots.len(), start.elapsed());

    let config = ResolverConfig {
        show_progress: true,
        ..ResolverConfig::default()
    };
    let pipeline = Pipeline::new(config);

    let start = Instant::now();
    // no fallback segmenter wired in the CLI; marker-free clauses stay whole
    let output = pipeline.run(&snapshots, None).await?;
    info!("Pipeline finished in {:?}", start.elapsed());

    fs::create_dir_all(&output_dir)?;
    write_table(&output_dir, "clauses.json", &output.clauses)?;
    write_table(&output_dir, "segments.json", &output.segments)?;
    write_table(&output_dir, "dictionary.json", &output.dictionary)?;
    write_table(&output_dir, "intervals.json", &output.intervals)?;
    write_table(&output_dir, "report.json", &output.report)?;
    info!("Wrote output tables to {}", output_dir.display());

    Ok(())
}

fn write_table<T: serde::Serialize>(dir: &Path, name: &str, table: &T) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(table)
        .map_err(|e| indication_resolver::ResolverError::Validation(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}
