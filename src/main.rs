mod caller;
mod cli;
mod error;
mod microhomology;
mod overlap;
mod pipeline;
mod record;
mod sam_input;
mod tag;
mod types;

use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = caller::CallerConfig {
        distance_threshold: args.distance,
        quality_mode: if args.strict_quality {
            microhomology::QualityMode::Strict
        } else {
            microhomology::QualityMode::Lenient
        },
    };

    let (records, ingest) = sam_input::read_alignments(&args.in_sam)?;
    let mut stats = pipeline::Stats::default();
    let results = pipeline::run(records, &config, args.threads as usize, &mut stats)?;

    let mut writer: BufWriter<Box<dyn Write>> = match &args.out_tsv {
        Some(path) => BufWriter::new(Box::new(File::create(path)?)),
        None => BufWriter::new(Box::new(std::io::stdout().lock())),
    };
    for result in &results {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            result.read_id, result.reference_id, result.position, result.csvtag
        )?;
    }
    writer.flush()?;

    tracing::info!(
        total_records = ingest.total_records,
        unmapped_records = ingest.unmapped_records,
        missing_cs_records = ingest.missing_cs_records,
        missing_seq_records = ingest.missing_seq_records,
        clusters = stats.clusters,
        failed_clusters = stats.failed_clusters,
        results = stats.results,
        "csvtag-rs: processing complete"
    );
    Ok(())
}
