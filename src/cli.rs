use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "csvtag-rs",
    about = "Call annotated difference strings (CSVTAG) from cs-tagged SAM alignments",
    version
)]
pub struct Args {
    /// Input SAM with cs-tagged alignments
    pub in_sam: PathBuf,

    /// Output TSV path (defaults to stdout)
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub out_tsv: Option<PathBuf>,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Maximum gap between neighboring segments of an inversion triple
    #[arg(long = "distance", default_value_t = 50)]
    pub distance: u32,

    /// Require per-base quality agreement when sizing microhomology
    #[arg(long = "strict-quality")]
    pub strict_quality: bool,

    /// Suppress progress output and set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
