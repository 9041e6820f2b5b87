use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the quicklens binary.
#[derive(Parser, Debug)]
#[command(
    name = "quicklens",
    version,
    about = "Annotate a TypeScript file's functions with evaluated example calls"
)]
pub struct CliArgs {
    /// Source file to annotate.
    pub file: PathBuf,

    /// Emit annotations as JSON instead of text lines.
    #[arg(long)]
    pub json: bool,

    /// Seed the randomness provider for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
