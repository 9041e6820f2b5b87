mod args;
mod driver;

use clap::Parser;

use args::CliArgs;

fn main() -> anyhow::Result<()> {
    // QUICKLENS_LOG=debug (or finer, per target) enables tracing output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("QUICKLENS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    driver::run(&args)
}
