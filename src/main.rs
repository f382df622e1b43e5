//! exradd CLI - add two OpenEXR images sample by sample.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exradd::{ChannelSelection, Config, Pipeline};

/// Add a reference OpenEXR image into a query image and write the sum.
///
/// Both images must have the same size and the same channels in the same order.
#[derive(Parser, Debug)]
#[command(name = "exradd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Query image path. Its samples are the left operand.
    #[arg(value_name = "QUERY")]
    query: PathBuf,

    /// Reference image path. Its samples are added to the query.
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Only accumulate this channel. Repeat to select several; defaults to all channels.
    #[arg(short, long = "channel", value_name = "NAME")]
    channels: Vec<String>,

    /// Accumulate on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("exradd={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let channels = if args.channels.is_empty() {
        ChannelSelection::All
    } else {
        ChannelSelection::Names(args.channels.clone())
    };

    let config = Config {
        channels,
        parallel: !args.sequential,
        ..Config::default()
    };

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    let summary = pipeline
        .process(&args.query, &args.reference, &args.output)
        .with_context(|| {
            format!(
                "Failed to add {} into {}",
                args.reference.display(),
                args.query.display()
            )
        })?;

    println!(
        "Wrote {} ({}x{}, {} of {} channels accumulated)",
        args.output.display(),
        summary.width,
        summary.height,
        summary.accumulated,
        summary.channels.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["exradd", "a.exr", "b.exr", "out.exr"]).unwrap();
        assert_eq!(args.query, PathBuf::from("a.exr"));
        assert_eq!(args.reference, PathBuf::from("b.exr"));
        assert_eq!(args.output, PathBuf::from("out.exr"));
        assert!(args.channels.is_empty());
        assert!(!args.sequential);
    }

    #[test]
    fn test_missing_output_is_rejected() {
        assert!(Args::try_parse_from(["exradd", "a.exr", "b.exr"]).is_err());
    }

    #[test]
    fn test_repeated_channel_flag() {
        let args =
            Args::try_parse_from(["exradd", "-c", "R", "--channel", "G", "a", "b", "c"]).unwrap();
        assert_eq!(args.channels, vec!["R", "G"]);
    }
}
