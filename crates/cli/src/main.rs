mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// wixgen - Compile declarative installer manifests to WiX source
#[derive(Parser)]
#[command(name = "wixgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Print machine readable JSON instead of text
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile a manifest into a .wxs document
  Build {
    /// Path to the manifest
    manifest: PathBuf,

    /// Output file (default: the manifest path with a .wxs extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the document to stdout instead of writing it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
  },

  /// Show the resolved directory tree, features and dialog navigation
  Inspect {
    /// Path to the manifest
    manifest: PathBuf,
  },

  /// List every identifier assigned during compilation
  Ids {
    /// Only show ids of this kind (Directory, File, Component, ...)
    #[arg(short, long)]
    kind: Option<String>,

    /// Path to the manifest
    manifest: PathBuf,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Build {
      manifest,
      output,
      stdout,
    } => cmd::cmd_build(&manifest, output.as_deref(), stdout, cli.json),
    Commands::Inspect { manifest } => cmd::cmd_inspect(&manifest, cli.verbose, cli.json),
    Commands::Ids { manifest, kind } => cmd::cmd_ids(&manifest, kind.as_deref(), cli.json),
  };

  if let Err(err) = result {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}
