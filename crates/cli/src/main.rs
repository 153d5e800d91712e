mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// solvm - soljson.js compiler version manager
#[derive(Parser)]
#[command(name = "solvm")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Storage root holding soljson.js and versions/ (overrides SOLVM_ROOT)
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download and verify a release into the version cache
  #[command(visible_alias = "d")]
  Download {
    /// Exact version (x.y.z) or 'latest'
    version: String,

    /// Re-download even if a verified copy is already cached
    #[arg(short, long)]
    force: bool,
  },

  /// Activate a downloaded version as soljson.js
  #[command(visible_alias = "u")]
  Use {
    /// Exact version (x.y.z) or 'newest'
    version: String,
  },

  /// List downloaded versions
  #[command(visible_alias = "ls")]
  List {
    /// List releases from the remote manifest instead
    #[arg(short, long)]
    remote: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Download the latest release and activate it
  Latest,

  /// Show which downloaded version is active
  Current {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Download { version, force } => cmd::cmd_download(&version, force, cli.root).await,
    Commands::Use { version } => cmd::cmd_use(&version, cli.root),
    Commands::List { remote, output } => cmd::cmd_list(remote, output, cli.root).await,
    Commands::Latest => cmd::cmd_latest(cli.root).await,
    Commands::Current { output } => cmd::cmd_current(output, cli.root),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<solvm_lib::Error>())
        .map_or(1, solvm_lib::Error::exit_code);
      ExitCode::from(code)
    }
  }
}
