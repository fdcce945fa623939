mod app;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use pmrview::config::Config;
use pmrview::sort::SortOption;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pmrview")]
#[command(about = "Browse workspaces and exposures of the Physiome Model Repository")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./pmrview.yaml or $XDG_CONFIG_HOME/pmrview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List workspaces
  Workspaces {
    /// FIELD-DIRECTION, e.g. description-asc, id-desc, date-desc
    #[arg(short, long, default_value_t = SortOption::default())]
    sort: SortOption,
    /// Ignore the cached listing
    #[arg(short, long)]
    refresh: bool,
  },
  /// Show a workspace directory or file at a commit
  Workspace {
    alias: String,
    /// Commit id; the latest commit when omitted
    commit: Option<String>,
    #[arg(default_value = "")]
    path: String,
  },
  /// Print a raw workspace file
  File {
    alias: String,
    commit: String,
    path: String,
    /// Render Markdown files to HTML
    #[arg(long)]
    render: bool,
  },
  /// List exposures
  Exposures {
    #[arg(short, long, default_value_t = SortOption::default())]
    sort: SortOption,
    #[arg(short, long)]
    refresh: bool,
  },
  /// Show an exposure and its files
  Exposure { alias: String },
  /// Show the views available for an exposure file
  ExposureFile { alias: String, file: String },
  /// Print the HTML of an exposure file view
  View {
    exposure_id: i64,
    file_id: i64,
    view_key: String,
    #[arg(default_value = "")]
    path: String,
    /// Print the unprocessed view content
    #[arg(long)]
    raw: bool,
  },
  /// Browse the search indexes
  Search {
    /// Index kind, e.g. cellml_keyword
    kind: Option<String>,
    term: Option<String>,
    #[arg(short, long)]
    refresh: bool,
  },
  /// Sign in (password read from PMRVIEW_PASSWORD)
  Login { user: String },
  /// Sign out
  Logout,
  /// Show or dismiss the site notice
  Notice {
    /// Hide the notice for this many days
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    dismiss: Option<i64>,
  },
  /// Run commands interactively, keeping caches between them
  Shell,
}

/// One line typed at the interactive prompt.
#[derive(Parser, Debug)]
#[command(name = "pmrview", no_binary_name = true)]
pub struct ShellLine {
  #[command(subcommand)]
  pub command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Held until exit so buffered log lines are flushed
  let _log_guard = pmrview::logging::init_tracing()?;

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let app = app::App::new(config)?;
  match args.command {
    Command::Shell => app.shell().await?,
    command => app.run(command).await?,
  }

  Ok(())
}
