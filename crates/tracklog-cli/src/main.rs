//! tracklog binary.
//!
//! Reads `tracklog.toml` (or the path given with `--config`), opens the SQLite
//! store and runs one command against it.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracklog_cli::{Settings, build_registry, ingest};
use tracklog_core::store::TrackerStore;
use tracklog_store_sqlite::{IssueLogger, SqliteStore};

#[derive(Parser)]
#[command(author, version, about = "Issue tracker history logger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tracklog.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Upsert a JSON tracker dump into the store.
  Ingest {
    /// Path to the dump file.
    dump: PathBuf,
  },
  /// Replay the change history of a stored tracker into its log table.
  Log {
    /// URL of the tracker, as stored.
    url: String,
  },
  /// Remove a tracker's rows from its log table.
  TruncateLog { url: String },
  /// List the registered backends.
  Backends,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TRACKLOG"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise Settings")?;

  let registry =
    build_registry(&settings).context("invalid backend selection")?;

  if let Command::Backends = cli.command {
    for name in registry.names() {
      println!("{name}");
    }
    return Ok(());
  }

  let store_path = expand_tilde(&settings.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Ingest { dump: path } => {
      let raw = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {path:?}"))?;
      let dump = ingest::read_dump(raw)
        .with_context(|| format!("failed to parse {path:?}"))?;
      let report = ingest::ingest(&store, dump).await?;
      println!(
        "{}: {} issues, {} relationships ({} dangling)",
        report.tracker.url,
        report.issues,
        report.relationships,
        report.dangling
      );
    }
    Command::Log { url } => {
      let logger = logger(&store, &registry, &url).await?;
      let report = logger.generate_log().await.with_context(|| {
        format!(
          "replay of {url} failed; a tracker that was logged before needs \
           `tracklog truncate-log` first"
        )
      })?;
      println!(
        "{}: {} rows for {} issues",
        report.table, report.rows, report.issues
      );
    }
    Command::TruncateLog { url } => {
      let logger = logger(&store, &registry, &url).await?;
      let removed = logger.truncate_log().await?;
      println!("{}: {removed} rows removed", logger.table_name());
    }
    Command::Backends => {}
  }

  Ok(())
}

/// An [`IssueLogger`] for the stored tracker at `url`, using the backend
/// registered for its type.
async fn logger<'s>(
  store: &'s SqliteStore,
  registry: &tracklog_core::registry::LoggerRegistry,
  url: &str,
) -> anyhow::Result<IssueLogger<'s>> {
  let tracker = store
    .get_tracker(url)
    .await?
    .with_context(|| format!("no tracker stored for {url}"))?;
  let backend = registry
    .lookup(&tracker.kind)
    .with_context(|| format!("no backend for tracker type {:?}", tracker.kind))?;
  Ok(IssueLogger::new(store, backend, tracker))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
