//! tracklog orchestration: settings, backend selection and dump ingestion.
//!
//! The `tracklog` binary wires these to a [`SqliteStore`] and the command
//! line.
//!
//! [`SqliteStore`]: tracklog_store_sqlite::SqliteStore

pub mod ingest;

use std::path::PathBuf;

use serde::Deserialize;
use tracklog_core::registry::LoggerRegistry;
use tracklog_store_sqlite::backends;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Settings read from `tracklog.toml` and `TRACKLOG_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub store_path: PathBuf,
  /// Restrict the registered backends to these tracker types.
  #[serde(default)]
  pub backends:   Option<Vec<String>>,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Build the logger registry from the bundled backends, honouring
/// [`Settings::backends`]. Naming a backend that is not bundled is an error.
pub fn build_registry(
  settings: &Settings,
) -> tracklog_core::Result<LoggerRegistry> {
  let bundled = backends::bundled();

  if let Some(wanted) = &settings.backends
    && let Some(unknown) = wanted
      .iter()
      .find(|w| !bundled.iter().any(|b| b.name() == w.as_str()))
  {
    return Err(tracklog_core::Error::UnknownLogger(unknown.clone()));
  }

  let mut registry = LoggerRegistry::new();
  for backend in bundled {
    let enabled = settings
      .backends
      .as_ref()
      .is_none_or(|wanted| wanted.iter().any(|w| w == backend.name()));
    if enabled {
      registry.register(backend)?;
    }
  }
  Ok(registry)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(backends: Option<&[&str]>) -> Settings {
    Settings {
      store_path: PathBuf::from(":memory:"),
      backends:   backends
        .map(|names| names.iter().map(|n| (*n).to_owned()).collect()),
    }
  }

  #[test]
  fn registers_every_bundled_backend_by_default() {
    let registry = build_registry(&settings(None)).unwrap();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, ["launchpad", "redmine", "sourceforge", "trac"]);
  }

  #[test]
  fn honours_backend_selection() {
    let registry = build_registry(&settings(Some(&["trac"]))).unwrap();
    assert!(registry.lookup("trac").is_ok());
    assert!(registry.lookup("launchpad").is_err());
  }

  #[test]
  fn rejects_unknown_backend_name() {
    let err = build_registry(&settings(Some(&["trac", "bugzilla"])))
      .unwrap_err();
    assert!(
      matches!(err, tracklog_core::Error::UnknownLogger(name) if name == "bugzilla")
    );
  }

  #[test]
  fn settings_deserialize_from_toml_source() {
    let cfg = config::Config::builder()
      .add_source(config::File::from_str(
        "store_path = \"/tmp/t.db\"\nbackends = [\"trac\"]",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let settings: Settings = cfg.try_deserialize().unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/t.db"));
    assert_eq!(settings.backends, Some(vec!["trac".to_owned()]));
  }
}
