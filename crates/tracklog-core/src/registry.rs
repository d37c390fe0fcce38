//! Registry of issue-log backends keyed by tracker type.
//!
//! Built once while the application is composed and then passed by
//! reference to whatever drives the replay.

use std::{collections::BTreeMap, sync::Arc};

use crate::{Error, Result, backend::LogBackend};

#[derive(Default, Clone)]
pub struct LoggerRegistry {
  backends: BTreeMap<String, Arc<dyn LogBackend>>,
}

impl LoggerRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register `backend` under its [`LogBackend::name`].
  ///
  /// Fails if a backend with the same name is already registered.
  pub fn register(&mut self, backend: Arc<dyn LogBackend>) -> Result<()> {
    let name = backend.name();
    if self.backends.contains_key(name) {
      return Err(Error::DuplicateLogger(name.to_owned()));
    }
    self.backends.insert(name.to_owned(), backend);
    Ok(())
  }

  /// The backend registered for tracker type `name`.
  pub fn lookup(&self, name: &str) -> Result<Arc<dyn LogBackend>> {
    self
      .backends
      .get(name)
      .cloned()
      .ok_or_else(|| Error::UnknownLogger(name.to_owned()))
  }

  /// Registered tracker types, sorted.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.backends.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.backends.is_empty() }
}

impl std::fmt::Debug for LoggerRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_set().entries(self.backends.keys()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::snapshot::SnapshotField;

  struct Dummy(&'static str);

  impl LogBackend for Dummy {
    fn name(&self) -> &'static str { self.0 }

    fn table_name(&self) -> &'static str { "issues_log_dummy" }

    fn translate_field(&self, field: &str) -> Option<SnapshotField> {
      (field == "status").then_some(SnapshotField::Status)
    }

    fn schema_ddl(&self) -> String { String::new() }
  }

  #[test]
  fn lookup_registered_backend() {
    let mut registry = LoggerRegistry::new();
    registry.register(Arc::new(Dummy("trac"))).unwrap();

    let backend = registry.lookup("trac").unwrap();
    assert_eq!(backend.name(), "trac");
  }

  #[test]
  fn lookup_unknown_is_configuration_error() {
    let registry = LoggerRegistry::new();
    let err = registry.lookup("bugzilla").err().unwrap();
    assert!(matches!(err, Error::UnknownLogger(ref n) if n == "bugzilla"));
  }

  #[test]
  fn duplicate_registration_rejected() {
    let mut registry = LoggerRegistry::new();
    registry.register(Arc::new(Dummy("trac"))).unwrap();
    let err = registry.register(Arc::new(Dummy("trac"))).unwrap_err();
    assert!(matches!(err, Error::DuplicateLogger(_)));
  }

  #[test]
  fn names_are_sorted() {
    let mut registry = LoggerRegistry::new();
    registry.register(Arc::new(Dummy("trac"))).unwrap();
    registry.register(Arc::new(Dummy("launchpad"))).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), ["launchpad", "trac"]);
  }
}
