//! Process-wide rule tables with whole-table swaps.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::KeywordTables;
use crate::error::EngineResult;

static DEFAULT_TABLES: Lazy<Arc<KeywordTables>> = Lazy::new(|| Arc::new(KeywordTables::default()));

/// Built-in tables, created once per process.
pub fn default_tables() -> Arc<KeywordTables> {
    Arc::clone(&DEFAULT_TABLES)
}

/// Holds the active rule tables.
///
/// Readers take an `Arc` snapshot and keep using it for the whole call, so a
/// concurrent [`RuleStore::replace`] never exposes a half-updated rule set.
#[derive(Debug)]
pub struct RuleStore {
    current: RwLock<Arc<KeywordTables>>,
}

impl RuleStore {
    /// Create a store after validating `tables`.
    pub fn new(tables: KeywordTables) -> EngineResult<Self> {
        tables.validate()?;
        Ok(Self { current: RwLock::new(Arc::new(tables)) })
    }

    /// Create a store holding the built-in tables.
    pub fn with_defaults() -> Self {
        Self { current: RwLock::new(default_tables()) }
    }

    /// Create a store from a TOML rules file.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let tables = KeywordTables::load(path)?;
        tracing::info!(path = %path.display(), version = tables.version, "Loaded rule tables");
        Ok(Self { current: RwLock::new(Arc::new(tables)) })
    }

    /// Snapshot of the active tables.
    pub fn current(&self) -> Arc<KeywordTables> {
        Arc::clone(&self.current.read())
    }

    /// Validate `tables` and make them active, returning the previous set.
    ///
    /// On validation failure the active tables are left untouched.
    pub fn replace(&self, tables: KeywordTables) -> EngineResult<Arc<KeywordTables>> {
        tables.validate()?;
        let version = tables.version;
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(tables));
        tracing::info!(from = previous.version, to = version, "Swapped rule tables");
        Ok(previous)
    }

    /// Reload tables from a TOML file.
    pub fn reload(&self, path: &Path) -> EngineResult<Arc<KeywordTables>> {
        self.replace(KeywordTables::load(path)?)
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
