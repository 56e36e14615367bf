//! Storage layer for pmstore
//!
//! Each agent owns an isolated SQLite file named `NNN-name.db` under the
//! agents directory. A handle is opened per call and closed on drop; nothing
//! is kept between calls, so agents never share a lock or a connection.

pub mod database;
pub mod resolver;

use crate::config::StorageConfig;
use crate::error::{PmError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use database::{count_events, find_by_log, list_events, EventRecord, StoreHandle};
pub use resolver::{AgentLocationResolver, LocationResolver, LOCAL_AGENT_NAME};

/// Opens (creating if absent) the store that belongs to one agent
pub trait StoreOpener: Send + Sync {
    fn open(&self, entity_id: u32, name: &str) -> Result<StoreHandle>;
}

/// File-backed agent stores
#[derive(Debug, Clone)]
pub struct AgentStores {
    agents_dir: PathBuf,
    busy_timeout: Duration,
}

impl AgentStores {
    pub fn new(agents_dir: PathBuf, busy_timeout: Duration) -> Self {
        Self {
            agents_dir,
            busy_timeout,
        }
    }

    /// Build from the `[storage]` configuration section, paths already expanded
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.agents_dir.clone(),
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    /// Path of the store file for an agent
    pub fn store_path(&self, entity_id: u32, name: &str) -> PathBuf {
        self.agents_dir.join(format!("{:03}-{}.db", entity_id, name))
    }

    fn unavailable(entity_id: u32, name: &str, reason: impl Into<String>) -> PmError {
        PmError::StoreUnavailable {
            entity_id,
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn check_name(entity_id: u32, name: &str) -> Result<()> {
        if name.is_empty()
            || name.contains(['/', '\\', '\0'])
            || name.contains("..")
        {
            return Err(Self::unavailable(
                entity_id,
                name,
                "agent name is not usable as a file name",
            ));
        }
        Ok(())
    }
}

impl StoreOpener for AgentStores {
    fn open(&self, entity_id: u32, name: &str) -> Result<StoreHandle> {
        Self::check_name(entity_id, name)?;
        let path = self.store_path(entity_id, name);

        std::fs::create_dir_all(&self.agents_dir).map_err(|e| {
            Self::unavailable(
                entity_id,
                name,
                format!("cannot create {}: {}", self.agents_dir.display(), e),
            )
        })?;

        tracing::debug!("Opening agent store {}", path.display());

        let mut conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| Self::unavailable(entity_id, name, e.to_string()))?;

        database::configure(&conn, self.busy_timeout)
            .map_err(|e| Self::unavailable(entity_id, name, e.to_string()))?;
        database::migrate(&mut conn)
            .map_err(|e| Self::unavailable(entity_id, name, e.to_string()))?;

        Ok(conn)
    }
}
