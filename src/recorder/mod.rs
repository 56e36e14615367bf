//! Policy monitoring event recorder
//!
//! Routes each finding to its agent store and applies the dedup policy:
//! a first occurrence is inserted with its compliance tags, a recurrence
//! only advances `date_last`.

mod report;

pub use report::{FailureReporter, TracingReporter};

use crate::config::Config;
use crate::error::{PmError, Result};
use crate::storage::database::{self, SQL_INSERT_PM, SQL_UPDATE_PM};
use crate::storage::{
    AgentLocationResolver, AgentStores, EventRecord, LocationResolver, StoreHandle, StoreOpener,
};
use crate::tags::ComplianceTagger;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Outcome of [`EventRecorder::observe_finding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "id", rename_all = "lowercase")]
pub enum Observation {
    /// First occurrence, new record id
    Inserted(i64),
    /// Recurrence of an existing record
    Recurred(i64),
}

impl Observation {
    pub fn id(&self) -> i64 {
        match self {
            Observation::Inserted(id) | Observation::Recurred(id) => *id,
        }
    }
}

/// Bare record id, the same form `record_finding` callers print
impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Writes policy monitoring findings into per-agent stores
///
/// Holds no per-call state. Every operation resolves the agent, opens
/// its store, runs one statement (or one transaction) and releases the
/// handle before returning, on success and failure alike.
pub struct EventRecorder {
    resolver: Arc<dyn LocationResolver>,
    stores: Arc<dyn StoreOpener>,
    reporter: Arc<dyn FailureReporter>,
    tagger: ComplianceTagger,
}

impl EventRecorder {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        stores: Arc<dyn StoreOpener>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self {
            resolver,
            stores,
            reporter,
            tagger: ComplianceTagger::default(),
        }
    }

    /// Recorder with the default collaborators, store paths already expanded
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(AgentLocationResolver),
            Arc::new(AgentStores::from_config(&config.storage)),
            Arc::new(TracingReporter),
        )
        .with_tagger(ComplianceTagger::from_config(&config.tags))
    }

    pub fn with_tagger(mut self, tagger: ComplianceTagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// Insert the first occurrence of a finding. Returns the new record id.
    ///
    /// Whether the line is new is the caller's call; use
    /// [`observe_finding`](Self::observe_finding) to have the store decide.
    pub fn record_finding(
        &self,
        entity_id: u32,
        location: &str,
        timestamp: i64,
        log: &str,
    ) -> Result<i64> {
        self.with_store(entity_id, location, |conn| {
            let mut stmt = conn.prepare(SQL_INSERT_PM)?;
            let tags = self.tagger.tag(log);
            stmt.execute(params![timestamp, timestamp, log, tags.pci_dss, tags.cis])?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Advance `date_last` of the finding whose log text matches exactly
    ///
    /// Succeeds whether or not a record matched.
    pub fn advance_last_seen(
        &self,
        entity_id: u32,
        location: &str,
        log: &str,
        timestamp: i64,
    ) -> Result<()> {
        self.with_store(entity_id, location, |conn| {
            let mut stmt = conn.prepare(SQL_UPDATE_PM)?;
            let updated = stmt.execute(params![timestamp, log])?;
            tracing::trace!(entity_id, updated, "Advanced last seen");
            Ok(())
        })
    }

    /// Insert or advance in one immediate transaction
    pub fn observe_finding(
        &self,
        entity_id: u32,
        location: &str,
        timestamp: i64,
        log: &str,
    ) -> Result<Observation> {
        self.with_store(entity_id, location, |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let observation = match database::find_by_log(&tx, log)? {
                Some(existing) => {
                    tx.execute(SQL_UPDATE_PM, params![timestamp, log])?;
                    Observation::Recurred(existing.id)
                }
                None => {
                    let tags = self.tagger.tag(log);
                    tx.execute(
                        SQL_INSERT_PM,
                        params![timestamp, timestamp, log, tags.pci_dss, tags.cis],
                    )?;
                    Observation::Inserted(tx.last_insert_rowid())
                }
            };

            tx.commit()?;
            Ok(observation)
        })
    }

    /// Exact-match lookup of a finding in an agent store
    pub fn lookup(&self, entity_id: u32, location: &str, log: &str) -> Result<Option<EventRecord>> {
        self.with_store(entity_id, location, |conn| {
            database::find_by_log(conn, log).map_err(PmError::into_read)
        })
    }

    /// Most recently seen findings of an agent
    pub fn recent(&self, entity_id: u32, location: &str, limit: usize) -> Result<Vec<EventRecord>> {
        self.with_store(entity_id, location, |conn| {
            database::list_events(conn, limit).map_err(PmError::into_read)
        })
    }

    fn open(&self, entity_id: u32, location: &str) -> Result<StoreHandle> {
        let name = self
            .resolver
            .resolve(location)
            .ok_or_else(|| PmError::Resolution {
                location: location.to_string(),
            })?;

        self.stores.open(entity_id, &name)
    }

    /// Run `op` against the agent store; the handle is closed before any report
    fn with_store<T>(
        &self,
        entity_id: u32,
        location: &str,
        op: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let result = self
            .open(entity_id, location)
            .and_then(|mut conn| op(&mut conn));

        if let Err(err) = &result {
            if let Some(kind) = err.kind() {
                self.reporter.report(entity_id, kind, &err.to_string());
            }
        }

        result
    }
}
