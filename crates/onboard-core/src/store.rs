//! Answer storage.
//!
//! Two lifetimes are involved. [`OnboardingStore`] holds the answers of one
//! in-progress session and lives only as long as the flow controller that
//! owns it. Once the last step is confirmed the answers move into a
//! [`HandoffStore`], a single durable slot that the signup step reads and
//! clears after a successful registration.
//!
//! The durable slot is backed by redb: one `HANDOFF` table, keyed by
//! [`paths::HANDOFF_KEY`], holding a JSON-encoded [`HandoffRecord`].

use crate::answers::OnboardingAnswers;
use crate::error::{OnboardError, Result};
use crate::paths;
use chrono::{DateTime, Utc};
use redb::{Database, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OnboardingStore
// ---------------------------------------------------------------------------

/// Transient answer set for one onboarding session.
#[derive(Debug, Clone)]
pub struct OnboardingStore {
    session: Uuid,
    answers: OnboardingAnswers,
}

impl OnboardingStore {
    pub fn new() -> Self {
        Self::with_answers(OnboardingAnswers::new())
    }

    /// Resume a session from previously collected answers.
    pub fn with_answers(answers: OnboardingAnswers) -> Self {
        Self {
            session: Uuid::new_v4(),
            answers,
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn answers(&self) -> &OnboardingAnswers {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut OnboardingAnswers {
        &mut self.answers
    }

    /// Move the answers out, leaving the store empty.
    pub fn take(&mut self) -> OnboardingAnswers {
        std::mem::take(&mut self.answers)
    }
}

impl Default for OnboardingStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// HandoffRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRecord {
    pub session: Uuid,
    pub saved_at: DateTime<Utc>,
    pub data: OnboardingAnswers,
}

impl HandoffRecord {
    pub fn new(session: Uuid, data: OnboardingAnswers) -> Self {
        Self {
            session,
            saved_at: Utc::now(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// HandoffStore
// ---------------------------------------------------------------------------

/// Single-slot durable storage between onboarding and signup. Saving
/// overwrites whatever record was there.
pub trait HandoffStore {
    fn save(&self, record: &HandoffRecord) -> Result<()>;
    fn load(&self) -> Result<Option<HandoffRecord>>;
    /// Remove the record. Returns true if one was present.
    fn clear(&self) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// RedbHandoffStore
// ---------------------------------------------------------------------------

/// Key: [`paths::HANDOFF_KEY`]
/// Value: JSON-encoded HandoffRecord
const HANDOFF: TableDefinition<&str, &[u8]> = TableDefinition::new("handoff");

fn db_err(e: impl std::fmt::Display) -> OnboardError {
    OnboardError::Store(e.to_string())
}

pub struct RedbHandoffStore {
    db: Database,
}

impl RedbHandoffStore {
    /// Open or create the database at `path`, creating the table if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(HANDOFF).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }
}

impl HandoffStore for RedbHandoffStore {
    fn save(&self, record: &HandoffRecord) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(HANDOFF).map_err(db_err)?;
            table
                .insert(paths::HANDOFF_KEY, value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<HandoffRecord>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(HANDOFF).map_err(db_err)?;
        let Some(guard) = table.get(paths::HANDOFF_KEY).map_err(db_err)? else {
            return Ok(None);
        };
        let record: HandoffRecord = serde_json::from_slice(guard.value())?;
        Ok(Some(record))
    }

    fn clear(&self) -> Result<bool> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let removed = {
            let mut table = wt.open_table(HANDOFF).map_err(db_err)?;
            let old = table.remove(paths::HANDOFF_KEY).map_err(db_err)?;
            old.is_some()
        };
        wt.commit().map_err(db_err)?;
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// MemoryHandoffStore
// ---------------------------------------------------------------------------

/// In-process slot for callers that do not persist across runs.
#[derive(Debug, Default)]
pub struct MemoryHandoffStore {
    slot: Mutex<Option<HandoffRecord>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<HandoffRecord>>> {
        self.slot.lock().map_err(db_err)
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn save(&self, record: &HandoffRecord) -> Result<()> {
        *self.lock()? = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<HandoffRecord>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self.lock()?.take().is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
