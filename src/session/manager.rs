use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::migration::{self, Decoded};
use super::{is_valid_session_id, new_session_id, SessionPatch, SessionRecord};
use crate::error::{AppResult, StorageError, ValidationError};
use crate::storage::{keys, KeyValueStore};

/// Owns the current [`SessionRecord`] and keeps it in sync with storage.
///
/// Every mutation goes through [`SessionManager::update`] or
/// [`SessionManager::reset`], is persisted before it is published, and is
/// broadcast to [`SessionManager::subscribe`] receivers.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionRecord>,
    write_lock: Mutex<()>,
}

impl SessionManager {
    /// Restore the session from `store`, or start a new one.
    ///
    /// Absent, corrupt and unsupported records are replaced by a fresh
    /// record. Upgraded records are written back immediately.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let record = Self::restore(store.as_ref()).await?;
        let (state, _) = watch::channel(record);
        Ok(Self {
            store,
            state,
            write_lock: Mutex::new(()),
        })
    }

    /// Re-read the persisted record, replacing the in-memory copy.
    pub async fn reload(&self) -> AppResult<SessionRecord> {
        let _guard = self.write_lock.lock().await;
        let record = Self::restore(self.store.as_ref()).await?;
        self.state.send_replace(record.clone());
        Ok(record)
    }

    async fn restore(store: &dyn KeyValueStore) -> AppResult<SessionRecord> {
        let raw = store.get(keys::SESSION).await?;

        let (mut record, dirty) = match raw {
            None => {
                debug!("No persisted session, starting fresh");
                (SessionRecord::default(), true)
            }
            Some(raw) => match migration::decode(&raw) {
                Ok(Decoded {
                    record,
                    upgraded_from: None,
                }) => (record, false),
                Ok(Decoded {
                    record,
                    upgraded_from: Some(version),
                }) => {
                    info!(
                        from_version = version,
                        to_version = record.schema_version,
                        "Upgraded persisted session"
                    );
                    (record, true)
                }
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable session, starting fresh");
                    (SessionRecord::default(), true)
                }
            },
        };

        let dirty = if !is_valid_session_id(&record.session_id) {
            if !record.session_id.trim().is_empty() {
                warn!(
                    session_id = %record.session_id,
                    "Replacing malformed session id"
                );
            }
            record.session_id = new_session_id();
            true
        } else {
            dirty
        };

        for stage in record.lattice_violations() {
            warn!(
                session_id = %record.session_id,
                stage = %stage,
                "Restored session has a stage complete before its prerequisite"
            );
        }

        if dirty {
            persist(store, &record).await?;
        }

        info!(session_id = %record.session_id, "Session loaded");
        Ok(record)
    }

    /// Snapshot of the current record.
    pub fn get(&self) -> SessionRecord {
        self.state.borrow().clone()
    }

    /// Receiver notified after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<SessionRecord> {
        self.state.subscribe()
    }

    /// Shallow-merge `patch` into the record and persist it.
    ///
    /// On any error the in-memory record is left unchanged.
    pub async fn update(&self, patch: SessionPatch) -> AppResult<SessionRecord> {
        self.update_with(|_| patch).await
    }

    /// Record a single answer, keeping the other answers.
    pub async fn set_answer(
        &self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> AppResult<SessionRecord> {
        let (question, answer) = (question.into(), answer.into());
        self.update_with(|current| {
            let mut answers = current.answers.clone();
            answers.insert(question, answer);
            SessionPatch::new().with_answers(answers)
        })
        .await
    }

    /// Build a patch from the current record and apply it, all under the
    /// write lock.
    async fn update_with(
        &self,
        build: impl FnOnce(&SessionRecord) -> SessionPatch,
    ) -> AppResult<SessionRecord> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.get();
        let patch = build(&next);
        next.apply(patch)?;
        persist(self.store.as_ref(), &next).await?;

        debug!(
            session_id = %next.session_id,
            cv_uploaded = next.cv_uploaded,
            analysis_complete = next.analysis_complete,
            questions_generated = next.questions_generated,
            enhancement_complete = next.enhancement_complete,
            "Session updated"
        );

        self.state.send_replace(next.clone());
        Ok(next)
    }

    /// Discard all progress and start over under a new session id.
    pub async fn reset(&self, confirmed: bool) -> AppResult<SessionRecord> {
        if !confirmed {
            return Err(ValidationError::ResetNotConfirmed.into());
        }

        let _guard = self.write_lock.lock().await;
        let previous = self.get().session_id;

        let mut fresh = SessionRecord::new();
        while fresh.session_id == previous {
            fresh.session_id = new_session_id();
        }

        persist(self.store.as_ref(), &fresh).await?;
        info!(
            previous_session_id = %previous,
            session_id = %fresh.session_id,
            "Session reset"
        );

        self.state.send_replace(fresh.clone());
        Ok(fresh)
    }
}

async fn persist(store: &dyn KeyValueStore, record: &SessionRecord) -> AppResult<()> {
    let json = serde_json::to_string(record).map_err(|e| StorageError::Serialization {
        key: keys::SESSION.to_string(),
        message: e.to_string(),
    })?;
    store.set(keys::SESSION, &json).await?;
    Ok(())
}
