use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use survey_core::model::{ParticipantId, Response, Session, Trial};

use crate::repository::{KeyValueStore, StorageError, keys};

/// Current persisted-schema version. Records carrying any other
/// version are rejected on load.
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted shape for a session.
///
/// This mirrors the domain `Session` so the store can serialize and
/// deserialize without leaking storage concerns into the domain layer.
/// The version field makes shape mismatches explicit instead of
/// trusting deserialization to succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub version: u32,
    pub started_at: DateTime<Utc>,
    pub trials: Vec<Trial>,
    pub cursor: usize,
    pub responses: Vec<Response>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            version: SCHEMA_VERSION,
            started_at: session.started_at(),
            trials: session.trials().to_vec(),
            cursor: session.cursor(),
            responses: session.responses().to_vec(),
        }
    }

    /// Convert the record back into a domain `Session`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the version is unknown
    /// or the record violates the session invariants.
    pub fn into_session(self) -> Result<Session, StorageError> {
        if self.version != SCHEMA_VERSION {
            return Err(StorageError::Serialization(format!(
                "unsupported session schema version: {}",
                self.version
            )));
        }
        Session::from_persisted(self.started_at, self.trials, self.cursor, self.responses)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Persisted shape for the "current user" slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub version: u32,
    pub id: ParticipantId,
}

impl ParticipantRecord {
    #[must_use]
    pub fn new(id: ParticipantId) -> Self {
        Self {
            version: SCHEMA_VERSION,
            id,
        }
    }
}

/// Typed facade over a key-value store for survey state.
///
/// Saves write the current-session slot, the per-identity slot, and
/// the current-user record; loads treat any decode failure as absence
/// of a session rather than an error.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Persist the full session under both the current slot and the
    /// participant's own slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on serialization or write failure. A
    /// partial write is possible; recovery tolerates it by validating
    /// on load.
    pub async fn save(
        &self,
        participant: &ParticipantId,
        session: &Session,
    ) -> Result<(), StorageError> {
        let record = SessionRecord::from_session(session);
        let payload = serde_json::to_string(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let user = serde_json::to_string(&ParticipantRecord::new(participant.clone()))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.kv.set(keys::CURRENT_SESSION, &payload).await?;
        self.kv
            .set(&keys::participant_session(participant), &payload)
            .await?;
        self.kv.set(keys::CURRENT_USER, &user).await?;
        Ok(())
    }

    /// Load the most recently active participant and session.
    ///
    /// Both current-state keys are read together; a missing key or a
    /// record that fails schema validation yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend read failures, never
    /// for malformed data.
    pub async fn load_current(&self) -> Result<Option<(ParticipantId, Session)>, StorageError> {
        let Some(user_raw) = self.kv.get(keys::CURRENT_USER).await? else {
            return Ok(None);
        };
        let Some(session_raw) = self.kv.get(keys::CURRENT_SESSION).await? else {
            return Ok(None);
        };

        let participant = match serde_json::from_str::<ParticipantRecord>(&user_raw) {
            Ok(record) if record.version == SCHEMA_VERSION => record.id,
            Ok(record) => {
                tracing::warn!(version = record.version, "discarding current-user record with unknown version");
                return Ok(None);
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed current-user record");
                return Ok(None);
            }
        };

        match Self::decode_session(&session_raw) {
            Some(session) => Ok(Some((participant, session))),
            None => Ok(None),
        }
    }

    /// Load the persisted session for a specific participant, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend read failures; a
    /// malformed record yields `None`.
    pub async fn load_for(
        &self,
        participant: &ParticipantId,
    ) -> Result<Option<Session>, StorageError> {
        let Some(raw) = self.kv.get(&keys::participant_session(participant)).await? else {
            return Ok(None);
        };
        Ok(Self::decode_session(&raw))
    }

    /// Remove every persisted key for the participant, including the
    /// shared current-state slots.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear_for(&self, participant: &ParticipantId) -> Result<(), StorageError> {
        self.kv
            .remove(&keys::participant_session(participant))
            .await?;
        self.kv.remove(keys::CURRENT_SESSION).await?;
        self.kv.remove(keys::CURRENT_USER).await?;
        Ok(())
    }

    fn decode_session(raw: &str) -> Option<Session> {
        let record = match serde_json::from_str::<SessionRecord>(raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed session record");
                return None;
            }
        };
        match record.into_session() {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "discarding invalid session record");
                None
            }
        }
    }
}
