//! Versioned decoding of persisted session records.
//!
//! Version history:
//! - v1: unversioned record (no `schemaVersion`, no timestamps)
//! - v2: adds `schemaVersion`, `createdAt`, `updatedAt`
//!
//! [`decode`] upgrades older records and rejects newer ones. Callers treat
//! every error as corrupt state and start a fresh record.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{SessionRecord, CURRENT_SCHEMA_VERSION};
use crate::error::MigrationError;

/// A decoded record and the version it was upgraded from, if any.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub record: SessionRecord,
    pub upgraded_from: Option<u32>,
}

/// Decode persisted JSON into a current-version record.
pub fn decode(raw: &str) -> Result<Decoded, MigrationError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(MigrationError::NotAnObject)?;

    let version = match object.get("schemaVersion") {
        None | Some(Value::Null) => 1,
        Some(v) => v.as_u64().ok_or_else(|| MigrationError::InvalidField {
            field: "schemaVersion".to_string(),
            message: format!("expected an unsigned integer, got {}", v),
        })?,
    };

    match version {
        1 => {
            let legacy: LegacyRecord = serde_json::from_value(value)?;
            Ok(Decoded {
                record: upgrade_v1(legacy),
                upgraded_from: Some(1),
            })
        }
        v if v == u64::from(CURRENT_SCHEMA_VERSION) => Ok(Decoded {
            record: serde_json::from_value(value)?,
            upgraded_from: None,
        }),
        found => Err(MigrationError::UnsupportedVersion {
            found,
            supported: CURRENT_SCHEMA_VERSION,
        }),
    }
}

/// v1 shape. Every field is optional; wrong types still fail.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyRecord {
    session_id: Option<String>,
    cv_uploaded: Option<bool>,
    analysis_complete: Option<bool>,
    questions_generated: Option<bool>,
    enhancement_complete: Option<bool>,
    cv_text: Option<String>,
    analysis_text: Option<String>,
    questions_text: Option<String>,
    enhanced_resume: Option<String>,
    answers: Option<BTreeMap<String, String>>,
}

fn upgrade_v1(legacy: LegacyRecord) -> SessionRecord {
    let now = Utc::now();
    SessionRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        session_id: legacy.session_id.unwrap_or_default(),
        cv_uploaded: legacy.cv_uploaded.unwrap_or(false),
        analysis_complete: legacy.analysis_complete.unwrap_or(false),
        questions_generated: legacy.questions_generated.unwrap_or(false),
        enhancement_complete: legacy.enhancement_complete.unwrap_or(false),
        cv_text: legacy.cv_text,
        analysis_text: legacy.analysis_text,
        questions_text: legacy.questions_text,
        enhanced_resume: legacy.enhanced_resume,
        answers: legacy.answers.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    }
}
