//! Session state for the upload → analysis → questions → enhancement pipeline.
//!
//! - [`SessionRecord`]: the single persisted record of a user's progress
//! - [`SessionPatch`]: a shallow, top-level partial update
//! - [`SessionManager`]: the owning container (load/get/update/reset)
//! - [`status`]: labels derived from the record for display
//! - [`migration`]: versioned decoding of persisted records

mod manager;
pub mod migration;
pub mod status;


pub use manager::SessionManager;
pub use status::{NextAction, SessionStatus, StageLabels};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

use crate::error::ValidationError;

/// Schema version written with every persisted record.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// One of the four sequential workflow milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// CV text captured.
    Upload,
    /// Analysis text generated.
    Analysis,
    /// Clarification questions generated.
    Questions,
    /// Enhanced resume generated.
    Enhancement,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Upload,
        Stage::Analysis,
        Stage::Questions,
        Stage::Enhancement,
    ];

    /// Name of the persisted flag this stage sets.
    pub fn flag_name(self) -> &'static str {
        match self {
            Stage::Upload => "cvUploaded",
            Stage::Analysis => "analysisComplete",
            Stage::Questions => "questionsGenerated",
            Stage::Enhancement => "enhancementComplete",
        }
    }

    /// The stage that must be complete before this one.
    pub fn prerequisite(self) -> Option<Stage> {
        match self {
            Stage::Upload => None,
            Stage::Analysis => Some(Stage::Upload),
            Stage::Questions => Some(Stage::Analysis),
            Stage::Enhancement => Some(Stage::Questions),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Upload => write!(f, "upload"),
            Stage::Analysis => write!(f, "analysis"),
            Stage::Questions => write!(f, "questions"),
            Stage::Enhancement => write!(f, "enhancement"),
        }
    }
}

/// The persisted record of a user's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Persisted schema version.
    pub schema_version: u32,
    /// Opaque identifier; empty only before the manager assigns one.
    pub session_id: String,
    pub cv_uploaded: bool,
    pub analysis_complete: bool,
    pub questions_generated: bool,
    pub enhancement_complete: bool,
    pub cv_text: Option<String>,
    pub analysis_text: Option<String>,
    pub questions_text: Option<String>,
    pub enhanced_resume: Option<String>,
    /// Question text → answer text.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionRecord {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            session_id: String::new(),
            cv_uploaded: false,
            analysis_complete: false,
            questions_generated: false,
            enhancement_complete: false,
            cv_text: None,
            analysis_text: None,
            questions_text: None,
            enhanced_resume: None,
            answers: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl SessionRecord {
    /// Fresh record with a newly generated session id.
    pub fn new() -> Self {
        Self {
            session_id: new_session_id(),
            ..Self::default()
        }
    }

    /// Whether `stage` has been completed.
    pub fn is_complete(&self, stage: Stage) -> bool {
        match stage {
            Stage::Upload => self.cv_uploaded,
            Stage::Analysis => self.analysis_complete,
            Stage::Questions => self.questions_generated,
            Stage::Enhancement => self.enhancement_complete,
        }
    }

    /// Stages marked complete while their prerequisite is not.
    pub fn lattice_violations(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| {
                self.is_complete(*stage)
                    && stage
                        .prerequisite()
                        .is_some_and(|prev| !self.is_complete(prev))
            })
            .collect()
    }

    /// CV text, if present and not blank.
    pub fn cv_text(&self) -> Option<&str> {
        non_blank(&self.cv_text)
    }

    /// Analysis text, if present and not blank.
    pub fn analysis_text(&self) -> Option<&str> {
        non_blank(&self.analysis_text)
    }

    /// Questions text, if present and not blank.
    pub fn questions_text(&self) -> Option<&str> {
        non_blank(&self.questions_text)
    }

    /// Enhanced resume, if present and not blank.
    pub fn enhanced_resume(&self) -> Option<&str> {
        non_blank(&self.enhanced_resume)
    }

    /// Number of answers with non-blank text.
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| !a.trim().is_empty()).count()
    }

    /// Shallow-merge `patch` over this record.
    ///
    /// Fields absent from the patch are untouched; `answers` is replaced
    /// wholesale when present. A patch clearing a completed stage flag is
    /// rejected and nothing is applied.
    pub fn apply(&mut self, patch: SessionPatch) -> Result<(), ValidationError> {
        for (stage, value) in patch.flags() {
            if value == Some(false) && self.is_complete(stage) {
                return Err(ValidationError::ProgressRegression {
                    flag: stage.flag_name().to_string(),
                });
            }
        }

        if let Some(v) = patch.cv_uploaded {
            self.cv_uploaded = v;
        }
        if let Some(v) = patch.analysis_complete {
            self.analysis_complete = v;
        }
        if let Some(v) = patch.questions_generated {
            self.questions_generated = v;
        }
        if let Some(v) = patch.enhancement_complete {
            self.enhancement_complete = v;
        }
        if let Some(v) = patch.cv_text {
            self.cv_text = v;
        }
        if let Some(v) = patch.analysis_text {
            self.analysis_text = v;
        }
        if let Some(v) = patch.questions_text {
            self.questions_text = v;
        }
        if let Some(v) = patch.enhanced_resume {
            self.enhanced_resume = v;
        }
        if let Some(v) = patch.answers {
            self.answers = v;
        }
        self.updated_at = Utc::now();

        for stage in self.lattice_violations() {
            warn!(
                session_id = %self.session_id,
                stage = %stage,
                "Stage marked complete before its prerequisite"
            );
        }

        Ok(())
    }
}

/// A partial update. `None` means "field not present in the update".
///
/// Text payloads are doubly optional: `Some(None)` writes null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub cv_uploaded: Option<bool>,
    pub analysis_complete: Option<bool>,
    pub questions_generated: Option<bool>,
    pub enhancement_complete: Option<bool>,
    pub cv_text: Option<Option<String>>,
    pub analysis_text: Option<Option<String>>,
    pub questions_text: Option<Option<String>>,
    pub enhanced_resume: Option<Option<String>>,
    pub answers: Option<BTreeMap<String, String>>,
}

impl SessionPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the completion flag of `stage`
    pub fn with_stage(mut self, stage: Stage, complete: bool) -> Self {
        match stage {
            Stage::Upload => self.cv_uploaded = Some(complete),
            Stage::Analysis => self.analysis_complete = Some(complete),
            Stage::Questions => self.questions_generated = Some(complete),
            Stage::Enhancement => self.enhancement_complete = Some(complete),
        }
        self
    }

    pub fn with_cv_text(mut self, text: impl Into<String>) -> Self {
        self.cv_text = Some(Some(text.into()));
        self
    }

    pub fn with_analysis_text(mut self, text: Option<String>) -> Self {
        self.analysis_text = Some(text);
        self
    }

    pub fn with_questions_text(mut self, text: impl Into<String>) -> Self {
        self.questions_text = Some(Some(text.into()));
        self
    }

    pub fn with_enhanced_resume(mut self, text: impl Into<String>) -> Self {
        self.enhanced_resume = Some(Some(text.into()));
        self
    }

    /// Replace the whole answer map
    pub fn with_answers(mut self, answers: BTreeMap<String, String>) -> Self {
        self.answers = Some(answers);
        self
    }

    fn flags(&self) -> [(Stage, Option<bool>); 4] {
        [
            (Stage::Upload, self.cv_uploaded),
            (Stage::Analysis, self.analysis_complete),
            (Stage::Questions, self.questions_generated),
            (Stage::Enhancement, self.enhancement_complete),
        ]
    }
}

/// Generate a new opaque session identifier
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether `id` is usable as a session identifier: non-empty ASCII
/// letters, digits, `-` and `_` only.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
