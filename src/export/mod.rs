//! File artifacts produced from a session.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::backend::ordered_answers;
use crate::error::{AppResult, StorageError, ValidationError};
use crate::questions::parse_questions;
use crate::session::SessionRecord;

/// Exportable artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Analysis,
    Questions,
    Resume,
    QaData,
}

impl ArtifactKind {
    /// Export filename for `session_id`. Characters other than ASCII
    /// letters, digits, `-` and `_` become `_`.
    pub fn filename(self, session_id: &str) -> String {
        let session_id: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        match self {
            ArtifactKind::Analysis => format!("cv_analysis_{}.txt", session_id),
            ArtifactKind::Questions => format!("cv_questions_{}.txt", session_id),
            ArtifactKind::Resume => format!("enhanced_resume_{}.txt", session_id),
            ArtifactKind::QaData => format!("qa_data_{}.json", session_id),
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analysis" => Ok(ArtifactKind::Analysis),
            "questions" => Ok(ArtifactKind::Questions),
            "resume" => Ok(ArtifactKind::Resume),
            "qa" | "qa-data" | "qa_data" => Ok(ArtifactKind::QaData),
            other => Err(format!(
                "unknown artifact '{}' (expected analysis, questions, resume or qa)",
                other
            )),
        }
    }
}

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

/// The Q&A export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaExport {
    pub session_id: String,
    /// RFC 3339 export time.
    pub timestamp: String,
    pub questions: Vec<QaEntry>,
}

impl QaExport {
    /// Answers in parsed question order, then any remaining keys.
    pub fn from_record(record: &SessionRecord) -> Self {
        let order = record
            .questions_text()
            .map(parse_questions)
            .unwrap_or_default();
        let questions = ordered_answers(order.iter().map(String::as_str), &record.answers)
            .into_iter()
            .map(|(question, answer)| QaEntry { question, answer })
            .collect();

        Self {
            session_id: record.session_id.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            questions,
        }
    }

    pub fn to_pretty_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            StorageError::Serialization {
                key: "qa_export".to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Filename and contents of `kind` for `record`.
pub fn render(record: &SessionRecord, kind: ArtifactKind) -> AppResult<(String, String)> {
    let body = match kind {
        ArtifactKind::Analysis => record
            .analysis_text()
            .ok_or_else(|| ValidationError::missing("analysis_text"))?
            .to_string(),
        ArtifactKind::Questions => record
            .questions_text()
            .ok_or_else(|| ValidationError::missing("questions_text"))?
            .to_string(),
        ArtifactKind::Resume => record
            .enhanced_resume()
            .ok_or_else(|| ValidationError::missing("enhanced_resume"))?
            .to_string(),
        ArtifactKind::QaData => QaExport::from_record(record).to_pretty_json()?,
    };
    Ok((kind.filename(&record.session_id), body))
}

/// Write `contents` to `dir/filename`, creating `dir` if needed.
pub async fn write_artifact(dir: &Path, filename: &str, contents: &str) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, contents).await?;
    info!(path = %path.display(), bytes = contents.len(), "Artifact written");
    Ok(path)
}

/// Render and write `kind` for `record` into `dir`.
pub async fn export(record: &SessionRecord, kind: ArtifactKind, dir: &Path) -> AppResult<PathBuf> {
    let (filename, contents) = render(record, kind)?;
    write_artifact(dir, &filename, &contents).await
}
