//! Generation backend behind the analysis, questions and enhancement stages.
//!
//! The workflow only sees the [`ResumeBackend`] trait. [`SimulatedBackend`]
//! fulfils it with templated text and timed progress events.

mod simulated;

pub use simulated::SimulatedBackend;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

use crate::error::BackendResult;
use crate::session::Stage;

/// A coarse progress update from a running stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub status: String,
    /// 0..=100
    pub percent: u8,
}

/// Delivers [`ProgressEvent`]s to an optional listener.
///
/// A dropped receiver is not an error; events are discarded.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Reporter that drops every event.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Create a reporter and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn report(&self, stage: Stage, status: impl Into<String>, percent: u8) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressEvent {
                stage,
                status: status.into(),
                percent: percent.min(100),
            });
        }
    }
}

/// The three generation calls the workflow depends on.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    /// Produce an analysis of `cv_text`.
    async fn submit_for_analysis(
        &self,
        cv_text: &str,
        progress: &ProgressReporter,
    ) -> BackendResult<String>;

    /// Produce clarification questions (`question#`-marked lines).
    async fn submit_for_questions(
        &self,
        cv_text: &str,
        analysis_text: &str,
        progress: &ProgressReporter,
    ) -> BackendResult<String>;

    /// Produce the enhanced resume.
    ///
    /// `answers` holds (question, answer) pairs in question order.
    async fn submit_for_enhancement(
        &self,
        cv_text: &str,
        analysis_text: &str,
        answers: &[(String, String)],
        progress: &ProgressReporter,
    ) -> BackendResult<String>;
}

/// Order an answer map by `questions`, then append the remaining keys.
pub fn ordered_answers<'a>(
    questions: impl IntoIterator<Item = &'a str>,
    answers: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut ordered = Vec::with_capacity(answers.len());
    let mut taken = std::collections::HashSet::new();

    for question in questions {
        if let Some(answer) = answers.get(question) {
            if taken.insert(question) {
                ordered.push((question.to_string(), answer.clone()));
            }
        }
    }
    for (question, answer) in answers {
        if !taken.contains(question.as_str()) {
            ordered.push((question.clone(), answer.clone()));
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_reporter_delivers_events() {
        let (reporter, mut rx) = ProgressReporter::channel();
        reporter.report(Stage::Analysis, "Starting analysis...", 10);
        reporter.report(Stage::Analysis, "Overflow", 250);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, "Starting analysis...");
        assert_eq!(first.percent, 10);
        assert_eq!(rx.recv().await.unwrap().percent, 100);
    }

    #[test]
    fn test_reporter_ignores_closed_receiver() {
        let (reporter, rx) = ProgressReporter::channel();
        drop(rx);
        reporter.report(Stage::Questions, "Preparing data", 20);
        ProgressReporter::silent().report(Stage::Questions, "Preparing data", 20);
    }

    #[test]
    fn test_ordered_answers() {
        let answers: BTreeMap<String, String> = [
            ("A stale question?", "old"),
            ("Second question?", "two"),
            ("First question?", "one"),
        ]
        .into_iter()
        .map(|(q, a)| (q.to_string(), a.to_string()))
        .collect();

        let ordered = ordered_answers(
            ["First question?", "Unanswered?", "Second question?", "First question?"],
            &answers,
        );

        assert_eq!(
            ordered,
            vec![
                ("First question?".to_string(), "one".to_string()),
                ("Second question?".to_string(), "two".to_string()),
                ("A stale question?".to_string(), "old".to_string()),
            ]
        );
    }
}
