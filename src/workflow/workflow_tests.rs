//! Unit tests for the Workflow controller.

use super::*;
use crate::backend::SimulatedBackend;
use crate::config::SimulationConfig;
use crate::error::{AppError, BackendError};
use crate::storage::MemoryStore;
use async_trait::async_trait;
use std::sync::atomic::AtomicUsize;
use tokio::sync::Semaphore;

const CV: &str = "JOHN DOE\nSKILLS: Rust, SQL\nEXPERIENCE: Backend engineer at XYZ Corp\nEDUCATION: University of Technology";

const QUESTIONS: &str = "\
question#What was the size of your team at XYZ Corp?
question#Which performance metrics did you improve, and by how much?";

/// Backend returning fixed text, optionally blocking until released.
struct TestBackend {
    gate: Option<Semaphore>,
    questions_text: String,
    calls: AtomicUsize,
}

impl TestBackend {
    fn instant() -> Self {
        Self {
            gate: None,
            questions_text: QUESTIONS.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::instant()
        }
    }

    fn with_questions(text: &str) -> Self {
        Self {
            questions_text: text.to_string(),
            ..Self::instant()
        }
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    async fn wait(&self) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|e| BackendError::Generation {
                stage: "test".to_string(),
                message: e.to_string(),
            })?;
            permit.forget();
        }
        Ok(())
    }
}

#[async_trait]
impl ResumeBackend for TestBackend {
    async fn submit_for_analysis(
        &self,
        cv_text: &str,
        _progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.wait().await?;
        Ok(format!("SKILLS ANALYSIS\nMissing metrics for: {}", cv_text.len()))
    }

    async fn submit_for_questions(
        &self,
        _cv_text: &str,
        _analysis_text: &str,
        _progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.wait().await?;
        Ok(self.questions_text.clone())
    }

    async fn submit_for_enhancement(
        &self,
        _cv_text: &str,
        _analysis_text: &str,
        answers: &[(String, String)],
        _progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.wait().await?;
        let lines: Vec<String> = answers.iter().map(|(q, a)| format!("{q} => {a}")).collect();
        Ok(format!("ENHANCED\n{}", lines.join("\n")))
    }
}

async fn workflow_with(backend: Arc<dyn ResumeBackend>) -> Workflow {
    let session = SessionManager::load(Arc::new(MemoryStore::new()))
        .await
        .unwrap();
    Workflow::new(Arc::new(session), backend)
}

async fn analyzed(backend: Arc<dyn ResumeBackend>) -> Workflow {
    let workflow = workflow_with(backend).await;
    workflow.upload_cv(CV).await.unwrap();
    workflow
        .run_analysis(&ProgressReporter::silent())
        .await
        .unwrap();
    workflow
}

async fn wait_until_running(workflow: &Workflow) {
    while workflow.running_stage().is_none() {
        tokio::task::yield_now().await;
    }
}

fn silent() -> ProgressReporter {
    ProgressReporter::silent()
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_upload_blank_cv_rejected() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    let before = workflow.session().get();

    let err = workflow.upload_cv("  \n ").await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingText { .. })
    ));
    assert_eq!(workflow.session().get(), before);
}

#[tokio::test]
async fn test_analysis_requires_cv() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    let err = workflow.run_analysis(&silent()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingText { .. })
    ));
}

#[tokio::test]
async fn test_questions_require_analysis() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    workflow.upload_cv(CV).await.unwrap();

    let err = workflow.generate_questions(&silent()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingText { .. })
    ));
    assert!(!workflow.session().get().questions_generated);
}

#[tokio::test]
async fn test_missing_credentials_commits_nothing() {
    let backend = SimulatedBackend::new(None, "o1-mini", &SimulationConfig::instant());
    let workflow = workflow_with(Arc::new(backend)).await;
    workflow.upload_cv(CV).await.unwrap();
    let before = workflow.session().get();

    let err = workflow.run_analysis(&silent()).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Backend(BackendError::MissingCredentials)
    ));
    assert_eq!(workflow.session().get(), before);
    assert_eq!(workflow.running_stage(), None);
}

#[tokio::test]
async fn test_generated_text_without_questions_is_rejected() {
    let workflow = analyzed(Arc::new(TestBackend::with_questions(
        "question#Please describe your role",
    )))
    .await;

    let err = workflow.generate_questions(&silent()).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoQuestionsFound)
    ));
    let record = workflow.session().get();
    assert!(!record.questions_generated);
    assert!(record.questions_text.is_none());
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_full_pipeline() {
    let workflow = analyzed(Arc::new(TestBackend::instant())).await;
    let record = workflow.session().get();
    assert!(record.analysis_complete);
    assert!(record.analysis_text().unwrap().starts_with("SKILLS ANALYSIS"));

    let form = workflow.generate_questions(&silent()).await.unwrap();
    assert_eq!(form.len(), 2);
    assert!(workflow.session().get().questions_generated);

    let form = workflow.answer(2, "p95 latency down 40%").await.unwrap();
    assert_eq!(form.answered_count(), 1);
    workflow.answer(1, "8 engineers").await.unwrap();

    let record = workflow.enhance(&silent(), false).await.unwrap();
    assert!(record.enhancement_complete);
    let resume = record.enhanced_resume().unwrap();
    // answers arrive in question order
    let team = resume.find("8 engineers").unwrap();
    let latency = resume.find("p95 latency").unwrap();
    assert!(team < latency);

    let overview = workflow.overview();
    assert_eq!(overview.status, SessionStatus::Complete);
    assert_eq!(overview.next_action, NextAction::ViewResume);
    assert_eq!(overview.resume.unwrap().improvement_score, 100);
    assert_eq!(overview.analysis.unwrap().gap_count, 1);
}

#[tokio::test]
async fn test_pipeline_with_simulated_backend() {
    let backend = SimulatedBackend::new(
        Some("sk-test".to_string()),
        "o1-mini",
        &SimulationConfig::instant(),
    );
    let workflow = analyzed(Arc::new(backend)).await;

    let (reporter, mut rx) = ProgressReporter::channel();
    let form = workflow.generate_questions(&reporter).await.unwrap();
    assert!(!form.is_empty());
    drop(reporter);

    let mut last = 0;
    while let Some(event) = rx.recv().await {
        assert!(event.percent >= last);
        last = event.percent;
    }
    assert_eq!(last, 100);
}

#[tokio::test]
async fn test_load_questions_parses_before_commit() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;

    let err = workflow
        .load_questions("no questions in here", CV, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoQuestionsFound)
    ));
    let record = workflow.session().get();
    assert!(!record.questions_generated);
    assert!(record.cv_text.is_none());

    let form = workflow
        .load_questions(QUESTIONS, CV, Some("  "))
        .await
        .unwrap();
    assert_eq!(form.len(), 2);
    let record = workflow.session().get();
    assert!(record.questions_generated);
    assert_eq!(record.cv_text(), Some(CV));
    assert!(record.analysis_text.is_none());
}

#[tokio::test]
async fn test_load_questions_requires_texts() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;

    for (questions, cv) in [("", CV), (QUESTIONS, " ")] {
        let err = workflow
            .load_questions(questions, cv, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingText { .. })
        ));
    }
}

#[tokio::test]
async fn test_answer_index_out_of_range() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    workflow.load_questions(QUESTIONS, CV, None).await.unwrap();

    let err = workflow.answer(3, "nope").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::QuestionIndexOutOfRange { index: 3, count: 2 })
    ));
    assert!(workflow.session().get().answers.is_empty());
}

#[tokio::test]
async fn test_answer_without_questions() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    assert!(workflow.question_form().is_err());
    assert!(workflow.answer(1, "x").await.is_err());
}

#[tokio::test]
async fn test_concurrent_answers_are_all_kept() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    workflow.load_questions(QUESTIONS, CV, None).await.unwrap();

    let (first, second) = tokio::join!(
        workflow.answer(1, "8 engineers"),
        workflow.answer(2, "p95 latency down 40%"),
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(workflow.question_form().unwrap().answered_count(), 2);
}

#[tokio::test]
async fn test_answer_racing_reset_leaves_fresh_session_empty() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    workflow.load_questions(QUESTIONS, CV, None).await.unwrap();

    let (answered, reset) = tokio::join!(workflow.answer(1, "8 engineers"), workflow.reset(true));
    let fresh = reset.unwrap();

    let record = workflow.session().get();
    assert_eq!(record.session_id, fresh.session_id);
    assert!(record.answers.is_empty());
    assert!(record.questions_text.is_none());
    // either answered before the reset, or found no questions after it
    if let Err(err) = answered {
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingText { .. })
        ));
    }
}

#[tokio::test]
async fn test_enhance_requires_answers_unless_allowed() {
    let workflow = workflow_with(Arc::new(TestBackend::instant())).await;
    workflow.load_questions(QUESTIONS, CV, None).await.unwrap();
    workflow.answer(1, "   ").await.unwrap();

    let err = workflow.enhance(&silent(), false).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::NoAnswers)));
    assert!(!workflow.session().get().enhancement_complete);

    let record = workflow.enhance(&silent(), true).await.unwrap();
    assert!(record.enhancement_complete);
}

// ============================================================================
// Cancellation and supersession
// ============================================================================

#[tokio::test]
async fn test_cancel_running_stage() {
    let backend = Arc::new(TestBackend::gated());
    let workflow = Arc::new(workflow_with(backend.clone()).await);
    workflow.upload_cv(CV).await.unwrap();

    let running = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.run_analysis(&ProgressReporter::silent()).await })
    };
    wait_until_running(&workflow).await;

    assert!(workflow.cancel());
    let err = running.await.unwrap().unwrap_err();

    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::Cancelled { .. })
    ));
    assert!(!workflow.session().get().analysis_complete);
    assert_eq!(workflow.running_stage(), None);
    assert!(!workflow.cancel());
}

#[tokio::test]
async fn test_new_stage_supersedes_running_one() {
    let backend = Arc::new(TestBackend::gated());
    let workflow = Arc::new(workflow_with(backend.clone()).await);
    workflow.upload_cv(CV).await.unwrap();

    let first = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.run_analysis(&ProgressReporter::silent()).await })
    };
    wait_until_running(&workflow).await;

    // a fresh upload supersedes the analysis of the old CV
    workflow.upload_cv("JANE DOE\nSKILLS: Go").await.unwrap();
    backend.release();

    let err = first.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::Superseded { .. })
    ));
    let record = workflow.session().get();
    assert!(!record.analysis_complete);
    assert_eq!(record.cv_text(), Some("JANE DOE\nSKILLS: Go"));
}

#[tokio::test]
async fn test_reset_supersedes_running_stage() {
    let backend = Arc::new(TestBackend::gated());
    let workflow = Arc::new(workflow_with(backend.clone()).await);
    workflow.upload_cv(CV).await.unwrap();
    let old_id = workflow.session().get().session_id;

    let running = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.run_analysis(&ProgressReporter::silent()).await })
    };
    wait_until_running(&workflow).await;

    let fresh = workflow.reset(true).await.unwrap();
    backend.release();

    let err = running.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::Superseded { .. })
    ));
    assert_ne!(fresh.session_id, old_id);
    let record = workflow.session().get();
    assert_eq!(record, fresh);
    assert!(!record.cv_uploaded);
    assert!(record.analysis_text.is_none());
}

#[tokio::test]
async fn test_unconfirmed_reset_keeps_running_stage() {
    let backend = Arc::new(TestBackend::gated());
    let workflow = Arc::new(workflow_with(backend.clone()).await);
    workflow.upload_cv(CV).await.unwrap();

    let running = {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.run_analysis(&ProgressReporter::silent()).await })
    };
    wait_until_running(&workflow).await;

    let err = workflow.reset(false).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::ResetNotConfirmed)
    ));

    backend.release();
    let record = running.await.unwrap().unwrap();
    assert!(record.analysis_complete);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}
