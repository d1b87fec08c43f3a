//! Stage operations over the session: upload, analysis, questions, answers,
//! enhancement and reset.
//!
//! Every operation validates its inputs before touching the session, so a
//! rejected operation leaves the record exactly as it was. Backend stages
//! run under a [`CancellationToken`] and a generation ticket: starting a new
//! stage cancels the previous one, and a stage that was cancelled or
//! superseded returns an error instead of committing its result.

pub mod insights;

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod workflow_tests;

pub use insights::{analysis_section, AnalysisSummary, ResumeStats};

use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{ordered_answers, ProgressReporter, ResumeBackend};
use crate::error::{AppResult, BackendResult, ValidationError, WorkflowError};
use crate::questions::{parse_questions, QuestionForm};
use crate::session::{
    NextAction, SessionManager, SessionPatch, SessionRecord, SessionStatus, Stage, StageLabels,
};

/// Identifies one run of a backend stage.
#[derive(Debug, Clone)]
struct StageTicket {
    stage: Stage,
    generation: u64,
    token: CancellationToken,
}

/// Drives the session through its stages.
pub struct Workflow {
    session: Arc<SessionManager>,
    backend: Arc<dyn ResumeBackend>,
    active: Mutex<Option<StageTicket>>,
    generation: AtomicU64,
    commit_lock: tokio::sync::Mutex<()>,
}

/// Dashboard view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub session_id: String,
    pub status: SessionStatus,
    pub labels: StageLabels,
    pub next_action: NextAction,
    pub analysis: Option<AnalysisSummary>,
    pub resume: Option<ResumeStats>,
}

impl Overview {
    pub fn of(record: &SessionRecord) -> Self {
        Self {
            session_id: record.session_id.clone(),
            status: SessionStatus::of(record),
            labels: StageLabels::of(record),
            next_action: NextAction::of(record),
            analysis: record.analysis_text().map(AnalysisSummary::from_text),
            resume: record
                .enhancement_complete
                .then(|| ResumeStats::from_answers(&record.answers)),
        }
    }
}

impl Workflow {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn ResumeBackend>) -> Self {
        Self {
            session,
            backend,
            active: Mutex::new(None),
            generation: AtomicU64::new(0),
            commit_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn overview(&self) -> Overview {
        Overview::of(&self.session.get())
    }

    // ========================================================================
    // Stage operations
    // ========================================================================

    /// Store uploaded CV text and mark the upload stage complete.
    pub async fn upload_cv(&self, cv_text: &str) -> AppResult<SessionRecord> {
        if cv_text.trim().is_empty() {
            return Err(ValidationError::missing("cv_text").into());
        }

        let record = self
            .apply(
                Stage::Upload,
                SessionPatch::new()
                    .with_stage(Stage::Upload, true)
                    .with_cv_text(cv_text),
            )
            .await?;

        info!(
            session_id = %record.session_id,
            length = cv_text.len(),
            "CV uploaded"
        );
        Ok(record)
    }

    /// Analyze the stored CV.
    pub async fn run_analysis(&self, progress: &ProgressReporter) -> AppResult<SessionRecord> {
        let record = self.session.get();
        let cv = record
            .cv_text()
            .ok_or_else(|| ValidationError::missing("cv_text"))?
            .to_string();

        let ticket = self.begin(Stage::Analysis).await;
        let result = self.analyze(&ticket, &cv, progress).await;
        self.finish(&ticket);
        result
    }

    /// Generate clarification questions from the CV and its analysis.
    ///
    /// Nothing is committed unless the output yields at least one question.
    pub async fn generate_questions(&self, progress: &ProgressReporter) -> AppResult<QuestionForm> {
        let record = self.session.get();
        if !record.analysis_complete {
            return Err(ValidationError::missing("analysis_text").into());
        }
        let analysis = record
            .analysis_text()
            .ok_or_else(|| ValidationError::missing("analysis_text"))?
            .to_string();
        let cv = record.cv_text().unwrap_or_default().to_string();

        let ticket = self.begin(Stage::Questions).await;
        let result = self.question(&ticket, &cv, &analysis, progress).await;
        self.finish(&ticket);
        result
    }

    /// Manually supply questions text together with the CV and analysis.
    pub async fn load_questions(
        &self,
        questions_text: &str,
        cv_text: &str,
        analysis_text: Option<&str>,
    ) -> AppResult<QuestionForm> {
        if questions_text.trim().is_empty() {
            return Err(ValidationError::missing("questions_text").into());
        }
        if cv_text.trim().is_empty() {
            return Err(ValidationError::missing("cv_text").into());
        }
        if parse_questions(questions_text).is_empty() {
            return Err(ValidationError::NoQuestionsFound.into());
        }

        let analysis = analysis_text
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let record = self
            .apply(
                Stage::Questions,
                SessionPatch::new()
                    .with_questions_text(questions_text.trim())
                    .with_cv_text(cv_text.trim())
                    .with_analysis_text(analysis)
                    .with_stage(Stage::Questions, true),
            )
            .await?;

        info!(session_id = %record.session_id, "Questions loaded manually");
        Ok(self.form_for(&record))
    }

    /// The answer form for the stored questions.
    pub fn question_form(&self) -> AppResult<QuestionForm> {
        let record = self.session.get();
        if record.questions_text().is_none() {
            return Err(ValidationError::missing("questions_text").into());
        }
        Ok(self.form_for(&record))
    }

    /// Store the answer to the question at display `index` (1-based).
    pub async fn answer(&self, index: usize, answer: &str) -> AppResult<QuestionForm> {
        // lookup and write are atomic with respect to reset
        let _guard = self.commit_lock.lock().await;
        let form = self.question_form()?;
        let question = form.get(index)?.text.clone();

        let record = self.session.set_answer(question, answer).await?;
        debug!(session_id = %record.session_id, index, "Answer saved");
        Ok(self.form_for(&record))
    }

    /// Generate the enhanced resume.
    ///
    /// Without any non-blank answer this is rejected unless
    /// `allow_unanswered` is set.
    pub async fn enhance(
        &self,
        progress: &ProgressReporter,
        allow_unanswered: bool,
    ) -> AppResult<SessionRecord> {
        let record = self.session.get();
        let cv = record
            .cv_text()
            .ok_or_else(|| ValidationError::missing("cv_text"))?
            .to_string();
        if record.answered_count() == 0 && !allow_unanswered {
            return Err(ValidationError::NoAnswers.into());
        }
        let analysis = record.analysis_text().unwrap_or_default().to_string();
        let questions = record
            .questions_text()
            .map(parse_questions)
            .unwrap_or_default();
        let answers = ordered_answers(questions.iter().map(String::as_str), &record.answers);

        let ticket = self.begin(Stage::Enhancement).await;
        let result = self.enhance_with(&ticket, &cv, &analysis, &answers, progress).await;
        self.finish(&ticket);
        result
    }

    /// Cancel any running stage and start a new session.
    pub async fn reset(&self, confirmed: bool) -> AppResult<SessionRecord> {
        if !confirmed {
            return Err(ValidationError::ResetNotConfirmed.into());
        }

        let _guard = self.commit_lock.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(active) = self.active_slot().take() {
            active.token.cancel();
            info!(stage = %active.stage, "Cancelled running stage for reset");
        }
        self.session.reset(true).await
    }

    /// Cancel the running stage, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.active_slot().take() {
            Some(active) => {
                active.token.cancel();
                info!(stage = %active.stage, "Stage cancelled");
                true
            }
            None => false,
        }
    }

    /// Stage currently running, if any.
    pub fn running_stage(&self) -> Option<Stage> {
        self.active_slot().as_ref().map(|ticket| ticket.stage)
    }

    // ========================================================================
    // Stage bodies
    // ========================================================================

    async fn analyze(
        &self,
        ticket: &StageTicket,
        cv: &str,
        progress: &ProgressReporter,
    ) -> AppResult<SessionRecord> {
        let analysis = self
            .call_backend(ticket, self.backend.submit_for_analysis(cv, progress))
            .await?;

        self.commit(
            ticket,
            SessionPatch::new()
                .with_stage(Stage::Analysis, true)
                .with_analysis_text(Some(analysis)),
        )
        .await
    }

    async fn question(
        &self,
        ticket: &StageTicket,
        cv: &str,
        analysis: &str,
        progress: &ProgressReporter,
    ) -> AppResult<QuestionForm> {
        let questions_text = self
            .call_backend(
                ticket,
                self.backend.submit_for_questions(cv, analysis, progress),
            )
            .await?;

        if parse_questions(&questions_text).is_empty() {
            warn!(stage = %ticket.stage, "Generated text contained no questions");
            return Err(ValidationError::NoQuestionsFound.into());
        }

        let record = self
            .commit(
                ticket,
                SessionPatch::new()
                    .with_stage(Stage::Questions, true)
                    .with_questions_text(questions_text),
            )
            .await?;
        Ok(self.form_for(&record))
    }

    async fn enhance_with(
        &self,
        ticket: &StageTicket,
        cv: &str,
        analysis: &str,
        answers: &[(String, String)],
        progress: &ProgressReporter,
    ) -> AppResult<SessionRecord> {
        let resume = self
            .call_backend(
                ticket,
                self.backend
                    .submit_for_enhancement(cv, analysis, answers, progress),
            )
            .await?;

        self.commit(
            ticket,
            SessionPatch::new()
                .with_stage(Stage::Enhancement, true)
                .with_enhanced_resume(resume),
        )
        .await
    }

    // ========================================================================
    // Stage lifecycle
    // ========================================================================

    /// Commit a patch that needs no backend call, superseding any running stage.
    async fn apply(&self, stage: Stage, patch: SessionPatch) -> AppResult<SessionRecord> {
        let ticket = self.begin(stage).await;
        let result = self.commit(&ticket, patch).await;
        self.finish(&ticket);
        result
    }

    async fn begin(&self, stage: Stage) -> StageTicket {
        let _guard = self.commit_lock.lock().await;
        let ticket = StageTicket {
            stage,
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            token: CancellationToken::new(),
        };

        if let Some(previous) = self.active_slot().replace(ticket.clone()) {
            previous.token.cancel();
            info!(
                previous = %previous.stage,
                stage = %stage,
                "Superseding running stage"
            );
        }

        info!(stage = %stage, generation = ticket.generation, "Stage started");
        ticket
    }

    async fn call_backend<T>(
        &self,
        ticket: &StageTicket,
        call: impl Future<Output = BackendResult<T>>,
    ) -> AppResult<T> {
        tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(self.interrupted(ticket).into()),
            result = call => Ok(result?),
        }
    }

    async fn commit(&self, ticket: &StageTicket, patch: SessionPatch) -> AppResult<SessionRecord> {
        let _guard = self.commit_lock.lock().await;
        if ticket.token.is_cancelled() || self.is_stale(ticket) {
            return Err(self.interrupted(ticket).into());
        }

        let record = self.session.update(patch).await?;
        info!(
            session_id = %record.session_id,
            stage = %ticket.stage,
            "Stage complete"
        );
        Ok(record)
    }

    fn finish(&self, ticket: &StageTicket) {
        let mut slot = self.active_slot();
        if slot
            .as_ref()
            .is_some_and(|active| active.generation == ticket.generation)
        {
            *slot = None;
        }
    }

    fn is_stale(&self, ticket: &StageTicket) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket.generation
    }

    fn interrupted(&self, ticket: &StageTicket) -> WorkflowError {
        let stage = ticket.stage.to_string();
        if self.is_stale(ticket) {
            warn!(stage = %stage, "Discarding result of superseded stage");
            WorkflowError::Superseded { stage }
        } else {
            WorkflowError::Cancelled { stage }
        }
    }

    fn active_slot(&self) -> MutexGuard<'_, Option<StageTicket>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn form_for(&self, record: &SessionRecord) -> QuestionForm {
        let form = QuestionForm::build(record.questions_text().unwrap_or_default(), &record.answers);
        for text in form.duplicate_texts() {
            warn!(question = %text, "Duplicate question text shares one answer");
        }
        form
    }
}
