use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ProgressReporter, ResumeBackend};
use crate::config::SimulationConfig;
use crate::error::{BackendError, BackendResult};
use crate::prompts;
use crate::session::Stage;
use crate::settings::Settings;

/// (status, percent, delay weight). The step delay is `base * weight / 4`.
type Step = (&'static str, u8, u64);

const ANALYSIS_STEPS: &[Step] = &[
    ("Starting analysis...", 10, 4),
    ("Analyzing skills section...", 30, 5),
    ("Analyzing experience section...", 50, 5),
    ("Analyzing education section...", 70, 4),
    ("Finalizing analysis...", 90, 4),
];
const ANALYSIS_DONE: &str = "Analysis complete";

const QUESTION_STEPS: &[Step] = &[
    ("Preparing data", 20, 4),
    ("Analyzing gaps in CV", 40, 5),
    ("Generating targeted questions", 70, 6),
    ("Finalizing questions", 90, 4),
];
const QUESTIONS_DONE: &str = "Questions generated";

const ENHANCEMENT_STEPS: &[Step] = &[
    ("Preparing data", 15, 4),
    ("Processing CV analysis", 30, 5),
    ("Integrating Q&A responses", 50, 6),
    ("Improving CV content", 70, 5),
    ("Optimizing for ATS compatibility", 85, 4),
    ("Finalizing enhanced resume", 95, 4),
];
const ENHANCEMENT_DONE: &str = "Resume generated";

/// Backend that answers every call with templated text after a staged,
/// timed progress sequence.
///
/// Requires an API key like a real backend would; the key is never sent
/// anywhere.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    api_key: Option<String>,
    model: String,
    step_delay: Duration,
}

impl SimulatedBackend {
    pub fn new(api_key: Option<String>, model: impl Into<String>, config: &SimulationConfig) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            step_delay: Duration::from_millis(config.stage_delay_ms),
        }
    }

    /// Backend configured from stored settings.
    pub fn from_settings(settings: &Settings, config: &SimulationConfig) -> Self {
        Self::new(settings.api_key.clone(), settings.model.clone(), config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn ensure_credentials(&self) -> BackendResult<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(BackendError::MissingCredentials),
        }
    }

    async fn run_steps(&self, stage: Stage, steps: &[Step], progress: &ProgressReporter) {
        for (status, percent, weight) in steps {
            progress.report(stage, *status, *percent);
            let delay = self.step_delay * (*weight as u32) / 4;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl ResumeBackend for SimulatedBackend {
    async fn submit_for_analysis(
        &self,
        cv_text: &str,
        progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.ensure_credentials()?;
        debug!(model = %self.model, cv_len = cv_text.len(), "Simulating analysis");

        self.run_steps(Stage::Analysis, ANALYSIS_STEPS, progress).await;
        let analysis = mock_analysis(cv_text, &self.model);
        progress.report(Stage::Analysis, ANALYSIS_DONE, 100);

        info!(length = analysis.len(), "Simulated analysis produced");
        Ok(analysis)
    }

    async fn submit_for_questions(
        &self,
        cv_text: &str,
        analysis_text: &str,
        progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.ensure_credentials()?;
        debug!(
            model = %self.model,
            cv_len = cv_text.len(),
            analysis_len = analysis_text.len(),
            "Simulating question generation"
        );

        self.run_steps(Stage::Questions, QUESTION_STEPS, progress).await;
        progress.report(Stage::Questions, QUESTIONS_DONE, 100);

        Ok(prompts::QUESTIONS_FORM.to_string())
    }

    async fn submit_for_enhancement(
        &self,
        cv_text: &str,
        analysis_text: &str,
        answers: &[(String, String)],
        progress: &ProgressReporter,
    ) -> BackendResult<String> {
        self.ensure_credentials()?;
        debug!(
            model = %self.model,
            cv_len = cv_text.len(),
            analysis_len = analysis_text.len(),
            answers = answers.len(),
            "Simulating enhancement"
        );

        self.run_steps(Stage::Enhancement, ENHANCEMENT_STEPS, progress)
            .await;
        let resume = mock_resume(answers);
        progress.report(Stage::Enhancement, ENHANCEMENT_DONE, 100);

        Ok(resume)
    }
}

fn mock_analysis(cv_text: &str, model: &str) -> String {
    let lower = cv_text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let sections: Vec<(&str, &str)> = [
        (mentions(&["skills", "technologies"]), "Skills", prompts::SKILLS_ANALYSIS),
        (
            mentions(&["experience", "work"]),
            "Experience",
            prompts::EXPERIENCE_ANALYSIS,
        ),
        (
            mentions(&["education", "university"]),
            "Education",
            prompts::EDUCATION_ANALYSIS,
        ),
        (
            mentions(&["projects", "portfolio"]),
            "Projects",
            prompts::PROJECTS_ANALYSIS,
        ),
    ]
    .into_iter()
    .filter(|(present, _, _)| *present)
    .map(|(_, name, body)| (name, body))
    .collect();

    let structure: Vec<&str> = sections.iter().map(|(name, _)| *name).collect();
    let report_id = Uuid::new_v4().simple().to_string();

    let mut out = format!(
        "COMPREHENSIVE CV ANALYSIS REPORT\n\
         Report ID: {}\n\
         Analysis Date: {}\n\
         Model Used: {}\n\
         CV Structure Detected: {}\n\
         Analysis Passes Completed: {}\n\
         {}\n",
        &report_id[..8],
        Utc::now().format("%Y-%m-%d"),
        model,
        if structure.is_empty() {
            "None".to_string()
        } else {
            structure.join(", ")
        },
        sections.len() + 1,
        prompts::ANALYSIS_RULE,
    );

    let bodies = sections.iter().map(|(_, body)| *body);
    for body in bodies.chain(std::iter::once(prompts::INTEGRATION_ANALYSIS)) {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
        out.push_str(prompts::ANALYSIS_RULE);
        out.push('\n');
    }
    out
}

fn mock_resume(answers: &[(String, String)]) -> String {
    let pick = |i: usize| {
        answers
            .get(i)
            .map(|(_, a)| a.trim())
            .filter(|a| !a.is_empty())
            .unwrap_or(prompts::ENHANCEMENT_FALLBACKS[i])
    };

    prompts::ENHANCED_RESUME
        .replace("{team_size}", pick(0))
        .replace("{metrics}", pick(1))
        .replace("{user_base}", pick(2))
}
