//! Command-line interface.
//!
//! Each subcommand maps onto one workflow or settings operation. Stage
//! commands stream progress to stdout and can be cancelled with Ctrl-C.

use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::{ProgressReporter, SimulatedBackend};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::export::{self, ArtifactKind};
use crate::questions::QuestionForm;
use crate::session::{NextAction, SessionManager};
use crate::settings::{Page, SettingsStore};
use crate::storage::KeyValueStore;
use crate::workflow::{analysis_section, insights::ANALYSIS_SECTIONS, Overview, Workflow};

/// Guided resume enhancement from the command line.
#[derive(Parser, Debug)]
#[command(name = "resume-enhancer", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show session progress and the suggested next step
    Status {
        /// Print the overview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a plain-text CV
    Upload {
        /// Path to the CV text file
        file: PathBuf,
    },

    /// Analyze the uploaded CV
    Analyze,

    /// Generate clarification questions from the analysis
    Questions,

    /// Supply questions text manually together with the CV
    LoadQuestions {
        /// File with `question#`-marked questions
        questions: PathBuf,
        /// CV text file
        #[arg(long)]
        cv: PathBuf,
        /// Optional analysis text file
        #[arg(long)]
        analysis: Option<PathBuf>,
    },

    /// Show the answer form
    Form,

    /// Answer the question with the given number
    Answer {
        /// 1-based question number as shown by `form`
        index: usize,
        /// Answer text
        text: String,
    },

    /// Generate the enhanced resume
    Enhance {
        /// Proceed even if no question has been answered
        #[arg(long)]
        allow_unanswered: bool,
    },

    /// Write an artifact (analysis, questions, resume, qa) to disk
    Export {
        /// Artifact to export
        artifact: ArtifactKind,
        /// Output directory (defaults to EXPORT_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Discard the session and start over
    Reset {
        /// Confirm discarding all progress
        #[arg(long)]
        yes: bool,
    },

    /// Switch to a page (dashboard, analyzer, enhancement, settings)
    Navigate {
        page: String,
    },

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

/// Settings subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Set the API key (empty string clears it) and model
    Api {
        key: String,
        #[arg(long)]
        model: Option<String>,
    },

    /// Replace the questions prompt template with the contents of a file
    QuestionsPrompt { file: PathBuf },

    /// Replace the resume prompt template with the contents of a file
    ResumePrompt { file: PathBuf },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

impl From<AppResult<String>> for CliResult {
    fn from(result: AppResult<String>) -> Self {
        match result {
            Ok(message) => CliResult::success(message),
            Err(e) => CliResult::error(e.to_string()),
        }
    }
}

/// Everything a command needs.
pub struct CliContext {
    pub config: Config,
    pub workflow: Arc<Workflow>,
    pub settings: SettingsStore,
}

impl CliContext {
    /// Restore session and settings from `store` and wire the backend.
    pub async fn load(config: Config, store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let settings = SettingsStore::new(store.clone());
        let backend = SimulatedBackend::from_settings(&settings.load().await?, &config.simulation);
        let session = SessionManager::load(store).await?;
        let workflow = Arc::new(Workflow::new(Arc::new(session), Arc::new(backend)));

        Ok(Self {
            config,
            workflow,
            settings,
        })
    }
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, ctx: &CliContext) -> CliResult {
    debug!(command = ?command, "Executing command");
    let result = match command {
        Commands::Status { json } => execute_status(ctx, json).await,
        Commands::Upload { file } => execute_upload(ctx, &file).await,
        Commands::Analyze => execute_analyze(ctx).await,
        Commands::Questions => execute_questions(ctx).await,
        Commands::LoadQuestions {
            questions,
            cv,
            analysis,
        } => execute_load_questions(ctx, &questions, &cv, analysis.as_deref()).await,
        Commands::Form => ctx.workflow.question_form().map(|form| render_form(&form)),
        Commands::Answer { index, text } => execute_answer(ctx, index, &text).await,
        Commands::Enhance { allow_unanswered } => execute_enhance(ctx, allow_unanswered).await,
        Commands::Export { artifact, dir } => execute_export(ctx, artifact, dir).await,
        Commands::Reset { yes } => execute_reset(ctx, yes).await,
        Commands::Navigate { page } => execute_navigate(ctx, &page).await,
        Commands::Settings(command) => execute_settings(ctx, command).await,
    };
    result.into()
}

async fn execute_status(ctx: &CliContext, json: bool) -> AppResult<String> {
    let overview = ctx.workflow.overview();
    if json {
        return serde_json::to_string_pretty(&overview).map_err(|e| AppError::Internal {
            message: e.to_string(),
        });
    }

    let page = ctx.settings.current_page().await?;
    Ok(render_overview(&overview, page))
}

async fn execute_upload(ctx: &CliContext, file: &Path) -> AppResult<String> {
    let text = read_file(file).await?;
    let record = ctx.workflow.upload_cv(&text).await?;
    ctx.settings.set_current_page(Page::Analyzer).await?;
    Ok(format!(
        "CV uploaded ({} characters). Session {}\nNext: {}",
        text.chars().count(),
        record.session_id,
        NextAction::of(&record).hint()
    ))
}

async fn execute_analyze(ctx: &CliContext) -> AppResult<String> {
    let record = with_progress(ctx, move |progress| async move {
        ctx.workflow.run_analysis(&progress).await
    })
    .await?;

    let analysis = record.analysis_text().unwrap_or_default();
    let overview = Overview::of(&record);
    let mut out = String::from("\nAnalysis complete\n");
    if let Some(summary) = overview.analysis {
        out.push_str(&format!(
            "  Sections analyzed: {}\n  Gaps identified:   {}\n  Enhancement score: {}%\n",
            summary.section_count, summary.gap_count, summary.enhancement_score
        ));
    }
    let found: Vec<&str> = ANALYSIS_SECTIONS
        .iter()
        .copied()
        .filter(|title| analysis_section(analysis, title).is_some())
        .collect();
    out.push_str(&format!("  Sections: {}\n", found.join(", ")));
    out.push_str(&format!("Next: {}", overview.next_action.hint()));
    Ok(out)
}

async fn execute_questions(ctx: &CliContext) -> AppResult<String> {
    let form = with_progress(ctx, move |progress| async move {
        ctx.workflow.generate_questions(&progress).await
    })
    .await?;
    ctx.settings.set_current_page(Page::Enhancement).await?;
    Ok(render_form(&form))
}

async fn execute_load_questions(
    ctx: &CliContext,
    questions: &Path,
    cv: &Path,
    analysis: Option<&Path>,
) -> AppResult<String> {
    let questions_text = read_file(questions).await?;
    let cv_text = read_file(cv).await?;
    let analysis_text = match analysis {
        Some(path) => Some(read_file(path).await?),
        None => None,
    };

    let form = ctx
        .workflow
        .load_questions(&questions_text, &cv_text, analysis_text.as_deref())
        .await?;
    ctx.settings.set_current_page(Page::Enhancement).await?;
    Ok(render_form(&form))
}

async fn execute_answer(ctx: &CliContext, index: usize, text: &str) -> AppResult<String> {
    let form = ctx.workflow.answer(index, text).await?;
    Ok(format!(
        "Saved answer to question {} ({}/{} answered)",
        index,
        form.answered_count(),
        form.len()
    ))
}

async fn execute_enhance(ctx: &CliContext, allow_unanswered: bool) -> AppResult<String> {
    let record = with_progress(ctx, move |progress| async move {
        ctx.workflow.enhance(&progress, allow_unanswered).await
    })
    .await?;

    let overview = Overview::of(&record);
    let mut out = String::from("\nEnhanced resume generated\n");
    if let Some(stats) = overview.resume {
        out.push_str(&format!(
            "  Questions answered: {}/{}\n  Improvement score:  {}%\n",
            stats.answered, stats.total, stats.improvement_score
        ));
    }
    out.push('\n');
    out.push_str(record.enhanced_resume().unwrap_or_default());
    Ok(out)
}

async fn execute_export(
    ctx: &CliContext,
    artifact: ArtifactKind,
    dir: Option<PathBuf>,
) -> AppResult<String> {
    let dir = dir.unwrap_or_else(|| ctx.config.export.dir.clone());
    let record = ctx.workflow.session().get();
    let path = export::export(&record, artifact, &dir).await?;
    Ok(format!("Wrote {}", path.display()))
}

async fn execute_reset(ctx: &CliContext, confirmed: bool) -> AppResult<String> {
    let record = ctx.workflow.reset(confirmed).await?;
    ctx.settings.set_current_page(Page::Dashboard).await?;
    Ok(format!("Session data cleared. New session {}", record.session_id))
}

async fn execute_navigate(ctx: &CliContext, page: &str) -> AppResult<String> {
    let page: Page = page.parse()?;
    ctx.settings.set_current_page(page).await?;
    Ok(format!("Current page: {}", page))
}

async fn execute_settings(ctx: &CliContext, command: SettingsCommands) -> AppResult<String> {
    match command {
        SettingsCommands::Show => {
            let settings = ctx.settings.load().await?;
            Ok(format!(
                "API key:          {}\nModel:            {}\nQuestions prompt: {} characters\nResume prompt:    {} characters",
                settings
                    .masked_api_key()
                    .unwrap_or_else(|| "(not set)".to_string()),
                settings.model,
                settings.questions_prompt.chars().count(),
                settings.resume_prompt.chars().count(),
            ))
        }
        SettingsCommands::Api { key, model } => {
            ctx.settings
                .save_api_settings(&key, model.as_deref())
                .await?;
            Ok("API settings saved successfully".to_string())
        }
        SettingsCommands::QuestionsPrompt { file } => {
            let template = read_file(&file).await?;
            ctx.settings.save_questions_prompt(&template).await?;
            Ok("Questions prompt template saved successfully".to_string())
        }
        SettingsCommands::ResumePrompt { file } => {
            let template = read_file(&file).await?;
            ctx.settings.save_resume_prompt(&template).await?;
            Ok("Resume prompt template saved successfully".to_string())
        }
    }
}

/// Run a stage while printing its progress; Ctrl-C cancels it.
async fn with_progress<'a, T, F, Fut>(ctx: &'a CliContext, stage: F) -> AppResult<T>
where
    F: FnOnce(ProgressReporter) -> Fut,
    Fut: Future<Output = AppResult<T>> + 'a,
{
    let (reporter, mut rx) = ProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("[{:>3}%] {}", event.percent, event.status);
        }
    });

    let workflow = ctx.workflow.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling running stage");
            workflow.cancel();
        }
    });

    let result = stage(reporter).await;
    interrupt.abort();
    let _ = printer.await;
    result
}

async fn read_file(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

fn render_overview(overview: &Overview, page: Page) -> String {
    let mut out = String::new();
    out.push_str("\nResume Enhancer\n");
    out.push_str("═══════════════════════════════════════════════════════════════\n");
    out.push_str(&format!("Session:      {}\n", overview.session_id));
    out.push_str(&format!("Status:       {}\n", overview.status));
    out.push_str(&format!("Page:         {}\n\n", page));
    out.push_str(&format!("CV:           {}\n", overview.labels.cv));
    out.push_str(&format!("Analysis:     {}\n", overview.labels.analysis));
    out.push_str(&format!("Enhancement:  {}\n", overview.labels.enhancement));

    if let Some(summary) = &overview.analysis {
        out.push_str(&format!(
            "\nAnalysis: {} sections, {} gaps, score {}%\n",
            summary.section_count, summary.gap_count, summary.enhancement_score
        ));
    }
    if let Some(stats) = &overview.resume {
        out.push_str(&format!(
            "Resume: {}/{} answered, improvement {}%\n",
            stats.answered, stats.total, stats.improvement_score
        ));
    }

    out.push_str(&format!("\nNext: {}\n", overview.next_action.hint()));
    out
}

fn render_form(form: &QuestionForm) -> String {
    let mut out = format!("\nClarification questions ({})\n", form.len());
    for item in &form.items {
        out.push_str(&format!("\nQuestion {}:\n  {}\n", item.index, item.text));
        match item.answer.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(answer) => out.push_str(&format!("  > {}\n", answer)),
            None => out.push_str("  > (unanswered)\n"),
        }
    }
    let duplicates = form.duplicate_texts();
    if !duplicates.is_empty() {
        out.push_str(&format!(
            "\nNote: {} question(s) appear more than once and share one answer\n",
            duplicates.len()
        ));
    }
    out
}
