//! # Resume Enhancer
//!
//! A guided resume enhancement workflow with persistent session state.
//!
//! ## Features
//!
//! - **Upload**: Store plain-text CV content for the current session
//! - **Analysis**: Section-by-section review of skills, experience, education and projects
//! - **Clarification Questions**: `question#`-marked questions parsed into an answer form
//! - **Enhancement**: Synthesize an enhanced resume from the CV, analysis and answers
//! - **Session Persistence**: Versioned session records with legacy migration
//! - **Cancellation**: Newer stages supersede running ones; stale results never commit
//! - **Export**: Analysis, questions, resume and Q&A JSON artifacts
//!
//! ## Architecture
//!
//! ```text
//! CLI → Workflow → ResumeBackend (simulated)
//!           ↓
//!     SessionManager → KeyValueStore (SQLite)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use resume_enhancer::backend::{ProgressReporter, SimulatedBackend};
//! use resume_enhancer::session::SessionManager;
//! use resume_enhancer::storage::SqliteStore;
//! use resume_enhancer::workflow::Workflow;
//! use resume_enhancer::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(SqliteStore::new(&config.database).await?);
//!     let session = Arc::new(SessionManager::load(store).await?);
//!     let backend = SimulatedBackend::new(Some("sk-...".into()), "o1-mini", &config.simulation);
//!     let workflow = Workflow::new(session, Arc::new(backend));
//!
//!     workflow.upload_cv("JANE DOE\nSKILLS: Rust").await?;
//!     workflow.run_analysis(&ProgressReporter::silent()).await?;
//!     Ok(())
//! }
//! ```

/// Generation backends and progress reporting.
pub mod backend;
/// Command-line interface.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Artifact export (text files and Q&A JSON).
pub mod export;
/// Default prompt templates and canned generation text.
pub mod prompts;
/// Question parsing and the answer form.
pub mod questions;
/// Session record, persistence and migration.
pub mod session;
/// User settings and page navigation.
pub mod settings;
/// Key-value persistence.
pub mod storage;
/// Stage orchestration over the session.
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{SessionManager, SessionRecord};
pub use workflow::Workflow;
