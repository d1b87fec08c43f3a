use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed for {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Errors raised by the analysis/generation backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key not configured. Set it with `settings api <key>`.")]
    MissingCredentials,

    #[error("{stage} failed: {message}")]
    Generation { stage: String, message: String },
}

/// User-facing validation failures. The rejected operation leaves state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required text: {field}")]
    MissingText { field: String },

    #[error("No valid questions found. Please check the input format")]
    NoQuestionsFound,

    #[error("No questions have been answered")]
    NoAnswers,

    #[error("Prompt template cannot be empty: {template}")]
    EmptyPromptTemplate { template: String },

    #[error("Stage flag {flag} cannot be cleared without a session reset")]
    ProgressRegression { flag: String },

    #[error("Question {index} does not exist (form has {count} questions)")]
    QuestionIndexOutOfRange { index: usize, count: usize },

    #[error("Unknown page: {page}")]
    UnknownPage { page: String },

    #[error("Session reset requires confirmation")]
    ResetNotConfirmed,
}

impl ValidationError {
    /// Shorthand for a [`ValidationError::MissingText`] on `field`.
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingText {
            field: field.into(),
        }
    }
}

/// Stage lifecycle errors. Neither variant commits anything to the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("{stage} was cancelled")]
    Cancelled { stage: String },

    #[error("{stage} was superseded by a newer request")]
    Superseded { stage: String },
}

/// Failures decoding a persisted session record. Always recovered locally.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Persisted session is not a JSON object")]
    NotAnObject,

    #[error("Invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Unsupported schema version {found} (supported: {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("Malformed session JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
