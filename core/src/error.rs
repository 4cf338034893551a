use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model not trained. Call train() first.")]
    NotTrained,

    #[error("Ticket '{ticket_id}' not found")]
    TicketNotFound { ticket_id: String },

    #[error("Invalid value for {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TriageResult<T> = Result<T, TriageError>;
