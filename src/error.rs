use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisputeError {
    #[error("Failed to load {path}: {detail}")]
    Load { path: String, detail: String },

    #[error("No transactions to summarize")]
    EmptyTable,

    #[error("Failed to read attachment {file_name}: {detail}")]
    AttachmentRead { file_name: String, detail: String },

    #[error("No attachment found for {0}")]
    AttachmentNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DisputeError>;
