use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EventKeepError {
    #[error("Encoding error: {0}")]
    Encoding(serde_json::Error),

    #[error("Decoding error: {0}")]
    Decoding(serde_json::Error),

    #[error("Storage write failure ({key}): {message}")]
    StorageWrite { key: String, message: String },

    #[error("Storage read failure ({key}): {message}")]
    StorageRead { key: String, message: String },

    #[error("Event not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Backup exists but could not be restored: {0}")]
    EmptyBackupRestore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EventKeepError {
    pub fn write(key: &str, message: impl Into<String>) -> Self {
        Self::StorageWrite {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn read(key: &str, message: impl Into<String>) -> Self {
        Self::StorageRead {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EventKeepError>;
