use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
}

impl PulseError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        PulseError::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

// Manual From implementation for unboxed to boxed conversion
impl From<gix::open::Error> for PulseError {
    fn from(err: gix::open::Error) -> Self {
        PulseError::Git(Box::new(err))
    }
}
