use thiserror::Error;

#[derive(Error, Debug)]
pub enum UbigeoError {
    #[error("Source {feed} unavailable: {reason}")]
    SourceUnavailable { feed: String, reason: String },

    #[error("Source {feed} is malformed: {reason}")]
    SourceMalformed { feed: String, reason: String },

    #[error("{kind} {id} not found")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("Invalid code '{input}': {reason}")]
    InvalidCode { input: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Lookup,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl UbigeoError {
    pub fn unavailable(feed: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            feed: feed.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(feed: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceMalformed {
            feed: feed.into(),
            reason: reason.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceUnavailable { .. } | Self::SourceMalformed { .. } | Self::Http(_) => {
                ErrorCategory::Source
            }
            Self::UnknownEntity { .. } | Self::InvalidCode { .. } => ErrorCategory::Lookup,
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) | Self::Zip(_) => {
                ErrorCategory::Output
            }
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidCode { .. } => ErrorSeverity::Low,
            // 重新執行即可能成功
            Self::SourceUnavailable { .. } | Self::Http(_) => ErrorSeverity::Medium,
            Self::SourceMalformed { .. } | Self::UnknownEntity { .. } | Self::Csv(_) => {
                ErrorSeverity::High
            }
            Self::Io(_) | Self::Serialization(_) | Self::Zip(_) => ErrorSeverity::Critical,
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorSeverity::High
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Source => match self {
                Self::SourceMalformed { .. } => {
                    "Check that the feed contains the expected JSON/CSV layout"
                }
                _ => "Check the source URL or path and retry the load",
            },
            ErrorCategory::Lookup => "Enter a 6-digit UBIGEO code that exists in the catalog",
            ErrorCategory::Output => "Check that the output path is writable",
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceUnavailable { feed, .. } => format!("Could not load data from {}", feed),
            Self::SourceMalformed { feed, .. } => format!("Data from {} could not be read", feed),
            Self::UnknownEntity { kind, id } => format!("{} {} does not exist", kind, id),
            Self::InvalidCode { reason, .. } => format!("Invalid UBIGEO code: {}", reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UbigeoError>;
