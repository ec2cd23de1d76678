use crate::modules::ModuleId;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    UnknownModule(ModuleId),
    DuplicateModule(ModuleId),
    ModuleTypeMismatch { module: ModuleId, expected: &'static str },
    InvalidPatch { module: ModuleId, reason: String },
    PersistenceWrite { module: ModuleId, reason: String },
    ConfigError(String),
    IoError(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnknownModule(id) => write!(f, "Unknown module: {}", id),
            AppError::DuplicateModule(id) => write!(f, "Module already registered: {}", id),
            AppError::ModuleTypeMismatch { module, expected } => write!(
                f,
                "Module {} is not managed with configuration type {}",
                module, expected
            ),
            AppError::InvalidPatch { module, reason } => {
                write!(f, "Invalid configuration patch for {}: {}", module, reason)
            }
            AppError::PersistenceWrite { module, reason } => {
                write!(f, "Could not persist configuration for {}: {}", module, reason)
            }
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigError(format!("Could not parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::ConfigError(format!("Could not serialize TOML: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Fatal,
    Recoverable,
    Minor,
}

impl AppError {
    /// How the host should treat this error when it reaches a reporting boundary.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Lifecycle bugs in the host plugin
            AppError::DuplicateModule(_) | AppError::ModuleTypeMismatch { .. } => {
                ErrorSeverity::Fatal
            }
            AppError::UnknownModule(_)
            | AppError::InvalidPatch { .. }
            | AppError::ConfigError(_)
            | AppError::IoError(_) => ErrorSeverity::Recoverable,
            // In-memory value stands
            AppError::PersistenceWrite { .. } => ErrorSeverity::Minor,
        }
    }
}

pub struct ErrorContext {
    pub error: AppError,
    pub severity: ErrorSeverity,
    pub context: String,
}

impl ErrorContext {
    pub fn new(error: AppError, context: impl Into<String>) -> Self {
        let severity = error.severity();
        Self {
            error,
            severity,
            context: context.into(),
        }
    }

    pub fn should_notify_user(&self) -> bool {
        matches!(self.severity, ErrorSeverity::Fatal | ErrorSeverity::Recoverable)
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}
