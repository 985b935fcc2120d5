use thiserror::Error;

/// Unified error type for version-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unable to determine the current version. Checked: {0}")]
    VersionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot prompt for a version: the interactive interface is disabled")]
    InterfaceDisabled,

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Failed to parse manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("Git working tree is not clean:\n{0}")]
    DirtyWorkingTree(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid operation state: {0}")]
    State(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in version-bump
pub type Result<T> = std::result::Result<T, BumpError>;

/// Process exit status reported by the `bump` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    FatalError = 1,
    InvalidArgument = 9,
}

impl BumpError {
    /// Create an invalid version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        BumpError::InvalidVersion(msg.into())
    }

    /// Create an invalid argument error with context
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BumpError::InvalidArgument(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// Create an external command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        BumpError::Command(msg.into())
    }

    /// Create a manifest parse error for the given file
    pub fn manifest(path: impl Into<String>, msg: impl Into<String>) -> Self {
        BumpError::Manifest {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a state transition error with context
    pub fn state(msg: impl Into<String>) -> Self {
        BumpError::State(msg.into())
    }

    /// Exit code the CLI reports for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            BumpError::InvalidVersion(_) | BumpError::InvalidArgument(_) => {
                ExitCode::InvalidArgument
            }
            _ => ExitCode::FatalError,
        }
    }
}
