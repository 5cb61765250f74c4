//! Application and repository error types.
//!
//! Exit codes:
//! - `2` usage, configuration, or input file problems
//! - `3` invalid selections or an ambiguous resolution under a strict policy
//! - `4` data source failures

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure reported by a series repository.
///
/// `Request` failures are scoped to one query and the resolver degrades around
/// them. `Unreachable` means the whole data source is gone and the computation
/// cannot continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    Unreachable(String),
    Request(String),
}

impl RepositoryError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, RepositoryError::Unreachable(_))
    }
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::Unreachable(msg) => write!(f, "data source unreachable: {msg}"),
            RepositoryError::Request(msg) => write!(f, "data source request failed: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::new(4, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_data_source_exit_code() {
        let err: AppError = RepositoryError::Unreachable("connection refused".to_string()).into();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "data source unreachable: connection refused");
    }

    #[test]
    fn only_unreachable_is_fatal() {
        assert!(RepositoryError::Unreachable(String::new()).is_fatal());
        assert!(!RepositoryError::Request(String::new()).is_fatal());
    }
}
