use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Batch error
pub enum BatchError {
    /// The requested number of contacts is zero or negative.
    #[error("Invalid count {0}: must be positive")]
    InvalidCount(i64),

    /// The requested number of contacts is above the configured maximum.
    #[error("Count {requested} exceeds the maximum of {max} contacts")]
    CountExceedsMaximum { requested: i64, max: i64 },

    #[error("ProfileGenerator from: {0}")]
    ItemReader(String),

    #[error("ContactSink from: {0}")]
    ItemWriter(String),

    /// Any other fault that aborts a run.
    #[error("Unexpected fault: {0}")]
    UnexpectedFault(String),
}

impl BatchError {
    /// Whether the error was raised while validating a request, before any
    /// contact was generated.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BatchError::InvalidCount(_) | BatchError::CountExceedsMaximum { .. }
        )
    }
}
