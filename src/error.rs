use thiserror::Error;

/// Main error type for the import engine.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum BoqImportError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Workbook module errors
    #[error("{0}")]
    WorkbookError(#[from] crate::workbook::WorkbookError),

    // Mapping module errors
    #[error("{0}")]
    FieldTableError(#[from] crate::mapping::FieldTableError),

    // Session module errors
    #[error("{0}")]
    SessionError(#[from] crate::session::SessionError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, BoqImportError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| BoqImportError::WithContextError(format!("{}: {}", message, e)))
    }
}
