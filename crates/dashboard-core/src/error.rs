use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the returns dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A column the pipeline cannot work without is absent from the upload.
    /// Row-level problems are absorbed during normalization; a missing
    /// column is the one schema fault the operator must fix in the file.
    #[error("Required column '{0}' not found in the uploaded file")]
    MissingColumn(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A spreadsheet workbook could not be opened or its first sheet read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Delimited text input could not be read.
    #[error("Delimited input error: {0}")]
    Delimited(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_column() {
        let err = DashboardError::MissingColumn("VALOR".to_string());
        let msg = err.to_string();
        assert_eq!(msg, "Required column 'VALOR' not found in the uploaded file");
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/some/returns.xlsx"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/returns.xlsx"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_spreadsheet() {
        let err = DashboardError::Spreadsheet("workbook contains no sheets".to_string());
        let msg = err.to_string();
        assert_eq!(msg, "Spreadsheet error: workbook contains no sheets");
    }

    #[test]
    fn test_error_display_delimited() {
        let err = DashboardError::Delimited("unterminated quote".to_string());
        let msg = err.to_string();
        assert_eq!(msg, "Delimited input error: unterminated quote");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        let msg = err.to_string();
        assert!(msg.contains("denied"));
    }
}
