//! Error types for PDF generation

use thiserror::Error;

use nbreport_core::CoreError;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during PDF generation
#[derive(Error, Debug)]
pub enum PdfError {
    /// Configured command string has no program
    #[error("No command configured for the {0}")]
    EmptyCommand(&'static str),

    /// Child process could not be started
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Program not found on the search path
    #[error("{tool} not found: `{program}` is not on PATH")]
    ToolNotFound { tool: &'static str, program: String },

    /// External step finished unsuccessfully
    #[error("{step} step failed ({})\n{log}", exit_label(.exit_code))]
    StepFailed {
        step: &'static str,
        exit_code: Option<i32>,
        log: String,
    },

    /// Rewrite, config or cleanup error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_message() {
        let err = PdfError::StepFailed {
            step: "convert",
            exit_code: Some(1),
            log: "No such file".to_string(),
        };
        assert_eq!(err.to_string(), "convert step failed (exit code 1)\nNo such file");
    }

    #[test]
    fn test_signal_message() {
        let err = PdfError::StepFailed {
            step: "compile",
            exit_code: None,
            log: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
