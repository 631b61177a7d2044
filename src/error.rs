use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Why a submitted URL was rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    Empty,
    UnrecognizedUrl,
}

impl std::fmt::Display for InputProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputProblem::Empty => f.write_str("Please enter a YouTube URL."),
            InputProblem::UnrecognizedUrl => {
                f.write_str("Invalid YouTube URL. Please check and try again.")
            }
        }
    }
}

/// User-facing failures of the summary workflow.
///
/// The `Display` text of every variant is the exact message shown to the
/// user. Raw transport or provider errors never end up in here; the
/// resolver and generator log them and map them onto one of these kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("{0}")]
    InvalidInput(InputProblem),

    #[error("Video not found. Please check the URL. The video may be private, age-restricted, or deleted.")]
    MetadataNotFound,

    #[error("Could not connect to the video details service (Status: {status}). Please try again later.")]
    MetadataServiceUnreachable { status: u16 },

    #[error("Could not retrieve complete details for this video. Please ensure it's a valid YouTube video URL.")]
    MetadataIncomplete,

    #[error("Summary generation was blocked. This may be due to the video's content violating safety policies.")]
    GenerationBlocked,

    #[error("The AI was unable to generate a summary. This can happen if the video is not well-documented online or has no public transcript.")]
    GenerationEmpty,

    #[error("The AI service is not configured correctly. Please contact support.")]
    ServiceMisconfigured,

    #[error("Failed to generate summary. The AI service may be temporarily unavailable.")]
    ServiceUnavailable,

    #[error("An unexpected error occurred while fetching video details. Please check your internet connection and the URL.")]
    UnexpectedError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_messages_depend_on_problem() {
        assert_eq!(
            SummaryError::InvalidInput(InputProblem::Empty).to_string(),
            "Please enter a YouTube URL."
        );
        assert!(SummaryError::InvalidInput(InputProblem::UnrecognizedUrl)
            .to_string()
            .starts_with("Invalid YouTube URL"));
    }

    #[test]
    fn unreachable_message_carries_status() {
        let message = SummaryError::MetadataServiceUnreachable { status: 503 }.to_string();
        assert!(message.contains("(Status: 503)"));
    }

    #[test]
    fn summary_errors_pass_through_app_error_unchanged() {
        let err: AppError = SummaryError::GenerationBlocked.into();
        assert_eq!(err.to_string(), SummaryError::GenerationBlocked.to_string());
    }
}
