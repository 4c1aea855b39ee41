use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the dataset or the narrative script.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("step {step}: unknown chart identifier `{chart}`")]
    UnknownChart { step: usize, chart: String },

    #[error("step {step}: unknown highlight identifier `{highlight}`")]
    UnknownHighlight { step: usize, highlight: String },

    #[error("step {step}: highlight `{highlight}` does not belong to {chart}")]
    HighlightMismatch {
        step: usize,
        chart: &'static str,
        highlight: &'static str,
    },

    #[error("story has no steps")]
    EmptyStory,
}

pub type Result<T, E = StoryError> = std::result::Result<T, E>;
