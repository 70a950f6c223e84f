//! Error taxonomy for the rollover workflow.

use thiserror::Error;

use crate::core::types::Stage;

/// Input contract violation on an issue title.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("malformed weekly title '{title}' (expected Weekly-<number>)")]
    MalformedTitle { title: String },
    #[error("period {number} out of range (1..={max})")]
    PeriodOutOfRange { number: u64, max: u32 },
}

/// Broad classification of a failure, independent of the stage it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedTitle,
    Tracker,
    Store,
    Generator,
}

/// A rollover failure: the stage that failed plus the underlying cause.
#[derive(Debug, Error)]
#[error("rollover failed at {stage}: {cause:#}")]
pub struct RolloverError {
    pub stage: Stage,
    pub kind: ErrorKind,
    #[source]
    pub cause: anyhow::Error,
}

impl RolloverError {
    pub fn new(stage: Stage, kind: ErrorKind, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            kind,
            cause: cause.into(),
        }
    }

    pub fn malformed_title(cause: IdentityError) -> Self {
        Self::new(Stage::ParseTitle, ErrorKind::MalformedTitle, cause)
    }

    pub fn tracker(stage: Stage, cause: anyhow::Error) -> Self {
        Self::new(stage, ErrorKind::Tracker, cause)
    }

    pub fn store(stage: Stage, cause: anyhow::Error) -> Self {
        Self::new(stage, ErrorKind::Store, cause)
    }

    pub fn generator(stage: Stage, cause: anyhow::Error) -> Self {
        Self::new(stage, ErrorKind::Generator, cause)
    }
}
