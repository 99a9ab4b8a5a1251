//! Error taxonomy for discovery, sequence resolution and launching.

use std::path::PathBuf;

/// Errors raised by the action core.
///
/// `Configuration` aborts discovery. `Translation` must reach the caller of a
/// request. Every other variant is converted into an unsuccessful
/// `{success, message}` result at the operation boundary.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(
        "First part \"{root}\" of expression \"{expression}\" must match exactly to an existing entry on the filesystem."
    )]
    Configuration { root: String, expression: String },

    #[error("Invalid segment pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("DJV View - Filename has more than one sequence identifier.")]
    MultipleSequenceMarkers,

    #[error("DJV View - Unsupported frame padding in sequence identifier '{0}'.")]
    InvalidSequenceDirective(String),

    #[error("Unable to list sequence directory {path:?}: {source}")]
    SequenceScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to translate entity type: {0}.")]
    Translation(String),

    #[error("There are no Asset Versions to open.")]
    NoReviewableContent,

    #[error("No DJV View installation was discovered.")]
    NoApplication,

    #[error("Catalog lookup failed: {0}")]
    Catalog(String),
}

impl ActionError {
    /// True for faults that must cross the request boundary unconverted.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, ActionError::Translation(_))
    }
}

pub type Result<T, E = ActionError> = std::result::Result<T, E>;
