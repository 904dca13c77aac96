//! Composition error types.

use thiserror::Error;

use pvid_models::PlanError;

pub type ComposeResult<T> = Result<T, ComposeError>;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// Narration is the required asset; composition cannot proceed
    /// without a positive narration duration.
    #[error("Invalid narration duration: {0}")]
    InvalidNarration(f64),

    /// A computed window fell outside the total duration. Unreachable
    /// given correct trimming logic; reaching it is an engine defect.
    #[error("Composition invariant violated: {0}")]
    InvariantViolation(#[from] PlanError),
}
