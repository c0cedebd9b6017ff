//! Error types for HaloMass

use thiserror::Error;

/// HaloMass error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input-shape error (lengths, monotonicity, support), detected before any numerical work
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value outside the domain of a stage (non-positive mass, radius, sigma^2, ...)
    #[error("Domain error in {stage} at index {index}: {message}")]
    Domain {
        /// Pipeline stage that rejected the value
        stage: &'static str,
        /// Offending element of the batch (0 for scalar inputs)
        index: usize,
        /// What was wrong
        message: String,
    },

    /// Adaptive quadrature did not reach the requested tolerance
    #[error("Integration did not converge in {stage} at index {index}: {message}")]
    Convergence {
        /// Pipeline stage that ran the integral
        stage: &'static str,
        /// Element of the batch being integrated
        index: usize,
        /// Solver diagnostics
        message: String,
    },
}

impl Error {
    /// Domain error for element `index` of `stage`.
    pub fn domain(stage: &'static str, index: usize, message: impl Into<String>) -> Self {
        Self::Domain { stage, index, message: message.into() }
    }

    /// Attach a stage and batch index to a bare convergence failure.
    pub fn convergence(stage: &'static str, index: usize, message: impl Into<String>) -> Self {
        Self::Convergence { stage, index, message: message.into() }
    }

    /// Re-label the stage/index of a positional error.
    ///
    /// Used when an inner batch (e.g. the three-point finite-difference
    /// stencil) maps back onto the caller's indices.
    pub fn reindex(self, stage: &'static str, index: usize) -> Self {
        match self {
            Self::Domain { message, .. } => Self::Domain { stage, index, message },
            Self::Convergence { message, .. } => Self::Convergence { stage, index, message },
            other => other,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_message_names_stage_and_index() {
        let err = Error::domain("sigma2_at_r", 3, "radius must be > 0, got -1");
        let msg = err.to_string();
        assert!(msg.contains("sigma2_at_r"));
        assert!(msg.contains("index 3"));
    }

    #[test]
    fn test_reindex_keeps_message() {
        let err = Error::convergence("quadrature", 0, "budget exhausted").reindex("dndm_at_m", 7);
        match err {
            Error::Convergence { stage, index, message } => {
                assert_eq!(stage, "dndm_at_m");
                assert_eq!(index, 7);
                assert_eq!(message, "budget exhausted");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reindex_leaves_validation_alone() {
        let err = Error::Validation("bad".into()).reindex("x", 1);
        assert!(matches!(err, Error::Validation(_)));
    }
}
