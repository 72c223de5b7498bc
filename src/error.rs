//! Error types for scheme configuration and input validation.
//!
//! Only configuration misuse is reported through these errors: wrong spatial
//! dimension, mismatched buffer lengths, or missing inputs for the selected
//! mode. Physically degenerate states (loss of hyperbolicity at a face) are
//! *not* errors — they are recovered locally with a zeroed residual and
//! counted in [`FluxDiagnostics`](crate::diagnostics::FluxDiagnostics).

use thiserror::Error;

/// Error type for flux/residual scheme evaluation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumericsError {
    /// Spatial dimension other than 2 or 3.
    #[error("unsupported spatial dimension {0} (expected 2 or 3)")]
    UnsupportedDimension(usize),

    /// A state vector or buffer does not match the configured dimension.
    #[error("{what}: expected length {expected}, got {got}")]
    DimensionMismatch {
        /// Which input failed validation.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// A face flux evaluation was requested without both states and a normal.
    #[error("face flux evaluation requires left/right states and a face normal")]
    MissingFaceInputs,

    /// Implicit time integration was selected but Jacobian buffers are absent.
    #[error("implicit time integration requires both Jacobian output buffers")]
    MissingJacobians,

    /// The grid is flagged dynamic but a face state carries no grid velocity.
    #[error("dynamic grid enabled but grid velocity missing on a face state")]
    MissingGridVelocity,

    /// The conservative adjoint source needs two partial residuals.
    #[error("conservative adjoint source requires two partial residual vectors")]
    MissingPartialResiduals,
}
