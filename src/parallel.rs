//! Parallel evaluation over a face list.
//!
//! Residual evaluations are independent between faces, but one scheme
//! instance must never be shared by two threads mid-call because it reuses
//! its scratch buffers. [`compute_face_residuals_parallel`] therefore gives
//! each rayon worker its own [`GeneralRoeFlux`] and fans the faces out with
//! `par_chunks_mut`, writing every face's residual into its own output row.
//!
//! Only the explicit residual path is offered here; implicit assembly
//! scatters into a shared system matrix and belongs to the outer solver.

use rayon::prelude::*;

use crate::config::{SchemeConfig, TimeIntegration};
use crate::error::NumericsError;
use crate::scheme::{GeneralRoeFlux, ResidualBuffers, ResidualScheme, SchemeContext};
use crate::state::{check_dimension, n_var, FaceState, MAX_DIM};

/// One interior face: the two adjacent states and the area-scaled normal.
#[derive(Clone, Copy, Debug)]
pub struct FacePair {
    /// State on the owning side.
    pub left: FaceState,
    /// State on the neighbouring side.
    pub right: FaceState,
    /// Face normal; only the first `n_dim` entries are read.
    pub normal: [f64; MAX_DIM],
}

/// Evaluate the explicit Roe residual of every face in parallel.
///
/// `residuals` is a flat buffer of `faces.len() * (n_dim + 2)` values,
/// one row per face.
pub fn compute_face_residuals_parallel(
    n_dim: usize,
    config: &SchemeConfig,
    faces: &[FacePair],
    residuals: &mut [f64],
) -> Result<(), NumericsError> {
    check_dimension(n_dim)?;
    let n_var = n_var(n_dim);
    if residuals.len() != faces.len() * n_var {
        return Err(NumericsError::DimensionMismatch {
            what: "residual storage",
            expected: faces.len() * n_var,
            got: residuals.len(),
        });
    }

    let explicit = config.with_time_integration(TimeIntegration::RungeKutta);

    residuals
        .par_chunks_mut(n_var)
        .zip(faces.par_iter())
        .try_for_each_init(
            || GeneralRoeFlux::new(n_dim, &explicit),
            |scheme, (row, face)| {
                let scheme = scheme.as_mut().map_err(|e| *e)?;
                let ctx = SchemeContext::face(&face.left, &face.right, &face.normal[..n_dim]);
                let mut out = ResidualBuffers::explicit_only(row);
                scheme.compute_residual(&ctx, &mut out)
            },
        )
}
