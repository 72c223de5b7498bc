//! Flux kernels for the compressible Euler equations.
//!
//! Stateless, per-call building blocks used by the upwind schemes:
//! - [`inviscid_projected_flux`]: Euler flux dotted with an area-scaled normal
//! - [`inviscid_flux_jacobian`]: exact Jacobian w.r.t. conservative variables
//! - [`p_matrix`] / [`p_matrix_inverse`]: eigenvector matrices of the
//!   projected Jacobian, generalized to a chi/kappa equation-of-state closure
//! - [`roe_average`]: density-weighted interface state for the Roe
//!   linearization

pub mod eigen;
pub mod projected;
pub mod roe_average;

pub use eigen::{p_matrix, p_matrix_inverse};
pub use projected::{inviscid_flux_jacobian, inviscid_projected_flux};
pub use roe_average::{roe_average, RoeAverage};
