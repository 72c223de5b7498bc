//! # fv-rs
//!
//! Numerical flux and residual building blocks for density-based
//! finite-volume compressible-flow solvers.
//!
//! This crate provides the per-face and per-cell numerics of an
//! Euler/Navier-Stokes discretization:
//! - Projected inviscid flux and its exact Jacobian for a general
//!   (non-ideal) equation of state
//! - Eigenvector matrices of the projected flux Jacobian
//! - Roe-averaged interface states
//! - A generalized Roe upwind scheme with entropy-fix policies, explicit
//!   and implicit (Jacobian-assembling) residual paths, and ALE grid-motion
//!   corrections
//! - Body-force and conservative-adjoint source integrators
//! - A recording boundary for external reverse-mode differentiation
//!
//! Mesh handling, time integration, and linear solvers are deliberately out
//! of scope; the caller loops over faces and owns all output buffers.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flux;
pub mod matrix;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod scheme;
pub mod state;
pub mod tape;

// Re-export main types for convenience
pub use config::{EntropyFixPolicy, RoeAveragePolicy, SchemeConfig, TimeIntegration};
pub use diagnostics::FluxDiagnostics;
pub use error::NumericsError;
pub use flux::{
    inviscid_flux_jacobian, inviscid_projected_flux, p_matrix, p_matrix_inverse, roe_average,
    RoeAverage,
};
pub use matrix::SquareMatrix;
pub use scheme::{
    create_scheme, BodyForceSource, ConservativeAdjointSource, GeneralRoeFlux, ResidualBuffers,
    ResidualScheme, SchemeContext, SchemeKind,
};
pub use state::{FaceState, SideQuantities, MAX_DIM, MAX_VAR};
pub use tape::{NoTape, TapeRecorder};

#[cfg(feature = "parallel")]
pub use parallel::{compute_face_residuals_parallel, FacePair};
