//! Residual scheme abstraction.
//!
//! Every numerics object — the upwind face flux and the cell source
//! integrators — shares one contract: given a per-evaluation input context,
//! write a residual (and, for implicit face schemes, two Jacobians) into
//! caller-owned buffers. Scheme instances own their scratch storage, sized
//! once at construction, so a single instance must not be shared between
//! threads mid-evaluation; create one per worker instead.
//!
//! # Example
//! ```
//! use fv_rs::config::SchemeConfig;
//! use fv_rs::scheme::{GeneralRoeFlux, ResidualBuffers, ResidualScheme, SchemeContext};
//! use fv_rs::state::FaceState;
//!
//! let mut scheme = GeneralRoeFlux::new(2, &SchemeConfig::default()).unwrap();
//! let state = FaceState::from_pressure_derivatives(
//!     1.0, &[0.5, 0.0], 1.0 / 1.4, 2.625, 0.4 * 25.0 / 14.0, 0.4,
//! );
//! let normal = [1.0, 0.0];
//! let mut residual = [0.0; 4];
//!
//! let ctx = SchemeContext::face(&state, &state, &normal);
//! let mut out = ResidualBuffers::explicit_only(&mut residual);
//! scheme.compute_residual(&ctx, &mut out).unwrap();
//! assert!((residual[0] - 0.5).abs() < 1e-12);
//! ```

mod roe;
mod sources;

pub use roe::GeneralRoeFlux;
pub use sources::{BodyForceSource, ConservativeAdjointSource};

use crate::config::SchemeConfig;
use crate::error::NumericsError;
use crate::matrix::SquareMatrix;
use crate::state::FaceState;
use crate::tape::{NoTape, TapeRecorder};

/// Inputs for one residual evaluation.
///
/// Face schemes read `states` and `normal`; the conservative adjoint source
/// reads `partial_residuals`. Missing required inputs fail fast with a
/// configuration error rather than silently producing zeros.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemeContext<'a> {
    /// Left/right face states for a face flux evaluation.
    pub states: Option<(&'a FaceState, &'a FaceState)>,
    /// Face normal; magnitude is the face area.
    pub normal: Option<&'a [f64]>,
    /// Two already-computed partial residuals for conservative averaging.
    pub partial_residuals: Option<(&'a [f64], &'a [f64])>,
}

impl<'a> SchemeContext<'a> {
    /// Context for a face flux evaluation.
    pub fn face(left: &'a FaceState, right: &'a FaceState, normal: &'a [f64]) -> Self {
        Self {
            states: Some((left, right)),
            normal: Some(normal),
            partial_residuals: None,
        }
    }

    /// Context for a cell source evaluation.
    pub fn cell() -> Self {
        Self::default()
    }

    /// Attach two partial residual contributions.
    pub fn with_partial_residuals(mut self, left: &'a [f64], right: &'a [f64]) -> Self {
        self.partial_residuals = Some((left, right));
        self
    }

    pub(crate) fn face_inputs(
        &self,
    ) -> Result<(&'a FaceState, &'a FaceState, &'a [f64]), NumericsError> {
        match (self.states, self.normal) {
            (Some((left, right)), Some(normal)) => Ok((left, right, normal)),
            _ => Err(NumericsError::MissingFaceInputs),
        }
    }
}

/// Caller-owned output buffers, written in place.
pub struct ResidualBuffers<'a> {
    /// Residual vector, length `n_dim + 2`.
    pub residual: &'a mut [f64],
    /// ∂residual/∂U at the left state; required in implicit mode.
    pub jacobian_left: Option<&'a mut SquareMatrix>,
    /// ∂residual/∂U at the right state; required in implicit mode.
    pub jacobian_right: Option<&'a mut SquareMatrix>,
}

impl<'a> ResidualBuffers<'a> {
    /// Buffers for an explicit evaluation (residual only).
    pub fn explicit_only(residual: &'a mut [f64]) -> Self {
        Self {
            residual,
            jacobian_left: None,
            jacobian_right: None,
        }
    }

    /// Buffers for an implicit evaluation (residual and both Jacobians).
    pub fn with_jacobians(
        residual: &'a mut [f64],
        jacobian_left: &'a mut SquareMatrix,
        jacobian_right: &'a mut SquareMatrix,
    ) -> Self {
        Self {
            residual,
            jacobian_left: Some(jacobian_left),
            jacobian_right: Some(jacobian_right),
        }
    }
}

/// Common contract of all residual schemes.
///
/// Implementations are pure with respect to their inputs and write only into
/// the supplied buffers; no state is carried between faces beyond scratch
/// storage and diagnostics counters.
pub trait ResidualScheme: Send {
    /// Evaluate the residual, declaring the differentiation boundary on
    /// `tape`.
    fn compute_residual_recorded(
        &mut self,
        ctx: &SchemeContext<'_>,
        tape: &mut dyn TapeRecorder,
        out: &mut ResidualBuffers<'_>,
    ) -> Result<(), NumericsError>;

    /// Evaluate the residual without recording.
    fn compute_residual(
        &mut self,
        ctx: &SchemeContext<'_>,
        out: &mut ResidualBuffers<'_>,
    ) -> Result<(), NumericsError> {
        self.compute_residual_recorded(ctx, &mut NoTape, out)
    }

    /// Scheme name for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Scheme selection for configuration-driven construction.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemeKind {
    /// Generalized Roe upwind face flux.
    GeneralRoe,
    /// Body-force cell source with the given residual vector.
    BodyForce(Vec<f64>),
    /// Conservative averaging of two partial adjoint residuals.
    ConservativeAdjoint,
}

/// Create a boxed scheme from a kind and configuration.
///
/// Useful when the scheme is selected at runtime from solver configuration.
pub fn create_scheme(
    kind: SchemeKind,
    n_dim: usize,
    config: &SchemeConfig,
) -> Result<Box<dyn ResidualScheme>, NumericsError> {
    match kind {
        SchemeKind::GeneralRoe => Ok(Box::new(GeneralRoeFlux::new(n_dim, config)?)),
        SchemeKind::BodyForce(force) => Ok(Box::new(BodyForceSource::new(n_dim, &force)?)),
        SchemeKind::ConservativeAdjoint => Ok(Box::new(ConservativeAdjointSource::new(n_dim)?)),
    }
}
