//! Cell source-term integrators.
//!
//! Lightweight siblings of the face flux schemes sharing the same
//! [`ResidualScheme`] contract. Both write only the residual; neither
//! contributes a Jacobian.

use crate::error::NumericsError;
use crate::scheme::{ResidualBuffers, ResidualScheme, SchemeContext};
use crate::state::{check_dimension, n_var};
use crate::tape::TapeRecorder;

/// Body-force source term.
///
/// Emits a fixed residual vector per cell; scaling by the cell volume is the
/// caller's responsibility. Stateless apart from the stored force vector.
pub struct BodyForceSource {
    n_var: usize,
    force: Vec<f64>,
}

impl BodyForceSource {
    /// Create a body-force source for the given dimension.
    ///
    /// `force` must have length `n_dim + 2`, ordered
    /// [density, momentum × n_dim, energy].
    pub fn new(n_dim: usize, force: &[f64]) -> Result<Self, NumericsError> {
        check_dimension(n_dim)?;
        let n_var = n_var(n_dim);
        if force.len() != n_var {
            return Err(NumericsError::DimensionMismatch {
                what: "body force vector",
                expected: n_var,
                got: force.len(),
            });
        }
        Ok(Self {
            n_var,
            force: force.to_vec(),
        })
    }
}

impl ResidualScheme for BodyForceSource {
    fn compute_residual_recorded(
        &mut self,
        _ctx: &SchemeContext<'_>,
        tape: &mut dyn TapeRecorder,
        out: &mut ResidualBuffers<'_>,
    ) -> Result<(), NumericsError> {
        if out.residual.len() != self.n_var {
            return Err(NumericsError::DimensionMismatch {
                what: "residual buffer",
                expected: self.n_var,
                got: out.residual.len(),
            });
        }
        tape.begin();
        tape.record_input(&self.force);
        out.residual.copy_from_slice(&self.force);
        tape.record_output(out.residual);
        tape.end();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "body_force"
    }
}

/// Conservative source term for the continuous adjoint equations.
///
/// The PDE-specific partial residuals are computed externally from mean
/// primitive-variable gradients; this integrator supplies the conservative
/// blend of the two contributions.
pub struct ConservativeAdjointSource {
    n_var: usize,
    mean: Vec<f64>,
}

impl ConservativeAdjointSource {
    /// Create the integrator for the given dimension.
    pub fn new(n_dim: usize) -> Result<Self, NumericsError> {
        check_dimension(n_dim)?;
        let n_var = n_var(n_dim);
        Ok(Self {
            n_var,
            mean: vec![0.0; n_var],
        })
    }
}

impl ResidualScheme for ConservativeAdjointSource {
    fn compute_residual_recorded(
        &mut self,
        ctx: &SchemeContext<'_>,
        tape: &mut dyn TapeRecorder,
        out: &mut ResidualBuffers<'_>,
    ) -> Result<(), NumericsError> {
        let (left, right) = ctx
            .partial_residuals
            .ok_or(NumericsError::MissingPartialResiduals)?;
        for (what, got) in [
            ("left partial residual", left.len()),
            ("right partial residual", right.len()),
            ("residual buffer", out.residual.len()),
        ] {
            if got != self.n_var {
                return Err(NumericsError::DimensionMismatch {
                    what,
                    expected: self.n_var,
                    got,
                });
            }
        }

        tape.begin();
        tape.record_input(left);
        tape.record_input(right);
        for k in 0..self.n_var {
            self.mean[k] = 0.5 * (left[k] + right[k]);
        }
        out.residual.copy_from_slice(&self.mean);
        tape.record_output(out.residual);
        tape.end();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "conservative_adjoint"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-15;

    #[test]
    fn test_body_force_copies_vector() {
        let mut source = BodyForceSource::new(2, &[0.0, 0.3, -0.1, 0.05]).unwrap();
        let mut residual = [1.0; 4];
        let ctx = SchemeContext::cell();
        let mut out = ResidualBuffers::explicit_only(&mut residual);
        source.compute_residual(&ctx, &mut out).unwrap();

        assert_eq!(residual, [0.0, 0.3, -0.1, 0.05]);
    }

    #[test]
    fn test_body_force_rejects_wrong_length() {
        assert!(BodyForceSource::new(2, &[0.0; 5]).is_err());
        assert!(BodyForceSource::new(3, &[0.0; 5]).is_ok());
    }

    #[test]
    fn test_conservative_adjoint_blends() {
        let mut source = ConservativeAdjointSource::new(2).unwrap();
        let left = [1.0, 2.0, 3.0, 4.0];
        let right = [3.0, 2.0, 1.0, 0.0];
        let mut residual = [0.0; 4];
        let ctx = SchemeContext::cell().with_partial_residuals(&left, &right);
        let mut out = ResidualBuffers::explicit_only(&mut residual);
        source.compute_residual(&ctx, &mut out).unwrap();

        for (r, e) in residual.iter().zip([2.0, 2.0, 2.0, 2.0]) {
            assert!((r - e).abs() < TOL);
        }
    }

    #[test]
    fn test_conservative_adjoint_requires_partials() {
        let mut source = ConservativeAdjointSource::new(2).unwrap();
        let mut residual = [0.0; 4];
        let ctx = SchemeContext::cell();
        let mut out = ResidualBuffers::explicit_only(&mut residual);

        assert_eq!(
            source.compute_residual(&ctx, &mut out),
            Err(NumericsError::MissingPartialResiduals)
        );
    }
}
