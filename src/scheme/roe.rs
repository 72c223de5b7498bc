//! Generalized Roe upwind flux scheme.
//!
//! Computes the face residual of a density-based finite-volume
//! discretization from the primitive states on both sides of a face:
//!
//!   R = ½(F_i + F_j)·N − ½ Σ_k |λ_k| α_k p_k · |N|
//!
//! where the eigenvalues λ, wave strengths α and right eigenvectors p come
//! from the Roe-averaged interface state. The formulation is parameterized
//! by the chi/kappa equation-of-state closure, so it applies beyond
//! calorically perfect gases. In implicit mode the dissipation is built from
//! the full |A| = P·|Λ|·P⁻¹ and the exact flux Jacobians of both sides are
//! accumulated for the Newton linearization.
//!
//! Wave ordering: in 2D the strengths decompose into
//! [density, tangential-velocity, acoustic+, acoustic−]; 3D adds a second
//! tangential component ahead of the acoustic pair. The acoustic waves
//! always occupy the slots `n_var − 2` and `n_var − 1`.
//!
//! One instance holds scratch buffers sized at construction and is therefore
//! not safe for concurrent evaluation; use one instance per worker thread.

use crate::config::{EntropyFixPolicy, RoeAveragePolicy, SchemeConfig};
use crate::diagnostics::FluxDiagnostics;
use crate::error::NumericsError;
use crate::flux::{
    inviscid_flux_jacobian, inviscid_projected_flux, p_matrix, p_matrix_inverse, roe_average,
};
use crate::matrix::SquareMatrix;
use crate::scheme::{ResidualBuffers, ResidualScheme, SchemeContext};
use crate::state::{check_dimension, FaceState, SideQuantities, MAX_DIM, MAX_VAR};
use crate::tape::TapeRecorder;

/// Roe approximate Riemann solver for a general equation of state.
pub struct GeneralRoeFlux {
    n_dim: usize,
    n_var: usize,
    implicit: bool,
    dynamic_grid: bool,
    blend: f64,
    entropy_fix_coeff: f64,
    entropy_fix: EntropyFixPolicy,
    roe_average_policy: RoeAveragePolicy,
    diagnostics: FluxDiagnostics,
    // Scratch storage, sized once; reused across evaluations.
    proj_flux_i: Vec<f64>,
    proj_flux_j: Vec<f64>,
    lambda: Vec<f64>,
    delta_wave: Vec<f64>,
    diff_u: Vec<f64>,
    p: SquareMatrix,
    inv_p: SquareMatrix,
}

impl GeneralRoeFlux {
    /// Create a scheme for the given spatial dimension.
    pub fn new(n_dim: usize, config: &SchemeConfig) -> Result<Self, NumericsError> {
        check_dimension(n_dim)?;
        let n_var = n_dim + 2;
        Ok(Self {
            n_dim,
            n_var,
            implicit: config.time_integration.is_implicit(),
            dynamic_grid: config.dynamic_grid,
            blend: config.roe_kappa,
            entropy_fix_coeff: config.entropy_fix_coeff,
            entropy_fix: config.entropy_fix,
            roe_average_policy: config.roe_average,
            diagnostics: FluxDiagnostics::default(),
            proj_flux_i: vec![0.0; n_var],
            proj_flux_j: vec![0.0; n_var],
            lambda: vec![0.0; n_var],
            delta_wave: vec![0.0; n_var],
            diff_u: vec![0.0; n_var],
            p: SquareMatrix::zeros(n_var),
            inv_p: SquareMatrix::zeros(n_var),
        })
    }

    /// Spatial dimension the scheme was built for.
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Number of conserved variables.
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    /// Counters accumulated since construction or the last reset.
    pub fn diagnostics(&self) -> FluxDiagnostics {
        self.diagnostics
    }

    /// Reset the diagnostics counters.
    pub fn reset_diagnostics(&mut self) {
        self.diagnostics.reset();
    }

    fn validate(
        &self,
        left: &FaceState,
        right: &FaceState,
        normal: &[f64],
        residual_len: usize,
    ) -> Result<(), NumericsError> {
        for (what, got) in [
            ("left state velocity", left.n_dim()),
            ("right state velocity", right.n_dim()),
            ("face normal", normal.len()),
        ] {
            if got != self.n_dim {
                return Err(NumericsError::DimensionMismatch {
                    what,
                    expected: self.n_dim,
                    got,
                });
            }
        }
        if residual_len != self.n_var {
            return Err(NumericsError::DimensionMismatch {
                what: "residual buffer",
                expected: self.n_var,
                got: residual_len,
            });
        }
        Ok(())
    }

    fn record_inputs(
        &self,
        tape: &mut dyn TapeRecorder,
        left: &FaceState,
        right: &FaceState,
        normal: &[f64],
    ) {
        for state in [left, right] {
            tape.record_input(&[state.density]);
            tape.record_input(&state.velocity[..self.n_dim]);
            tape.record_input(&[state.pressure, state.enthalpy, state.chi, state.kappa]);
        }
        tape.record_input(normal);
        if self.dynamic_grid {
            for state in [left, right] {
                if let Some(w) = &state.grid_velocity {
                    tape.record_input(&w[..self.n_dim]);
                }
            }
        }
    }

    /// Limit the signed eigenvalues in place, leaving non-negative values.
    fn apply_entropy_fix(
        &mut self,
        proj_vel: f64,
        proj_vel_i: f64,
        proj_vel_j: f64,
        sound_speed: f64,
        sound_speed_i: f64,
        sound_speed_j: f64,
    ) {
        let n_var = self.n_var;
        match self.entropy_fix {
            EntropyFixPolicy::MaxWave => {
                let floor = self.entropy_fix_coeff * (proj_vel.abs() + sound_speed);
                for lambda in &mut self.lambda {
                    *lambda = lambda.abs().max(floor);
                }
            }
            EntropyFixPolicy::Absolute => {
                for lambda in &mut self.lambda {
                    *lambda = lambda.abs();
                }
            }
            EntropyFixPolicy::HartenHyman => {
                for k in 0..n_var {
                    let (low, high) = if k < self.n_dim {
                        (proj_vel_i, proj_vel_j)
                    } else if k == n_var - 2 {
                        (proj_vel_i + sound_speed_i, proj_vel_j + sound_speed_j)
                    } else {
                        (proj_vel_i - sound_speed_i, proj_vel_j - sound_speed_j)
                    };
                    let lambda = self.lambda[k];
                    let eps = 4.0 * 0.0f64.max((lambda - low).max(high - lambda));
                    self.lambda[k] = if lambda.abs() < eps {
                        (lambda * lambda + eps * eps) / (2.0 * eps)
                    } else {
                        lambda.abs()
                    };
                }
            }
        }
    }
}

impl ResidualScheme for GeneralRoeFlux {
    fn compute_residual_recorded(
        &mut self,
        ctx: &SchemeContext<'_>,
        tape: &mut dyn TapeRecorder,
        out: &mut ResidualBuffers<'_>,
    ) -> Result<(), NumericsError> {
        let (left, right, normal) = ctx.face_inputs()?;
        self.validate(left, right, normal, out.residual.len())?;

        // Fail fast on missing buffers/inputs before anything is recorded.
        let mut jacobians = match (
            out.jacobian_left.as_deref_mut(),
            out.jacobian_right.as_deref_mut(),
        ) {
            (Some(jl), Some(jr)) => {
                for (what, got) in [("left Jacobian", jl.n()), ("right Jacobian", jr.n())] {
                    if got != self.n_var {
                        return Err(NumericsError::DimensionMismatch {
                            what,
                            expected: self.n_var,
                            got,
                        });
                    }
                }
                Some((jl, jr))
            }
            _ if self.implicit => return Err(NumericsError::MissingJacobians),
            _ => None,
        };
        let grid_velocities = if self.dynamic_grid {
            match (left.grid_velocity, right.grid_velocity) {
                (Some(wi), Some(wj)) => Some((wi, wj)),
                _ => return Err(NumericsError::MissingGridVelocity),
            }
        } else {
            None
        };

        tape.begin();
        self.record_inputs(tape, left, right, normal);
        self.diagnostics.evaluations += 1;

        let n_dim = self.n_dim;
        let n_var = self.n_var;

        // Face area and unit normal.
        let area = normal.iter().map(|n| n * n).sum::<f64>().sqrt();
        let mut unit_normal = [0.0; MAX_DIM];
        for k in 0..n_dim {
            unit_normal[k] = normal[k] / area;
        }

        // Per-side derived quantities and conservative states.
        let qi = SideQuantities::derive(left, n_dim);
        let qj = SideQuantities::derive(right, n_dim);
        let mut u_i = [0.0; MAX_VAR];
        let mut u_j = [0.0; MAX_VAR];
        qi.conservative(n_dim, &mut u_i[..n_var]);
        qj.conservative(n_dim, &mut u_j[..n_var]);

        // Roe-averaged interface state; recover locally if hyperbolicity
        // is lost instead of propagating NaN from the sound speed.
        let roe = roe_average(&qi, &qj, n_dim, self.roe_average_policy);
        if !roe.is_hyperbolic() {
            self.diagnostics.degenerate_faces += 1;
            out.residual.fill(0.0);
            if let Some((jl, jr)) = jacobians.as_mut() {
                for k in 0..n_var {
                    jl[(k, k)] = 0.0;
                    jr[(k, k)] = 0.0;
                }
            }
            tape.record_output(out.residual);
            tape.end();
            return Ok(());
        }
        let sound_speed = roe.sound_speed2.sqrt();

        inviscid_projected_flux(
            qi.density,
            &qi.velocity[..n_dim],
            qi.pressure,
            qi.enthalpy,
            normal,
            &mut self.proj_flux_i,
        );
        inviscid_projected_flux(
            qj.density,
            &qj.velocity[..n_dim],
            qj.pressure,
            qj.enthalpy,
            normal,
            &mut self.proj_flux_j,
        );

        p_matrix(
            roe.density,
            &roe.velocity[..n_dim],
            sound_speed,
            roe.enthalpy,
            roe.chi,
            roe.kappa,
            &unit_normal[..n_dim],
            &mut self.p,
        );

        // Projected velocities along the unit normal, shifted by the mean
        // grid normal velocity when the mesh moves.
        let mut proj_vel = 0.0;
        let mut proj_vel_i = 0.0;
        let mut proj_vel_j = 0.0;
        for k in 0..n_dim {
            proj_vel += roe.velocity[k] * unit_normal[k];
            proj_vel_i += qi.velocity[k] * unit_normal[k];
            proj_vel_j += qj.velocity[k] * unit_normal[k];
        }
        if let Some((wi, wj)) = &grid_velocities {
            let mut proj_grid_vel = 0.0;
            for k in 0..n_dim {
                proj_grid_vel += 0.5 * (wi[k] + wj[k]) * unit_normal[k];
            }
            proj_vel -= proj_grid_vel;
            proj_vel_i -= proj_grid_vel;
            proj_vel_j -= proj_grid_vel;
        }

        // Convective eigenvalues, then the acoustic pair in the last slots.
        for k in 0..n_dim {
            self.lambda[k] = proj_vel;
        }
        self.lambda[n_var - 2] = proj_vel + sound_speed;
        self.lambda[n_var - 1] = proj_vel - sound_speed;

        self.apply_entropy_fix(
            proj_vel,
            proj_vel_i,
            proj_vel_j,
            sound_speed,
            qi.sound_speed,
            qj.sound_speed,
        );

        if !self.implicit {
            // Characteristic wave strengths from the primitive jumps.
            let mut delta_vel = [0.0; MAX_DIM];
            let mut proj_delta_vel = 0.0;
            for k in 0..n_dim {
                delta_vel[k] = qj.velocity[k] - qi.velocity[k];
                proj_delta_vel += delta_vel[k] * normal[k];
            }
            proj_delta_vel /= area;
            let delta_p = qj.pressure - qi.pressure;
            let delta_rho = qj.density - qi.density;

            let acoustic = delta_p / (roe.density * sound_speed);
            self.delta_wave[0] = delta_rho - delta_p / (sound_speed * sound_speed);
            if n_dim == 2 {
                self.delta_wave[1] = unit_normal[1] * delta_vel[0] - unit_normal[0] * delta_vel[1];
            } else {
                self.delta_wave[1] = unit_normal[0] * delta_vel[2] - unit_normal[2] * delta_vel[0];
                self.delta_wave[2] = unit_normal[1] * delta_vel[0] - unit_normal[0] * delta_vel[1];
            }
            self.delta_wave[n_var - 2] = proj_delta_vel + acoustic;
            self.delta_wave[n_var - 1] = -proj_delta_vel + acoustic;

            for iv in 0..n_var {
                let mut value = 0.5 * (self.proj_flux_i[iv] + self.proj_flux_j[iv]);
                for jv in 0..n_var {
                    value -= 0.5 * self.lambda[jv] * self.delta_wave[jv] * self.p[(iv, jv)] * area;
                }
                out.residual[iv] = value;
            }
        } else if let Some((jac_i, jac_j)) = jacobians.as_mut() {
            p_matrix_inverse(
                roe.density,
                &roe.velocity[..n_dim],
                sound_speed,
                roe.chi,
                roe.kappa,
                &unit_normal[..n_dim],
                &mut self.inv_p,
            );

            // Exact side Jacobians, scaled by the central blend factor.
            inviscid_flux_jacobian(
                &qi.velocity[..n_dim],
                qi.enthalpy,
                qi.chi,
                qi.kappa,
                normal,
                self.blend,
                jac_i,
            );
            inviscid_flux_jacobian(
                &qj.velocity[..n_dim],
                qj.enthalpy,
                qj.chi,
                qj.kappa,
                normal,
                self.blend,
                jac_j,
            );

            for k in 0..n_var {
                self.diff_u[k] = u_j[k] - u_i[k];
            }

            // Residual and the upwind part |A| = P·|Λ|·P⁻¹ of the Jacobians.
            let upwind = 1.0 - self.blend;
            for iv in 0..n_var {
                let mut value = self.blend * (self.proj_flux_i[iv] + self.proj_flux_j[iv]);
                for jv in 0..n_var {
                    let mut dissipation = 0.0;
                    for kv in 0..n_var {
                        dissipation += self.p[(iv, kv)] * self.lambda[kv] * self.inv_p[(kv, jv)];
                    }
                    value -= upwind * dissipation * self.diff_u[jv] * area;
                    jac_i[(iv, jv)] += upwind * dissipation * area;
                    jac_j[(iv, jv)] -= upwind * dissipation * area;
                }
                out.residual[iv] = value;
            }
        }

        // Flux carried by the mesh motion itself (area-scaled projection).
        if let Some((wi, wj)) = &grid_velocities {
            let mut proj_grid_flux = 0.0;
            for k in 0..n_dim {
                proj_grid_flux += 0.5 * (wi[k] + wj[k]) * normal[k];
            }
            for iv in 0..n_var {
                out.residual[iv] -= proj_grid_flux * 0.5 * (u_i[iv] + u_j[iv]);
            }
            if self.implicit {
                if let Some((jl, jr)) = jacobians.as_mut() {
                    for k in 0..n_var {
                        jl[(k, k)] -= 0.5 * proj_grid_flux;
                        jr[(k, k)] -= 0.5 * proj_grid_flux;
                    }
                }
            }
        }

        tape.record_output(out.residual);
        tape.end();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "general_roe"
    }
}
