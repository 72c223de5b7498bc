//! Eigenvector matrices of the projected flux Jacobian.
//!
//! For the Euler equations with a general equation of state the projected
//! Jacobian A·n has eigenvalues
//!
//!   λ = V·n  (multiplicity n_dim),  V·n + c,  V·n − c
//!
//! ordered [convective × n_dim, acoustic+, acoustic−]. [`p_matrix`] fills the
//! right eigenvector matrix P, [`p_matrix_inverse`] the left eigenvector
//! matrix P⁻¹, both parameterized by the closure coefficients chi and kappa
//! instead of a fixed ratio of specific heats.
//!
//! In 2D the convective columns are the entropy wave [1, v, |v|²/2 − chi/kappa]
//! and the shear wave [0, ρt, ρ·v·t] with t the in-plane tangent. In 3D the
//! three convective columns blend the entropy wave (weighted by the normal
//! components) with the shear waves generated by the tangents n × eᵢ, which
//! avoids constructing an arbitrary tangent basis.
//!
//! Both matrices are recomputed for every face; they must reflect the current
//! Roe state exactly and are never cached.

use crate::matrix::SquareMatrix;

/// Fill the right eigenvector matrix P of the projected flux Jacobian.
///
/// # Arguments
/// * `density`, `velocity`, `sound_speed`, `enthalpy` - State at which the
///   Jacobian is linearized (typically the Roe average)
/// * `chi`, `kappa` - Closure coefficients consistent with `sound_speed`
/// * `unit_normal` - Unit face normal (length sets the dimension)
/// * `p` - Output, order `n_dim + 2`; overwritten
pub fn p_matrix(
    density: f64,
    velocity: &[f64],
    sound_speed: f64,
    enthalpy: f64,
    chi: f64,
    kappa: f64,
    unit_normal: &[f64],
    p: &mut SquareMatrix,
) {
    let n_dim = unit_normal.len();
    let n_var = n_dim + 2;
    debug_assert_eq!(p.n(), n_var);

    let rho_over_c = density / sound_speed;
    let mut velocity2 = 0.0;
    let mut proj_vel = 0.0;
    for i in 0..n_dim {
        velocity2 += velocity[i] * velocity[i];
        proj_vel += velocity[i] * unit_normal[i];
    }
    let zeta = 0.5 * velocity2 - chi / kappa;

    if n_dim == 2 {
        let (nx, ny) = (unit_normal[0], unit_normal[1]);

        // Entropy wave.
        p[(0, 0)] = 1.0;
        p[(1, 0)] = velocity[0];
        p[(2, 0)] = velocity[1];
        p[(3, 0)] = zeta;

        // Shear wave along the in-plane tangent (ny, -nx).
        p[(0, 1)] = 0.0;
        p[(1, 1)] = density * ny;
        p[(2, 1)] = -density * nx;
        p[(3, 1)] = density * (velocity[0] * ny - velocity[1] * nx);
    } else {
        // Tangents n × e_i generating the shear contributions.
        let tangents = cross_tangents(unit_normal);
        for (col, tangent) in tangents.iter().enumerate() {
            let weight = unit_normal[col];
            let mut v_dot_t = 0.0;
            p[(0, col)] = weight;
            for j in 0..3 {
                p[(j + 1, col)] = velocity[j] * weight + density * tangent[j];
                v_dot_t += velocity[j] * tangent[j];
            }
            p[(4, col)] = zeta * weight + density * v_dot_t;
        }
    }

    // Acoustic waves (ρ/2c)·[1, v ± cn, H ± c·V·n].
    for (offset, sign) in [(2, 1.0), (1, -1.0)] {
        let col = n_var - offset;
        p[(0, col)] = 0.5 * rho_over_c;
        for j in 0..n_dim {
            p[(j + 1, col)] = 0.5 * (velocity[j] * rho_over_c + sign * density * unit_normal[j]);
        }
        p[(n_var - 1, col)] = 0.5 * (enthalpy * rho_over_c + sign * density * proj_vel);
    }
}

/// Fill the left eigenvector matrix P⁻¹ of the projected flux Jacobian.
///
/// Rows are the wave strengths expressed in conservative-variable jumps:
/// the entropy/shear rows first, then the acoustic rows
/// dV·n ± dp/(ρc) in the slots `n_var − 2` and `n_var − 1` (the last with
/// the sign convention dp/(ρc) − dV·n).
///
/// Takes the same state as [`p_matrix`]; enthalpy is not needed.
pub fn p_matrix_inverse(
    density: f64,
    velocity: &[f64],
    sound_speed: f64,
    chi: f64,
    kappa: f64,
    unit_normal: &[f64],
    inv_p: &mut SquareMatrix,
) {
    let n_dim = unit_normal.len();
    let n_var = n_dim + 2;
    debug_assert_eq!(inv_p.n(), n_var);

    let c2 = sound_speed * sound_speed;
    let mut velocity2 = 0.0;
    let mut proj_vel = 0.0;
    for i in 0..n_dim {
        velocity2 += velocity[i] * velocity[i];
        proj_vel += velocity[i] * unit_normal[i];
    }
    // Pressure sensitivity to density at fixed momentum and total energy.
    let theta = chi + 0.5 * kappa * velocity2;

    if n_dim == 2 {
        let (nx, ny) = (unit_normal[0], unit_normal[1]);

        // Entropy strength dρ − dp/c².
        inv_p[(0, 0)] = 1.0 - theta / c2;
        inv_p[(0, 1)] = kappa * velocity[0] / c2;
        inv_p[(0, 2)] = kappa * velocity[1] / c2;
        inv_p[(0, 3)] = -kappa / c2;

        // Shear strength t·dv.
        inv_p[(1, 0)] = (velocity[1] * nx - velocity[0] * ny) / density;
        inv_p[(1, 1)] = ny / density;
        inv_p[(1, 2)] = -nx / density;
        inv_p[(1, 3)] = 0.0;
    } else {
        let tangents = cross_tangents(unit_normal);
        for (row, tangent) in tangents.iter().enumerate() {
            let weight = unit_normal[row];
            let mut v_dot_t = 0.0;
            for j in 0..3 {
                v_dot_t += velocity[j] * tangent[j];
            }
            inv_p[(row, 0)] = weight * (1.0 - theta / c2) - v_dot_t / density;
            for j in 0..3 {
                inv_p[(row, j + 1)] = weight * kappa * velocity[j] / c2 + tangent[j] / density;
            }
            inv_p[(row, 4)] = -weight * kappa / c2;
        }
    }

    // Acoustic strengths dV·n ± dp/(ρc).
    let rc = density * sound_speed;
    inv_p[(n_var - 2, 0)] = (theta / sound_speed - proj_vel) / density;
    inv_p[(n_var - 1, 0)] = (theta / sound_speed + proj_vel) / density;
    for j in 0..n_dim {
        inv_p[(n_var - 2, j + 1)] = (unit_normal[j] - kappa * velocity[j] / sound_speed) / density;
        inv_p[(n_var - 1, j + 1)] = (-unit_normal[j] - kappa * velocity[j] / sound_speed) / density;
    }
    inv_p[(n_var - 2, n_var - 1)] = kappa / rc;
    inv_p[(n_var - 1, n_var - 1)] = kappa / rc;
}

/// Tangent vectors n × eᵢ for the 3D convective columns.
#[inline]
fn cross_tangents(n: &[f64]) -> [[f64; 3]; 3] {
    [
        [0.0, n[2], -n[1]],
        [-n[2], 0.0, n[0]],
        [n[1], -n[0], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::projected::inviscid_flux_jacobian;

    const TOL: f64 = 1e-10;

    struct TestState {
        density: f64,
        velocity: Vec<f64>,
        enthalpy: f64,
        chi: f64,
        kappa: f64,
        sound_speed: f64,
    }

    /// Non-ideal closure (chi ≠ 0) so the generalized terms are exercised.
    fn general_state(n_dim: usize) -> TestState {
        let velocity = if n_dim == 2 {
            vec![0.3, -0.2]
        } else {
            vec![0.3, -0.2, 0.15]
        };
        let velocity2: f64 = velocity.iter().map(|v| v * v).sum();
        let (chi, kappa, enthalpy) = (0.2, 0.3, 3.0);
        let sound_speed2 = chi + kappa * (enthalpy - 0.5 * velocity2);
        TestState {
            density: 1.3,
            velocity,
            enthalpy,
            chi,
            kappa,
            sound_speed: sound_speed2.sqrt(),
        }
    }

    fn matrices(state: &TestState, normal: &[f64]) -> (SquareMatrix, SquareMatrix) {
        let n_var = normal.len() + 2;
        let mut p = SquareMatrix::zeros(n_var);
        let mut inv_p = SquareMatrix::zeros(n_var);
        p_matrix(
            state.density,
            &state.velocity,
            state.sound_speed,
            state.enthalpy,
            state.chi,
            state.kappa,
            normal,
            &mut p,
        );
        p_matrix_inverse(
            state.density,
            &state.velocity,
            state.sound_speed,
            state.chi,
            state.kappa,
            normal,
            &mut inv_p,
        );
        (p, inv_p)
    }

    fn check_inverse(normal: &[f64]) {
        let state = general_state(normal.len());
        let (p, inv_p) = matrices(&state, normal);
        let n = p.n();
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += p[(i, k)] * inv_p[(k, j)];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (sum - expected).abs() < TOL,
                    "(P * invP)[{i}][{j}] = {sum}, expected {expected}"
                );
            }
        }
    }

    fn check_reconstruction(normal: &[f64]) {
        let state = general_state(normal.len());
        let n_dim = normal.len();
        let n_var = n_dim + 2;
        let (p, inv_p) = matrices(&state, normal);

        let proj_vel: f64 = state
            .velocity
            .iter()
            .zip(normal)
            .map(|(v, n)| v * n)
            .sum();
        let mut lambda = vec![proj_vel; n_var];
        lambda[n_var - 2] = proj_vel + state.sound_speed;
        lambda[n_var - 1] = proj_vel - state.sound_speed;

        let mut jac = SquareMatrix::zeros(n_var);
        inviscid_flux_jacobian(
            &state.velocity,
            state.enthalpy,
            state.chi,
            state.kappa,
            normal,
            1.0,
            &mut jac,
        );

        // P · Λ · P⁻¹ must reproduce the exact Jacobian (unit normal).
        for i in 0..n_var {
            for j in 0..n_var {
                let mut sum = 0.0;
                for k in 0..n_var {
                    sum += p[(i, k)] * lambda[k] * inv_p[(k, j)];
                }
                assert!(
                    (sum - jac[(i, j)]).abs() < TOL,
                    "(P Λ invP)[{i}][{j}] = {sum}, jacobian = {}",
                    jac[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_p_inverse_2d() {
        check_inverse(&[0.6, 0.8]);
    }

    #[test]
    fn test_p_inverse_3d() {
        let norm = (0.3f64 * 0.3 + 0.5 * 0.5 + 0.9 * 0.9).sqrt();
        check_inverse(&[0.3 / norm, -0.5 / norm, 0.9 / norm]);
    }

    #[test]
    fn test_eigendecomposition_reconstructs_jacobian_2d() {
        check_reconstruction(&[0.6, 0.8]);
    }

    #[test]
    fn test_eigendecomposition_reconstructs_jacobian_3d() {
        let norm = (0.2f64 * 0.2 + 0.7 * 0.7 + 0.4 * 0.4).sqrt();
        check_reconstruction(&[0.2 / norm, 0.7 / norm, -0.4 / norm]);
    }

    #[test]
    fn test_axis_aligned_normal_3d() {
        // Degenerate tangent components (normal along x) must still invert.
        check_inverse(&[1.0, 0.0, 0.0]);
        check_reconstruction(&[1.0, 0.0, 0.0]);
    }
}
