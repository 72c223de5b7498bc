//! Projected inviscid flux and its exact Jacobian.
//!
//! The projected flux is the Euler flux dotted with the face normal. The
//! normal is *not* normalized: its magnitude carries the face area, so the
//! result is already integrated over the face.
//!
//! The Jacobian is taken with respect to the conservative variables
//! U = [ρ, ρv, ρE] for a general equation of state parameterized by the
//! closure coefficients chi and kappa, for which the pressure differential is
//!
//!   dp = (chi + ½·kappa·|v|²)·dρ − kappa·v·d(ρv) + kappa·d(ρE)
//!
//! Both routines are exact and branch-free; they are evaluated once per face
//! per iteration and feed both the explicit flux and the Newton
//! linearization.

use crate::matrix::SquareMatrix;

/// Compute the inviscid flux projected onto an area-scaled normal.
///
/// # Arguments
/// * `density` - Density ρ
/// * `velocity` - Velocity components (length sets the dimension)
/// * `pressure` - Static pressure
/// * `enthalpy` - Total enthalpy H
/// * `normal` - Face normal, |normal| = face area
/// * `flux` - Output, length `n_dim + 2`
///
/// Ordering: [mass, momentum × n_dim, energy].
#[inline]
pub fn inviscid_projected_flux(
    density: f64,
    velocity: &[f64],
    pressure: f64,
    enthalpy: f64,
    normal: &[f64],
    flux: &mut [f64],
) {
    let n_dim = normal.len();

    let mut mass_flux = 0.0;
    for i in 0..n_dim {
        mass_flux += density * velocity[i] * normal[i];
    }

    flux[0] = mass_flux;
    for i in 0..n_dim {
        flux[i + 1] = mass_flux * velocity[i] + pressure * normal[i];
    }
    flux[n_dim + 1] = mass_flux * enthalpy;
}

/// Compute the exact Jacobian of the projected inviscid flux.
///
/// # Arguments
/// * `velocity` - Velocity components
/// * `enthalpy` - Total enthalpy H
/// * `chi`, `kappa` - Closure coefficients of the equation of state
/// * `normal` - Face normal, |normal| = face area
/// * `scale` - Blend factor multiplying every entry
/// * `jacobian` - Output, order `n_dim + 2`; overwritten
pub fn inviscid_flux_jacobian(
    velocity: &[f64],
    enthalpy: f64,
    chi: f64,
    kappa: f64,
    normal: &[f64],
    scale: f64,
    jacobian: &mut SquareMatrix,
) {
    let n_dim = normal.len();
    let n_var = n_dim + 2;
    debug_assert_eq!(jacobian.n(), n_var);

    let mut velocity2 = 0.0;
    let mut proj_vel = 0.0;
    for i in 0..n_dim {
        velocity2 += velocity[i] * velocity[i];
        proj_vel += velocity[i] * normal[i];
    }
    // Pressure sensitivity to density at fixed momentum and total energy.
    let theta = chi + 0.5 * kappa * velocity2;

    jacobian[(0, 0)] = 0.0;
    for j in 0..n_dim {
        jacobian[(0, j + 1)] = scale * normal[j];
    }
    jacobian[(0, n_var - 1)] = 0.0;

    for i in 0..n_dim {
        jacobian[(i + 1, 0)] = scale * (normal[i] * theta - velocity[i] * proj_vel);
        for j in 0..n_dim {
            jacobian[(i + 1, j + 1)] =
                scale * (normal[j] * velocity[i] - kappa * normal[i] * velocity[j]);
        }
        jacobian[(i + 1, i + 1)] += scale * proj_vel;
        jacobian[(i + 1, n_var - 1)] = scale * kappa * normal[i];
    }

    jacobian[(n_var - 1, 0)] = scale * proj_vel * (theta - enthalpy);
    for j in 0..n_dim {
        jacobian[(n_var - 1, j + 1)] =
            scale * (normal[j] * enthalpy - kappa * proj_vel * velocity[j]);
    }
    jacobian[(n_var - 1, n_var - 1)] = scale * (1.0 + kappa) * proj_vel;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;
    const GAMMA: f64 = 1.4;

    /// Projected flux evaluated from a conservative vector with the
    /// perfect-gas closure; used to finite-difference the Jacobian.
    fn flux_of_conservative(u: &[f64], normal: &[f64], flux: &mut [f64]) {
        let n_dim = normal.len();
        let density = u[0];
        let velocity: Vec<f64> = (0..n_dim).map(|i| u[i + 1] / density).collect();
        let velocity2: f64 = velocity.iter().map(|v| v * v).sum();
        let energy = u[n_dim + 1] / density;
        let pressure = (GAMMA - 1.0) * density * (energy - 0.5 * velocity2);
        let enthalpy = energy + pressure / density;
        inviscid_projected_flux(density, &velocity, pressure, enthalpy, normal, flux);
    }

    #[test]
    fn test_projected_flux_aligned() {
        // ρ = 1, v = (0.5, 0), p = 1/γ, normal = (1, 0):
        // flux = [ρu, ρu² + p, 0, ρuH]
        let density = 1.0;
        let velocity = [0.5, 0.0];
        let pressure = 1.0 / GAMMA;
        let e = pressure / ((GAMMA - 1.0) * density);
        let enthalpy = e + 0.5 * 0.25 + pressure / density;

        let mut flux = [0.0; 4];
        inviscid_projected_flux(density, &velocity, pressure, enthalpy, &[1.0, 0.0], &mut flux);

        assert!((flux[0] - 0.5).abs() < TOL);
        assert!((flux[1] - (0.25 + pressure)).abs() < TOL);
        assert!(flux[2].abs() < TOL);
        assert!((flux[3] - 0.5 * enthalpy).abs() < TOL);
    }

    #[test]
    fn test_projected_flux_area_scaling() {
        let density = 1.2;
        let velocity = [0.3, -0.1];
        let pressure = 0.9;
        let enthalpy = 2.5;

        let mut f1 = [0.0; 4];
        let mut f2 = [0.0; 4];
        inviscid_projected_flux(density, &velocity, pressure, enthalpy, &[0.6, 0.8], &mut f1);
        inviscid_projected_flux(density, &velocity, pressure, enthalpy, &[1.2, 1.6], &mut f2);

        for (a, b) in f1.iter().zip(&f2) {
            assert!((2.0 * a - b).abs() < TOL, "flux must scale with area");
        }
    }

    #[test]
    fn test_jacobian_matches_finite_differences_2d() {
        let u = [1.1, 0.4, -0.25, 2.8];
        let normal = [0.6, -0.8];
        jacobian_fd_check(&u, &normal);
    }

    #[test]
    fn test_jacobian_matches_finite_differences_3d() {
        let u = [0.9, 0.3, 0.2, -0.1, 2.4];
        let normal = [0.3, -0.5, 0.9];
        jacobian_fd_check(&u, &normal);
    }

    fn jacobian_fd_check(u: &[f64], normal: &[f64]) {
        let n_dim = normal.len();
        let n_var = n_dim + 2;

        let density = u[0];
        let velocity: Vec<f64> = (0..n_dim).map(|i| u[i + 1] / density).collect();
        let velocity2: f64 = velocity.iter().map(|v| v * v).sum();
        let energy = u[n_dim + 1] / density;
        let pressure = (GAMMA - 1.0) * density * (energy - 0.5 * velocity2);
        let enthalpy = energy + pressure / density;

        let mut jac = SquareMatrix::zeros(n_var);
        // Perfect gas: chi = 0, kappa = γ − 1.
        inviscid_flux_jacobian(&velocity, enthalpy, 0.0, GAMMA - 1.0, normal, 1.0, &mut jac);

        let h = 1e-7;
        let mut f_plus = vec![0.0; n_var];
        let mut f_minus = vec![0.0; n_var];
        for k in 0..n_var {
            let mut up = u.to_vec();
            let mut um = u.to_vec();
            up[k] += h;
            um[k] -= h;
            flux_of_conservative(&up, normal, &mut f_plus);
            flux_of_conservative(&um, normal, &mut f_minus);
            for i in 0..n_var {
                let fd = (f_plus[i] - f_minus[i]) / (2.0 * h);
                assert!(
                    (jac[(i, k)] - fd).abs() < 1e-5,
                    "jacobian ({i},{k}): analytic {} vs fd {}",
                    jac[(i, k)],
                    fd
                );
            }
        }
    }

    #[test]
    fn test_jacobian_scale_factor() {
        let velocity = [0.4, 0.1];
        let normal = [1.0, 0.5];
        let mut j1 = SquareMatrix::zeros(4);
        let mut j2 = SquareMatrix::zeros(4);
        inviscid_flux_jacobian(&velocity, 2.0, 0.1, 0.4, &normal, 1.0, &mut j1);
        inviscid_flux_jacobian(&velocity, 2.0, 0.1, 0.4, &normal, 0.5, &mut j2);

        for (a, b) in j1.as_slice().iter().zip(j2.as_slice()) {
            assert!((0.5 * a - b).abs() < TOL);
        }
    }
}
