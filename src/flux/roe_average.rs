//! Roe-averaged interface state.
//!
//! The Roe average linearizes the Riemann problem at a face around a single
//! intermediate state built from the density-ratio weighting
//! R = √(ρ_j/ρ_i). Density, velocity and total enthalpy use the classical
//! weighting; the closure coefficients chi and kappa use a Simpson-style
//! blend of the endpoint values, which is what keeps the linearization
//! consistent for a general (non-ideal) equation of state.
//!
//! The squared interface sound speed c² = chi + kappa·(H − |v|²/2) can lose
//! positivity near stagnation or for pathological input states. That is a
//! recoverable degeneracy: callers must check [`RoeAverage::is_hyperbolic`]
//! and fall back to a zero residual, never propagate the NaN from √c².

use crate::config::RoeAveragePolicy;
use crate::state::{SideQuantities, MAX_DIM};

/// Roe-averaged state at a face, valid for one evaluation.
#[derive(Clone, Copy, Debug)]
pub struct RoeAverage {
    /// Interface density R·ρ_i.
    pub density: f64,
    /// Interface velocity components.
    pub velocity: [f64; MAX_DIM],
    /// Interface total enthalpy.
    pub enthalpy: f64,
    /// Interface closure coefficient chi.
    pub chi: f64,
    /// Interface closure coefficient kappa.
    pub kappa: f64,
    /// Squared interface sound speed; may be non-positive (degenerate).
    pub sound_speed2: f64,
}

impl RoeAverage {
    /// Whether the averaged state kept a real sound speed.
    #[inline]
    pub fn is_hyperbolic(&self) -> bool {
        self.sound_speed2 > 0.0
    }
}

/// Simpson-style blend of two endpoint values with their midpoint.
#[inline]
fn blended_mean(a: f64, b: f64) -> f64 {
    let mid = 0.5 * (a + b);
    (a + b + 4.0 * mid) / 6.0
}

/// Compute the Roe-averaged state between two face sides.
pub fn roe_average(
    i: &SideQuantities,
    j: &SideQuantities,
    n_dim: usize,
    policy: RoeAveragePolicy,
) -> RoeAverage {
    let r = (j.density / i.density).abs().sqrt();
    let density = r * i.density;

    let mut velocity = [0.0; MAX_DIM];
    let mut velocity2 = 0.0;
    for k in 0..n_dim {
        velocity[k] = (r * j.velocity[k] + i.velocity[k]) / (r + 1.0);
        velocity2 += velocity[k] * velocity[k];
    }

    let enthalpy = (r * j.enthalpy + i.enthalpy) / (r + 1.0);
    let mut kappa = blended_mean(i.kappa, j.kappa);
    let mut chi = blended_mean(i.chi, j.chi);

    if policy == RoeAveragePolicy::PressureCorrected {
        // Rescale chi/kappa so the linearized pressure jump matches the
        // actual jump, guarded against small denominators and jumps.
        let delta_rho = j.density - i.density;
        let delta_p = j.pressure - i.pressure;
        let kappa_enthalpy = blended_mean(
            i.static_enthalpy * i.kappa,
            j.static_enthalpy * j.kappa,
        );
        let s = chi + kappa_enthalpy;
        let d = s * s * delta_rho * delta_rho + delta_p * delta_p;
        let delta_rho_e = j.density * j.static_energy - i.density * i.static_energy;
        let err_p = delta_p - chi * delta_rho - kappa * delta_rho_e;

        if ((d - delta_p * err_p) / i.density).abs() > 1e-3
            && (delta_rho / i.density).abs() > 1e-3
            && s / i.density > 1e-3
        {
            let denom = d - delta_p * err_p;
            kappa = d * kappa / denom;
            chi = (d * chi + s * s * delta_rho * err_p) / denom;
        }
    }

    let sound_speed2 = chi + kappa * (enthalpy - 0.5 * velocity2);

    RoeAverage {
        density,
        velocity,
        enthalpy,
        chi,
        kappa,
        sound_speed2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FaceState;

    const TOL: f64 = 1e-12;

    fn side(density: f64, velocity: [f64; 2], pressure: f64, enthalpy: f64) -> SideQuantities {
        let state = FaceState::from_pressure_derivatives(
            density,
            &velocity,
            pressure,
            enthalpy,
            0.4 * (enthalpy - 0.5 * (velocity[0] * velocity[0] + velocity[1] * velocity[1])
                - pressure / density),
            0.4 * density,
        );
        SideQuantities::derive(&state, 2)
    }

    #[test]
    fn test_equal_states_recover_the_state() {
        let a = side(1.0, [0.5, 0.1], 0.7, 2.6);
        let roe = roe_average(&a, &a, 2, RoeAveragePolicy::Blended);

        assert!((roe.density - a.density).abs() < TOL);
        assert!((roe.velocity[0] - a.velocity[0]).abs() < TOL);
        assert!((roe.velocity[1] - a.velocity[1]).abs() < TOL);
        assert!((roe.enthalpy - a.enthalpy).abs() < TOL);
        assert!((roe.chi - a.chi).abs() < TOL);
        assert!((roe.kappa - a.kappa).abs() < TOL);
        // c² must equal the single-state sound speed squared.
        assert!((roe.sound_speed2 - a.sound_speed * a.sound_speed).abs() < 1e-10);
    }

    #[test]
    fn test_density_weighting() {
        let a = side(1.0, [1.0, 0.0], 0.7, 3.0);
        let b = side(4.0, [2.0, 0.0], 0.7, 3.0);
        let roe = roe_average(&a, &b, 2, RoeAveragePolicy::Blended);

        // R = 2, interface density = R·ρ_i = 2, velocity = (2·2 + 1)/3.
        assert!((roe.density - 2.0).abs() < TOL);
        assert!((roe.velocity[0] - 5.0 / 3.0).abs() < TOL);
    }

    #[test]
    fn test_average_between_endpoints() {
        let a = side(1.0, [0.2, 0.0], 0.6, 2.4);
        let b = side(2.5, [0.8, 0.1], 1.1, 3.1);
        let roe = roe_average(&a, &b, 2, RoeAveragePolicy::Blended);

        assert!(roe.density > a.density && roe.density < b.density);
        assert!(roe.enthalpy > a.enthalpy && roe.enthalpy < b.enthalpy);
        assert!(roe.is_hyperbolic());
    }

    #[test]
    fn test_pressure_corrected_guard_small_jumps() {
        // Tiny jumps stay inside the guard band: both policies agree.
        let a = side(1.0, [0.5, 0.0], 0.7, 2.6);
        let b = side(1.0 + 1e-6, [0.5, 0.0], 0.7 + 1e-6, 2.6);
        let blended = roe_average(&a, &b, 2, RoeAveragePolicy::Blended);
        let corrected = roe_average(&a, &b, 2, RoeAveragePolicy::PressureCorrected);

        assert!((blended.chi - corrected.chi).abs() < TOL);
        assert!((blended.kappa - corrected.kappa).abs() < TOL);
    }

    #[test]
    fn test_degenerate_sound_speed_flagged() {
        // chi < 0 with kappa = 0 forces c² ≤ 0.
        let state = FaceState::new(1.0, &[0.1, 0.0], 0.7, 2.0, -10.0, 0.0);
        let q = SideQuantities::derive(&state, 2);
        let roe = roe_average(&q, &q, 2, RoeAveragePolicy::Blended);
        assert!(!roe.is_hyperbolic());
    }
}
