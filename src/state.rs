//! Primitive flow state at a control-volume face.
//!
//! A [`FaceState`] carries the primitive variables and the two
//! equation-of-state closure coefficients at one side of a mesh face:
//!
//! - density ρ, velocity v, pressure p, total enthalpy H
//! - chi = ∂p/∂ρ|e − kappa·e  and  kappa = (∂p/∂e|ρ)/ρ
//!
//! With these the speed of sound of a general (non-ideal) equation of state
//! is c² = chi + kappa·h, where h = H − |v|²/2 is the static enthalpy. For a
//! calorically perfect gas, chi = 0 and kappa = γ − 1.
//!
//! # Input validity
//!
//! Non-positive density and NaN/Inf primitives are *not* checked on the hot
//! path; the numeric result is undefined for such inputs. Constructors carry
//! `debug_assert!` guards only.

use crate::error::NumericsError;

/// Maximum supported spatial dimension.
pub const MAX_DIM: usize = 3;

/// Maximum number of conserved variables (density, momentum, energy).
pub const MAX_VAR: usize = MAX_DIM + 2;

/// Number of conserved variables for a given spatial dimension.
#[inline]
pub const fn n_var(n_dim: usize) -> usize {
    n_dim + 2
}

/// Validate a spatial dimension.
pub fn check_dimension(n_dim: usize) -> Result<(), NumericsError> {
    if n_dim == 2 || n_dim == 3 {
        Ok(())
    } else {
        Err(NumericsError::UnsupportedDimension(n_dim))
    }
}

/// Primitive state and closure coefficients at one side of a face.
///
/// Immutable per evaluation; callers build one per face side from their
/// per-point primitive storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceState {
    /// Density ρ.
    pub density: f64,
    /// Velocity components; only the first `n_dim` entries are meaningful.
    pub velocity: [f64; MAX_DIM],
    /// Static pressure p.
    pub pressure: f64,
    /// Total (stagnation) enthalpy H.
    pub enthalpy: f64,
    /// Closure coefficient chi (pressure sensitivity to density).
    pub chi: f64,
    /// Closure coefficient kappa (pressure sensitivity to internal energy).
    pub kappa: f64,
    /// Mesh velocity at this side, present when the grid is dynamic.
    pub grid_velocity: Option<[f64; MAX_DIM]>,
    n_dim: usize,
}

impl FaceState {
    /// Create a face state from primitives and closure coefficients.
    ///
    /// # Arguments
    /// * `density` - Density ρ
    /// * `velocity` - Velocity components (2 or 3)
    /// * `pressure` - Static pressure
    /// * `enthalpy` - Total enthalpy H
    /// * `chi`, `kappa` - Equation-of-state closure coefficients
    pub fn new(
        density: f64,
        velocity: &[f64],
        pressure: f64,
        enthalpy: f64,
        chi: f64,
        kappa: f64,
    ) -> Self {
        debug_assert!(
            velocity.len() == 2 || velocity.len() == 3,
            "face state velocity must have 2 or 3 components"
        );
        debug_assert!(density > 0.0, "face state density must be positive");
        let mut vel = [0.0; MAX_DIM];
        vel[..velocity.len()].copy_from_slice(velocity);
        Self {
            density,
            velocity: vel,
            pressure,
            enthalpy,
            chi,
            kappa,
            grid_velocity: None,
            n_dim: velocity.len(),
        }
    }

    /// Create a face state from raw pressure derivatives supplied by a
    /// thermodynamic closure.
    ///
    /// `dp_drho` is ∂p/∂ρ at constant internal energy, `dp_de` is ∂p/∂e at
    /// constant density. The closure coefficients follow as
    /// kappa = dp_de/ρ and chi = dp_drho − kappa·e, with e the static
    /// internal energy recovered from the primitives.
    ///
    /// For an ideal gas, `dp_drho = (γ−1)·e` and `dp_de = (γ−1)·ρ`, giving
    /// kappa = γ−1 and chi = 0.
    pub fn from_pressure_derivatives(
        density: f64,
        velocity: &[f64],
        pressure: f64,
        enthalpy: f64,
        dp_drho: f64,
        dp_de: f64,
    ) -> Self {
        let velocity2: f64 = velocity.iter().map(|v| v * v).sum();
        let static_enthalpy = enthalpy - 0.5 * velocity2;
        let static_energy = static_enthalpy - pressure / density;
        let kappa = dp_de / density;
        let chi = dp_drho - kappa * static_energy;
        Self::new(density, velocity, pressure, enthalpy, chi, kappa)
    }

    /// Attach a grid velocity (required per side when the grid is dynamic).
    pub fn with_grid_velocity(mut self, grid_velocity: &[f64]) -> Self {
        debug_assert_eq!(grid_velocity.len(), self.n_dim);
        let mut w = [0.0; MAX_DIM];
        w[..grid_velocity.len()].copy_from_slice(grid_velocity);
        self.grid_velocity = Some(w);
        self
    }

    /// Spatial dimension this state was built for.
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }
}

/// Quantities derived from a [`FaceState`] for one residual evaluation.
///
/// Recomputed fresh per call; never cached across faces.
#[derive(Clone, Copy, Debug)]
pub struct SideQuantities {
    /// Density ρ.
    pub density: f64,
    /// Velocity components.
    pub velocity: [f64; MAX_DIM],
    /// Static pressure.
    pub pressure: f64,
    /// Total enthalpy H.
    pub enthalpy: f64,
    /// Closure coefficient chi.
    pub chi: f64,
    /// Closure coefficient kappa.
    pub kappa: f64,
    /// |v|².
    pub velocity2: f64,
    /// Total energy E = H − p/ρ.
    pub energy: f64,
    /// Static enthalpy h = H − |v|²/2.
    pub static_enthalpy: f64,
    /// Static internal energy e = h − p/ρ.
    pub static_energy: f64,
    /// Speed of sound c = √(chi + kappa·h).
    pub sound_speed: f64,
}

impl SideQuantities {
    /// Derive the per-side quantities from a face state.
    pub fn derive(state: &FaceState, n_dim: usize) -> Self {
        let mut velocity2 = 0.0;
        for v in &state.velocity[..n_dim] {
            velocity2 += v * v;
        }
        let energy = state.enthalpy - state.pressure / state.density;
        let static_enthalpy = state.enthalpy - 0.5 * velocity2;
        let static_energy = static_enthalpy - state.pressure / state.density;
        let sound_speed = (state.chi + state.kappa * static_enthalpy).sqrt();
        Self {
            density: state.density,
            velocity: state.velocity,
            pressure: state.pressure,
            enthalpy: state.enthalpy,
            chi: state.chi,
            kappa: state.kappa,
            velocity2,
            energy,
            static_enthalpy,
            static_energy,
            sound_speed,
        }
    }

    /// Reconstruct the conservative vector [ρ, ρv, ρE] into `u`.
    ///
    /// `u` must have length `n_dim + 2`.
    pub fn conservative(&self, n_dim: usize, u: &mut [f64]) {
        u[0] = self.density;
        for i in 0..n_dim {
            u[i + 1] = self.density * self.velocity[i];
        }
        u[n_dim + 1] = self.density * self.energy;
    }

    /// Velocity projected onto a unit normal.
    #[inline]
    pub fn projected_velocity(&self, unit_normal: &[f64]) -> f64 {
        let mut proj = 0.0;
        for (v, n) in self.velocity.iter().zip(unit_normal) {
            proj += v * n;
        }
        proj
    }
}
