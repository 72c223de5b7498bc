//! Scheme configuration.
//!
//! [`SchemeConfig`] bundles the parameters that select the residual path
//! (explicit vs. implicit), the eigenvalue limiting policy, the Roe average
//! policy, and the grid-motion flag. Defaults follow the stable production
//! settings; the alternative policies are selectable but start disabled.

/// Time integration scheme of the outer solver.
///
/// The residual scheme only distinguishes implicit from explicit: implicit
/// integration requests exact flux Jacobians alongside the residual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeIntegration {
    /// Explicit multi-stage Runge-Kutta.
    #[default]
    RungeKutta,
    /// Single-stage explicit Euler.
    ExplicitEuler,
    /// Backward Euler; selects the Jacobian-assembling residual path.
    ImplicitEuler,
}

impl TimeIntegration {
    /// Whether this scheme requires Jacobian assembly.
    #[inline]
    pub fn is_implicit(self) -> bool {
        matches!(self, TimeIntegration::ImplicitEuler)
    }
}

/// Eigenvalue limiting policy applied before forming the upwind dissipation.
///
/// Only `MaxWave` is the production default. `HartenHyman` and `Absolute`
/// reproduce formulas that exist upstream in disabled form; they are kept as
/// named, selectable policies rather than dead code, and are not enabled by
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntropyFixPolicy {
    /// Lax-type floor: |λ| is bounded below by
    /// `entropy_fix_coeff * (|V·n| + c)` using the Roe-averaged state.
    #[default]
    MaxWave,
    /// Harten–Hyman smoothing: near-zero eigenvalues are replaced by
    /// `(λ² + ε²) / (2ε)` with ε built from the left/right wave speeds.
    HartenHyman,
    /// Plain absolute value, no correction.
    Absolute,
}

/// Averaging policy for the equation-of-state closure coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoeAveragePolicy {
    /// Simpson-style blend of the endpoint values (production default).
    #[default]
    Blended,
    /// Blended average followed by the guarded pressure-consistency
    /// rescaling of chi and kappa. Exists upstream in disabled form; kept
    /// selectable, not default.
    PressureCorrected,
}

/// Configuration for upwind flux schemes.
///
/// # Example
/// ```
/// use fv_rs::config::{SchemeConfig, TimeIntegration};
///
/// let config = SchemeConfig::default()
///     .with_time_integration(TimeIntegration::ImplicitEuler)
///     .with_entropy_fix_coeff(0.001);
/// assert!(config.time_integration.is_implicit());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchemeConfig {
    /// Outer time integration scheme; implicit selects Jacobian assembly.
    pub time_integration: TimeIntegration,
    /// Whether the mesh moves (ALE correction of projected velocities).
    pub dynamic_grid: bool,
    /// Central/upwind blend factor for the implicit residual.
    ///
    /// The stable range excludes 1.0 (pure central, no dissipation).
    pub roe_kappa: f64,
    /// Coefficient of the `MaxWave` eigenvalue floor.
    pub entropy_fix_coeff: f64,
    /// Eigenvalue limiting policy.
    pub entropy_fix: EntropyFixPolicy,
    /// Closure-coefficient averaging policy.
    pub roe_average: RoeAveragePolicy,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            time_integration: TimeIntegration::default(),
            dynamic_grid: false,
            roe_kappa: 0.5,
            entropy_fix_coeff: 0.001,
            entropy_fix: EntropyFixPolicy::default(),
            roe_average: RoeAveragePolicy::default(),
        }
    }
}

impl SchemeConfig {
    /// Set the time integration scheme.
    pub fn with_time_integration(mut self, scheme: TimeIntegration) -> Self {
        self.time_integration = scheme;
        self
    }

    /// Enable or disable the dynamic-grid (ALE) correction.
    pub fn with_dynamic_grid(mut self, dynamic: bool) -> Self {
        self.dynamic_grid = dynamic;
        self
    }

    /// Set the central/upwind blend factor for the implicit residual.
    pub fn with_roe_kappa(mut self, kappa: f64) -> Self {
        self.roe_kappa = kappa;
        self
    }

    /// Set the `MaxWave` entropy-fix coefficient.
    pub fn with_entropy_fix_coeff(mut self, coeff: f64) -> Self {
        self.entropy_fix_coeff = coeff;
        self
    }

    /// Select the eigenvalue limiting policy.
    pub fn with_entropy_fix(mut self, policy: EntropyFixPolicy) -> Self {
        self.entropy_fix = policy;
        self
    }

    /// Select the closure-coefficient averaging policy.
    pub fn with_roe_average(mut self, policy: RoeAveragePolicy) -> Self {
        self.roe_average = policy;
        self
    }
}
