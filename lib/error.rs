//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use thiserror::Error;
use crate::linsolve::Method;

/// Returned when a state vector does not match the rank of the operators it is
/// meant to be evolved by.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A>(a: &nd::ArrayBase<S, nd::Ix1>, n: usize)
        -> Result<(), Self>
    where S: nd::Data<Elem = A>
    {
        let na = a.len();
        (na == n).then_some(()).ok_or(Self(na, n))
    }
}

/// Returned when a simulation, grid, potential, or initial state is set up with
/// unsupported or nonsensical parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a dimensionality other than 1 or 2 is requested.
    #[error("unsupported dimensionality {0}; must be 1 or 2")]
    BadDim(usize),

    /// Returned when too few grid points are requested for the boundary mode.
    #[error("number of points must be at least {1} for this boundary mode; got {0}")]
    BadNumberPoints(usize, usize),

    /// Returned when a non-positive or non-finite domain length is encountered.
    #[error("domain length must be positive and finite; got {0}")]
    BadDomainLength(f64),

    /// Returned when the domain origin does not match the dimensionality or is
    /// not finite.
    #[error("domain origin must be a finite point of dimension {dim}; got {got:?}")]
    BadOrigin { dim: usize, got: Vec<f64> },

    /// Returned when a non-positive or non-finite time step is encountered.
    #[error("time step must be positive and finite; got {0}")]
    BadTimeStep(f64),

    /// Returned when a potential's arity does not match the grid.
    #[error("potential takes {potential} coordinate(s) but the grid is {grid}-dimensional")]
    PotentialArity { potential: usize, grid: usize },

    /// Returned when the potential evaluates to NaN or an infinity.
    #[error("potential is not finite at {at:?}; got {value}")]
    NonFinitePotential { at: Vec<f64>, value: f64 },

    /// Returned when a pulse kind cannot be sampled on the grid.
    #[error("pulse kind `{pulse}` is not supported in {dim} dimension(s)")]
    UnsupportedPulse { pulse: &'static str, dim: usize },

    /// Returned when a pulse energy is non-positive or non-finite.
    #[error("pulse energy must be positive and finite; got {0}")]
    BadEnergy(f64),

    /// Returned when a pulse width is non-positive or non-finite.
    #[error("pulse width must be positive and finite; got {0}")]
    BadWidth(f64),

    /// Returned when a circular pulse is given a zero velocity.
    #[error("pulse velocity must be non-zero; got ({0}, {1})")]
    BadVelocity(f64, f64),

    /// Returned when a configuration file cannot be read.
    #[error("unable to read config file {path}: {msg}")]
    Read { path: String, msg: String },

    /// Returned when a configuration string cannot be parsed.
    #[error("unable to parse config: {0}")]
    Parse(String),

    /// Returned when a configuration cannot be written out.
    #[error("unable to serialize config: {0}")]
    Serialize(String),

    /// Returned when a simulation is stepped before its state is initialized.
    #[error("wavefunction has not been initialized")]
    NoState,
}

/// Returned from linear solvers.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Returned when an iterative method exhausts its iteration budget without
    /// meeting its tolerance.
    #[error("{method:?} did not converge within {iters} iterations; relative residual {residual:.3e}")]
    NonConvergence { method: Method, iters: usize, residual: f64 },

    /// Returned when an iterative method hits a zero inner product and cannot
    /// continue.
    #[error("{method:?} broke down after {iters} iterations; relative residual {residual:.3e}")]
    Breakdown { method: Method, iters: usize, residual: f64 },

    /// Returned when a non-iterative method is asked for an iterate.
    #[error("{0:?} is not an iterative method")]
    NotIterative(Method),

    /// Returned when a direct factorization encounters a zero pivot.
    #[error("direct factorization encountered a zero pivot at row {0}")]
    ZeroPivot(usize),

    /// Returned when a non-positive tolerance is encountered.
    #[error("tolerance must be greater than 0; got {0}")]
    BadTolerance(f64),

    /// Returned when a zero iteration or subspace count is encountered.
    #[error("{0} must be greater than 0")]
    BadCount(&'static str),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}

impl SolveError {
    pub(crate) fn check_tolerance(tol: f64) -> Result<(), Self> {
        (tol > 0.0 && tol.is_finite()).then_some(()).ok_or(Self::BadTolerance(tol))
    }

    pub(crate) fn check_count(what: &'static str, n: usize)
        -> Result<(), Self>
    {
        (n != 0).then_some(()).ok_or(Self::BadCount(what))
    }

    /// Return `true` if `self` is a recoverable failure of an iterative method,
    /// i.e. one that may succeed with a different method or larger budget.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonConvergence { .. } | Self::Breakdown { .. })
    }
}

/// Returned from [`Simulation`][crate::simulation::Simulation] operations.
#[derive(Debug, Error)]
pub enum SimError {
    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`SolveError`]
    #[error("solver error: {0}")]
    Solve(#[from] SolveError),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}
