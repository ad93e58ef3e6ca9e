//! Solvers for the complex linear systems `A·x = b` arising at each
//! Crank-Nicolson step.
//!
//! One direct method (banded LU in natural ordering) and five Krylov methods
//! are provided, selected by [`Method`]. Iterative methods start from an
//! initial guess (the previous state, in practice) and stop once
//! ```text
//! ‖b - A·x‖ ≤ tol ‖b‖
//! ```
//! or once their iteration budget is spent, in which case the failure is
//! reported as a [`SolveError`] rather than handed back as a solution.

use ndarray as nd;
use ndarray_linalg::Norm;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use sprs::CsMat;
use crate::{
    Arr1,
    error::{ LengthError, SolveError },
    sparse,
    DEF_EPSILON,
    DEF_MAXITERS,
};

pub mod direct;
pub mod gmres;
pub mod krylov;

pub use direct::BandedLu;

pub type SolveResult<T> = Result<T, SolveError>;

/// A linear operator on complex vectors.
///
/// Implemented for complex CSR matrices; solvers only ever borrow their
/// operator immutably.
pub trait LinOp {
    /// Dimension of the (square) operator.
    fn rank(&self) -> usize;

    /// Compute `A·x`.
    fn apply(&self, x: &nd::Array1<C64>) -> nd::Array1<C64>;

    /// Compute `A^H·x`.
    fn apply_adjoint(&self, x: &nd::Array1<C64>) -> nd::Array1<C64>;
}

impl LinOp for CsMat<C64> {
    fn rank(&self) -> usize { self.rows() }

    fn apply(&self, x: &nd::Array1<C64>) -> nd::Array1<C64> {
        sparse::matvec(self, x)
    }

    fn apply_adjoint(&self, x: &nd::Array1<C64>) -> nd::Array1<C64> {
        sparse::matvec_adjoint(self, x)
    }
}

/// Solving method selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Banded LU factorization; exact up to rounding.
    Direct,
    /// Conjugate gradient squared.
    Cgs,
    /// Biconjugate gradient stabilized.
    BiCgStab,
    /// Restarted generalized minimal residual.
    Gmres,
    /// GMRES augmented with error approximations from previous restart
    /// cycles.
    LGmres,
    /// Quasi-minimal residual.
    Qmr,
}

impl Method {
    /// All methods, direct first.
    pub const ALL: [Method; 6] = [
        Self::Direct,
        Self::Cgs,
        Self::BiCgStab,
        Self::Gmres,
        Self::LGmres,
        Self::Qmr,
    ];

    /// Return `true` if `self` is `Direct`.
    pub fn is_direct(&self) -> bool { matches!(self, Self::Direct) }

    /// Return `true` if `self` is one of the Krylov methods.
    pub fn is_iterative(&self) -> bool { !self.is_direct() }
}

/// Tolerance and iteration-budget settings for the iterative methods.
///
/// Ignored by [`Method::Direct`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative residual tolerance (default: `1e-6`).
    pub tol: f64,
    /// Maximum number of iterations, i.e. applications of the operator for
    /// the GMRES family (default: `1000`).
    pub maxiters: usize,
    /// Krylov subspace size between GMRES restarts (default: `20`).
    pub restart: usize,
    /// Inner Krylov subspace size for LGMRES (default: `30`).
    pub inner: usize,
    /// Number of augmentation vectors carried between LGMRES cycles (default:
    /// `3`).
    pub outer_k: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tol: DEF_EPSILON,
            maxiters: DEF_MAXITERS,
            restart: 20,
            inner: 30,
            outer_k: 3,
        }
    }
}

impl SolverConfig {
    /// Set the tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the iteration budget.
    pub fn with_maxiters(mut self, maxiters: usize) -> Self {
        self.maxiters = maxiters;
        self
    }

    /// Check that all parameters are usable.
    pub fn validate(&self) -> SolveResult<()> {
        SolveError::check_tolerance(self.tol)?;
        SolveError::check_count("maxiters", self.maxiters)?;
        SolveError::check_count("restart", self.restart)?;
        SolveError::check_count("inner", self.inner)?;
        Ok(())
    }
}

/// Final state of an iterative solve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The residual met the tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIters,
    /// A vanishing inner product stopped the recurrence.
    Breakdown,
}

/// Best iterate reached by an iterative solver.
#[derive(Clone, Debug)]
pub struct Iterate {
    /// Approximate solution.
    pub x: nd::Array1<C64>,
    /// Number of iterations performed.
    pub iters: usize,
    /// Relative residual `‖b - A·x‖ / ‖b‖` of `x`.
    pub residual: f64,
    /// How the solver stopped.
    pub status: Status,
}

impl Iterate {
    pub(crate) fn new<L>(
        A: &L,
        b: &nd::Array1<C64>,
        x: nd::Array1<C64>,
        iters: usize,
        status: Status,
    ) -> Self
    where L: LinOp + ?Sized
    {
        let residual = relative_residual(A, b, &x);
        Self { x, iters, residual, status }
    }

    /// Return `true` if the solver converged.
    pub fn converged(&self) -> bool { self.status == Status::Converged }

    /// Convert to a plain solution, failing unless the solver converged and
    /// the recomputed relative residual is within `tol`.
    pub fn into_result(self, method: Method, tol: f64)
        -> SolveResult<nd::Array1<C64>>
    {
        let Self { x, iters, residual, status } = self;
        match status {
            Status::Converged if residual <= tol => Ok(x),
            Status::Converged | Status::MaxIters
                => Err(SolveError::NonConvergence { method, iters, residual }),
            Status::Breakdown
                => Err(SolveError::Breakdown { method, iters, residual }),
        }
    }
}

// conjugated inner product `a^H b`
pub(crate) fn dotc(a: &nd::Array1<C64>, b: &nd::Array1<C64>) -> C64 {
    a.iter().zip(b).fold(C64::from(0.0), |acc, (ak, bk)| acc + ak.conj() * bk)
}

pub(crate) fn residual<L>(A: &L, b: &nd::Array1<C64>, x: &nd::Array1<C64>)
    -> nd::Array1<C64>
where L: LinOp + ?Sized
{
    b - &A.apply(x)
}

// ‖b - A·x‖ / ‖b‖, taking ‖b‖ = 1 when b = 0
pub(crate) fn relative_residual<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x: &nd::Array1<C64>,
) -> f64
where L: LinOp + ?Sized
{
    let bnorm = b.norm_l2();
    let r = residual(A, b, x).norm_l2();
    if bnorm > 0.0 { r / bnorm } else { r }
}

/// Run an iterative method and return its best iterate, converged or not.
///
/// `A` is never modified. Fails only on invalid configuration or mismatched
/// lengths; use [`Iterate::into_result`] to treat non-convergence as an
/// error. Fails with [`SolveError::NotIterative`] for [`Method::Direct`],
/// which needs the matrix itself; see [`solve`].
pub fn iterate<L, S, T>(
    method: Method,
    A: &L,
    b: &Arr1<S>,
    x0: &Arr1<T>,
    config: &SolverConfig,
) -> SolveResult<Iterate>
where
    L: LinOp + ?Sized,
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    config.validate()?;
    LengthError::check(b, A.rank())?;
    LengthError::check(x0, A.rank())?;
    let b = b.to_owned();
    let x0 = x0.to_owned();
    // the trivial system is solved exactly by x = 0
    if b.iter().all(|bk| *bk == C64::from(0.0)) {
        return Ok(Iterate {
            x: nd::Array1::zeros(A.rank()),
            iters: 0,
            residual: 0.0,
            status: Status::Converged,
        });
    }
    let it = match method {
        Method::Direct => return Err(SolveError::NotIterative(method)),
        Method::Cgs => krylov::cgs(A, &b, x0, config),
        Method::BiCgStab => krylov::bicgstab(A, &b, x0, config),
        Method::Qmr => krylov::qmr(A, &b, x0, config),
        Method::Gmres => gmres::gmres(A, &b, x0, config),
        Method::LGmres => gmres::lgmres(A, &b, x0, config),
    };
    if !it.converged() || it.residual > config.tol {
        log::warn!(
            "linsolve::iterate: {:?} stopped with status {:?} after {} iterations \
            (relative residual {:.3e}, tol {:.1e})",
            method, it.status, it.iters, it.residual, config.tol,
        );
    }
    Ok(it)
}

/// Master solving function for all [methods][Method].
///
/// Solves `A·x = b` starting from `x0` (ignored by the direct method) and
/// fails with [`SolveError::NonConvergence`] or [`SolveError::Breakdown`] if
/// an iterative method does not reach `config.tol`.
pub fn solve<S, T>(
    method: Method,
    A: &CsMat<C64>,
    b: &Arr1<S>,
    x0: &Arr1<T>,
    config: &SolverConfig,
) -> SolveResult<nd::Array1<C64>>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    match method {
        Method::Direct => BandedLu::factor(A)?.solve(b),
        _ => iterate(method, A, b, x0, config)?.into_result(method, config.tol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse;

    fn iterate_with(residual: f64, status: Status) -> Iterate {
        Iterate { x: nd::array![C64::from(1.0)], iters: 7, residual, status }
    }

    #[test]
    fn converged_status_is_checked_against_tol() {
        let ok = iterate_with(1e-9, Status::Converged);
        assert_eq!(ok.into_result(Method::Cgs, 1e-8).unwrap(), nd::array![C64::from(1.0)]);

        let drifted = iterate_with(3e-4, Status::Converged);
        assert!(matches!(
            drifted.into_result(Method::Cgs, 1e-8),
            Err(SolveError::NonConvergence { method: Method::Cgs, iters: 7, residual })
                if residual == 3e-4
        ));

        let broken = iterate_with(1e-9, Status::Breakdown);
        assert!(matches!(
            broken.into_result(Method::Qmr, 1e-8),
            Err(SolveError::Breakdown { method: Method::Qmr, .. })
        ));
    }

    #[test]
    fn solve_meets_tol_on_true_residual() {
        let n = 50;
        let K = sparse::tridiag(&vec![2.0; n], &vec![-1.0; n - 1]);
        let A = sparse::shifted_identity(&K, C64::new(0.0, 2.0));
        let b: nd::Array1<C64>
            = (0..n).map(|k| C64::from_polar(1.0, 0.2 * k as f64)).collect();
        let config = SolverConfig::default().with_tol(1e-11);
        let x0: nd::Array1<C64> = nd::Array1::zeros(n);
        for method in [Method::Cgs, Method::BiCgStab, Method::Qmr] {
            let x = solve(method, &A, &b, &x0, &config).unwrap();
            assert!(relative_residual(&A, &b, &x) <= config.tol, "{:?}", method);
        }
    }
}
