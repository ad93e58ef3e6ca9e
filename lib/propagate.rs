//! Crank-Nicolson propagation.
//!
//! For a Hamiltonian `H` and time step `dt`, a single step solves
//! ```text
//! A ψ(t + dt) = B ψ(t)
//! A = I + i H dt / 2
//! B = I - i H dt / 2
//! ```
//! which is unitary to rounding error for Hermitian `H`. Stepping backward
//! solves the same system with the roles of `A` and `B` exchanged.

use ndarray as nd;
use num_complex::Complex64 as C64;
use sprs::CsMat;
use crate::{
    Arr1,
    error::{ ConfigError, LengthError },
    linsolve::{ self, BandedLu, LinOp, Method, SolveResult, SolverConfig },
    sparse,
};

/// Holds the pair of Crank-Nicolson matrices for a fixed Hamiltonian and time
/// step.
///
/// Direct factorizations are computed on first use and kept for the lifetime
/// of the propagator.
#[derive(Clone, Debug)]
pub struct Propagator {
    A: CsMat<C64>,
    B: CsMat<C64>,
    dt: f64,
    lu_A: Option<BandedLu>,
    lu_B: Option<BandedLu>,
}

impl Propagator {
    /// Build `A` and `B` from a real, symmetric Hamiltonian.
    ///
    /// Fails if `dt` is not positive and finite.
    ///
    /// *Panics if `H` is not square*.
    pub fn new(H: &CsMat<f64>, dt: f64) -> Result<Self, ConfigError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::BadTimeStep(dt));
        }
        assert_eq!(H.rows(), H.cols(), "Propagator::new: Hamiltonian must be square");
        let half = C64::new(0.0, dt / 2.0);
        let A = sparse::shifted_identity(H, half);
        let B = sparse::shifted_identity(H, -half);
        log::debug!(
            "Propagator::new: rank {}, {} non-zeros per matrix, dt = {:e}",
            A.rows(), A.nnz(), dt,
        );
        Ok(Self { A, B, dt, lu_A: None, lu_B: None })
    }

    /// The left-hand matrix `I + i H dt / 2`.
    pub fn a(&self) -> &CsMat<C64> { &self.A }

    /// The right-hand matrix `I - i H dt / 2`.
    pub fn b(&self) -> &CsMat<C64> { &self.B }

    /// Time step.
    pub fn dt(&self) -> f64 { self.dt }

    /// Length of the state vectors acted upon.
    pub fn rank(&self) -> usize { self.A.rows() }

    /// Advance a state by one time step.
    ///
    /// `psi` also serves as the initial guess for iterative methods. Fails
    /// without side effects if `psi` has the wrong length or if an iterative
    /// method does not converge.
    pub fn advance<S>(
        &mut self,
        psi: &Arr1<S>,
        method: Method,
        config: &SolverConfig,
    ) -> SolveResult<nd::Array1<C64>>
    where S: nd::Data<Elem = C64>
    {
        LengthError::check(psi, self.rank())?;
        let rhs = self.B.apply(&psi.to_owned());
        Self::do_solve(&self.A, &mut self.lu_A, &rhs, psi, method, config)
    }

    /// Step a state backward by one time step.
    ///
    /// This inverts [`advance`][Self::advance] up to solver tolerance.
    pub fn retreat<S>(
        &mut self,
        psi: &Arr1<S>,
        method: Method,
        config: &SolverConfig,
    ) -> SolveResult<nd::Array1<C64>>
    where S: nd::Data<Elem = C64>
    {
        LengthError::check(psi, self.rank())?;
        let rhs = self.A.apply(&psi.to_owned());
        Self::do_solve(&self.B, &mut self.lu_B, &rhs, psi, method, config)
    }

    fn do_solve<S>(
        lhs: &CsMat<C64>,
        lu: &mut Option<BandedLu>,
        rhs: &nd::Array1<C64>,
        x0: &Arr1<S>,
        method: Method,
        config: &SolverConfig,
    ) -> SolveResult<nd::Array1<C64>>
    where S: nd::Data<Elem = C64>
    {
        if method.is_direct() {
            let fact
                = match lu.take() {
                    Some(fact) => fact,
                    None => BandedLu::factor(lhs)?,
                };
            let x = fact.solve(rhs);
            *lu = Some(fact);
            x
        } else {
            linsolve::solve(method, lhs, rhs, x0, config)
        }
    }
}
