//! The top-level simulation object.
//!
//! A [`Simulation`] owns a fixed grid, the Crank-Nicolson propagator built
//! from the Hamiltonian on that grid, and the current wavefunction. Grid,
//! potential, and time step cannot be changed after construction.
//!
//! ```
//! use cnspace::{
//!     config::Config,
//!     grid::Boundary,
//!     linsolve::Method,
//!     potential::Potential,
//!     pulse::Pulse,
//!     simulation::Simulation,
//! };
//!
//! let config = Config::new(1, 128, Boundary::Open, 0.0, 10.0, 1e-3)
//!     .with_pulse(Pulse::plane(100.0, 3.0));
//! let V = Potential::new_1d(|x| if (6.0..6.5).contains(&x) { 50.0 } else { 0.0 });
//! let mut sim = Simulation::new(&config, &V).unwrap();
//! let p0 = sim.total_probability().unwrap();
//! sim.evolve_n(10, Method::Direct).unwrap();
//! assert_eq!(sim.steps(), 10);
//! assert!((sim.total_probability().unwrap() - p0).abs() < 1e-10 * p0);
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use sprs::CsMat;
use crate::{
    Arr1,
    config::Config,
    error::{ ConfigError, LengthError, SimError },
    grid::{ Dim, Grid },
    hamiltonian,
    linsolve::{ LinOp, Method, SolverConfig },
    potential::Potential,
    propagate::Propagator,
    pulse::Pulse,
    sparse,
    utils,
};

pub type SimResult<T> = Result<T, SimError>;

/// Time evolution of a single wavefunction under a static potential.
#[derive(Clone, Debug)]
pub struct Simulation {
    grid: Grid,
    H: CsMat<f64>,
    prop: Propagator,
    solver: SolverConfig,
    psi: Option<nd::Array1<C64>>,
    // net number of steps taken since the state was last set
    steps: i64,
}

impl Simulation {
    /// Build the grid, Hamiltonian, and propagation matrices.
    ///
    /// If `config` carries a pulse, the wavefunction is initialized from it;
    /// otherwise it must be set with [`set_pulse`][Self::set_pulse] or
    /// [`set_psi`][Self::set_psi] before stepping.
    pub fn new(config: &Config, V: &Potential) -> SimResult<Self> {
        config.validate()?;
        let grid = config.grid()?;
        let H = hamiltonian::build(&grid, V)?;
        let prop = Propagator::new(&H, config.dt)?;
        let mut sim = Self {
            grid,
            H,
            prop,
            solver: config.solver,
            psi: None,
            steps: 0,
        };
        if let Some(pulse) = &config.pulse {
            sim.set_pulse(pulse)?;
        }
        log::debug!(
            "Simulation::new: {}D {:?} grid of {} points, dt = {:e}",
            sim.grid.dim().as_usize(), sim.grid.boundary(), sim.grid.rank(),
            sim.prop.dt(),
        );
        Ok(sim)
    }

    /// Set the wavefunction from a pulse and reset the clock.
    pub fn set_pulse(&mut self, pulse: &Pulse) -> SimResult<()> {
        self.psi = Some(pulse.sample(&self.grid)?);
        self.steps = 0;
        Ok(())
    }

    /// Set the wavefunction directly and reset the clock.
    ///
    /// Values on Dirichlet boundary points are replaced by zero.
    pub fn set_psi<S>(&mut self, psi: &Arr1<S>) -> SimResult<()>
    where S: nd::Data<Elem = C64>
    {
        LengthError::check(psi, self.grid.rank())?;
        let mut psi = psi.to_owned();
        psi.indexed_iter_mut()
            .filter(|(k, _)| self.grid.is_boundary(*k))
            .for_each(|(_, p)| { *p = C64::from(0.0); });
        self.psi = Some(psi);
        self.steps = 0;
        Ok(())
    }

    /// Advance by one time step using the stored solver settings.
    pub fn evolve(&mut self, method: Method) -> SimResult<()> {
        let solver = self.solver;
        self.evolve_with(method, &solver)
    }

    /// Advance by one time step with explicit solver settings.
    ///
    /// On failure the wavefunction and clock are left untouched.
    pub fn evolve_with(&mut self, method: Method, solver: &SolverConfig)
        -> SimResult<()>
    {
        let psi = self.psi.as_ref().ok_or(ConfigError::NoState)?;
        let next = self.prop.advance(psi, method, solver)?;
        self.psi = Some(next);
        self.steps += 1;
        log::trace!("Simulation::evolve: step {} ({:?})", self.steps, method);
        Ok(())
    }

    /// Step backward in time by one time step.
    ///
    /// On failure the wavefunction and clock are left untouched.
    pub fn evolve_back(&mut self, method: Method) -> SimResult<()> {
        let psi = self.psi.as_ref().ok_or(ConfigError::NoState)?;
        let prev = self.prop.retreat(psi, method, &self.solver)?;
        self.psi = Some(prev);
        self.steps -= 1;
        log::trace!("Simulation::evolve_back: step {} ({:?})", self.steps, method);
        Ok(())
    }

    /// Advance by `n` time steps, stopping at the first failure.
    pub fn evolve_n(&mut self, n: usize, method: Method) -> SimResult<()> {
        (0..n).try_for_each(|_| self.evolve(method))
    }

    /// Get the grid.
    pub fn grid(&self) -> &Grid { &self.grid }

    /// Get the Hamiltonian.
    pub fn hamiltonian(&self) -> &CsMat<f64> { &self.H }

    /// Get the propagator.
    pub fn propagator(&self) -> &Propagator { &self.prop }

    /// Get the stored solver settings.
    pub fn solver(&self) -> &SolverConfig { &self.solver }

    /// Replace the stored solver settings.
    pub fn set_solver(&mut self, solver: SolverConfig) -> SimResult<()> {
        solver.validate()?;
        self.solver = solver;
        Ok(())
    }

    /// Get the time step.
    pub fn dt(&self) -> f64 { self.prop.dt() }

    /// Get the net number of steps taken since the state was set.
    pub fn steps(&self) -> i64 { self.steps }

    /// Get the elapsed time since the state was set.
    pub fn time(&self) -> f64 { self.steps as f64 * self.prop.dt() }

    /// Get the current wavefunction, if initialized.
    pub fn psi(&self) -> Option<&nd::Array1<C64>> { self.psi.as_ref() }

    /// Get the probability density `|ψ|²`.
    pub fn norm_psi(&self) -> Option<nd::Array1<f64>> {
        self.psi.as_ref().map(utils::prob_density)
    }

    /// Get the real part of the wavefunction.
    pub fn real_psi(&self) -> Option<nd::Array1<f64>> {
        self.psi.as_ref().map(|psi| psi.mapv(|p| p.re))
    }

    /// Get the imaginary part of the wavefunction.
    pub fn imag_psi(&self) -> Option<nd::Array1<f64>> {
        self.psi.as_ref().map(|psi| psi.mapv(|p| p.im))
    }

    /// Get the probability density as an `n × n` array indexed `[x, y]`.
    ///
    /// Returns `None` for 1D grids.
    pub fn norm_psi_2d(&self) -> Option<nd::Array2<f64>> {
        self.norm_psi().and_then(|rho| self.grid.unflatten(&rho))
    }

    /// Get the total probability `Σ |ψ|² h^dim`.
    pub fn total_probability(&self) -> Option<f64> {
        self.psi.as_ref().map(|psi| utils::wf_norm(psi, self.grid.cell()))
    }

    /// Get the momentum-space density over wavenumbers, in increasing order.
    ///
    /// Wavenumbers are spaced `2π / (rank · h)` with `h = L/N` the stencil
    /// step of the Hamiltonian, so they line up with the discrete kinetic
    /// term. On open grids this is not the coordinate spacing `L/(N − 2)` of
    /// the sample points.
    ///
    /// Returns `None` for 2D grids.
    pub fn momentum_density(&self) -> Option<(nd::Array1<f64>, nd::Array1<f64>)> {
        if self.grid.dim() != Dim::D1 { return None; }
        self.psi.as_ref().map(|psi| utils::momentum_density(psi, self.grid.h()))
    }

    /// Get the expectation value of the x-coordinate.
    pub fn expect_x(&self) -> Option<f64> {
        let rho = self.norm_psi()?;
        let total = rho.sum();
        if total == 0.0 { return None; }
        let coords = self.grid.coords();
        let x = coords.column(0);
        Some(x.iter().zip(&rho).map(|(xk, rk)| xk * rk).sum::<f64>() / total)
    }

    /// Get the expectation value of the energy, `⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩`.
    pub fn expect_energy(&self) -> Option<f64> {
        let psi = self.psi.as_ref()?;
        let cell = self.grid.cell();
        let norm = utils::wf_norm(psi, cell);
        if norm == 0.0 { return None; }
        let Hpsi = sparse::to_complex(&self.H).apply(psi);
        Some(utils::wf_dot(psi, &Hpsi, cell).re / norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ error::SolveError, grid::Boundary };

    fn free_1d() -> Simulation {
        let config = Config::new(1, 256, Boundary::Open, 0.0, 15.0, 1e-3)
            .with_pulse(Pulse::plane(500.0, 2.0));
        Simulation::new(&config, &Potential::zero(Dim::D1)).unwrap()
    }

    #[test]
    fn unset_state_cannot_step() {
        let config = Config::new(1, 32, Boundary::Open, 0.0, 1.0, 1e-3);
        let mut sim = Simulation::new(&config, &Potential::zero(Dim::D1))
            .unwrap();
        assert!(sim.psi().is_none());
        assert!(sim.total_probability().is_none());
        assert!(matches!(
            sim.evolve(Method::Direct),
            Err(SimError::Config(ConfigError::NoState))
        ));
    }

    #[test]
    fn arity_mismatch_is_fatal() {
        let config = Config::new(2, 16, Boundary::Open, (0.0, 0.0), 1.0, 1e-3);
        let res = Simulation::new(&config, &Potential::new_1d(|x| x));
        assert!(matches!(
            res,
            Err(SimError::Config(ConfigError::PotentialArity { .. }))
        ));
    }

    #[test]
    fn singular_potential_on_pinned_edge() {
        let config = Config::new(1, 64, Boundary::Dirichlet, 0.0, 4.0, 1e-3)
            .with_pulse(Pulse::plane(50.0, 2.0));
        let mut sim = Simulation::new(&config, &Potential::new_1d(|x| 1.0 / x))
            .unwrap();
        assert_eq!(sim.hamiltonian().get(0, 0), Some(&1.0));
        let p0 = sim.total_probability().unwrap();
        sim.evolve_n(10, Method::Direct).unwrap();
        let p1 = sim.total_probability().unwrap();
        assert!(((p1 - p0) / p0).abs() < 1e-10);

        // same for a 1/r center sitting on a 2D edge
        let config = Config::new(2, 16, Boundary::Dirichlet, (0.0, 0.0), 1.0, 1e-3)
            .with_pulse(Pulse::circular(50.0, (0.5, 0.5), (1.0, 0.0)));
        let V = Potential::new_2d(|x, y| 1.0 / (x - 0.5).hypot(y));
        let sim = Simulation::new(&config, &V).unwrap();
        assert!(sim.hamiltonian().data().iter().all(|a| a.is_finite()));
    }

    #[test]
    fn momentum_axis_uses_stencil_step() {
        let config = Config::new(1, 64, Boundary::Open, 0.0, 8.0, 1e-3)
            .with_pulse(Pulse::plane(100.0, 4.0));
        let sim = Simulation::new(&config, &Potential::zero(Dim::D1)).unwrap();
        let (k, _) = sim.momentum_density().unwrap();
        assert_eq!(k.len(), 63);
        let dk = std::f64::consts::TAU / (63.0 * (8.0 / 64.0));
        assert!(k.iter().zip(k.iter().skip(1)).all(|(a, b)| (b - a - dk).abs() < 1e-9));
    }

    #[test]
    fn clock_and_accessors() {
        let mut sim = free_1d();
        sim.evolve_n(3, Method::Direct).unwrap();
        sim.evolve_back(Method::Direct).unwrap();
        assert_eq!(sim.steps(), 2);
        assert!((sim.time() - 2e-3).abs() < 1e-15);
        let n = sim.grid().rank();
        assert_eq!(sim.real_psi().unwrap().len(), n);
        assert_eq!(sim.imag_psi().unwrap().len(), n);
        assert!(sim.norm_psi_2d().is_none());
        sim.set_pulse(&Pulse::plane(500.0, 2.0)).unwrap();
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn failed_step_leaves_state() {
        let mut sim = free_1d();
        let before = sim.psi().unwrap().clone();
        let starved = SolverConfig::default().with_tol(1e-15).with_maxiters(1);
        let res = sim.evolve_with(Method::Cgs, &starved);
        match res {
            Err(SimError::Solve(e)) => assert!(e.is_recoverable()),
            other => panic!("expected a solver failure, got {:?}", other),
        }
        assert_eq!(sim.psi().unwrap(), &before);
        assert_eq!(sim.steps(), 0);
        let wrong: nd::Array1<C64> = nd::Array1::zeros(3);
        assert!(matches!(sim.set_psi(&wrong), Err(SimError::Length(_))));
        assert!(matches!(
            sim.set_solver(SolverConfig::default().with_tol(0.0)),
            Err(SimError::Solve(SolveError::BadTolerance(_)))
        ));
    }

    #[test]
    fn energy_and_momentum_of_plane_pulse() {
        let sim = free_1d();
        let (k, rho) = sim.momentum_density().unwrap();
        let imax
            = rho.iter().enumerate()
            .fold((0, 0.0), |(im, m), (i, r)| if *r > m { (i, *r) } else { (im, m) })
            .0;
        let dk = k[1] - k[0];
        assert!((k[imax] - 500.0_f64.sqrt()).abs() <= dk);
        // kinetic energy of the packet: k0² plus envelope spread, less the
        // finite-difference dispersion
        let E = sim.expect_energy().unwrap();
        assert!(E > 300.0 && E < 520.0);
        let x = sim.expect_x().unwrap();
        assert!((x - 2.0).abs() < 1e-6);
    }
}
