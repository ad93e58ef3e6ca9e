#![allow(dead_code, non_snake_case)]

//! Provides a position-space solver for the one- and two-dimensional
//! time-dependent Schrödinger equation (TDSE) in an arbitrary static
//! potential, using finite differences and the Crank-Nicolson scheme.
//!
//! The main pieces are:
//! - Finite-difference Hamiltonians for open and Dirichlet boundaries in 1D
//!   and 2D ([`hamiltonian`])
//! - Crank-Nicolson propagation, forward and backward ([`propagate`])
//! - Interchangeable linear solvers for each step: banded direct LU and the
//!   CGS, BiCGSTAB, GMRES, LGMRES, and QMR Krylov methods ([`linsolve`])
//! - Gaussian wave packets for initial states ([`pulse`])
//! - A [`Simulation`][simulation::Simulation] aggregate driven by a
//!   TOML-loadable [`Config`][config::Config]
//!
//! See [`docs`] for theoretical background.
//!
//! Logging goes through the [`log`] facade; no logger is installed by this
//! crate.

pub mod error;
pub mod grid;
pub mod potential;
pub mod sparse;
pub mod hamiltonian;
pub mod linsolve;
pub mod propagate;
pub mod pulse;
pub mod config;
pub mod simulation;
pub mod utils;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-6;
pub(crate) const DEF_MAXITERS: usize = 1000;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;

pub use config::Config;
pub use grid::{ Boundary, Grid };
pub use linsolve::{ Method, SolverConfig };
pub use potential::Potential;
pub use pulse::Pulse;
pub use simulation::Simulation;
