//! Simulation parameters, loadable from TOML.
//!
//! ```toml
//! dim = 1
//! number_points = 256
//! boundary = "open"
//! start = 0.0
//! domain_length = 15.0
//! dt = 0.001
//!
//! [solver]
//! tol = 1e-8
//!
//! [pulse]
//! kind = "plane"
//! energy = 500.0
//! center = 2.0
//! ```
//! The `[solver]` and `[pulse]` tables are optional. In 2D, `start` is a pair,
//! e.g. `start = [0.0, 0.0]`.

use std::path::Path;
use serde::{ Deserialize, Serialize };
use crate::{
    error::ConfigError,
    grid::{ Boundary, Dim, Grid, Origin },
    linsolve::SolverConfig,
    pulse::Pulse,
    simulation::SimResult,
};

/// Fixed parameters of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spatial dimensions, 1 or 2.
    pub dim: usize,
    /// Requested point count `N`; see [`Grid`] for how it maps to the number
    /// of sampled points.
    pub number_points: usize,
    pub boundary: Boundary,
    /// Start of the domain along each axis.
    pub start: Origin,
    /// Length of the domain along each axis.
    pub domain_length: f64,
    /// Time step.
    pub dt: f64,
    /// Settings for iterative solvers.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Optional initial wave packet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<Pulse>,
}

impl Config {
    /// Create a new `Config` with default solver settings and no pulse.
    pub fn new<O>(
        dim: usize,
        number_points: usize,
        boundary: Boundary,
        start: O,
        domain_length: f64,
        dt: f64,
    ) -> Self
    where O: Into<Origin>
    {
        Self {
            dim,
            number_points,
            boundary,
            start: start.into(),
            domain_length,
            dt,
            solver: SolverConfig::default(),
            pulse: None,
        }
    }

    /// Set the solver settings.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Set the initial pulse.
    pub fn with_pulse(mut self, pulse: Pulse) -> Self {
        self.pulse = Some(pulse);
        self
    }

    /// Build the grid described by `self`.
    pub fn grid(&self) -> Result<Grid, ConfigError> {
        let dim = Dim::from_usize(self.dim)?;
        Grid::new(
            dim,
            self.boundary,
            self.number_points,
            self.start,
            self.domain_length,
        )
    }

    /// Check every parameter.
    pub fn validate(&self) -> SimResult<()> {
        let grid = self.grid()?;
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(ConfigError::BadTimeStep(self.dt).into());
        }
        self.solver.validate()?;
        if let Some(pulse) = &self.pulse {
            pulse.validate(grid.dim())?;
        }
        Ok(())
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let contents
            = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                msg: e.to_string(),
            })?;
        Self::from_toml_str(&contents)
    }

    /// Render as a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ error::SimError, linsolve::Method };

    const SCENARIO: &str = r#"
dim = 1
number_points = 256
boundary = "open"
start = 0.0
domain_length = 15.0
dt = 0.001

[solver]
tol = 1e-8

[pulse]
kind = "plane"
energy = 500.0
center = 2.0
"#;

    #[test]
    fn parses_scenario() {
        let config = Config::from_toml_str(SCENARIO).unwrap();
        assert_eq!(config.dim, 1);
        assert_eq!(config.boundary, Boundary::Open);
        assert_eq!(config.start, Origin::D1(0.0));
        assert_eq!(config.solver.tol, 1e-8);
        assert_eq!(config.solver.maxiters, SolverConfig::default().maxiters);
        assert_eq!(config.pulse, Some(Pulse::plane(500.0, 2.0)));
        config.validate().unwrap();
        assert_eq!(config.grid().unwrap().rank(), 255);
    }

    #[test]
    fn toml_round_trip_2d() {
        let config = Config::new(2, 100, Boundary::Dirichlet, (0.0, 0.0), 2.0, 1e-3)
            .with_solver(SolverConfig { restart: 40, ..Default::default() })
            .with_pulse(
                Pulse::circular(1000.0, (0.1, 1.0), (1.0, 0.0)).with_width(0.1));
        let s = config.to_toml_string().unwrap();
        let back = Config::from_toml_str(&s).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn method_names() {
        #[derive(Deserialize)]
        struct M { method: Method }
        let m: M = toml::from_str("method = \"bicgstab\"").unwrap();
        assert_eq!(m.method, Method::BiCgStab);
        let m: M = toml::from_str("method = \"lgmres\"").unwrap();
        assert_eq!(m.method, Method::LGmres);
    }

    #[test]
    fn invalid_configs() {
        let bad_dim = Config::new(3, 10, Boundary::Open, 0.0, 1.0, 1e-3);
        assert!(matches!(
            bad_dim.validate(),
            Err(SimError::Config(ConfigError::BadDim(3)))
        ));
        let bad_origin = Config::new(2, 10, Boundary::Open, 0.0, 1.0, 1e-3);
        assert!(matches!(
            bad_origin.validate(),
            Err(SimError::Config(ConfigError::BadOrigin { dim: 2, .. }))
        ));
        let bad_dt = Config::new(1, 10, Boundary::Open, 0.0, 1.0, -1e-3);
        assert!(matches!(
            bad_dt.validate(),
            Err(SimError::Config(ConfigError::BadTimeStep(_)))
        ));
        let bad_solver = Config::new(1, 10, Boundary::Open, 0.0, 1.0, 1e-3)
            .with_solver(SolverConfig::default().with_maxiters(0));
        assert!(matches!(bad_solver.validate(), Err(SimError::Solve(_))));
        let bad_pulse = Config::new(1, 10, Boundary::Open, 0.0, 1.0, 1e-3)
            .with_pulse(Pulse::circular(1.0, (0.0, 0.0), (1.0, 0.0)));
        assert!(matches!(
            bad_pulse.validate(),
            Err(SimError::Config(ConfigError::UnsupportedPulse { .. }))
        ));
        assert!(matches!(
            Config::from_toml_str("dim = \"one\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_file("/nonexistent/cnspace.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
