//! Initial wave packets.
//!
//! Every pulse is a Gaussian envelope of width `w` modulated by a plane wave
//! whose wavenumber is set by the pulse energy, `k = √E` (in units where
//! `ħ = 2m = 1`):
//! ```text
//! Plane (1D)    : ψ(x)    = exp(i k x) exp(-(x - c)² / 2w²)
//! Plane (2D)    : ψ(x, y) = exp(i k x) exp(-(x - c)² / 2w²)
//! Circular (2D) : ψ(r)    = exp(i k v̂·r) exp(-|r - c|² / 2w²)
//! ```
//! The 2D plane pulse is a front travelling along +x and uniform in y. Pulses
//! are not normalized.

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::{
    error::ConfigError,
    grid::{ Dim, Grid },
};

/// Envelope width used when none is given.
pub const DEF_WIDTH: f64 = 0.3;

/// Description of an initial wave packet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pulse {
    /// Gaussian packet moving along +x. In 2D the envelope depends on `x`
    /// only.
    Plane {
        energy: f64,
        /// Envelope center along x.
        center: f64,
        #[serde(default)]
        width: Option<f64>,
    },
    /// Gaussian packet centered on a point and moving along `vel` (2D only).
    ///
    /// Only the direction of `vel` is used; the speed follows from `energy`.
    Circular {
        energy: f64,
        center: (f64, f64),
        #[serde(default)]
        width: Option<f64>,
        vel: (f64, f64),
    },
}

impl Pulse {
    /// Shorthand for a plane pulse with the default width.
    pub fn plane(energy: f64, center: f64) -> Self {
        Self::Plane { energy, center, width: None }
    }

    /// Shorthand for a circular pulse with the default width.
    pub fn circular(energy: f64, center: (f64, f64), vel: (f64, f64)) -> Self {
        Self::Circular { energy, center, width: None, vel }
    }

    /// Set the envelope width.
    pub fn with_width(mut self, w: f64) -> Self {
        match &mut self {
            Self::Plane { width, .. } => { *width = Some(w); },
            Self::Circular { width, .. } => { *width = Some(w); },
        }
        self
    }

    /// Name of the pulse kind, as used in configuration files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plane { .. } => "plane",
            Self::Circular { .. } => "circular",
        }
    }

    /// Kinetic energy parameter.
    pub fn energy(&self) -> f64 {
        match self {
            Self::Plane { energy, .. } => *energy,
            Self::Circular { energy, .. } => *energy,
        }
    }

    /// Envelope width, falling back to [`DEF_WIDTH`].
    pub fn width(&self) -> f64 {
        match self {
            Self::Plane { width, .. } => width.unwrap_or(DEF_WIDTH),
            Self::Circular { width, .. } => width.unwrap_or(DEF_WIDTH),
        }
    }

    /// Check parameters against a grid dimensionality.
    pub fn validate(&self, dim: Dim) -> Result<(), ConfigError> {
        let energy = self.energy();
        if !(energy > 0.0 && energy.is_finite()) {
            return Err(ConfigError::BadEnergy(energy));
        }
        let width = self.width();
        if !(width > 0.0 && width.is_finite()) {
            return Err(ConfigError::BadWidth(width));
        }
        match (self, dim) {
            (Self::Plane { .. }, _) => Ok(()),
            (Self::Circular { .. }, Dim::D1) => {
                Err(ConfigError::UnsupportedPulse {
                    pulse: self.kind(),
                    dim: dim.as_usize(),
                })
            },
            (Self::Circular { vel: (vx, vy), .. }, Dim::D2) => {
                let speed = vx.hypot(*vy);
                (speed > 0.0 && speed.is_finite()).then_some(())
                    .ok_or(ConfigError::BadVelocity(*vx, *vy))
            },
        }
    }

    /// Sample the pulse over every point of a grid, in flattened order.
    ///
    /// Samples on Dirichlet boundary points are set to zero.
    pub fn sample(&self, grid: &Grid) -> Result<nd::Array1<C64>, ConfigError> {
        self.validate(grid.dim())?;
        let k = self.energy().sqrt();
        let w = self.width();
        let amp: Box<dyn Fn(&[f64]) -> C64>
            = match *self {
                Self::Plane { center, .. } => Box::new(move |r: &[f64]| {
                    let envelope = (-(r[0] - center).powi(2) / (2.0 * w * w)).exp();
                    C64::from_polar(envelope, k * r[0])
                }),
                Self::Circular { center: (cx, cy), vel: (vx, vy), .. } => {
                    let speed = vx.hypot(vy);
                    let (ux, uy) = (vx / speed, vy / speed);
                    Box::new(move |r: &[f64]| {
                        let d2 = (r[0] - cx).powi(2) + (r[1] - cy).powi(2);
                        let envelope = (-d2 / (2.0 * w * w)).exp();
                        C64::from_polar(envelope, k * (ux * r[0] + uy * r[1]))
                    })
                },
            };
        let psi: nd::Array1<C64>
            = grid.coords()
            .axis_iter(nd::Axis(0))
            .enumerate()
            .map(|(idx, r)| {
                if grid.is_boundary(idx) {
                    C64::from(0.0)
                } else {
                    amp(&r.to_vec())
                }
            })
            .collect();
        log::debug!(
            "Pulse::sample: {} pulse, E = {}, w = {}, over {} points",
            self.kind(), self.energy(), w, psi.len(),
        );
        Ok(psi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundary;

    #[test]
    fn plane_1d_formula() {
        let grid = Grid::new(Dim::D1, Boundary::Open, 100, 0.0, 4.0).unwrap();
        let pulse = Pulse::plane(25.0, 1.0);
        let psi = pulse.sample(&grid).unwrap();
        for (xk, pk) in grid.x().iter().zip(&psi) {
            let expected
                = C64::from_polar(
                    (-(xk - 1.0).powi(2) / (2.0 * 0.3 * 0.3)).exp(),
                    5.0 * xk,
                );
            assert!((pk - expected).norm() < 1e-14);
        }
    }

    #[test]
    fn plane_2d_uniform_in_y() {
        let grid = Grid::new(Dim::D2, Boundary::Open, 10, (0.0, 0.0), 1.0)
            .unwrap();
        let psi = Pulse::plane(100.0, 0.3).with_width(0.1).sample(&grid).unwrap();
        let psi2 = grid.unflatten(&psi).unwrap();
        for row in psi2.rows() {
            assert!(row.iter().all(|p| (p - row[0]).norm() < 1e-15));
        }
    }

    #[test]
    fn circular_moves_along_velocity() {
        let grid = Grid::new(Dim::D2, Boundary::Open, 20, (0.0, 0.0), 2.0)
            .unwrap();
        let pulse = Pulse::circular(16.0, (1.0, 1.0), (0.0, 3.0));
        let psi = grid.unflatten(&pulse.sample(&grid).unwrap()).unwrap();
        // phase advances along y only, at wavenumber 4
        let y = grid.y().unwrap();
        let (i, j) = (9, 9);
        let dphase = (psi[[i, j + 1]] / psi[[i, j]]).arg();
        assert!((dphase - 4.0 * (y[j + 1] - y[j])).abs() < 1e-12);
        let dphase = (psi[[i + 1, j]] / psi[[i, j]]).arg();
        assert!(dphase.abs() < 1e-12);
    }

    #[test]
    fn dirichlet_edges_are_zero() {
        let grid = Grid::new(Dim::D2, Boundary::Dirichlet, 8, (0.0, 0.0), 1.0)
            .unwrap();
        let psi = Pulse::circular(10.0, (0.0, 0.5), (1.0, 0.0))
            .sample(&grid)
            .unwrap();
        (0..grid.rank())
            .filter(|k| grid.is_boundary(*k))
            .for_each(|k| assert_eq!(psi[k], C64::from(0.0)));
        assert!(psi.iter().any(|p| p.norm() > 0.1));
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let g1 = Grid::new(Dim::D1, Boundary::Open, 10, 0.0, 1.0).unwrap();
        let g2 = Grid::new(Dim::D2, Boundary::Open, 10, (0.0, 0.0), 1.0).unwrap();
        assert!(matches!(
            Pulse::plane(0.0, 0.5).sample(&g1),
            Err(ConfigError::BadEnergy(_))
        ));
        assert!(matches!(
            Pulse::plane(1.0, 0.5).with_width(-0.1).sample(&g1),
            Err(ConfigError::BadWidth(_))
        ));
        assert!(matches!(
            Pulse::circular(1.0, (0.5, 0.5), (1.0, 0.0)).sample(&g1),
            Err(ConfigError::UnsupportedPulse { pulse: "circular", dim: 1 })
        ));
        assert!(matches!(
            Pulse::circular(1.0, (0.5, 0.5), (0.0, 0.0)).sample(&g2),
            Err(ConfigError::BadVelocity(..))
        ));
    }
}
