//! Caller-supplied potentials.
//!
//! A potential is any function mapping one (1D) or two (2D) real coordinates
//! to a real scalar. The engine evaluates it pointwise over the grid, so the
//! function itself never needs to handle arrays.

use std::fmt;
use ndarray as nd;
use crate::{
    error::ConfigError,
    grid::{ Dim, Grid },
};

/// A static, real potential in one or two dimensions.
pub enum Potential<'a> {
    /// `V(x)`
    D1(Box<dyn Fn(f64) -> f64 + 'a>),
    /// `V(x, y)`
    D2(Box<dyn Fn(f64, f64) -> f64 + 'a>),
}

impl<'a> Potential<'a> {
    /// Wrap a one-dimensional potential.
    pub fn new_1d<F>(V: F) -> Self
    where F: Fn(f64) -> f64 + 'a
    {
        Self::D1(Box::new(V))
    }

    /// Wrap a two-dimensional potential.
    pub fn new_2d<F>(V: F) -> Self
    where F: Fn(f64, f64) -> f64 + 'a
    {
        Self::D2(Box::new(V))
    }

    /// The potential that is zero everywhere, for a grid of dimension `dim`.
    pub fn zero(dim: Dim) -> Self {
        match dim {
            Dim::D1 => Self::new_1d(|_| 0.0),
            Dim::D2 => Self::new_2d(|_, _| 0.0),
        }
    }

    /// Number of coordinates the potential takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::D1(_) => 1,
            Self::D2(_) => 2,
        }
    }

    /// Evaluate at a single point.
    ///
    /// *Panics if `r` has fewer elements than the potential's arity*.
    pub fn eval(&self, r: &[f64]) -> f64 {
        match self {
            Self::D1(V) => V(r[0]),
            Self::D2(V) => V(r[0], r[1]),
        }
    }

    /// Evaluate over every point of a grid, in the grid's flattened order.
    ///
    /// Dirichlet boundary points are pinned by the Hamiltonian and never see
    /// the potential, so they are not evaluated and hold zero.
    ///
    /// Fails if the potential's arity does not match the grid or if any
    /// evaluated sample is NaN or infinite.
    pub fn sample(&self, grid: &Grid) -> Result<nd::Array1<f64>, ConfigError> {
        let dim = grid.dim().as_usize();
        if self.arity() != dim {
            return Err(ConfigError::PotentialArity {
                potential: self.arity(),
                grid: dim,
            });
        }
        let coords = grid.coords();
        coords.axis_iter(nd::Axis(0))
            .enumerate()
            .map(|(k, r)| {
                if grid.is_boundary(k) { return Ok(0.0); }
                let r = r.to_vec();
                let v = self.eval(&r);
                v.is_finite().then_some(v)
                    .ok_or(ConfigError::NonFinitePotential { at: r, value: v })
            })
            .collect()
    }
}

impl fmt::Debug for Potential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Potential::D{}(..)", self.arity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundary;

    #[test]
    fn samples_in_flattened_order() {
        let grid = Grid::new(Dim::D2, Boundary::Open, 4, (0.0, 0.0), 1.0)
            .unwrap();
        let V = Potential::new_2d(|x, y| 10.0 * x + y);
        let v = V.sample(&grid).unwrap();
        assert_eq!(v.len(), 9);
        assert!((v[1] - 0.5).abs() < 1e-15);
        assert!((v[3] - 5.0).abs() < 1e-15);
        assert!((v[8] - 11.0).abs() < 1e-15);
    }

    #[test]
    fn scalar_only_function_is_fine() {
        // piecewise, non-broadcastable potential
        let grid = Grid::new(Dim::D1, Boundary::Open, 5, 0.0, 1.0).unwrap();
        let V = Potential::new_1d(|x| if x > 0.5 { 100.0 } else { 0.0 });
        let v = V.sample(&grid).unwrap();
        assert_eq!(v.to_vec(), vec![0.0, 0.0, 100.0, 100.0]);
    }

    #[test]
    fn rejects_wrong_arity_and_nonfinite() {
        let grid = Grid::new(Dim::D1, Boundary::Open, 5, 0.0, 1.0).unwrap();
        assert!(matches!(
            Potential::zero(Dim::D2).sample(&grid),
            Err(ConfigError::PotentialArity { potential: 2, grid: 1 })
        ));
        let V = Potential::new_1d(|x| 1.0 / x);
        assert!(matches!(
            V.sample(&grid),
            Err(ConfigError::NonFinitePotential { .. })
        ));
    }

    #[test]
    fn dirichlet_edges_are_not_evaluated() {
        // singular exactly on the pinned endpoint
        let grid = Grid::new(Dim::D1, Boundary::Dirichlet, 4, 0.0, 2.0)
            .unwrap();
        let v = Potential::new_1d(|x| 1.0 / x).sample(&grid).unwrap();
        assert_eq!(v.to_vec(), vec![0.0, 2.0, 1.0, 2.0 / 3.0, 0.0]);

        // singular on a corner and along an edge in 2D
        let grid = Grid::new(Dim::D2, Boundary::Dirichlet, 4, (0.0, 0.0), 1.0)
            .unwrap();
        let v = Potential::new_2d(|x, y| 1.0 / (x * y)).sample(&grid).unwrap();
        assert!(v.iter().all(|vk| vk.is_finite()));
        (0..grid.rank())
            .filter(|k| grid.is_boundary(*k))
            .for_each(|k| assert_eq!(v[k], 0.0));
        assert_eq!(v[6], 16.0);

        // an interior singularity is still caught
        let V = Potential::new_1d(|x| 1.0 / (x - 1.0));
        let grid = Grid::new(Dim::D1, Boundary::Dirichlet, 4, 0.0, 2.0)
            .unwrap();
        assert!(matches!(
            V.sample(&grid),
            Err(ConfigError::NonFinitePotential { .. })
        ));
    }
}
