//! Uniform spatial grids in one or two dimensions.
//!
//! A grid is described by the number of points `N` requested by the caller,
//! the start of the domain, the length of the domain (the same along each axis
//! in 2D), and a [`Boundary`] mode. The boundary mode changes the number of
//! points actually sampled along each axis:
//! ```text
//! Open      : N - 1 points
//! Dirichlet : N + 1 points (both endpoints included)
//! ```
//! while the step size is always `h = L / N`. Points along an axis are placed
//! "linspace-style" between the start and end of the domain, inclusive.
//!
//! In 2D, values are stored flattened with the y-coordinate varying fastest,
//! i.e. the point `(x[i], y[j])` lives at index `i * n + j`.

use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;

/// Dimensionality of a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dim {
    D1,
    D2,
}

impl Dim {
    /// Convert from a bare number of dimensions.
    pub fn from_usize(dim: usize) -> Result<Self, ConfigError> {
        match dim {
            1 => Ok(Self::D1),
            2 => Ok(Self::D2),
            d => Err(ConfigError::BadDim(d)),
        }
    }

    /// Return the number of dimensions as a `usize`.
    pub fn as_usize(self) -> usize {
        match self {
            Self::D1 => 1,
            Self::D2 => 2,
        }
    }
}

/// Boundary treatment at the edges of the domain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Truncated grid with no explicit edge constraint; the wavefunction is
    /// simply not modeled outside the sampled window.
    Open,
    /// Wavefunction pinned to zero at the edges of the domain.
    Dirichlet,
}

impl Boundary {
    /// Return the number of points sampled along each axis for a requested
    /// point count `N`.
    pub fn points(self, number_points: usize) -> usize {
        match self {
            Self::Open => number_points.saturating_sub(1),
            Self::Dirichlet => number_points + 1,
        }
    }

    // smallest `N` giving a usable stencil (at least two sampled points in the
    // open case, at least one interior point in the Dirichlet case)
    fn min_number_points(self) -> usize {
        match self {
            Self::Open => 3,
            Self::Dirichlet => 2,
        }
    }

    /// Return `true` if `self` is `Open`.
    pub fn is_open(self) -> bool { matches!(self, Self::Open) }

    /// Return `true` if `self` is `Dirichlet`.
    pub fn is_dirichlet(self) -> bool { matches!(self, Self::Dirichlet) }
}

/// Start of the domain: a scalar in 1D, a pair in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Origin {
    D1(f64),
    D2(f64, f64),
}

impl Origin {
    fn to_vec(self) -> Vec<f64> {
        match self {
            Self::D1(x) => vec![x],
            Self::D2(x, y) => vec![x, y],
        }
    }

    fn is_finite(self) -> bool {
        self.to_vec().into_iter().all(f64::is_finite)
    }
}

impl From<f64> for Origin {
    fn from(x: f64) -> Self { Self::D1(x) }
}

impl From<(f64, f64)> for Origin {
    fn from(xy: (f64, f64)) -> Self { Self::D2(xy.0, xy.1) }
}

impl From<[f64; 2]> for Origin {
    fn from(xy: [f64; 2]) -> Self { Self::D2(xy[0], xy[1]) }
}

/// A fixed, uniform grid.
///
/// Arrays borrowed from this type are guaranteed to be sampled with the same
/// spacing along every axis and to be consistent with the Hamiltonian built
/// from the same grid.
#[derive(Clone, Debug)]
pub struct Grid {
    dim: Dim,
    boundary: Boundary,
    // requested point count
    number_points: usize,
    domain_length: f64,
    // step size
    h: f64,
    // coordinate arrays along each axis; `y` is `None` in 1D
    x: nd::Array1<f64>,
    y: Option<nd::Array1<f64>>,
}

impl Grid {
    /// Create a new `Grid`.
    ///
    /// Fails if `number_points` is too small for the boundary mode, if the
    /// domain length is not positive, or if `start` does not match `dim`.
    pub fn new<O>(
        dim: Dim,
        boundary: Boundary,
        number_points: usize,
        start: O,
        domain_length: f64,
    ) -> Result<Self, ConfigError>
    where O: Into<Origin>
    {
        let start: Origin = start.into();
        let nmin = boundary.min_number_points();
        if number_points < nmin {
            return Err(ConfigError::BadNumberPoints(number_points, nmin));
        }
        if !(domain_length > 0.0 && domain_length.is_finite()) {
            return Err(ConfigError::BadDomainLength(domain_length));
        }
        let (x0, y0) = match (dim, start) {
            (Dim::D1, Origin::D1(x0)) if start.is_finite() => (x0, None),
            (Dim::D2, Origin::D2(x0, y0)) if start.is_finite() => (x0, Some(y0)),
            _ => {
                return Err(ConfigError::BadOrigin {
                    dim: dim.as_usize(),
                    got: start.to_vec(),
                });
            },
        };
        let n = boundary.points(number_points);
        let axis = |a: f64| nd::Array1::linspace(a, a + domain_length, n);
        let h = domain_length / number_points as f64;
        Ok(Self {
            dim,
            boundary,
            number_points,
            domain_length,
            h,
            x: axis(x0),
            y: y0.map(axis),
        })
    }

    /// Get the dimensionality.
    pub fn dim(&self) -> Dim { self.dim }

    /// Get the boundary mode.
    pub fn boundary(&self) -> Boundary { self.boundary }

    /// Get the point count originally requested.
    pub fn number_points(&self) -> usize { self.number_points }

    /// Get the domain length.
    pub fn domain_length(&self) -> f64 { self.domain_length }

    /// Get the step size, `L / N`.
    pub fn h(&self) -> f64 { self.h }

    /// Get the volume element `h^dim` used to integrate densities.
    pub fn cell(&self) -> f64 { self.h.powi(self.dim.as_usize() as i32) }

    /// Get the number of points along each axis.
    pub fn n(&self) -> usize { self.x.len() }

    /// Get the total number of points, i.e. the rank of any operator on the
    /// grid.
    pub fn rank(&self) -> usize { self.n().pow(self.dim.as_usize() as u32) }

    /// Get the coordinate array along x.
    pub fn x(&self) -> &nd::Array1<f64> { &self.x }

    /// Get the coordinate array along y, if the grid is 2D.
    pub fn y(&self) -> Option<&nd::Array1<f64>> { self.y.as_ref() }

    /// Get the coordinate array along axis `axis`, if it exists.
    pub fn axis_coords(&self, axis: usize) -> Option<&nd::Array1<f64>> {
        match axis {
            0 => Some(&self.x),
            1 => self.y.as_ref(),
            _ => None,
        }
    }

    /// Get the coordinates of every grid point as a `rank × dim` array, in the
    /// same (flattened) order as state vectors.
    pub fn coords(&self) -> nd::Array2<f64> {
        match self.y.as_ref() {
            None => self.x.view().insert_axis(nd::Axis(1)).to_owned(),
            Some(y) => {
                let n = self.n();
                let mut c: nd::Array2<f64> = nd::Array2::zeros((n * n, 2));
                c.axis_iter_mut(nd::Axis(0)).enumerate()
                    .for_each(|(k, mut ck)| {
                        ck[0] = self.x[k / n];
                        ck[1] = y[k % n];
                    });
                c
            },
        }
    }

    /// Return `true` if axis index `i` sits on a Dirichlet boundary.
    pub fn is_edge(&self, i: usize) -> bool {
        self.boundary.is_dirichlet() && (i == 0 || i + 1 == self.n())
    }

    /// Return `true` if the flattened point index `k` sits on a Dirichlet
    /// boundary (any edge or corner in 2D).
    pub fn is_boundary(&self, k: usize) -> bool {
        match self.dim {
            Dim::D1 => self.is_edge(k),
            Dim::D2 => {
                let n = self.n();
                self.is_edge(k / n) || self.is_edge(k % n)
            },
        }
    }

    /// Reshape a flattened array over a 2D grid into an `n × n` array indexed
    /// as `[x, y]`.
    ///
    /// Returns `None` if the grid is 1D or the array has the wrong length.
    pub fn unflatten<A: Clone>(&self, a: &nd::Array1<A>)
        -> Option<nd::Array2<A>>
    {
        if self.dim != Dim::D2 || a.len() != self.rank() { return None; }
        let n = self.n();
        a.to_owned().into_shape((n, n)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_counts() {
        let open = Grid::new(Dim::D1, Boundary::Open, 4, 0.0, 1.0).unwrap();
        assert_eq!(open.n(), 3);
        assert_eq!(open.rank(), 3);
        assert!((open.h() - 0.25).abs() < 1e-15);
        assert_eq!(open.x()[0], 0.0);
        assert_eq!(open.x()[2], 1.0);

        let dir = Grid::new(Dim::D2, Boundary::Dirichlet, 4, (0.0, 1.0), 2.0)
            .unwrap();
        assert_eq!(dir.n(), 5);
        assert_eq!(dir.rank(), 25);
        assert!((dir.h() - 0.5).abs() < 1e-15);
        assert!((dir.cell() - 0.25).abs() < 1e-15);
        assert_eq!(dir.y().unwrap()[4], 3.0);
    }

    #[test]
    fn coords_y_fastest() {
        let g = Grid::new(Dim::D2, Boundary::Open, 4, (0.0, 10.0), 1.0)
            .unwrap();
        let c = g.coords();
        assert_eq!(c.dim(), (9, 2));
        assert_eq!(c[[0, 0]], 0.0);
        assert_eq!(c[[1, 0]], 0.0);
        assert_eq!(c[[1, 1]], 10.5);
        assert_eq!(c[[3, 0]], 0.5);
        assert_eq!(c[[3, 1]], 10.0);
    }

    #[test]
    fn boundary_nodes() {
        let g = Grid::new(Dim::D2, Boundary::Dirichlet, 3, (0.0, 0.0), 1.0)
            .unwrap();
        let interior: Vec<usize>
            = (0..g.rank()).filter(|k| !g.is_boundary(*k)).collect();
        assert_eq!(interior, vec![5, 6, 9, 10]);
        let g = Grid::new(Dim::D1, Boundary::Open, 3, 0.0, 1.0).unwrap();
        assert!((0..g.rank()).all(|k| !g.is_boundary(k)));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            Dim::from_usize(3),
            Err(ConfigError::BadDim(3))
        ));
        assert!(matches!(
            Grid::new(Dim::D1, Boundary::Open, 2, 0.0, 1.0),
            Err(ConfigError::BadNumberPoints(2, 3))
        ));
        assert!(matches!(
            Grid::new(Dim::D1, Boundary::Dirichlet, 8, 0.0, -1.0),
            Err(ConfigError::BadDomainLength(_))
        ));
        assert!(matches!(
            Grid::new(Dim::D2, Boundary::Open, 8, 0.0, 1.0),
            Err(ConfigError::BadOrigin { dim: 2, .. })
        ));
    }
}
