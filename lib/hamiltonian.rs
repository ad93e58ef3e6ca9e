//! Finite-difference discretization of the Hamiltonian `-∇² + V` (ħ = 2m = 1)
//! on a uniform grid.
//!
//! Each of the four (dimension, boundary) combinations has its own routine;
//! [`build`] picks the right one for a [`Grid`] and samples the potential over
//! it. All routines assemble the operator in units of `h²` and apply the
//! overall `1/h²` scaling last.
//!
//! ```
//! use cnspace::{ grid::{ Boundary, Dim, Grid }, hamiltonian, potential::Potential };
//!
//! let grid = Grid::new(Dim::D1, Boundary::Open, 4, 0.0, 1.0).unwrap();
//! let H = hamiltonian::build(&grid, &Potential::zero(Dim::D1)).unwrap();
//! // tridiagonal, 2/h² on the diagonal and -1/h² off it
//! assert_eq!(H.rows(), 3);
//! assert_eq!(H.get(0, 0), Some(&32.0));
//! assert_eq!(H.get(0, 1), Some(&-16.0));
//! ```

use ndarray as nd;
use sprs::{ CsMat, kronecker_product as kron };
use crate::{
    Arr1,
    error::ConfigError,
    grid::{ Boundary, Dim, Grid },
    potential::Potential,
    sparse,
};

/// Signature shared by every discretization routine: number of points per
/// axis, step size, and the potential sampled in flattened grid order.
pub type Discretizer = fn(usize, f64, &nd::Array1<f64>) -> CsMat<f64>;

/// Select the discretization routine for a (dimension, boundary) pair.
pub fn discretizer(dim: Dim, boundary: Boundary) -> Discretizer {
    match (dim, boundary) {
        (Dim::D1, Boundary::Open) => h1_open,
        (Dim::D1, Boundary::Dirichlet) => h1_dirichlet,
        (Dim::D2, Boundary::Open) => h2_open,
        (Dim::D2, Boundary::Dirichlet) => h2_dirichlet,
    }
}

/// Build the Hamiltonian for a grid and potential.
///
/// Fails if the potential's arity does not match the grid or the potential is
/// not finite at some point it is evaluated on. Dirichlet boundary points are
/// not evaluated.
pub fn build(grid: &Grid, V: &Potential) -> Result<CsMat<f64>, ConfigError> {
    let v = V.sample(grid)?;
    let H = discretizer(grid.dim(), grid.boundary())(grid.n(), grid.h(), &v);
    log::debug!(
        "hamiltonian: {:?}/{:?} grid, rank {}, {} non-zeros",
        grid.dim(), grid.boundary(), H.rows(), H.nnz(),
    );
    Ok(H)
}

// 1D stencil `2 + h²V` / `-1`, before scaling
fn stencil_1d<S>(n: usize, h: f64, v: &Arr1<S>) -> (Vec<f64>, Vec<f64>)
where S: nd::Data<Elem = f64>
{
    let h2 = h.powi(2);
    let main: Vec<f64> = v.iter().take(n).map(|vk| 2.0 + h2 * vk).collect();
    let off: Vec<f64> = vec![-1.0; n - 1];
    (main, off)
}

// zero the boundary couplings and pin the boundary diagonal of a 1D stencil
fn isolate_edges(h: f64, main: &mut [f64], off: &mut [f64]) {
    let n = main.len();
    main[0] = h.powi(2);
    main[n - 1] = h.powi(2);
    off[0] = 0.0;
    off[n - 2] = 0.0;
}

/// 1D Hamiltonian for an open grid of `n` points.
///
/// Tridiagonal; diagonal `2/h² + V(x)`, off-diagonals `-1/h²`.
pub fn h1_open(n: usize, h: f64, v: &nd::Array1<f64>) -> CsMat<f64> {
    let (main, off) = stencil_1d(n, h, v);
    let scale = h.powi(2).recip();
    sparse::tridiag(&main, &off).map(|&a| a * scale)
}

/// 1D Hamiltonian for a Dirichlet grid of `n` points including both endpoints.
///
/// As [`h1_open`] in the interior; the two boundary nodes are decoupled from
/// their neighbors and given a unit diagonal.
pub fn h1_dirichlet(n: usize, h: f64, v: &nd::Array1<f64>) -> CsMat<f64> {
    let (mut main, mut off) = stencil_1d(n, h, v);
    isolate_edges(h, &mut main, &mut off);
    let scale = h.powi(2).recip();
    sparse::tridiag(&main, &off).map(|&a| a * scale)
}

/// 2D Hamiltonian for an open `n × n` grid.
///
/// Built as the Kronecker sum `I ⊗ T + T ⊗ I` of the potential-free 1D stencil
/// `T`, plus the potential on the diagonal.
pub fn h2_open(n: usize, h: f64, v: &nd::Array1<f64>) -> CsMat<f64> {
    let (main, off) = stencil_1d(n, h, &nd::Array1::<f64>::zeros(n));
    let T = sparse::tridiag(&main, &off);
    let I: CsMat<f64> = CsMat::eye(n);
    let Vd = sparse::diag(&v.mapv(|vk| h.powi(2) * vk).to_vec());
    let laplacian = &kron(I.view(), T.view()) + &kron(T.view(), I.view());
    let scale = h.powi(2).recip();
    (&laplacian + &Vd).map(|&a| a * scale)
}

/// 2D Hamiltonian for a Dirichlet `n × n` grid including all edges.
///
/// Interior rows carry the five-point stencil (`4/h² + V` on the diagonal,
/// `-1/h²` to each neighbor); every node on an edge or corner is decoupled and
/// given a unit diagonal. Assembled as
/// ```text
/// C ⊗ T + S ⊗ I' + Sᵀ ⊗ I' + E ⊗ h²I + h² diag(V')
/// ```
/// where `C = I' = diag(0, 1, ..., 1, 0)`, `T` is the 1D Dirichlet stencil with
/// interior diagonal 4, `S` the superdiagonal coupling with both ends removed,
/// `E = diag(1, 0, ..., 0, 1)`, and `V'` the potential restricted to interior
/// nodes.
pub fn h2_dirichlet(n: usize, h: f64, v: &nd::Array1<f64>) -> CsMat<f64> {
    let h2 = h.powi(2);
    let interior: Vec<f64>
        = (0..n).map(|i| if i == 0 || i == n - 1 { 0.0 } else { 1.0 })
        .collect();
    let edges: Vec<f64> = interior.iter().map(|c| 1.0 - c).collect();

    let mut main: Vec<f64> = vec![4.0; n];
    let mut off: Vec<f64> = vec![-1.0; n - 1];
    isolate_edges(h, &mut main, &mut off);
    let T = sparse::tridiag(&main, &off);
    let S: CsMat<f64>
        = sparse::from_triplets(
            (n, n),
            off.iter().enumerate().map(|(i, &b)| (i, i + 1, b)),
        );
    let St: CsMat<f64> = S.transpose_view().to_csr();
    let C = sparse::diag(&interior);
    let E = sparse::diag(&edges);
    let I: CsMat<f64> = CsMat::eye(n).map(|&a: &f64| a * h2);

    let Vd: Vec<f64>
        = v.iter().enumerate()
        .map(|(k, vk)| h2 * vk * interior[k / n] * interior[k % n])
        .collect();
    let hopping = &kron(S.view(), C.view()) + &kron(St.view(), C.view());
    let pinned = &kron(E.view(), I.view()) + &sparse::diag(&Vd);
    let H = &(&kron(C.view(), T.view()) + &hopping) + &pinned;
    let scale = h2.recip();
    H.map(|&a| a * scale)
}
