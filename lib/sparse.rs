//! Stencil assembly and complex-vector products over [`sprs`] matrices.
//!
//! Matrices are assembled from triplets (duplicate entries are summed) and
//! stored in CSR form. Everything else (sums, Kronecker products, scaling,
//! transposition) goes through `sprs` directly. Matrix-vector products are
//! written against this crate's own `ndarray` types.

use std::ops::{ Add, Mul };
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use sprs::{ CsMat, TriMat };
use crate::Arr1;

/// Bound satisfied by every element type stored in a sparse matrix here.
pub trait Elem: Copy + Zero + Add<Output = Self> + Mul<Output = Self> {}

impl<T> Elem for T where T: Copy + Zero + Add<Output = T> + Mul<Output = T> {}

/// Build a matrix from `(row, col, value)` triplets, summing duplicates and
/// dropping exact zeros.
pub fn from_triplets<A, I>(shape: (usize, usize), triplets: I) -> CsMat<A>
where
    A: Elem,
    I: IntoIterator<Item = (usize, usize, A)>,
{
    let mut tri: TriMat<A> = TriMat::new(shape);
    triplets.into_iter()
        .filter(|(_, _, a)| !a.is_zero())
        .for_each(|(i, j, a)| { tri.add_triplet(i, j, a); });
    tri.to_csr()
}

/// Square diagonal matrix.
pub fn diag<A>(d: &[A]) -> CsMat<A>
where A: Elem
{
    let n = d.len();
    from_triplets((n, n), d.iter().enumerate().map(|(i, &a)| (i, i, a)))
}

/// Symmetric tridiagonal matrix with main diagonal `main` and both
/// off-diagonals equal to `off`.
///
/// *Panics if `off.len() + 1 != main.len()`*.
pub fn tridiag<A>(main: &[A], off: &[A]) -> CsMat<A>
where A: Elem
{
    let n = main.len();
    assert_eq!(off.len() + 1, n, "tridiag: inconsistent diagonal lengths");
    let d = main.iter().enumerate().map(|(i, &a)| (i, i, a));
    let u = off.iter().enumerate().map(|(i, &a)| (i, i + 1, a));
    let l = off.iter().enumerate().map(|(i, &a)| (i + 1, i, a));
    from_triplets((n, n), d.chain(u).chain(l))
}

/// Compute `I + c·m` for a real square matrix `m` and complex `c`.
pub fn shifted_identity(m: &CsMat<f64>, c: C64) -> CsMat<C64> {
    let eye: CsMat<C64> = CsMat::eye(m.rows());
    &eye + &m.map(|&a| c * a)
}

/// Promote a real matrix to a complex one.
pub fn to_complex(m: &CsMat<f64>) -> CsMat<C64> {
    m.map(|&a| C64::from(a))
}

/// Compute the matrix-vector product `m·x`.
///
/// *Panics if `x` has length different from the number of columns of `m`*.
pub fn matvec<A, S>(m: &CsMat<A>, x: &Arr1<S>) -> nd::Array1<A>
where
    A: Elem,
    S: nd::Data<Elem = A>,
{
    assert_eq!(m.cols(), x.len(), "matvec: incompatible shapes");
    m.outer_iterator()
        .map(|row| {
            row.iter().fold(A::zero(), |acc, (j, &a)| acc + a * x[j])
        })
        .collect()
}

/// Compute the product `m^H·x` of the conjugate transpose of a complex matrix
/// with a vector.
///
/// *Panics if `x` has length different from the number of rows of `m`*.
pub fn matvec_adjoint<S>(m: &CsMat<C64>, x: &Arr1<S>) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    assert_eq!(m.rows(), x.len(), "matvec_adjoint: incompatible shapes");
    let mut y: nd::Array1<C64> = nd::Array1::zeros(m.cols());
    m.iter().for_each(|(&a, (i, j))| { y[j] += a.conj() * x[i]; });
    y
}

/// Return the (lower, upper) bandwidths of a matrix.
pub fn bandwidths<A>(m: &CsMat<A>) -> (usize, usize) {
    m.iter()
        .fold((0, 0), |(p, q), (_, (i, j))| {
            if i > j { (p.max(i - j), q) } else { (p, q.max(j - i)) }
        })
}

/// Expand into a dense array.
pub fn to_dense<A>(m: &CsMat<A>) -> nd::Array2<A>
where A: Elem
{
    let mut d: nd::Array2<A> = nd::Array2::zeros((m.rows(), m.cols()));
    m.iter().for_each(|(&a, (i, j))| { d[[i, j]] = d[[i, j]] + a; });
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::kronecker_product;

    #[test]
    fn kron_matches_block_structure() {
        let a: CsMat<f64> = from_triplets((2, 2), [(0, 1, 2.0), (1, 0, 3.0)]);
        let b: CsMat<f64> = tridiag(&[1.0, 1.0], &[5.0]);
        let k = to_dense(&kronecker_product(a.view(), b.view()));
        let expected = nd::array![
            [0.0, 0.0, 2.0, 10.0],
            [0.0, 0.0, 10.0, 2.0],
            [3.0, 15.0, 0.0, 0.0],
            [15.0, 3.0, 0.0, 0.0],
        ];
        assert_eq!(k, expected);
    }

    #[test]
    fn duplicates_summed_zeros_dropped() {
        let m: CsMat<f64>
            = from_triplets((2, 2), [(0, 0, 1.0), (0, 0, 2.0), (1, 0, 0.0)]);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 0), Some(&3.0));
        let s = &m + &CsMat::<f64>::eye(2);
        assert_eq!(to_dense(&s), nd::array![[4.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn shifted_identity_and_promotion() {
        let m: CsMat<f64> = tridiag(&[2.0, 3.0], &[-1.0]);
        let a = to_dense(&shifted_identity(&m, C64::new(0.0, 0.5)));
        let expected = nd::array![
            [C64::new(1.0, 1.0), C64::new(0.0, -0.5)],
            [C64::new(0.0, -0.5), C64::new(1.0, 1.5)],
        ];
        assert_eq!(a, expected);
        let z = to_dense(&to_complex(&m));
        assert_eq!(z, to_dense(&m).mapv(C64::from));
    }

    #[test]
    fn products_and_adjoint() {
        let m: CsMat<C64> = from_triplets(
            (2, 3),
            [(0, 0, C64::i()), (0, 2, C64::from(2.0)), (1, 1, C64::new(1.0, 1.0))],
        );
        let x = nd::array![C64::from(1.0), C64::from(2.0), C64::from(3.0)];
        let y = matvec(&m, &x);
        assert_eq!(y, nd::array![C64::new(6.0, 1.0), C64::new(2.0, 2.0)]);
        let z = matvec_adjoint(&m, &nd::array![C64::from(1.0), C64::i()]);
        let dense = to_dense(&m).t().mapv(|a| a.conj());
        let expected = dense.dot(&nd::array![C64::from(1.0), C64::i()]);
        assert_eq!(z, expected);
        assert_eq!(bandwidths(&m), (0, 2));
    }
}
