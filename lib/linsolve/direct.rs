//! Direct solution by LU factorization in band storage.
//!
//! Factorization is done without pivoting, in natural ordering. This is safe
//! for the Crank-Nicolson matrices `I ± i H dt/2` with real symmetric `H`,
//! whose Hermitian part is the identity, so every leading principal submatrix
//! is non-singular. Fill-in is confined to the band.

use ndarray as nd;
use num_complex::Complex64 as C64;
use sprs::CsMat;
use crate::{
    Arr1,
    error::{ LengthError, SolveError },
    linsolve::SolveResult,
    sparse,
};

/// LU factors of a banded matrix, stored together in a single band array.
///
/// Row `i` of the band holds columns `i - p ..= i + q` of the original matrix,
/// with the unit lower factor below the diagonal and the upper factor on and
/// above it.
#[derive(Clone, Debug)]
pub struct BandedLu {
    n: usize,
    p: usize,
    q: usize,
    band: nd::Array2<C64>,
}

impl BandedLu {
    /// Factor a square matrix.
    ///
    /// Fails with [`SolveError::ZeroPivot`] if a pivot vanishes exactly.
    ///
    /// *Panics if `A` is not square*.
    pub fn factor(A: &CsMat<C64>) -> SolveResult<Self> {
        assert_eq!(A.rows(), A.cols(), "BandedLu::factor: matrix must be square");
        let n = A.rows();
        let (p, q) = sparse::bandwidths(A);
        let mut band: nd::Array2<C64> = nd::Array2::zeros((n, p + q + 1));
        A.iter().for_each(|(&a, (i, j))| { band[[i, j + p - i]] += a; });
        for k in 0..n {
            let pivot = band[[k, p]];
            if pivot == C64::from(0.0) { return Err(SolveError::ZeroPivot(k)); }
            for i in k + 1..(k + p + 1).min(n) {
                let l = band[[i, k + p - i]] / pivot;
                band[[i, k + p - i]] = l;
                if l == C64::from(0.0) { continue; }
                for j in k + 1..(k + q + 1).min(n) {
                    let ukj = band[[k, j + p - k]];
                    band[[i, j + p - i]] -= l * ukj;
                }
            }
        }
        log::trace!(
            "BandedLu::factor: rank {} with bandwidths ({}, {})", n, p, q);
        Ok(Self { n, p, q, band })
    }

    /// Dimension of the factored matrix.
    pub fn rank(&self) -> usize { self.n }

    /// Lower and upper bandwidths of the factored matrix.
    pub fn bandwidths(&self) -> (usize, usize) { (self.p, self.q) }

    /// Solve `A·x = b` by forward and back substitution.
    pub fn solve<S>(&self, b: &Arr1<S>) -> SolveResult<nd::Array1<C64>>
    where S: nd::Data<Elem = C64>
    {
        LengthError::check(b, self.n)?;
        let Self { n, p, q, band } = self;
        let (n, p, q) = (*n, *p, *q);
        let mut x: nd::Array1<C64> = b.to_owned();
        for i in 0..n {
            let acc
                = (i.saturating_sub(p)..i)
                .fold(C64::from(0.0), |acc, j| acc + band[[i, j + p - i]] * x[j]);
            x[i] -= acc;
        }
        for i in (0..n).rev() {
            let acc
                = (i + 1..(i + q + 1).min(n))
                .fold(C64::from(0.0), |acc, j| acc + band[[i, j + p - i]] * x[j]);
            x[i] = (x[i] - acc) / band[[i, p]];
        }
        Ok(x)
    }
}
