//! Miscellaneous tools for working with sampled wavefunctions.
//!
//! Integrals over the grid are plain Riemann sums with volume element `cell`
//! (`h` in 1D, `h²` in 2D), which is the measure the Crank-Nicolson step
//! conserves exactly.

use ndarray::{ self as nd, Ix1, concatenate };
use ndarray_linalg::Scalar;
use num_traits::Zero;
use rustfft as fft;
use num_complex::Complex64 as C64;

/// Compute the probability density `|q|²` pointwise.
pub fn prob_density<S, A>(q: &nd::ArrayBase<S, Ix1>) -> nd::Array1<A::Real>
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    q.mapv(|qk| qk.square())
}

/// Calculate the total probability `Σ |q|² cell`.
pub fn wf_norm<S, A>(q: &nd::ArrayBase<S, Ix1>, cell: A::Real) -> A::Real
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    q.iter().fold(A::Real::zero(), |acc, qk| acc + qk.square()) * cell
}

/// Calculate the inner product `Σ q* p cell` of two wavefunctions.
///
/// *Panics if the arrays have different lengths*.
pub fn wf_dot<S, T, A>(
    q: &nd::ArrayBase<S, Ix1>,
    p: &nd::ArrayBase<T, Ix1>,
    cell: A::Real,
) -> A
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
    A: Scalar,
{
    assert_eq!(q.len(), p.len(), "wf_dot: incompatible lengths");
    q.iter().zip(p)
        .fold(A::zero(), |acc, (qk, pk)| acc + qk.conj() * *pk)
        * A::from_real(cell)
}

/// Renormalize a wavefunction in place to unit total probability.
///
/// Does nothing to a wavefunction that is identically zero.
pub fn wf_renormalize<S, A>(q: &mut nd::ArrayBase<S, Ix1>, cell: A::Real)
where
    S: nd::DataMut<Elem = A>,
    A: Scalar,
{
    let norm = wf_norm(&*q, cell).sqrt();
    if norm > A::Real::zero() {
        let norm = A::from_real(norm);
        q.iter_mut().for_each(|qk| { *qk /= norm; });
    }
}

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling interval `dt`.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    let (np, nm) = ((n + 1) / 2, n / 2);
    let fp = (0..np).map(|k| k as f64 / (n as f64 * dt));
    let fm = (1..nm + 1).rev().map(|k| -(k as f64) / (n as f64 * dt));
    fp.chain(fm).collect()
}

/// Perform the one-dimensional, complex-valued FFT.
pub fn fft<S>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let mut f: Vec<C64> = x.to_vec();
    let mut planner = fft::FftPlanner::new();
    planner.plan_fft_forward(f.len()).process(&mut f);
    nd::Array1::from(f)
}

/// Return a copy of `x` with indices shifted to map super-Nyquist frequency
/// components to negative frequencies.
pub fn fft_shift<S, A>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    let n = x.len();
    let (p, m) = x.view().split_at(nd::Axis(0), (n + 1) / 2);
    concatenate!(nd::Axis(0), m, p)
}

/// Compute the momentum-space probability density of a 1D wavefunction
/// sampled with spacing `dx`.
///
/// Wavenumbers are spaced `2π / (n · dx)`.
///
/// Returns wavenumbers in increasing order with the corresponding density,
/// normalized to unit total probability over `k`.
pub fn momentum_density<S>(q: &nd::ArrayBase<S, Ix1>, dx: f64)
    -> (nd::Array1<f64>, nd::Array1<f64>)
where S: nd::Data<Elem = C64>
{
    let n = q.len();
    let dk = std::f64::consts::TAU / (n as f64 * dx);
    let k = fft_shift(&fft_freq(n, dx).mapv(|f| std::f64::consts::TAU * f));
    let mut rho = fft_shift(&prob_density(&fft(q)));
    let total = rho.sum() * dk;
    if total > 0.0 { rho.mapv_inplace(|r| r / total); }
    (k, rho)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freq_layout() {
        assert_eq!(fft_freq(4, 0.5).to_vec(), vec![0.0, 0.5, -1.0, -0.5]);
        assert_eq!(
            fft_freq(5, 1.0).to_vec(),
            vec![0.0, 0.2, 0.4, -0.4, -0.2],
        );
        let shifted = fft_shift(&fft_freq(5, 1.0));
        assert_eq!(shifted.to_vec(), vec![-0.4, -0.2, 0.0, 0.2, 0.4]);
        let shifted = fft_shift(&fft_freq(4, 0.5));
        assert_eq!(shifted.to_vec(), vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn norms_and_products() {
        let q = nd::array![C64::new(1.0, 1.0), C64::new(0.0, 2.0)];
        assert!((wf_norm(&q, 0.5) - 3.0).abs() < 1e-15);
        let p = nd::array![C64::from(1.0), C64::from(1.0)];
        let d = wf_dot(&q, &p, 1.0);
        assert!((d - C64::new(1.0, -3.0)).norm() < 1e-15);
        let mut r = q.clone();
        wf_renormalize(&mut r, 0.5);
        assert!((wf_norm(&r, 0.5) - 1.0).abs() < 1e-14);
        assert_eq!(prob_density(&q).to_vec(), vec![2.0, 4.0]);
    }

    #[test]
    fn momentum_peak_at_wavenumber() {
        let n = 512;
        let dx = 20.0 / n as f64;
        let k0 = 6.0;
        let q: nd::Array1<C64>
            = (0..n)
            .map(|j| {
                let x = j as f64 * dx - 10.0;
                C64::from_polar((-x * x / 2.0).exp(), k0 * x)
            })
            .collect();
        let (k, rho) = momentum_density(&q, dx);
        let imax
            = rho.iter().enumerate()
            .fold((0, 0.0), |(im, m), (i, r)| if *r > m { (i, *r) } else { (im, m) })
            .0;
        let dk = k[1] - k[0];
        assert!((k[imax] - k0).abs() <= dk);
        assert!((rho.sum() * dk - 1.0).abs() < 1e-12);
    }
}
