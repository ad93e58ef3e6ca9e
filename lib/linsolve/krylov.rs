//! Short-recurrence Krylov methods for non-Hermitian systems: CGS, BiCGSTAB,
//! and QMR.
//!
//! All three work in complex arithmetic throughout and take the initial
//! residual as their shadow vector. Convergence is judged on the recursively
//! updated residual and then confirmed against the true residual `b - A·x`;
//! if the two have drifted apart, the true residual replaces the recursive one
//! and iteration continues.

use ndarray as nd;
use ndarray_linalg::Norm;
use num_complex::Complex64 as C64;
use crate::linsolve::{
    dotc,
    residual,
    Iterate,
    LinOp,
    SolverConfig,
    Status,
};

const ZERO: C64 = C64 { re: 0.0, im: 0.0 };

// overwrite `r` with the true residual of `x`; `true` if it meets `atol`
fn confirm<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x: &nd::Array1<C64>,
    r: &mut nd::Array1<C64>,
    atol: f64,
) -> bool
where L: LinOp + ?Sized
{
    *r = residual(A, b, x);
    r.norm_l2() <= atol
}

/// Conjugate gradient squared.
pub fn cgs<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x0: nd::Array1<C64>,
    config: &SolverConfig,
) -> Iterate
where L: LinOp + ?Sized
{
    let atol = config.tol * b.norm_l2();
    let mut x = x0;
    let mut r = residual(A, b, &x);
    if r.norm_l2() <= atol {
        return Iterate::new(A, b, x, 0, Status::Converged);
    }
    let rt = r.clone();
    let mut rho_prev = C64::from(1.0);
    let mut p: nd::Array1<C64> = nd::Array1::zeros(r.len());
    let mut q: nd::Array1<C64> = nd::Array1::zeros(r.len());
    for iter in 1..=config.maxiters {
        let rho = dotc(&rt, &r);
        if rho == ZERO {
            return Iterate::new(A, b, x, iter - 1, Status::Breakdown);
        }
        let u: nd::Array1<C64>
            = if iter == 1 {
                p = r.clone();
                r.clone()
            } else {
                let beta = rho / rho_prev;
                let u = &r + &(&q * beta);
                p = &u + &((&q + &(&p * beta)) * beta);
                u
            };
        let vhat = A.apply(&p);
        let sigma = dotc(&rt, &vhat);
        if sigma == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        let alpha = rho / sigma;
        q = &u - &(&vhat * alpha);
        let uhat = &u + &q;
        x.scaled_add(alpha, &uhat);
        r.scaled_add(-alpha, &A.apply(&uhat));
        if r.norm_l2() <= atol && confirm(A, b, &x, &mut r, atol) {
            return Iterate::new(A, b, x, iter, Status::Converged);
        }
        rho_prev = rho;
    }
    Iterate::new(A, b, x, config.maxiters, Status::MaxIters)
}

/// Biconjugate gradient stabilized.
pub fn bicgstab<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x0: nd::Array1<C64>,
    config: &SolverConfig,
) -> Iterate
where L: LinOp + ?Sized
{
    let atol = config.tol * b.norm_l2();
    let mut x = x0;
    let mut r = residual(A, b, &x);
    if r.norm_l2() <= atol {
        return Iterate::new(A, b, x, 0, Status::Converged);
    }
    let rt = r.clone();
    let mut rho_prev = C64::from(1.0);
    let mut alpha = C64::from(1.0);
    let mut omega = C64::from(1.0);
    let mut p: nd::Array1<C64> = nd::Array1::zeros(r.len());
    let mut v: nd::Array1<C64> = nd::Array1::zeros(r.len());
    for iter in 1..=config.maxiters {
        let rho = dotc(&rt, &r);
        if rho == ZERO {
            return Iterate::new(A, b, x, iter - 1, Status::Breakdown);
        }
        if iter == 1 {
            p = r.clone();
        } else {
            let beta = (rho / rho_prev) * (alpha / omega);
            p = &r + &((&p - &(&v * omega)) * beta);
        }
        v = A.apply(&p);
        let denom = dotc(&rt, &v);
        if denom == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        alpha = rho / denom;
        let s = &r - &(&v * alpha);
        if s.norm_l2() <= atol {
            let mut xs = x.clone();
            xs.scaled_add(alpha, &p);
            if residual(A, b, &xs).norm_l2() <= atol {
                return Iterate::new(A, b, xs, iter, Status::Converged);
            }
        }
        let t = A.apply(&s);
        let tt = dotc(&t, &t);
        if tt == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        omega = dotc(&t, &s) / tt;
        x.scaled_add(alpha, &p);
        x.scaled_add(omega, &s);
        r = &s - &(&t * omega);
        if r.norm_l2() <= atol && confirm(A, b, &x, &mut r, atol) {
            return Iterate::new(A, b, x, iter, Status::Converged);
        }
        if omega == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        rho_prev = rho;
    }
    Iterate::new(A, b, x, config.maxiters, Status::MaxIters)
}

/// Quasi-minimal residual, using the coupled two-term look-ahead-free
/// Lanczos recurrences of Freund and Nachtigal.
///
/// Requires the adjoint of the operator.
pub fn qmr<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x0: nd::Array1<C64>,
    config: &SolverConfig,
) -> Iterate
where L: LinOp + ?Sized
{
    let atol = config.tol * b.norm_l2();
    let n = b.len();
    let mut x = x0;
    let mut r = residual(A, b, &x);
    if r.norm_l2() <= atol {
        return Iterate::new(A, b, x, 0, Status::Converged);
    }
    let mut vt = r.clone();
    let mut rho = vt.norm_l2();
    let mut wt = r.clone();
    let mut xi = wt.norm_l2();
    let mut gamma: f64 = 1.0;
    let mut theta: f64 = 0.0;
    let mut eta = C64::from(-1.0);
    let mut epsilon = C64::from(1.0);
    let mut p: nd::Array1<C64> = nd::Array1::zeros(n);
    let mut q: nd::Array1<C64> = nd::Array1::zeros(n);
    let mut d: nd::Array1<C64> = nd::Array1::zeros(n);
    let mut s: nd::Array1<C64> = nd::Array1::zeros(n);
    for iter in 1..=config.maxiters {
        if rho == 0.0 || xi == 0.0 {
            return Iterate::new(A, b, x, iter - 1, Status::Breakdown);
        }
        let v = vt.mapv(|vk| vk / rho);
        let y = v.clone();
        let w = wt.mapv(|wk| wk / xi);
        let z = w.clone();
        let delta = dotc(&z, &y);
        if delta == ZERO {
            return Iterate::new(A, b, x, iter - 1, Status::Breakdown);
        }
        if iter == 1 {
            p = y;
            q = z;
        } else {
            p = &y - &(&p * (xi * delta / epsilon));
            q = &z - &(&q * (rho * (delta / epsilon).conj()));
        }
        let pt = A.apply(&p);
        epsilon = dotc(&q, &pt);
        if epsilon == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        let beta = epsilon / delta;
        if beta == ZERO {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        vt = &pt - &(&v * beta);
        let rho_prev = rho;
        rho = vt.norm_l2();
        wt = &A.apply_adjoint(&q) - &(&w * beta.conj());
        xi = wt.norm_l2();
        let gamma_prev = gamma;
        let theta_prev = theta;
        theta = rho / (gamma_prev * beta.norm());
        gamma = 1.0 / (1.0 + theta.powi(2)).sqrt();
        if gamma == 0.0 {
            return Iterate::new(A, b, x, iter, Status::Breakdown);
        }
        eta *= -(rho_prev / beta) * (gamma / gamma_prev).powi(2);
        if iter == 1 {
            d = &p * eta;
            s = &pt * eta;
        } else {
            let f = (theta_prev * gamma).powi(2);
            d = &(&d * f) + &(&p * eta);
            s = &(&s * f) + &(&pt * eta);
        }
        x += &d;
        r -= &s;
        if r.norm_l2() <= atol && confirm(A, b, &x, &mut r, atol) {
            return Iterate::new(A, b, x, iter, Status::Converged);
        }
    }
    Iterate::new(A, b, x, config.maxiters, Status::MaxIters)
}
