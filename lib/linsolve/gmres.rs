//! Restarted GMRES and its loosely augmented variant, LGMRES.
//!
//! Both are built on a single flexible Arnoldi cycle with modified
//! Gram-Schmidt orthogonalization. The small least-squares problem is kept in
//! triangular form by complex Givens rotations as the Hessenberg matrix grows,
//! so the residual norm of the current iterate is known at every step without
//! forming it.

use std::collections::VecDeque;
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

// plane rotation [[c, s], [-s*, c]] with real `c`
#[derive(Copy, Clone, Debug)]
struct Givens {
    c: f64,
    s: C64,
}

impl Givens {
    // rotation taking (a, b) to (r, 0)
    fn zeroing(a: C64, b: C64) -> (Self, C64) {
        let an = a.norm();
        let rho = (an.powi(2) + b.norm_sqr()).sqrt();
        if rho == 0.0 {
            (Self { c: 1.0, s: C64::from(0.0) }, C64::from(0.0))
        } else if an == 0.0 {
            (Self { c: 0.0, s: C64::from(1.0) }, b)
        } else {
            let phase = a / an;
            (Self { c: an / rho, s: phase * b.conj() / rho }, phase * rho)
        }
    }

    fn apply(&self, a: C64, b: C64) -> (C64, C64) {
        (self.c * a + self.s * b, -self.s.conj() * a + self.c * b)
    }
}

// outcome of a single Arnoldi cycle
struct Cycle {
    // correction to the current iterate
    dx: nd::Array1<C64>,
    // number of operator applications
    steps: usize,
    breakdown: bool,
}

// run one flexible Arnoldi cycle from residual `r`
//
// search directions are the Krylov basis vectors themselves for the first
// `inner` steps, followed by the vectors in `augment`; at most `max_steps`
// directions are used in total, and the cycle ends early once the estimated
// residual norm falls to `atol`
fn arnoldi_cycle<L>(
    A: &L,
    r: &nd::Array1<C64>,
    inner: usize,
    augment: &VecDeque<nd::Array1<C64>>,
    max_steps: usize,
    atol: f64,
) -> Cycle
where L: LinOp + ?Sized
{
    let n = r.len();
    let m = (inner + augment.len()).min(max_steps);
    let beta = r.norm_l2();
    let mut V: Vec<nd::Array1<C64>> = vec![r.mapv(|rk| rk / beta)];
    let mut Z: Vec<nd::Array1<C64>> = Vec::with_capacity(m);
    // columns of the rotated Hessenberg matrix, i.e. of R
    let mut R: Vec<Vec<C64>> = Vec::with_capacity(m);
    let mut rotations: Vec<Givens> = Vec::with_capacity(m);
    let mut g: Vec<C64> = vec![C64::from(beta)];
    let mut breakdown = false;
    for j in 0..m {
        let z
            = if j < inner { V[j].clone() } else { augment[j - inner].clone() };
        let mut w = A.apply(&z);
        let wnorm = w.norm_l2();
        let mut h: Vec<C64> = Vec::with_capacity(j + 2);
        for v in V.iter() {
            let hij = dotc(v, &w);
            w.scaled_add(-hij, v);
            h.push(hij);
        }
        let hnext = w.norm_l2();
        h.push(C64::from(hnext));
        Z.push(z);
        for (k, rot) in rotations.iter().enumerate() {
            let (a, b) = rot.apply(h[k], h[k + 1]);
            h[k] = a;
            h[k + 1] = b;
        }
        let (rot, diag) = Givens::zeroing(h[j], h[j + 1]);
        h[j] = diag;
        h.truncate(j + 1);
        let (gj, gnext) = rot.apply(g[j], C64::from(0.0));
        g[j] = gj;
        g.push(gnext);
        rotations.push(rot);
        R.push(h);
        if diag == C64::from(0.0) {
            breakdown = true;
            break;
        }
        let happy = hnext <= f64::EPSILON * wnorm;
        if happy || gnext.norm() <= atol { break; }
        V.push(w.mapv(|wk| wk / hnext));
    }
    let k = R.len();
    // back substitution in R y = g
    let mut y: Vec<C64> = vec![C64::from(0.0); k];
    if !breakdown {
        for i in (0..k).rev() {
            let acc
                = (i + 1..k)
                .fold(C64::from(0.0), |acc, l| acc + R[l][i] * y[l]);
            y[i] = (g[i] - acc) / R[i][i];
        }
    }
    let mut dx: nd::Array1<C64> = nd::Array1::zeros(n);
    Z.iter().zip(&y).for_each(|(z, yk)| { dx.scaled_add(*yk, z); });
    Cycle { dx, steps: k, breakdown }
}

/// Restarted GMRES with `config.restart` Arnoldi steps per cycle.
///
/// The iteration count is the total number of operator applications across
/// all cycles.
pub fn gmres<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x0: nd::Array1<C64>,
    config: &SolverConfig,
) -> Iterate
where L: LinOp + ?Sized
{
    let atol = config.tol * b.norm_l2();
    let none = VecDeque::new();
    let mut x = x0;
    let mut iters: usize = 0;
    loop {
        let r = residual(A, b, &x);
        if r.norm_l2() <= atol {
            return Iterate::new(A, b, x, iters, Status::Converged);
        }
        if iters >= config.maxiters {
            return Iterate::new(A, b, x, iters, Status::MaxIters);
        }
        let budget = config.maxiters - iters;
        let cycle = arnoldi_cycle(A, &r, config.restart, &none, budget, atol);
        x += &cycle.dx;
        iters += cycle.steps;
        if cycle.breakdown {
            return Iterate::new(A, b, x, iters, Status::Breakdown);
        }
    }
}

/// LGMRES: restarted GMRES whose cycles are augmented with the
/// `config.outer_k` most recent normalized corrections, which approximate the
/// error components the restart would otherwise discard.
///
/// Each cycle performs `config.inner` plain Krylov steps followed by one step
/// per augmentation vector. The iteration count is the total number of
/// operator applications.
pub fn lgmres<L>(
    A: &L,
    b: &nd::Array1<C64>,
    x0: nd::Array1<C64>,
    config: &SolverConfig,
) -> Iterate
where L: LinOp + ?Sized
{
    let atol = config.tol * b.norm_l2();
    let mut outer: VecDeque<nd::Array1<C64>>
        = VecDeque::with_capacity(config.outer_k + 1);
    let mut x = x0;
    let mut iters: usize = 0;
    loop {
        let r = residual(A, b, &x);
        if r.norm_l2() <= atol {
            return Iterate::new(A, b, x, iters, Status::Converged);
        }
        if iters >= config.maxiters {
            return Iterate::new(A, b, x, iters, Status::MaxIters);
        }
        let budget = config.maxiters - iters;
        let cycle = arnoldi_cycle(A, &r, config.inner, &outer, budget, atol);
        x += &cycle.dx;
        iters += cycle.steps;
        if cycle.breakdown {
            return Iterate::new(A, b, x, iters, Status::Breakdown);
        }
        let dxnorm = cycle.dx.norm_l2();
        if config.outer_k > 0 && dxnorm > 0.0 {
            outer.push_front(cycle.dx.mapv(|dxk| dxk / dxnorm));
            outer.truncate(config.outer_k);
        }
    }
}
