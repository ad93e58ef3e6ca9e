//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Units](#units)
//! - [Discretization](#discretization)
//! - [Boundaries](#boundaries)
//! - [Time stepping](#time-stepping)
//! - [Linear solvers](#linear-solvers)
//!
//! # Background
//! The time-dependent Schrödinger equation (TDSE) for a single particle in a
//! static potential *V* reads
//! ```text
//!    ∂ψ     ħ²
//! iħ -- = - --- ∇²ψ + V ψ = H ψ
//!    ∂t     2 m
//! ```
//! whose formal solution ψ(*t*) = exp(-*i* *H* *t* / *ħ*) ψ(0) is unitary:
//! total probability ∫|ψ|² is conserved for all time. A good integrator should
//! inherit this property exactly, not merely to within truncation error,
//! since long runs otherwise gain or lose probability steadily.
//!
//! # Units
//! Everything in this crate is written in units where *ħ* = 2 *m* = 1, so that
//! the Hamiltonian is simply
//! ```text
//! H = -∇² + V
//! ```
//! and a plane wave exp(*i* *k* *x*) has energy *E* = *k*². Lengths and times
//! are then in whatever unit the caller chooses for *x*, with energies in the
//! corresponding inverse-length-squared unit.
//!
//! # Discretization
//! On a uniform grid with step *h*, the Laplacian is replaced by the
//! three-point (1D) or five-point (2D) central difference,
//! ```text
//! ∂²ψ     ψ[i - 1] - 2 ψ[i] + ψ[i + 1]
//! ---  ≈  ----------------------------
//! ∂x²                 h²
//! ```
//! which turns *H* into a real, symmetric, sparse matrix with `2/h² + V` (1D)
//! or `4/h² + V` (2D) on the diagonal and `-1/h²` for each nearest neighbor.
//! In 2D the operator is assembled from 1D pieces by Kronecker products,
//! ```text
//! H = (I ⊗ T + T ⊗ I) / h² + diag(V)
//! ```
//! where *T* is the potential-free 1D stencil, with grid points ordered so
//! that the y-index varies fastest.
//!
//! # Boundaries
//! Two boundary treatments are offered.
//!
//! *Open* boundaries simply truncate the domain: the stencil is applied to the
//! sampled points and anything beyond the last point is treated as absent,
//! which is equivalent to an implicit zero just outside the window.
//!
//! *Dirichlet* boundaries sample the domain endpoints explicitly and pin the
//! wavefunction there. The rows and columns of boundary nodes are decoupled
//! from the interior and given a unit diagonal, so that a boundary value that
//! starts at zero remains exactly zero under every step.
//!
//! # Time stepping
//! The Crank-Nicolson scheme[^1] averages the forward and backward Euler
//! steps, giving the Cayley form of the exact propagator,
//! ```text
//!     i dt          i dt
//! (I + ---- H) ψ' = (I - ---- H) ψ
//!      2             2
//! ```
//! For Hermitian *H*, the operator taking ψ to ψ' is exactly unitary, and the
//! scheme is second-order accurate in *dt* and unconditionally stable. The cost
//! is one sparse linear solve per step. Reversing the roles of the two
//! matrices yields the exact inverse step.
//!
//! # Linear solvers
//! The left-hand matrix *A* = *I* + *i* *H* *dt* / 2 is complex symmetric but
//! not Hermitian. Its Hermitian part is the identity, however, so it is
//! non-singular and Gaussian elimination without pivoting is stable. The
//! direct solver exploits this with a banded LU factorization in natural
//! ordering, whose fill-in is confined to the band (bandwidth 1 in 1D, the
//! number of points per axis in 2D). The factorization is computed once and
//! reused for every step.
//!
//! Since the previous state is an excellent initial guess for the next one,
//! Krylov methods for non-Hermitian systems are also effective[^2]: CGS,
//! BiCGSTAB, and QMR use short recurrences with constant memory, while GMRES
//! minimizes the residual over a growing subspace and must be restarted to
//! bound its memory. LGMRES[^3] recovers some of what is lost at each restart
//! by carrying approximations of the error from previous cycles.
//!
//! [^1]: J. Crank and P. Nicolson, "A practical method for numerical
//! evaluation of solutions of partial differential equations of the
//! heat-conduction type." Proc. Camb. Phil. Soc. **43** 1 50-67 (1947).
//!
//! [^2]: R. Barrett et al., *Templates for the Solution of Linear Systems:
//! Building Blocks for Iterative Methods*. SIAM (1994).
//!
//! [^3]: A. H. Baker, E. R. Jessup, and T. Manteuffel, "A technique for
//! accelerating the convergence of restarted GMRES." SIAM J. Matrix Anal.
//! Appl. **26** 4 962-984 (2005).
