/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Canonical dual and tight windows.
//!
//! Three routes, cheapest first:
//!
//! * painless (`a <= gl <= M`): the frame operator is diagonal and the
//!   windows are a pointwise rescaling of `g`;
//! * long (`gl == L`): per-block linear algebra on the Walnut factorization;
//! * FIR: zero-extend to `L`, solve the long problem, cut back.

use log::debug;
use nalgebra::{DMatrix, RealField};

use crate::error::{GaborError, Result, ensure_positive, try_buffer};
use crate::fft_backend::{Complex, PlanFlags};
use crate::sample::{GaborFloat, Sample, from_usize};
use crate::utils::{fir2long, long2fir, positive_rem};
use crate::walnut::{WalnutDefactorization, WalnutFactorization};

/// Precision accepted by the linear-algebra backed solvers.
pub trait SolverFloat: GaborFloat + RealField {}

impl SolverFloat for f32 {}
impl SolverFloat for f64 {}

fn check_redundancy(a: usize, m: usize) -> Result<()> {
    ensure_positive("a", a)?;
    ensure_positive("M", m)?;
    if m < a {
        return Err(GaborError::NotAFrame(format!(
            "M (passed {}) is smaller than a (passed {})",
            m, a
        )));
    }
    Ok(())
}

fn check_support(window_len: usize, a: usize) -> Result<()> {
    if window_len < a {
        return Err(GaborError::NotAFrame(format!(
            "window length {} is shorter than a (passed {})",
            window_len, a
        )));
    }
    Ok(())
}

fn check_transform_length(signal_len: usize, a: usize, m: usize) -> Result<()> {
    for divisor in [a, m] {
        if signal_len % divisor != 0 {
            return Err(GaborError::BadTransformLength {
                len: signal_len,
                divisor,
            });
        }
    }
    Ok(())
}

/// `Σₙ |g(j + n a)|²` for every residue `j mod a`.
fn residue_energy<T: GaborFloat, S: Sample<T>>(g: &[S], a: usize) -> Result<Vec<T>> {
    let gl = g.len();
    let head = gl.div_ceil(2);
    let mut energy = try_buffer(a, T::zero())?;
    for (k, &x) in g.iter().enumerate() {
        let offset = if k < head {
            k as isize
        } else {
            k as isize - gl as isize
        };
        energy[positive_rem(offset, a)] += x.energy();
    }

    if let Some(r) = energy.iter().position(|&e| e <= T::zero()) {
        return Err(GaborError::NotAFrame(format!(
            "window has no energy at residue {} mod {}",
            r, a
        )));
    }
    Ok(energy)
}

fn painless<T: GaborFloat, S: Sample<T>>(
    g: &[S],
    a: usize,
    m: usize,
    rescale: impl Fn(T) -> T,
) -> Result<Vec<S>> {
    let gl = g.len();
    ensure_positive("gl", gl)?;
    check_redundancy(a, m)?;
    check_support(gl, a)?;
    if gl > m {
        return Err(GaborError::NotPainless {
            window_len: gl,
            channels: m,
        });
    }

    let energy = residue_energy(g, a)?;
    let m = from_usize::<T>(m);
    let head = gl.div_ceil(2);

    let mut out = try_buffer(gl, S::default())?;
    for (k, (o, &x)) in out.iter_mut().zip(g).enumerate() {
        let offset = if k < head {
            k as isize
        } else {
            k as isize - gl as isize
        };
        *o = x.scaled(rescale(m * energy[positive_rem(offset, a)]));
    }
    Ok(out)
}

/// Canonical dual of a painless window: `g / (M Σₙ|g(l - n a)|²)`.
pub fn gabdual_painless<T: GaborFloat, S: Sample<T>>(g: &[S], a: usize, m: usize) -> Result<Vec<S>> {
    painless(g, a, m, |d| T::one() / d)
}

/// Canonical tight window of a painless window: `g / √(M Σₙ|g(l - n a)|²)`.
pub fn gabtight_painless<T: GaborFloat, S: Sample<T>>(g: &[S], a: usize, m: usize) -> Result<Vec<S>> {
    painless(g, a, m, |d| T::one() / d.sqrt())
}

#[derive(Clone, Copy)]
enum Target {
    Dual,
    Tight,
}

fn solve_long<T: SolverFloat, S: Sample<T>>(g: &[S], a: usize, m: usize, target: Target) -> Result<Vec<S>> {
    let len = g.len();
    ensure_positive("L", len)?;
    check_redundancy(a, m)?;
    check_transform_length(len, a, m)?;

    let mut factorization = WalnutFactorization::<T>::new(len, a, m, PlanFlags::default())?;
    let layout = *factorization.layout();
    let (p, q) = (layout.p(), layout.q());
    let mut gf = factorization.process(g, 1)?;

    debug!(
        "solving {} blocks of {}x{} for L={}, a={}, M={}",
        layout.c() * layout.d(),
        p,
        q,
        len,
        a,
        m
    );

    // With a single window each (r, s) block is a contiguous column-major p x q matrix.
    for (index, block) in gf.chunks_exact_mut(p * q).enumerate() {
        let gm = DMatrix::<Complex<T>>::from_column_slice(p, q, block);
        let solved = match target {
            Target::Dual => dual_block(gm, index)?,
            Target::Tight => tight_block(gm, index)?,
        };
        block.copy_from_slice(solved.as_slice());
    }

    let mut defactorization = WalnutDefactorization::<T>::new(len, a, m, PlanFlags::default())?;
    defactorization.process(&gf, 1)
}

/// `(G Gᴴ)⁻¹ G`
fn dual_block<T: SolverFloat>(gm: DMatrix<Complex<T>>, index: usize) -> Result<DMatrix<Complex<T>>> {
    let gram = &gm * gm.adjoint();
    let cholesky = gram.cholesky().ok_or_else(|| {
        GaborError::NotAFrame(format!("frame operator block {} is singular", index))
    })?;
    Ok(cholesky.solve(&gm))
}

/// `U Vᴴ` from the thin SVD `G = U Σ Vᴴ`.
fn tight_block<T: SolverFloat>(gm: DMatrix<Complex<T>>, index: usize) -> Result<DMatrix<Complex<T>>> {
    let svd = gm.svd(true, true);
    if svd.singular_values.iter().any(|&s| s <= T::zero()) {
        return Err(GaborError::NotAFrame(format!(
            "frame operator block {} is singular",
            index
        )));
    }
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => Ok(u * v_t),
        _ => Err(GaborError::GenericFailure(format!(
            "SVD of block {} did not produce singular vectors",
            index
        ))),
    }
}

/// Canonical dual of a full-length window (`g.len() == L`).
pub fn gabdual_long<T: SolverFloat, S: Sample<T>>(g: &[S], a: usize, m: usize) -> Result<Vec<S>> {
    solve_long(g, a, m, Target::Dual)
}

/// Canonical tight window of a full-length window.
pub fn gabtight_long<T: SolverFloat, S: Sample<T>>(g: &[S], a: usize, m: usize) -> Result<Vec<S>> {
    solve_long(g, a, m, Target::Tight)
}

fn solve_fir<T: SolverFloat, S: Sample<T>>(
    g: &[S],
    signal_len: usize,
    a: usize,
    m: usize,
    out_len: usize,
    target: Target,
) -> Result<Vec<S>> {
    ensure_positive("gl", g.len())?;
    ensure_positive("gdl", out_len)?;
    ensure_positive("L", signal_len)?;
    check_redundancy(a, m)?;
    check_transform_length(signal_len, a, m)?;
    for required in [g.len(), out_len] {
        if signal_len < required {
            return Err(GaborError::BadRequiredSize {
                len: signal_len,
                required,
            });
        }
    }
    check_support(g.len(), a)?;

    let long = fir2long(g, signal_len)?;
    let solved = solve_long(&long, a, m, target)?;
    long2fir(&solved, out_len)
}

/// Canonical dual of an FIR window computed at length `L` and cut to `gdl`.
///
/// The result is exact only when the true dual fits in `gdl` samples, e.g.
/// in the painless case with `gdl >= gl`.
pub fn gabdual_fir<T: SolverFloat, S: Sample<T>>(
    g: &[S],
    signal_len: usize,
    a: usize,
    m: usize,
    dual_len: usize,
) -> Result<Vec<S>> {
    solve_fir(g, signal_len, a, m, dual_len, Target::Dual)
}

pub fn gabtight_fir<T: SolverFloat, S: Sample<T>>(
    g: &[S],
    signal_len: usize,
    a: usize,
    m: usize,
    tight_len: usize,
) -> Result<Vec<S>> {
    solve_fir(g, signal_len, a, m, tight_len, Target::Tight)
}
