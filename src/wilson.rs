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

//! Discrete Wilson transform on top of the filterbank DGT.
//!
//! `M` Wilson channels use a DGT with `2M` channels and hop `M`. Atoms pair a
//! cosine and a sine modulation so that, with a suitable window, the system
//! is an orthonormal basis:
//!
//! ```text
//! m = 0          g(l - nM)                   n even
//! 0 < m < M      √2 g(l - nM) cos(π m l / M)  m + n even
//!                √2 g(l - nM) sin(π m l / M)  m + n odd
//! m = M          (-1)^l g(l - nM)             m + n even
//! ```
//!
//! Coefficients are stored `2M x N/2` per block: column `j` holds frame `2j`
//! in rows `0..M` and frame `2j + 1` in rows `M + 1..2M`, with the Nyquist
//! atom in row `M`.
//!
//! The type III variant (WMDCT) shifts every channel by half a bin, which
//! removes the DC and Nyquist special cases; see [`DwiltiiiFbPlan`].

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::marker::PhantomData;

use log::{debug, trace};

use crate::dgt_fb::DgtFbPlan;
use crate::error::{GaborError, Result, ensure_len, ensure_positive, try_buffer};
use crate::fft_backend::{Complex, PlanFlags};
use crate::idgt_fb::{IdgtFbPlan, checked_len};
use crate::sample::{GaborFloat, Sample, from_f64};
use crate::{GaborConfig, PhaseConvention};

fn wilson_config(channels: usize, flags: PlanFlags) -> Result<GaborConfig> {
    ensure_positive("M", channels)?;
    let doubled = checked_len(&[2, channels])?;
    Ok(GaborConfig::new(channels, doubled)?
        .with_phase(PhaseConvention::FrequencyInvariant)
        .with_flags(flags))
}

fn check_block(signal_len: usize, channels: usize, blocks: usize) -> Result<usize> {
    ensure_positive("W", blocks)?;
    if signal_len % (2 * channels) != 0 {
        return Err(GaborError::BadTransformLength {
            len: signal_len,
            divisor: 2 * channels,
        });
    }
    checked_len(&[signal_len, blocks])
}

/// Grow `buf` to `len` elements without aborting on allocation failure.
fn reserve<T: GaborFloat>(buf: &mut Vec<Complex<T>>, len: usize) -> Result<()> {
    if buf.len() < len {
        buf.try_reserve_exact(len - buf.len())
            .map_err(|_| GaborError::NoMemory(len))?;
        buf.resize(len, Complex::new(T::zero(), T::zero()));
    }
    Ok(())
}

#[inline]
fn times_minus_i<T: GaborFloat>(x: Complex<T>) -> Complex<T> {
    Complex::new(x.im, -x.re)
}

pub struct DwiltFbPlan<T: GaborFloat, S: Sample<T>> {
    m: usize,
    dgt: DgtFbPlan<T, S>,
    /// DGT coefficients of one block, `2L` values.
    coefs: Vec<Complex<T>>,
    norm: T,
}

impl<T: GaborFloat, S: Sample<T>> DwiltFbPlan<T, S> {
    pub fn new(window: &[S], channels: usize, flags: PlanFlags) -> Result<Self> {
        let config = wilson_config(channels, flags)?;
        let dgt = DgtFbPlan::new(window, &config)?;
        debug!("dwilt_fb plan: gl={}, M={}", window.len(), channels);
        Ok(Self {
            m: channels,
            dgt,
            coefs: Vec::new(),
            norm: from_f64(FRAC_1_SQRT_2),
        })
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    /// Analyse `blocks` signals of `signal_len` samples into `signal_len`
    /// Wilson coefficients each.
    pub fn execute(
        &mut self,
        signal: &[S],
        signal_len: usize,
        blocks: usize,
        coefficients: &mut [S],
    ) -> Result<()> {
        let total = check_block(signal_len, self.m, blocks)?;
        ensure_len("signal", signal.len(), total)?;
        ensure_len("coefficients", coefficients.len(), total)?;
        reserve(&mut self.coefs, 2 * signal_len)?;

        trace!("dwilt_fb execute: L={}, W={}", signal_len, blocks);

        let (m, norm) = (self.m, self.norm);
        let m2 = 2 * m;
        for (block, out) in signal[..total]
            .chunks_exact(signal_len)
            .zip(coefficients[..total].chunks_exact_mut(signal_len))
        {
            let coefs = &mut self.coefs[..2 * signal_len];
            self.dgt.execute(block, signal_len, 1, coefs)?;

            for (pair, column) in coefs.chunks_exact(2 * m2).zip(out.chunks_exact_mut(m2)) {
                let (even, odd) = pair.split_at(m2);
                column[0] = S::from_complex(even[0]);
                for k in 1..m {
                    let (even_row, odd_row) = (k, m + k);
                    if k % 2 == 0 {
                        column[even_row] = S::from_complex(cos_coef(even, k, norm));
                        column[odd_row] = S::from_complex(sin_coef(odd, k, norm));
                    } else {
                        column[even_row] = S::from_complex(sin_coef(even, k, norm));
                        column[odd_row] = S::from_complex(cos_coef(odd, k, norm));
                    }
                }
                column[m] = S::from_complex(if m % 2 == 0 { even[m] } else { odd[m] });
            }
        }
        Ok(())
    }

    pub fn process(&mut self, signal: &[S], signal_len: usize, blocks: usize) -> Result<Vec<S>> {
        let total = checked_len(&[signal_len, blocks])?;
        let mut coefficients = try_buffer(total, S::default())?;
        self.execute(signal, signal_len, blocks, &mut coefficients)?;
        Ok(coefficients)
    }
}

// frame has 2M entries; k and 2M - k are the two halves of one real modulation.
#[inline]
fn cos_coef<T: GaborFloat>(frame: &[Complex<T>], k: usize, norm: T) -> Complex<T> {
    (frame[k] + frame[frame.len() - k]) * norm
}

#[inline]
fn sin_coef<T: GaborFloat>(frame: &[Complex<T>], k: usize, norm: T) -> Complex<T> {
    times_minus_i((frame[frame.len() - k] - frame[k]) * norm)
}

pub struct IdwiltFbPlan<T: GaborFloat, S: Sample<T>> {
    m: usize,
    idgt: IdgtFbPlan<T, S>,
    coefs: Vec<Complex<T>>,
    signal: Vec<Complex<T>>,
    norm: T,
}

impl<T: GaborFloat, S: Sample<T>> IdwiltFbPlan<T, S> {
    pub fn new(window: &[S], channels: usize, flags: PlanFlags) -> Result<Self> {
        let config = wilson_config(channels, flags)?;
        let idgt = IdgtFbPlan::new(window, &config)?;
        debug!("idwilt_fb plan: gl={}, M={}", window.len(), channels);
        Ok(Self {
            m: channels,
            idgt,
            coefs: Vec::new(),
            signal: Vec::new(),
            norm: from_f64(FRAC_1_SQRT_2),
        })
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    pub fn execute(
        &mut self,
        coefficients: &[S],
        signal_len: usize,
        blocks: usize,
        output: &mut [S],
    ) -> Result<()> {
        let total = check_block(signal_len, self.m, blocks)?;
        ensure_len("coefficients", coefficients.len(), total)?;
        ensure_len("output", output.len(), total)?;
        reserve(&mut self.coefs, 2 * signal_len)?;
        reserve(&mut self.signal, signal_len)?;

        trace!("idwilt_fb execute: L={}, W={}", signal_len, blocks);

        let (m, norm) = (self.m, self.norm);
        let m2 = 2 * m;
        let zero = Complex::new(T::zero(), T::zero());
        for (block, out) in coefficients[..total]
            .chunks_exact(signal_len)
            .zip(output[..total].chunks_exact_mut(signal_len))
        {
            let coefs = &mut self.coefs[..2 * signal_len];
            coefs.fill(zero);

            for (column, pair) in block.chunks_exact(m2).zip(coefs.chunks_exact_mut(2 * m2)) {
                let (even, odd) = pair.split_at_mut(m2);
                even[0] = column[0].to_complex();
                for k in 1..m {
                    let (even_row, odd_row) = (k, m + k);
                    if k % 2 == 0 {
                        add_cos(even, k, column[even_row].to_complex() * norm);
                        add_sin(odd, k, column[odd_row].to_complex() * norm);
                    } else {
                        add_sin(even, k, column[even_row].to_complex() * norm);
                        add_cos(odd, k, column[odd_row].to_complex() * norm);
                    }
                }
                let nyquist = if m % 2 == 0 { even } else { odd };
                nyquist[m] = column[m].to_complex();
            }

            let signal = &mut self.signal[..signal_len];
            self.idgt.execute(coefs, signal_len, 1, signal)?;
            for (o, &x) in out.iter_mut().zip(signal.iter()) {
                *o = S::from_complex(x);
            }
        }
        Ok(())
    }

    pub fn process(&mut self, coefficients: &[S], signal_len: usize, blocks: usize) -> Result<Vec<S>> {
        let total = checked_len(&[signal_len, blocks])?;
        let mut output = try_buffer(total, S::default())?;
        self.execute(coefficients, signal_len, blocks, &mut output)?;
        Ok(output)
    }
}

fn add_cos<T: GaborFloat>(frame: &mut [Complex<T>], k: usize, value: Complex<T>) {
    let mirror = frame.len() - k;
    frame[k] += value;
    frame[mirror] += value;
}

fn add_sin<T: GaborFloat>(frame: &mut [Complex<T>], k: usize, value: Complex<T>) {
    let mirror = frame.len() - k;
    let rotated = times_minus_i(value);
    frame[k] += rotated;
    frame[mirror] -= rotated;
}

/// One-shot forward Wilson transform with `channels` channels.
pub fn dwilt_fb<T: GaborFloat, S: Sample<T>>(
    signal: &[S],
    window: &[S],
    channels: usize,
    signal_len: usize,
    blocks: usize,
) -> Result<Vec<S>> {
    let mut plan = DwiltFbPlan::<T, S>::new(window, channels, PlanFlags::default())?;
    plan.process(signal, signal_len, blocks)
}

pub fn idwilt_fb<T: GaborFloat, S: Sample<T>>(
    coefficients: &[S],
    window: &[S],
    channels: usize,
    signal_len: usize,
    blocks: usize,
) -> Result<Vec<S>> {
    let mut plan = IdwiltFbPlan::<T, S>::new(window, channels, PlanFlags::default())?;
    plan.process(coefficients, signal_len, blocks)
}

/// `e^{-πi j / 2M}` for `j` in `0..4M`; the half-bin shift is periodic in `4M`.
fn half_bin_shift<T: GaborFloat>(channels: usize) -> Result<Vec<Complex<T>>> {
    let period = checked_len(&[4, channels])?;
    let mut shift = try_buffer(period, Complex::new(T::zero(), T::zero()))?;
    for (j, s) in shift.iter_mut().enumerate() {
        let angle = -PI * j as f64 / (2 * channels) as f64;
        *s = Complex::new(from_f64(angle.cos()), from_f64(angle.sin()));
    }
    Ok(shift)
}

fn complex_window<T: GaborFloat, S: Sample<T>>(window: &[S]) -> Result<Vec<Complex<T>>> {
    let mut out = try_buffer(window.len(), Complex::new(T::zero(), T::zero()))?;
    for (o, &g) in out.iter_mut().zip(window) {
        *o = g.to_complex();
    }
    Ok(out)
}

/// `(1 - i) / 2`, i.e. `e^{-iπ/4} / √2`.
fn eighth_turn<T: GaborFloat>() -> Complex<T> {
    let half = from_f64::<T>(0.5);
    Complex::new(half, -half)
}

/// Wilson type III (WMDCT) analysis.
///
/// Atoms have no DC or Nyquist special case:
///
/// ```text
/// √2 g(l - nM) cos(π (m + 1/2) l / M + π/4)   m + n even
/// √2 g(l - nM) sin(π (m + 1/2) l / M + π/4)   m + n odd
/// ```
///
/// Coefficients are `M x N` per block, column-major.
pub struct DwiltiiiFbPlan<T: GaborFloat, S: Sample<T>>
where
    Complex<T>: Sample<T>,
{
    m: usize,
    dgt: DgtFbPlan<T, Complex<T>>,
    shift: Vec<Complex<T>>,
    modulated: Vec<Complex<T>>,
    coefs: Vec<Complex<T>>,
    rotation: Complex<T>,
    _sample: PhantomData<S>,
}

impl<T: GaborFloat, S: Sample<T>> DwiltiiiFbPlan<T, S>
where
    Complex<T>: Sample<T>,
{
    pub fn new(window: &[S], channels: usize, flags: PlanFlags) -> Result<Self> {
        let config = wilson_config(channels, flags)?;
        let dgt = DgtFbPlan::new(&complex_window(window)?, &config)?;
        debug!("dwiltiii_fb plan: gl={}, M={}", window.len(), channels);
        Ok(Self {
            m: channels,
            dgt,
            shift: half_bin_shift(channels)?,
            modulated: Vec::new(),
            coefs: Vec::new(),
            rotation: eighth_turn(),
            _sample: PhantomData,
        })
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    pub fn execute(
        &mut self,
        signal: &[S],
        signal_len: usize,
        blocks: usize,
        coefficients: &mut [S],
    ) -> Result<()> {
        let total = check_block(signal_len, self.m, blocks)?;
        ensure_len("signal", signal.len(), total)?;
        ensure_len("coefficients", coefficients.len(), total)?;
        reserve(&mut self.modulated, signal_len)?;
        reserve(&mut self.coefs, 2 * signal_len)?;

        trace!("dwiltiii_fb execute: L={}, W={}", signal_len, blocks);

        let m = self.m;
        let m2 = 2 * m;
        let (r, r_conj) = (self.rotation, self.rotation.conj());
        let period = self.shift.len();
        for (block, out) in signal[..total]
            .chunks_exact(signal_len)
            .zip(coefficients[..total].chunks_exact_mut(signal_len))
        {
            let modulated = &mut self.modulated[..signal_len];
            for (l, (x, &f)) in modulated.iter_mut().zip(block).enumerate() {
                *x = f.to_complex() * self.shift[l % period];
            }

            let coefs = &mut self.coefs[..2 * signal_len];
            self.dgt.execute(modulated, signal_len, 1, coefs)?;

            for (n, (frame, column)) in coefs
                .chunks_exact(m2)
                .zip(out.chunks_exact_mut(m))
                .enumerate()
            {
                for (k, c) in column.iter_mut().enumerate() {
                    let (x, mirror) = (frame[k], frame[m2 - 1 - k]);
                    let value = if (k + n) % 2 == 0 {
                        x * r + mirror * r_conj
                    } else {
                        x * r_conj + mirror * r
                    };
                    *c = S::from_complex(value);
                }
            }
        }
        Ok(())
    }

    pub fn process(&mut self, signal: &[S], signal_len: usize, blocks: usize) -> Result<Vec<S>> {
        let total = checked_len(&[signal_len, blocks])?;
        let mut coefficients = try_buffer(total, S::default())?;
        self.execute(signal, signal_len, blocks, &mut coefficients)?;
        Ok(coefficients)
    }
}

/// Wilson type III (WMDCT) synthesis, the inverse of [`DwiltiiiFbPlan`].
pub struct IdwiltiiiFbPlan<T: GaborFloat, S: Sample<T>>
where
    Complex<T>: Sample<T>,
{
    m: usize,
    idgt: IdgtFbPlan<T, Complex<T>>,
    shift: Vec<Complex<T>>,
    coefs: Vec<Complex<T>>,
    signal: Vec<Complex<T>>,
    rotation: Complex<T>,
    _sample: PhantomData<S>,
}

impl<T: GaborFloat, S: Sample<T>> IdwiltiiiFbPlan<T, S>
where
    Complex<T>: Sample<T>,
{
    pub fn new(window: &[S], channels: usize, flags: PlanFlags) -> Result<Self> {
        let config = wilson_config(channels, flags)?;
        let idgt = IdgtFbPlan::new(&complex_window(window)?, &config)?;
        debug!("idwiltiii_fb plan: gl={}, M={}", window.len(), channels);
        Ok(Self {
            m: channels,
            idgt,
            shift: half_bin_shift(channels)?,
            coefs: Vec::new(),
            signal: Vec::new(),
            rotation: eighth_turn(),
            _sample: PhantomData,
        })
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    pub fn execute(
        &mut self,
        coefficients: &[S],
        signal_len: usize,
        blocks: usize,
        output: &mut [S],
    ) -> Result<()> {
        let total = check_block(signal_len, self.m, blocks)?;
        ensure_len("coefficients", coefficients.len(), total)?;
        ensure_len("output", output.len(), total)?;
        reserve(&mut self.coefs, 2 * signal_len)?;
        reserve(&mut self.signal, signal_len)?;

        trace!("idwiltiii_fb execute: L={}, W={}", signal_len, blocks);

        let m = self.m;
        let m2 = 2 * m;
        let (r, r_conj) = (self.rotation, self.rotation.conj());
        let period = self.shift.len();
        for (block, out) in coefficients[..total]
            .chunks_exact(signal_len)
            .zip(output[..total].chunks_exact_mut(signal_len))
        {
            // Every bin of every frame is written once: k and its mirror 2M - 1 - k.
            let coefs = &mut self.coefs[..2 * signal_len];
            for (n, (column, frame)) in block
                .chunks_exact(m)
                .zip(coefs.chunks_exact_mut(m2))
                .enumerate()
            {
                for (k, &c) in column.iter().enumerate() {
                    let c = c.to_complex();
                    let (direct, mirrored) = if (k + n) % 2 == 0 {
                        (c * r_conj, c * r)
                    } else {
                        (c * r, c * r_conj)
                    };
                    frame[k] = direct;
                    frame[m2 - 1 - k] = mirrored;
                }
            }

            let signal = &mut self.signal[..signal_len];
            self.idgt.execute(coefs, signal_len, 1, signal)?;
            for (l, (o, &x)) in out.iter_mut().zip(signal.iter()).enumerate() {
                *o = S::from_complex(x * self.shift[l % period].conj());
            }
        }
        Ok(())
    }

    pub fn process(&mut self, coefficients: &[S], signal_len: usize, blocks: usize) -> Result<Vec<S>> {
        let total = checked_len(&[signal_len, blocks])?;
        let mut output = try_buffer(total, S::default())?;
        self.execute(coefficients, signal_len, blocks, &mut output)?;
        Ok(output)
    }
}

/// One-shot WMDCT analysis with `channels` channels.
pub fn dwiltiii_fb<T: GaborFloat, S: Sample<T>>(
    signal: &[S],
    window: &[S],
    channels: usize,
    signal_len: usize,
    blocks: usize,
) -> Result<Vec<S>>
where
    Complex<T>: Sample<T>,
{
    let mut plan = DwiltiiiFbPlan::<T, S>::new(window, channels, PlanFlags::default())?;
    plan.process(signal, signal_len, blocks)
}

pub fn idwiltiii_fb<T: GaborFloat, S: Sample<T>>(
    coefficients: &[S],
    window: &[S],
    channels: usize,
    signal_len: usize,
    blocks: usize,
) -> Result<Vec<S>>
where
    Complex<T>: Sample<T>,
{
    let mut plan = IdwiltiiiFbPlan::<T, S>::new(window, channels, PlanFlags::default())?;
    plan.process(coefficients, signal_len, blocks)
}
