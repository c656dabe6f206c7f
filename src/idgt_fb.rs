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

//! Inverse filterbank DGT.
//!
//! Reconstructs `W` blocks of `L` samples from `M x N` coefficient arrays
//! (`N = L / a`). Each frame is inverse transformed with a length-`M` FFT,
//! shifted and periodized against the window, weighted and overlap-added
//! into the output with periodic wraparound at both ends of the block.

use log::{debug, trace};

use crate::error::{GaborError, Result, ensure_len, ensure_positive, try_buffer};
use crate::fft_backend::{Complex, FftDirection, FftHandle};
use crate::sample::{GaborFloat, Sample};
use crate::simd::accumulate;
use crate::utils::{ceil_div, circshift, fftshift, periodize_in_place, positive_rem};
use crate::{GaborConfig, PhaseConvention};

/// Frame ranges of a filterbank transform over a block of `L` samples.
///
/// Frames in `left` and `right` have window support crossing the block
/// boundary; frames in `middle` never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameRanges {
    pub left: core::ops::Range<usize>,
    pub middle: core::ops::Range<usize>,
    pub right: core::ops::Range<usize>,
}

impl FrameRanges {
    pub fn new(signal_len: usize, hop: usize, window_len: usize) -> Self {
        let frames = signal_len / hop;
        let glh = window_len / 2;
        let left_end = ceil_div(glh, hop);
        let right_start = (signal_len - window_len.div_ceil(2)) / hop + 1;
        Self {
            left: 0..left_end,
            middle: left_end..right_start,
            right: right_start..frames,
        }
    }
}

/// Checks shared by the filterbank executors.
pub(crate) fn validate_signal(signal_len: usize, hop: usize, window_len: usize) -> Result<()> {
    if signal_len < window_len || signal_len % hop != 0 {
        return Err(GaborError::BadArgument(format!(
            "L (passed {}) must be at least gl ({}) and divisible by a (passed {})",
            signal_len, window_len, hop
        )));
    }
    Ok(())
}

pub(crate) fn checked_len(factors: &[usize]) -> Result<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| GaborError::BadArgument(format!("array size {:?} overflows", factors)))
}

/// Reusable inverse filterbank DGT plan.
///
/// Owns every buffer the reconstruction needs; `execute` never allocates.
pub struct IdgtFbPlan<T: GaborFloat, S: Sample<T>> {
    a: usize,
    m: usize,
    gl: usize,
    phase: PhaseConvention,
    /// One coefficient column, transformed in place.
    cbuf: Vec<Complex<T>>,
    /// Window shifted so its centre sits at `gl / 2`.
    gw: Vec<S>,
    /// Windowed frame, `max(gl, M)` long.
    ff: Vec<Complex<T>>,
    ifft: FftHandle<T>,
}

impl<T: GaborFloat, S: Sample<T>> IdgtFbPlan<T, S> {
    pub fn new(window: &[S], config: &GaborConfig) -> Result<Self> {
        let gl = window.len();
        let a = config.hop();
        let m = config.channels();
        ensure_positive("gl", gl)?;
        ensure_positive("a", a)?;
        ensure_positive("M", m)?;

        let zero = Complex::new(T::zero(), T::zero());
        let cbuf = try_buffer(m, zero)?;
        let mut gw = try_buffer(gl, S::default())?;
        let ff = try_buffer(gl.max(m), zero)?;
        let ifft = FftHandle::new(m, FftDirection::Inverse, config.flags())?;

        fftshift(window, &mut gw);

        debug!(
            "idgt_fb plan: gl={}, a={}, M={}, phase={:?}, flags={:?}",
            gl,
            a,
            m,
            config.phase(),
            config.flags()
        );

        Ok(Self {
            a,
            m,
            gl,
            phase: config.phase(),
            cbuf,
            gw,
            ff,
            ifft,
        })
    }

    pub fn hop(&self) -> usize {
        self.a
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    pub fn window_len(&self) -> usize {
        self.gl
    }

    pub fn phase(&self) -> PhaseConvention {
        self.phase
    }

    /// Reconstruct `blocks` signals of `signal_len` samples into `output`.
    ///
    /// `coefficients` holds `M * (signal_len / a)` values per block, column
    /// `n` at offset `n * M`. The first `signal_len * blocks` output samples
    /// are overwritten.
    pub fn execute(
        &mut self,
        coefficients: &[Complex<T>],
        signal_len: usize,
        blocks: usize,
        output: &mut [Complex<T>],
    ) -> Result<()> {
        validate_signal(signal_len, self.a, self.gl)?;
        ensure_positive("W", blocks)?;

        let frames = signal_len / self.a;
        let block_coefs = checked_len(&[self.m, frames])?;
        let total_coefs = checked_len(&[block_coefs, blocks])?;
        let total_out = checked_len(&[signal_len, blocks])?;
        ensure_len("coefficients", coefficients.len(), total_coefs)?;
        ensure_len("output", output.len(), total_out)?;

        trace!(
            "idgt_fb execute: L={}, W={}, N={}",
            signal_len, blocks, frames
        );

        let output = &mut output[..total_out];
        output.fill(Complex::new(T::zero(), T::zero()));

        let ranges = FrameRanges::new(signal_len, self.a, self.gl);
        let m = self.m;

        for (coefs, out) in coefficients[..total_coefs]
            .chunks_exact(block_coefs)
            .zip(output.chunks_exact_mut(signal_len))
        {
            for n in ranges.left.clone() {
                self.synthesize_frame(&coefs[n * m..(n + 1) * m], n);
                self.add_wrapped(out, n);
            }
            for n in ranges.middle.clone() {
                self.synthesize_frame(&coefs[n * m..(n + 1) * m], n);
                self.add_contiguous(out, n);
            }
            for n in ranges.right.clone() {
                self.synthesize_frame(&coefs[n * m..(n + 1) * m], n);
                self.add_wrapped(out, n);
            }
        }

        Ok(())
    }

    /// Allocating form of [`IdgtFbPlan::execute`].
    pub fn process(
        &mut self,
        coefficients: &[Complex<T>],
        signal_len: usize,
        blocks: usize,
    ) -> Result<Vec<Complex<T>>> {
        let total = checked_len(&[signal_len, blocks])?;
        let mut output = try_buffer(total, Complex::new(T::zero(), T::zero()))?;
        self.execute(coefficients, signal_len, blocks, &mut output)?;
        Ok(output)
    }

    /// Leaves the windowed frame `n` in `ff[..gl]`.
    fn synthesize_frame(&mut self, column: &[Complex<T>], n: usize) {
        self.cbuf.copy_from_slice(column);
        self.ifft.process(&mut self.cbuf);

        let glh = (self.gl / 2) as isize;
        let shift = match self.phase {
            PhaseConvention::TimeInvariant => glh,
            PhaseConvention::FrequencyInvariant => glh - (n * self.a) as isize,
        };
        circshift(&self.cbuf, shift, &mut self.ff[..self.m]);
        periodize_in_place(&mut self.ff, self.m, self.gl);

        for (x, &g) in self.ff[..self.gl].iter_mut().zip(&self.gw) {
            *x = g.mul_complex(*x);
        }
    }

    /// First sample of frame `n`'s support, possibly negative.
    #[inline]
    fn frame_start(&self, n: usize) -> isize {
        (n * self.a) as isize - (self.gl / 2) as isize
    }

    fn add_contiguous(&self, out: &mut [Complex<T>], n: usize) {
        let sp = positive_rem(self.frame_start(n), out.len());
        accumulate(&self.ff[..self.gl], &mut out[sp..sp + self.gl]);
    }

    fn add_wrapped(&self, out: &mut [Complex<T>], n: usize) {
        let len = out.len();
        let start = self.frame_start(n);
        let sp = positive_rem(start, len);
        let ep = positive_rem(start + self.gl as isize - 1, len);

        let head = len - sp;
        accumulate(&self.ff[..head], &mut out[sp..]);
        accumulate(&self.ff[head..self.gl], &mut out[..=ep]);
    }
}

/// One-shot inverse filterbank DGT: plan, execute, drop.
pub fn idgt_fb<T: GaborFloat, S: Sample<T>>(
    coefficients: &[Complex<T>],
    window: &[S],
    signal_len: usize,
    blocks: usize,
    config: &GaborConfig,
) -> Result<Vec<Complex<T>>> {
    let mut plan = IdgtFbPlan::<T, S>::new(window, config)?;
    plan.process(coefficients, signal_len, blocks)
}
