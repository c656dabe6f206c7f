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

//! Forward filterbank DGT, the analysis counterpart of [`crate::idgt_fb`].
//!
//! For every frame the windowed signal segment is folded onto `M` bins and
//! transformed with a forward FFT of length `M`.

use log::{debug, trace};

use crate::error::{Result, ensure_len, ensure_positive, try_buffer};
use crate::fft_backend::{Complex, FftDirection, FftHandle};
use crate::idgt_fb::{FrameRanges, checked_len, validate_signal};
use crate::sample::{GaborFloat, Sample};
use crate::utils::{fftshift, fold, positive_rem};
use crate::{GaborConfig, PhaseConvention};

pub struct DgtFbPlan<T: GaborFloat, S: Sample<T>> {
    a: usize,
    m: usize,
    gl: usize,
    phase: PhaseConvention,
    /// Folded frame, transformed in place.
    sbuf: Vec<Complex<T>>,
    /// Conjugated, centre-shifted window.
    gw: Vec<S>,
    fw: Vec<Complex<T>>,
    fft: FftHandle<T>,
}

impl<T: GaborFloat, S: Sample<T>> DgtFbPlan<T, S> {
    pub fn new(window: &[S], config: &GaborConfig) -> Result<Self> {
        let gl = window.len();
        let a = config.hop();
        let m = config.channels();
        ensure_positive("gl", gl)?;
        ensure_positive("a", a)?;
        ensure_positive("M", m)?;

        let zero = Complex::new(T::zero(), T::zero());
        let sbuf = try_buffer(m, zero)?;
        let mut gw = try_buffer(gl, S::default())?;
        let fw = try_buffer(gl, zero)?;
        let fft = FftHandle::new(m, FftDirection::Forward, config.flags())?;

        fftshift(window, &mut gw);
        for g in gw.iter_mut() {
            *g = g.conj();
        }

        debug!(
            "dgt_fb plan: gl={}, a={}, M={}, phase={:?}, flags={:?}",
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
            sbuf,
            gw,
            fw,
            fft,
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

    /// Analyse `blocks` signals of `signal_len` samples.
    ///
    /// Writes `M * (signal_len / a)` coefficients per block, column-major.
    pub fn execute(
        &mut self,
        signal: &[S],
        signal_len: usize,
        blocks: usize,
        coefficients: &mut [Complex<T>],
    ) -> Result<()> {
        validate_signal(signal_len, self.a, self.gl)?;
        ensure_positive("W", blocks)?;

        let frames = signal_len / self.a;
        let block_coefs = checked_len(&[self.m, frames])?;
        let total_coefs = checked_len(&[block_coefs, blocks])?;
        let total_in = checked_len(&[signal_len, blocks])?;
        ensure_len("signal", signal.len(), total_in)?;
        ensure_len("coefficients", coefficients.len(), total_coefs)?;

        trace!("dgt_fb execute: L={}, W={}, N={}", signal_len, blocks, frames);

        let ranges = FrameRanges::new(signal_len, self.a, self.gl);
        let m = self.m;

        for (block, coefs) in signal[..total_in]
            .chunks_exact(signal_len)
            .zip(coefficients[..total_coefs].chunks_exact_mut(block_coefs))
        {
            for n in ranges.left.clone() {
                self.gather_wrapped(block, n);
                self.analyse_frame(n, &mut coefs[n * m..(n + 1) * m]);
            }
            for n in ranges.middle.clone() {
                self.gather_contiguous(block, n);
                self.analyse_frame(n, &mut coefs[n * m..(n + 1) * m]);
            }
            for n in ranges.right.clone() {
                self.gather_wrapped(block, n);
                self.analyse_frame(n, &mut coefs[n * m..(n + 1) * m]);
            }
        }

        Ok(())
    }

    pub fn process(
        &mut self,
        signal: &[S],
        signal_len: usize,
        blocks: usize,
    ) -> Result<Vec<Complex<T>>> {
        let frames = signal_len / self.a;
        let total = checked_len(&[self.m, frames, blocks])?;
        let mut coefficients = try_buffer(total, Complex::new(T::zero(), T::zero()))?;
        self.execute(signal, signal_len, blocks, &mut coefficients)?;
        Ok(coefficients)
    }

    #[inline]
    fn frame_start(&self, n: usize) -> isize {
        (n * self.a) as isize - (self.gl / 2) as isize
    }

    fn gather_contiguous(&mut self, block: &[S], n: usize) {
        let sp = positive_rem(self.frame_start(n), block.len());
        for ((w, &g), &x) in self
            .fw
            .iter_mut()
            .zip(&self.gw)
            .zip(&block[sp..sp + self.gl])
        {
            *w = g.mul_complex(x.to_complex());
        }
    }

    fn gather_wrapped(&mut self, block: &[S], n: usize) {
        let len = block.len();
        let sp = positive_rem(self.frame_start(n), len);
        let head = len - sp;
        let segment = block[sp..].iter().chain(&block[..self.gl - head]);
        for ((w, &g), &x) in self.fw.iter_mut().zip(&self.gw).zip(segment) {
            *w = g.mul_complex(x.to_complex());
        }
    }

    fn analyse_frame(&mut self, n: usize, column: &mut [Complex<T>]) {
        let glh = (self.gl / 2) as isize;
        let offset = match self.phase {
            PhaseConvention::FrequencyInvariant => (n * self.a) as isize - glh,
            PhaseConvention::TimeInvariant => -glh,
        };
        fold(&self.fw, offset, &mut self.sbuf);
        self.fft.process(&mut self.sbuf);
        column.copy_from_slice(&self.sbuf);
    }
}

/// One-shot forward filterbank DGT.
pub fn dgt_fb<T: GaborFloat, S: Sample<T>>(
    signal: &[S],
    window: &[S],
    signal_len: usize,
    blocks: usize,
    config: &GaborConfig,
) -> Result<Vec<Complex<T>>> {
    let mut plan = DgtFbPlan::<T, S>::new(window, config)?;
    plan.process(signal, signal_len, blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GaborError;
    use crate::idgt_fb::IdgtFbPlan;
    use crate::utils::fir2long;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn gaussian(gl: usize, width: f64) -> Vec<f64> {
        (0..gl)
            .map(|k| {
                let t = if k < gl.div_ceil(2) {
                    k as f64
                } else {
                    k as f64 - gl as f64
                };
                (-PI * (t / width).powi(2)).exp()
            })
            .collect()
    }

    fn test_signal(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (i as f64 * 0.3).sin() + 0.5 * (i as f64 * 1.7).cos())
            .collect()
    }

    fn direct_analysis(
        signal: &[f64],
        window: &[f64],
        a: usize,
        m: usize,
        phase: PhaseConvention,
    ) -> Vec<Complex<f64>> {
        let len = signal.len();
        let g = fir2long(window, len).unwrap();
        let mut c = Vec::new();
        for n in 0..len / a {
            for k in 0..m {
                let mut acc = Complex::new(0.0, 0.0);
                for (l, &x) in signal.iter().enumerate() {
                    let gv = g[positive_rem(l as isize - (n * a) as isize, len)];
                    let time = match phase {
                        PhaseConvention::FrequencyInvariant => l as f64,
                        PhaseConvention::TimeInvariant => l as f64 - (n * a) as f64,
                    };
                    let angle = -2.0 * PI * k as f64 * time / m as f64;
                    acc += Complex::new(angle.cos(), angle.sin()) * (x * gv);
                }
                c.push(acc);
            }
        }
        c
    }

    #[test]
    fn test_matches_direct_analysis() {
        let (signal_len, a, m) = (24, 4, 8);
        let signal = test_signal(signal_len);
        for gl in [3, 8, 13, 24] {
            let window = gaussian(gl, 4.0);
            for phase in [PhaseConvention::FrequencyInvariant, PhaseConvention::TimeInvariant] {
                let config = GaborConfig::new(a, m).unwrap().with_phase(phase);
                let c = dgt_fb(&signal, &window, signal_len, 1, &config).unwrap();
                let expected = direct_analysis(&signal, &window, a, m, phase);
                for (x, y) in c.iter().zip(&expected) {
                    assert_relative_eq!(x.re, y.re, epsilon = 1e-10);
                    assert_relative_eq!(x.im, y.im, epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_adjoint_of_synthesis() {
        // <dgt(f), c> == <f, idgt(c)> for the same window.
        let (signal_len, a, m) = (20, 2, 5);
        let window: Vec<Complex<f64>> = gaussian(7, 3.0)
            .iter()
            .enumerate()
            .map(|(k, &w)| Complex::new(w, 0.05 * k as f64))
            .collect();
        let signal: Vec<Complex<f64>> = test_signal(signal_len)
            .iter()
            .enumerate()
            .map(|(i, &x)| Complex::new(x, (i as f64 * 0.11).cos()))
            .collect();
        let coefficients: Vec<Complex<f64>> = (0..m * signal_len / a)
            .map(|i| Complex::new((i as f64 * 0.7).cos(), (i as f64 * 0.2).sin()))
            .collect();

        for phase in [PhaseConvention::FrequencyInvariant, PhaseConvention::TimeInvariant] {
            let config = GaborConfig::new(a, m).unwrap().with_phase(phase);
            let analysed = dgt_fb(&signal, &window, signal_len, 1, &config).unwrap();
            let mut synthesis = IdgtFbPlan::new(&window, &config).unwrap();
            let synthesised = synthesis.process(&coefficients, signal_len, 1).unwrap();

            let lhs: Complex<f64> = analysed
                .iter()
                .zip(&coefficients)
                .map(|(x, y)| x * y.conj())
                .sum();
            let rhs: Complex<f64> = signal
                .iter()
                .zip(&synthesised)
                .map(|(x, y)| x * y.conj())
                .sum();
            assert_relative_eq!(lhs.re, rhs.re, epsilon = 1e-9);
            assert_relative_eq!(lhs.im, rhs.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_multiple_blocks() {
        let (signal_len, a, m) = (16, 4, 8);
        let window = gaussian(8, 3.0);
        let config = GaborConfig::new(a, m).unwrap();
        let signal = test_signal(2 * signal_len);
        let mut plan = DgtFbPlan::new(&window, &config).unwrap();

        let both = plan.process(&signal, signal_len, 2).unwrap();
        let second = plan.process(&signal[signal_len..], signal_len, 1).unwrap();
        assert_eq!(&both[m * 4..], &second[..]);
    }

    #[test]
    fn test_validation() {
        let config = GaborConfig::new(2, 4).unwrap();
        let window = gaussian(4, 2.0);
        let mut plan = DgtFbPlan::new(&window, &config).unwrap();
        let signal = test_signal(8);
        let mut coefficients = vec![Complex::new(0.0, 0.0); 16];

        assert!(matches!(
            plan.execute(&signal, 9, 1, &mut coefficients),
            Err(GaborError::BadArgument(_))
        ));
        assert!(matches!(
            plan.execute(&signal[..6], 8, 1, &mut coefficients),
            Err(GaborError::BadSize { name: "signal", .. })
        ));
        assert!(matches!(
            plan.execute(&signal, 8, 1, &mut coefficients[..12]),
            Err(GaborError::BadSize { name: "coefficients", .. })
        ));
    }
}
