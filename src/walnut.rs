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

//! Walnut factorization of length-`L` windows.
//!
//! With `c = gcd(a, M)`, `p = a / c`, `q = M / c` and `d = L / (p M)`, a window
//! is split into `c * d` matrices of size `p x q`. In that form the Gabor frame
//! operator is block diagonal, one `G Gᴴ` block per `(r, s)` pair, which is
//! what the dual and tight window solvers work on.
//!
//! Factored layout, for `R` windows stacked back to back:
//!
//! ```text
//! index = k + l*p + w*p*q + r*p*q*R + s*c*p*q*R
//! time  = r + ((k*M - l*a + s*p*M) mod L) + w*L
//! ```

use log::{debug, trace};

use crate::error::{GaborError, Result, ensure_len, ensure_positive, try_buffer};
use crate::fft_backend::{Complex, FftDirection, FftHandle, PlanFlags};
use crate::idgt_fb::checked_len;
use crate::sample::{GaborFloat, Sample, from_usize};
use crate::utils::{gcd, lcm, positive_rem};

/// Index bijection between a time-domain window and its factored form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalnutLayout {
    len: usize,
    a: usize,
    m: usize,
    c: usize,
    p: usize,
    q: usize,
    d: usize,
}

impl WalnutLayout {
    pub fn new(signal_len: usize, a: usize, m: usize) -> Result<Self> {
        ensure_positive("L", signal_len)?;
        ensure_positive("a", a)?;
        ensure_positive("M", m)?;

        let period = lcm(a, m);
        if signal_len % period != 0 {
            return Err(GaborError::BadTransformLength {
                len: signal_len,
                divisor: period,
            });
        }

        let c = gcd(a, m);
        let p = a / c;
        let q = m / c;
        Ok(Self {
            len: signal_len,
            a,
            m,
            c,
            p,
            q,
            d: signal_len / (p * m),
        })
    }

    pub fn signal_len(&self) -> usize {
        self.len
    }

    pub fn hop(&self) -> usize {
        self.a
    }

    pub fn channels(&self) -> usize {
        self.m
    }

    /// `gcd(a, M)`
    pub fn c(&self) -> usize {
        self.c
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Length of the DFT taken along `s`.
    pub fn d(&self) -> usize {
        self.d
    }

    /// Time index of entry `(k, l)` of block `(r, s)` within one window.
    #[inline]
    pub fn time_index(&self, r: usize, k: usize, l: usize, s: usize) -> usize {
        r + self.phase_origin(k, l, s)
    }

    #[inline]
    pub fn factored_index(&self, r: usize, k: usize, l: usize, s: usize, w: usize, windows: usize) -> usize {
        let pq = self.p * self.q;
        k + l * self.p + w * pq + r * pq * windows + s * self.c * pq * windows
    }

    #[inline]
    fn phase_origin(&self, k: usize, l: usize, s: usize) -> usize {
        let base = (k * self.m) as isize - (l * self.a) as isize;
        positive_rem(base + (s * self.p * self.m) as isize, self.len)
    }

    /// Reshuffle `windows` time-domain windows into factored order.
    pub fn factor<S: Copy>(&self, input: &[S], windows: usize, output: &mut [S]) -> Result<()> {
        let total = self.check_sizes(input.len(), output.len(), windows)?;
        let (input, output) = (&input[..total], &mut output[..total]);
        self.for_each_index(windows, |t, f| output[f] = input[t]);
        Ok(())
    }

    /// Inverse of [`WalnutLayout::factor`].
    pub fn unfactor<S: Copy>(&self, input: &[S], windows: usize, output: &mut [S]) -> Result<()> {
        let total = self.check_sizes(input.len(), output.len(), windows)?;
        let (input, output) = (&input[..total], &mut output[..total]);
        self.for_each_index(windows, |t, f| output[t] = input[f]);
        Ok(())
    }

    fn check_sizes(&self, input_len: usize, output_len: usize, windows: usize) -> Result<usize> {
        ensure_positive("R", windows)?;
        let total = checked_len(&[self.len, windows])?;
        ensure_len("input", input_len, total)?;
        ensure_len("output", output_len, total)?;
        Ok(total)
    }

    fn for_each_index(&self, windows: usize, mut visit: impl FnMut(usize, usize)) {
        for w in 0..windows {
            for r in 0..self.c {
                for l in 0..self.q {
                    for k in 0..self.p {
                        for s in 0..self.d {
                            visit(
                                w * self.len + self.time_index(r, k, l, s),
                                self.factored_index(r, k, l, s, w, windows),
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Walnut factorization plan: reshuffle, then a length-`d` DFT along `s`
/// scaled by `√M`.
pub struct WalnutFactorization<T: GaborFloat> {
    layout: WalnutLayout,
    sbuf: Vec<Complex<T>>,
    fft: FftHandle<T>,
    scale: T,
}

impl<T: GaborFloat> WalnutFactorization<T> {
    pub fn new(signal_len: usize, a: usize, m: usize, flags: PlanFlags) -> Result<Self> {
        let layout = WalnutLayout::new(signal_len, a, m)?;
        let sbuf = try_buffer(layout.d, Complex::new(T::zero(), T::zero()))?;
        let fft = FftHandle::new(layout.d, FftDirection::Forward, flags)?;

        debug!(
            "wfac plan: L={}, a={}, M={}, c={}, p={}, q={}, d={}",
            signal_len, a, m, layout.c, layout.p, layout.q, layout.d
        );

        Ok(Self {
            layout,
            sbuf,
            fft,
            scale: from_usize::<T>(m).sqrt(),
        })
    }

    pub fn layout(&self) -> &WalnutLayout {
        &self.layout
    }

    pub fn execute<S: Sample<T>>(
        &mut self,
        input: &[S],
        windows: usize,
        output: &mut [Complex<T>],
    ) -> Result<()> {
        let layout = self.layout;
        layout.check_sizes(input.len(), output.len(), windows)?;
        trace!("wfac execute: R={}", windows);

        for w in 0..windows {
            let window = &input[w * layout.len..(w + 1) * layout.len];
            for r in 0..layout.c {
                for l in 0..layout.q {
                    for k in 0..layout.p {
                        for (s, x) in self.sbuf.iter_mut().enumerate() {
                            *x = window[layout.time_index(r, k, l, s)].to_complex() * self.scale;
                        }
                        self.fft.process(&mut self.sbuf);
                        for (s, &x) in self.sbuf.iter().enumerate() {
                            output[layout.factored_index(r, k, l, s, w, windows)] = x;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn process<S: Sample<T>>(&mut self, input: &[S], windows: usize) -> Result<Vec<Complex<T>>> {
        let total = checked_len(&[self.layout.len, windows])?;
        let mut output = try_buffer(total, Complex::new(T::zero(), T::zero()))?;
        self.execute(input, windows, &mut output)?;
        Ok(output)
    }
}

/// Inverse of [`WalnutFactorization`]. Real outputs keep the real part.
pub struct WalnutDefactorization<T: GaborFloat> {
    layout: WalnutLayout,
    sbuf: Vec<Complex<T>>,
    ifft: FftHandle<T>,
    scale: T,
}

impl<T: GaborFloat> WalnutDefactorization<T> {
    pub fn new(signal_len: usize, a: usize, m: usize, flags: PlanFlags) -> Result<Self> {
        let layout = WalnutLayout::new(signal_len, a, m)?;
        let sbuf = try_buffer(layout.d, Complex::new(T::zero(), T::zero()))?;
        let ifft = FftHandle::new(layout.d, FftDirection::Inverse, flags)?;

        debug!(
            "iwfac plan: L={}, a={}, M={}, c={}, p={}, q={}, d={}",
            signal_len, a, m, layout.c, layout.p, layout.q, layout.d
        );

        let scale = T::one() / (from_usize::<T>(m).sqrt() * from_usize::<T>(layout.d));
        Ok(Self {
            layout,
            sbuf,
            ifft,
            scale,
        })
    }

    pub fn layout(&self) -> &WalnutLayout {
        &self.layout
    }

    pub fn execute<S: Sample<T>>(
        &mut self,
        input: &[Complex<T>],
        windows: usize,
        output: &mut [S],
    ) -> Result<()> {
        let layout = self.layout;
        layout.check_sizes(input.len(), output.len(), windows)?;
        trace!("iwfac execute: R={}", windows);

        for w in 0..windows {
            let window = &mut output[w * layout.len..(w + 1) * layout.len];
            for r in 0..layout.c {
                for l in 0..layout.q {
                    for k in 0..layout.p {
                        for (s, x) in self.sbuf.iter_mut().enumerate() {
                            *x = input[layout.factored_index(r, k, l, s, w, windows)];
                        }
                        self.ifft.process(&mut self.sbuf);
                        for (s, &x) in self.sbuf.iter().enumerate() {
                            window[layout.time_index(r, k, l, s)] = S::from_complex(x * self.scale);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn process<S: Sample<T>>(&mut self, input: &[Complex<T>], windows: usize) -> Result<Vec<S>> {
        let total = checked_len(&[self.layout.len, windows])?;
        let mut output = try_buffer(total, S::default())?;
        self.execute(input, windows, &mut output)?;
        Ok(output)
    }
}

/// One-shot Walnut factorization of `windows` windows of length `signal_len`.
pub fn wfac<T: GaborFloat, S: Sample<T>>(
    input: &[S],
    signal_len: usize,
    a: usize,
    m: usize,
    windows: usize,
) -> Result<Vec<Complex<T>>> {
    let mut plan = WalnutFactorization::<T>::new(signal_len, a, m, PlanFlags::default())?;
    plan.process(input, windows)
}

pub fn iwfac<T: GaborFloat, S: Sample<T>>(
    input: &[Complex<T>],
    signal_len: usize,
    a: usize,
    m: usize,
    windows: usize,
) -> Result<Vec<S>> {
    let mut plan = WalnutDefactorization::<T>::new(signal_len, a, m, PlanFlags::default())?;
    plan.process(input, windows)
}
