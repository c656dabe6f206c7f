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

//! FFT backend abstraction layer
//!
//! Transform plans hold a fixed-size FFT handle created once and executed
//! many times in place. The handle is obtained from a planner implementing
//! [`FftPlannerTrait`]; the only backend is `rustfft`, with [`PlanFlags`]
//! selecting how much effort the planner spends.

use std::sync::Arc;

use crate::error::{GaborError, Result};

pub use rustfft::FftNum;
pub use rustfft::num_complex::Complex;

/// Planning effort passed through to the FFT backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFlags {
    /// Portable scalar algorithms, no CPU feature detection.
    #[default]
    Estimate,
    /// Fastest plan available on this CPU (runtime SIMD detection).
    Fastest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    Forward,
    /// Unnormalized inverse.
    Inverse,
}

/// Trait abstracting a planned FFT of fixed length
pub trait FftBackend<T: FftNum>: Send + Sync {
    /// Process FFT in-place, using caller-provided scratch
    fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]);

    /// Scratch length required by [`FftBackend::process_with_scratch`]
    fn scratch_len(&self) -> usize;

    /// Get the FFT size
    fn len(&self) -> usize;

    /// Check if FFT size is zero (always false for valid FFTs)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// FFT planner trait for creating forward and inverse FFT instances
pub trait FftPlannerTrait<T: FftNum> {
    /// Create a new planner
    fn new(flags: PlanFlags) -> Self;

    /// Plan a forward FFT of the given size
    fn plan_fft_forward(&mut self, size: usize) -> Arc<dyn FftBackend<T>>;

    /// Plan an inverse FFT of the given size
    fn plan_fft_inverse(&mut self, size: usize) -> Arc<dyn FftBackend<T>>;
}

mod rustfft_impl {
    use super::*;
    use rustfft::{Fft, FftPlanner as RustFftPlanner, FftPlannerScalar};

    /// Wrapper around rustfft's Fft that implements our FftBackend trait
    struct RustFftWrapper<T: FftNum> {
        fft: Arc<dyn Fft<T>>,
    }

    impl<T: FftNum> FftBackend<T> for RustFftWrapper<T> {
        fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]) {
            self.fft.process_with_scratch(buffer, scratch);
        }

        fn scratch_len(&self) -> usize {
            self.fft.get_inplace_scratch_len()
        }

        fn len(&self) -> usize {
            self.fft.len()
        }
    }

    enum Inner<T: FftNum> {
        Scalar(FftPlannerScalar<T>),
        Detect(RustFftPlanner<T>),
    }

    /// FFT planner using rustfft
    pub struct FftPlanner<T: FftNum> {
        inner: Inner<T>,
    }

    impl<T: FftNum> FftPlanner<T> {
        fn plan(&mut self, size: usize, direction: rustfft::FftDirection) -> Arc<dyn FftBackend<T>> {
            let fft = match &mut self.inner {
                Inner::Scalar(planner) => planner.plan_fft(size, direction),
                Inner::Detect(planner) => planner.plan_fft(size, direction),
            };
            Arc::new(RustFftWrapper { fft })
        }
    }

    impl<T: FftNum> FftPlannerTrait<T> for FftPlanner<T> {
        fn new(flags: PlanFlags) -> Self {
            let inner = match flags {
                PlanFlags::Estimate => Inner::Scalar(FftPlannerScalar::new()),
                PlanFlags::Fastest => Inner::Detect(RustFftPlanner::new()),
            };
            Self { inner }
        }

        fn plan_fft_forward(&mut self, size: usize) -> Arc<dyn FftBackend<T>> {
            self.plan(size, rustfft::FftDirection::Forward)
        }

        fn plan_fft_inverse(&mut self, size: usize) -> Arc<dyn FftBackend<T>> {
            self.plan(size, rustfft::FftDirection::Inverse)
        }
    }
}

pub use rustfft_impl::FftPlanner;

/// A planned FFT together with the scratch space it runs in.
pub struct FftHandle<T: FftNum> {
    fft: Arc<dyn FftBackend<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T: FftNum> FftHandle<T> {
    /// Plan an FFT of `size` points, failing with `InitFailed` if the backend
    /// hands back a transform of a different length.
    pub fn new(size: usize, direction: FftDirection, flags: PlanFlags) -> Result<Self> {
        let mut planner = FftPlanner::<T>::new(flags);
        let fft = match direction {
            FftDirection::Forward => planner.plan_fft_forward(size),
            FftDirection::Inverse => planner.plan_fft_inverse(size),
        };
        if fft.len() != size {
            return Err(GaborError::InitFailed(format!(
                "planned FFT has length {}, requested {}",
                fft.len(),
                size
            )));
        }
        let zero = Complex::new(T::zero(), T::zero());
        let scratch = crate::error::try_buffer(fft.scratch_len(), zero)?;
        Ok(Self { fft, scratch })
    }

    /// Transform `buffer` in place. `buffer.len()` must equal [`FftHandle::len`].
    #[inline]
    pub fn process(&mut self, buffer: &mut [Complex<T>]) {
        self.fft.process_with_scratch(buffer, &mut self.scratch);
    }

    pub fn len(&self) -> usize {
        self.fft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fft.is_empty()
    }
}
