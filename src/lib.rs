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

//! Filterbank Gabor and Wilson transforms.
//!
//! Transforms are plans: build once with a window and a [`GaborConfig`],
//! execute many times on signals of any admissible length, drop when done.
//! Every plan is generic over the precision (`f32`/`f64`) and over a real or
//! complex window element.
//!
//! ```
//! use gabor_rs::prelude::*;
//!
//! let config = GaborConfig::new(2, 4).unwrap();
//! let window = vec![1.0f64; 4];
//! let mut plan = IdgtFbPlan::new(&window, &config).unwrap();
//!
//! // One 8-sample block: 4 frames of 4 channels.
//! let mut coefficients = vec![Complex::new(0.0, 0.0); 16];
//! coefficients[0] = Complex::new(1.0, 0.0);
//! let signal = plan.process(&coefficients, 8, 1).unwrap();
//! assert_eq!(signal.len(), 8);
//! ```

pub mod dgt_fb;
pub mod dual;
pub mod error;
pub mod fft_backend;
pub mod idgt_fb;
pub mod sample;
pub mod simd;
pub mod utils;
pub mod walnut;
pub mod wilson;

pub use dgt_fb::{DgtFbPlan, dgt_fb};
pub use dual::{
    SolverFloat, gabdual_fir, gabdual_long, gabdual_painless, gabtight_fir, gabtight_long,
    gabtight_painless,
};
pub use error::{GaborError, Result, SUCCESS, status};
pub use fft_backend::{Complex, PlanFlags};
pub use idgt_fb::{IdgtFbPlan, idgt_fb};
pub use sample::{GaborFloat, Sample};
pub use utils::{fir2long, long2fir};
pub use walnut::{WalnutDefactorization, WalnutFactorization, WalnutLayout, iwfac, wfac};
pub use wilson::{
    DwiltFbPlan, DwiltiiiFbPlan, IdwiltFbPlan, IdwiltiiiFbPlan, dwilt_fb, dwiltiii_fb, idwilt_fb,
    idwiltiii_fb,
};

pub mod prelude {
    pub use crate::{
        Complex, DgtFbPlan, DwiltFbPlan, DwiltiiiFbPlan, GaborConfig, GaborError, IdgtFbPlan,
        IdwiltFbPlan, IdwiltiiiFbPlan, PhaseConvention, PlanFlags, WalnutDefactorization,
        WalnutFactorization, WalnutLayout, done, dgt_fb, dwilt_fb, dwiltiii_fb, fir2long,
        gabdual_fir, gabdual_long, gabdual_painless, gabtight_fir, gabtight_long,
        gabtight_painless, idgt_fb, idwilt_fb, idwiltiii_fb, iwfac, long2fir, wfac,
    };
}

use error::ensure_positive;

/// Where the phase of each frame is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseConvention {
    /// Modulation relative to absolute time: `exp(2πi m l / M)`.
    #[default]
    FrequencyInvariant,
    /// Modulation relative to the frame centre: `exp(2πi m (l - n a) / M)`.
    TimeInvariant,
}

/// Lattice parameters shared by the filterbank plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaborConfig {
    hop: usize,
    channels: usize,
    phase: PhaseConvention,
    flags: PlanFlags,
}

impl GaborConfig {
    /// Hop `a` and channel count `M`, both positive.
    pub fn new(hop: usize, channels: usize) -> Result<Self> {
        ensure_positive("a", hop)?;
        ensure_positive("M", channels)?;
        Ok(Self {
            hop,
            channels,
            phase: PhaseConvention::default(),
            flags: PlanFlags::default(),
        })
    }

    pub fn with_phase(mut self, phase: PhaseConvention) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_flags(mut self, flags: PlanFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn phase(&self) -> PhaseConvention {
        self.phase
    }

    pub fn flags(&self) -> PlanFlags {
        self.flags
    }

    /// Number of frames in a signal of length `signal_len`.
    pub fn frames(&self, signal_len: usize) -> usize {
        signal_len / self.hop
    }

    /// Ratio `M / a`; values below one cannot form a frame.
    pub fn redundancy(&self) -> f64 {
        self.channels as f64 / self.hop as f64
    }
}

/// Tear down the plan held in `slot`, leaving `None` behind.
///
/// Returns `NullPointer` if the slot is already empty. Dropping a plan has the
/// same effect; this form exists for callers that keep plans in optional slots.
pub fn done<P>(slot: &mut Option<P>) -> Result<()> {
    match slot.take() {
        Some(plan) => {
            drop(plan);
            Ok(())
        }
        None => Err(GaborError::NullPointer("plan")),
    }
}
