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

//! Error taxonomy shared by every transform entry point.
//!
//! Each variant maps to a stable integer status code (see [`GaborError::code`]),
//! so callers that need a flat status value can still get one.

use thiserror::Error;

/// Status code reported for a successful call.
pub const SUCCESS: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaborError {
    #[error("required {0} is missing")]
    NullPointer(&'static str),

    #[error("{name} has length {len}, expected at least {expected}")]
    BadSize {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("transform length {len} must be divisible by {divisor}")]
    BadTransformLength { len: usize, divisor: usize },

    #[error("{name} (passed {value}) must be positive")]
    NotPositiveArgument { name: &'static str, value: usize },

    #[error("system is not a frame: {0}")]
    NotAFrame(String),

    #[error("transform length {len} is smaller than required {required}")]
    BadRequiredSize { len: usize, required: usize },

    #[error("allocation of {0} elements failed")]
    NoMemory(usize),

    #[error("initialization failed: {0}")]
    InitFailed(String),

    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("operation failed: {0}")]
    GenericFailure(String),

    #[error("window length {window_len} exceeds {channels} channels, system is not painless")]
    NotPainless { window_len: usize, channels: usize },
}

impl GaborError {
    /// Stable integer status code of this error.
    pub fn code(&self) -> i32 {
        match self {
            GaborError::NullPointer(_) => -1,
            GaborError::BadSize { .. } => -2,
            GaborError::BadTransformLength { .. } => -3,
            GaborError::NotPositiveArgument { .. } => -4,
            GaborError::NotAFrame(_) => -5,
            GaborError::BadRequiredSize { .. } => -6,
            GaborError::NoMemory(_) => -7,
            GaborError::InitFailed(_) => -8,
            GaborError::BadArgument(_) => -9,
            GaborError::GenericFailure(_) => -10,
            GaborError::NotPainless { .. } => -11,
        }
    }
}

pub type Result<T> = std::result::Result<T, GaborError>;

/// Flatten a result into its status code.
pub fn status<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => SUCCESS,
        Err(e) => e.code(),
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(GaborError::NotPositiveArgument { name, value });
    }
    Ok(())
}

pub(crate) fn ensure_len(name: &'static str, len: usize, expected: usize) -> Result<()> {
    if len < expected {
        return Err(GaborError::BadSize {
            name,
            len,
            expected,
        });
    }
    Ok(())
}

/// Allocate a buffer of `len` copies of `value`, reporting allocation failure
/// instead of aborting.
pub(crate) fn try_buffer<S: Copy>(len: usize, value: S) -> Result<Vec<S>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| GaborError::NoMemory(len))?;
    buf.resize(len, value);
    Ok(buf)
}
