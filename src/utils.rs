/// Index arithmetic and buffer reshaping primitives shared by the transforms.
///
/// Windows are stored zero-centred: index `k < ceil(gl/2)` holds time offset
/// `k`, index `k >= ceil(gl/2)` holds offset `k - gl`.
use crate::error::{GaborError, Result};

/// Floor-mod: the remainder of `x / m` in `[0, m)`, also for negative `x`.
#[inline]
pub fn positive_rem(x: isize, m: usize) -> usize {
    debug_assert!(m > 0);
    x.rem_euclid(m as isize) as usize
}

/// Greatest common divisor. `gcd(0, b) == b`.
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple, `0` if either argument is `0`.
pub fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

#[inline]
pub fn ceil_div(x: usize, y: usize) -> usize {
    x.div_ceil(y)
}

/// Circular shift: `output[(i + shift) mod len] = input[i]`.
///
/// A positive shift moves samples towards higher indices.
pub fn circshift<S: Copy>(input: &[S], shift: isize, output: &mut [S]) {
    debug_assert_eq!(input.len(), output.len());
    let len = input.len();
    if len == 0 {
        return;
    }
    let p = positive_rem(shift, len);
    output[p..].copy_from_slice(&input[..len - p]);
    output[..p].copy_from_slice(&input[len - p..]);
}

/// Move the zero-centred sample to the middle: a circular shift by `len / 2`.
pub fn fftshift<S: Copy>(input: &[S], output: &mut [S]) {
    circshift(input, (input.len() / 2) as isize, output);
}

/// Extend (or truncate) the first `period` samples of `buf` periodically so
/// that `buf[i] = buf[i mod period]` for every `i < len`.
pub fn periodize_in_place<S: Copy>(buf: &mut [S], period: usize, len: usize) {
    debug_assert!(period > 0 && len <= buf.len());
    for i in period..len {
        buf[i] = buf[i - period];
    }
}

/// Circular summation of `input` into `output` with the first input sample
/// landing at `offset`: `output[(j + offset) mod M] += input[j]`.
///
/// `output` is cleared first.
pub fn fold<S: Copy + Default + core::ops::AddAssign>(input: &[S], offset: isize, output: &mut [S]) {
    let m = output.len();
    debug_assert!(m > 0);
    output.fill(S::default());

    let mut k = positive_rem(offset, m);
    for &x in input {
        output[k] += x;
        k += 1;
        if k == m {
            k = 0;
        }
    }
}

/// Zero-extend a zero-centred window of length `gl` to length `long_len`.
///
/// The extra sample of an odd-length window stays in the first half.
pub fn fir2long<S: Copy + Default>(window: &[S], long_len: usize) -> Result<Vec<S>> {
    let gl = window.len();
    if gl == 0 {
        return Err(GaborError::NotPositiveArgument {
            name: "window length",
            value: 0,
        });
    }
    if long_len < gl {
        return Err(GaborError::BadRequiredSize {
            len: long_len,
            required: gl,
        });
    }

    let head = gl.div_ceil(2);
    let mut long = crate::error::try_buffer(long_len, S::default())?;
    long[..head].copy_from_slice(&window[..head]);
    long[long_len - (gl - head)..].copy_from_slice(&window[head..]);
    Ok(long)
}

/// Cut a zero-centred window of length `L` down to `fir_len` samples.
pub fn long2fir<S: Copy + Default>(window: &[S], fir_len: usize) -> Result<Vec<S>> {
    let long_len = window.len();
    if fir_len == 0 {
        return Err(GaborError::NotPositiveArgument {
            name: "fir length",
            value: 0,
        });
    }
    if long_len < fir_len {
        return Err(GaborError::BadRequiredSize {
            len: long_len,
            required: fir_len,
        });
    }

    let head = fir_len.div_ceil(2);
    let mut fir = crate::error::try_buffer(fir_len, S::default())?;
    fir[..head].copy_from_slice(&window[..head]);
    fir[head..].copy_from_slice(&window[long_len - (fir_len - head)..]);
    Ok(fir)
}
