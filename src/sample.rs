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

//! Element traits.
//!
//! Every transform is written once against [`GaborFloat`] (precision) and
//! [`Sample`] (real or complex element), giving the four flavours
//! `f32`, `f64`, `Complex<f32>` and `Complex<f64>`.

use core::fmt;

use num_traits::{Float, FromPrimitive, NumAssign};

use crate::fft_backend::{Complex, FftNum};

/// Floating point precision usable by the transforms.
pub trait GaborFloat:
    FftNum + Float + FromPrimitive + NumAssign + Default + fmt::Debug + fmt::Display
{
}

impl GaborFloat for f32 {}
impl GaborFloat for f64 {}

/// A signal or window element: either a real `T` or a `Complex<T>`.
pub trait Sample<T: GaborFloat>: Copy + Default + Send + Sync + fmt::Debug + 'static {
    /// `true` for complex element types.
    const IS_COMPLEX: bool;

    fn to_complex(self) -> Complex<T>;

    /// Convert back from a complex value. Real samples keep the real part.
    fn from_complex(value: Complex<T>) -> Self;

    fn conj(self) -> Self;

    /// Squared magnitude.
    fn energy(self) -> T;

    fn scaled(self, factor: T) -> Self;

    /// Multiply a complex value by this sample.
    #[inline]
    fn mul_complex(self, value: Complex<T>) -> Complex<T> {
        value * self.to_complex()
    }
}

macro_rules! impl_real_sample {
    ($t:ty) => {
        impl Sample<$t> for $t {
            const IS_COMPLEX: bool = false;

            #[inline]
            fn to_complex(self) -> Complex<$t> {
                Complex::new(self, 0.0)
            }

            #[inline]
            fn from_complex(value: Complex<$t>) -> Self {
                value.re
            }

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn energy(self) -> $t {
                self * self
            }

            #[inline]
            fn scaled(self, factor: $t) -> Self {
                self * factor
            }

            #[inline]
            fn mul_complex(self, value: Complex<$t>) -> Complex<$t> {
                Complex::new(value.re * self, value.im * self)
            }
        }

        impl Sample<$t> for Complex<$t> {
            const IS_COMPLEX: bool = true;

            #[inline]
            fn to_complex(self) -> Complex<$t> {
                self
            }

            #[inline]
            fn from_complex(value: Complex<$t>) -> Self {
                value
            }

            #[inline]
            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }

            #[inline]
            fn energy(self) -> $t {
                self.re * self.re + self.im * self.im
            }

            #[inline]
            fn scaled(self, factor: $t) -> Self {
                Complex::new(self.re * factor, self.im * factor)
            }
        }
    };
}

impl_real_sample!(f32);
impl_real_sample!(f64);

// Both conversions are total for f32 and f64.
#[inline]
pub(crate) fn from_usize<T: GaborFloat>(n: usize) -> T {
    T::from_usize(n).unwrap_or_else(T::nan)
}

#[inline]
pub(crate) fn from_f64<T: GaborFloat>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_sample() {
        let x = 3.0f64;
        assert_eq!(x.to_complex(), Complex::new(3.0, 0.0));
        assert_eq!(<f64 as Sample<f64>>::from_complex(Complex::new(2.0, 5.0)), 2.0);
        assert_eq!(Sample::<f64>::energy(x), 9.0);
        assert_eq!(x.mul_complex(Complex::new(1.0, -2.0)), Complex::new(3.0, -6.0));
        assert!(!<f64 as Sample<f64>>::IS_COMPLEX);
    }

    #[test]
    fn test_complex_sample() {
        let z = Complex::new(1.0f32, 2.0);
        assert_eq!(Sample::<f32>::conj(z), Complex::new(1.0, -2.0));
        assert_eq!(Sample::<f32>::energy(z), 5.0);
        assert_eq!(Sample::<f32>::scaled(z, 2.0), Complex::new(2.0, 4.0));
        assert_eq!(z.mul_complex(Complex::new(0.0, 1.0)), Complex::new(-2.0, 1.0));
        assert!(<Complex<f32> as Sample<f32>>::IS_COMPLEX);
    }
}
