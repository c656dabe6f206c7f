/// SIMD-accelerated buffer arithmetic for overlap-add using pulp
use crate::fft_backend::Complex;
use num_traits::Float;

#[cfg(feature = "simd")]
use pulp::Arch;

/// Accumulate for overlap-add reconstruction
/// Computes: output[i] += input[i]
#[inline]
pub fn accumulate<T: Float + 'static>(input: &[Complex<T>], output: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), output.len());

    #[cfg(feature = "simd")]
    {
        let simd = pulp::Arch::new();
        // Complex<T> is repr(C), so a complex slice is a real slice of twice the length.
        let len = 2 * input.len();
        match (
            std::any::TypeId::of::<T>(),
            std::any::TypeId::of::<f32>(),
            std::any::TypeId::of::<f64>(),
        ) {
            (t, f32_id, _) if t == f32_id => {
                accumulate_f32_simd(
                    simd,
                    unsafe { std::slice::from_raw_parts(input.as_ptr() as *const f32, len) },
                    unsafe { std::slice::from_raw_parts_mut(output.as_mut_ptr() as *mut f32, len) },
                );
                return;
            }
            (t, _, f64_id) if t == f64_id => {
                accumulate_f64_simd(
                    simd,
                    unsafe { std::slice::from_raw_parts(input.as_ptr() as *const f64, len) },
                    unsafe { std::slice::from_raw_parts_mut(output.as_mut_ptr() as *mut f64, len) },
                );
                return;
            }
            _ => {}
        }
    }

    // Fallback to scalar implementation
    for (o, &i) in output.iter_mut().zip(input) {
        *o = *o + i;
    }
}

#[cfg(feature = "simd")]
fn accumulate_f32_simd(simd: Arch, input: &[f32], output: &mut [f32]) {
    simd.dispatch(|| {
        let (input_head, input_tail) = pulp::as_arrays::<4, _>(input);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..input_head.len() {
            output_head[i] = [
                output_head[i][0] + input_head[i][0],
                output_head[i][1] + input_head[i][1],
                output_head[i][2] + input_head[i][2],
                output_head[i][3] + input_head[i][3],
            ];
        }

        for i in 0..input_tail.len() {
            output_tail[i] += input_tail[i];
        }
    });
}

#[cfg(feature = "simd")]
fn accumulate_f64_simd(simd: Arch, input: &[f64], output: &mut [f64]) {
    simd.dispatch(|| {
        let (input_head, input_tail) = pulp::as_arrays::<4, _>(input);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..input_head.len() {
            output_head[i] = [
                output_head[i][0] + input_head[i][0],
                output_head[i][1] + input_head[i][1],
                output_head[i][2] + input_head[i][2],
                output_head[i][3] + input_head[i][3],
            ];
        }

        for i in 0..input_tail.len() {
            output_tail[i] += input_tail[i];
        }
    });
}
