/// Common test utilities
use gabor_rs::{Complex, GaborFloat, Sample};

fn to_f64<T: GaborFloat>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// SNR in dB of a reconstruction against a real or complex original.
pub fn calculate_snr<T: GaborFloat, S: Sample<T>>(original: &[S], reconstructed: &[Complex<T>]) -> f64 {
    assert_eq!(original.len(), reconstructed.len());

    let signal_power: f64 = original.iter().map(|&x| to_f64(x.energy())).sum();
    let noise_power: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(&o, &r)| to_f64((o.to_complex() - r).norm_sqr()))
        .sum();

    if noise_power == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (signal_power / noise_power).log10()
    }
}

#[allow(dead_code)]
pub fn max_abs_error<T: GaborFloat, S: Sample<T>>(original: &[S], reconstructed: &[Complex<T>]) -> f64 {
    original
        .iter()
        .zip(reconstructed.iter())
        .map(|(&o, &r)| to_f64((o.to_complex() - r).norm()))
        .fold(0.0, f64::max)
}

/// Deterministic test signal with a few incommensurate partials.
#[allow(dead_code)]
pub fn test_signal(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            (t * 0.31).sin() + 0.5 * (t * 1.13).cos() - 0.25 * (t * 2.71).sin()
        })
        .collect()
}

#[allow(dead_code)]
pub fn test_signal_complex(len: usize) -> Vec<Complex<f64>> {
    test_signal(len)
        .iter()
        .enumerate()
        .map(|(i, &x)| Complex::new(x, (i as f64 * 0.57).cos()))
        .collect()
}

/// Zero-centred offset of FIR index `k` in a window of length `gl`.
#[allow(dead_code)]
pub fn offset(k: usize, gl: usize) -> f64 {
    if k < gl.div_ceil(2) {
        k as f64
    } else {
        k as f64 - gl as f64
    }
}

/// Periodic Gaussian-like window `exp(-π t² / width)` in FIR format.
#[allow(dead_code)]
pub fn gaussian(gl: usize, width: f64) -> Vec<f64> {
    (0..gl)
        .map(|k| (-std::f64::consts::PI * offset(k, gl).powi(2) / width).exp())
        .collect()
}

/// Periodic Hann window in FIR format, positive on its whole support.
#[allow(dead_code)]
pub fn hann(gl: usize) -> Vec<f64> {
    (0..gl)
        .map(|k| {
            let t = offset(k, gl) + 0.5;
            0.5 + 0.5 * (2.0 * std::f64::consts::PI * t / (gl as f64 + 1.0)).cos()
        })
        .collect()
}

#[allow(dead_code)]
pub fn to_f32(x: &[f64]) -> Vec<f32> {
    x.iter().map(|&v| v as f32).collect()
}
