mod common;

use gabor_rs::prelude::*;
use gabor_rs::status;

fn impulse(len: usize, index: usize) -> Vec<Complex<f64>> {
    let mut c = vec![Complex::new(0.0, 0.0); len];
    c[index] = Complex::new(1.0, 0.0);
    c
}

#[test]
fn test_rectangular_window_impulse() {
    let config = GaborConfig::new(2, 4).unwrap();
    let window = vec![1.0f64; 4];

    let f = idgt_fb(&impulse(16, 0), &window, 8, 1, &config).unwrap();

    let expected = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
    for (x, e) in f.iter().zip(expected) {
        assert!((x.re - e).abs() < 1e-12, "got {:?}", f);
        assert!(x.im.abs() < 1e-12);
    }
}

#[test]
fn test_impulse_in_later_frame_is_modulated() {
    // Channel 1 of frame 1 (hop 2): exp(2πi l / 4) on samples 0..=3.
    let config = GaborConfig::new(2, 4).unwrap();
    let window = vec![1.0f64; 4];

    let f = idgt_fb(&impulse(16, 4 + 1), &window, 8, 1, &config).unwrap();

    let expected = [
        Complex::new(1.0, 0.0),
        Complex::new(0.0, 1.0),
        Complex::new(-1.0, 0.0),
        Complex::new(0.0, -1.0),
    ];
    for (x, e) in f[..4].iter().zip(expected) {
        assert!((x - e).norm() < 1e-12, "got {:?}", f);
    }
    assert!(f[4..].iter().all(|x| x.norm() < 1e-12));

    // Time-invariant phase starts the modulation at the frame centre.
    let config = config.with_phase(PhaseConvention::TimeInvariant);
    let f = idgt_fb(&impulse(16, 4 + 1), &window, 8, 1, &config).unwrap();
    let expected = [
        Complex::new(-1.0, 0.0),
        Complex::new(0.0, -1.0),
        Complex::new(1.0, 0.0),
        Complex::new(0.0, 1.0),
    ];
    for (x, e) in f[..4].iter().zip(expected) {
        assert!((x - e).norm() < 1e-12, "got {:?}", f);
    }
}

#[test]
fn test_plan_reuse_across_lengths() {
    let config = GaborConfig::new(3, 6).unwrap();
    let window = common::hann(9);
    let mut plan = IdgtFbPlan::new(&window, &config).unwrap();

    for len in [9, 18, 48] {
        let n = len / 3;
        let coefficients: Vec<Complex<f64>> = (0..6 * n)
            .map(|i| Complex::new((i as f64).sin(), 0.0))
            .collect();
        let reused = plan.process(&coefficients, len, 1).unwrap();
        let fresh = idgt_fb(&coefficients, &window, len, 1, &config).unwrap();
        assert_eq!(reused, fresh);
    }
}

#[test]
fn test_single_precision_flavours() {
    let config = GaborConfig::new(2, 4).unwrap();
    let coefficients: Vec<Complex<f32>> = (0..32)
        .map(|i| Complex::new(i as f32 * 0.1, -(i as f32) * 0.05))
        .collect();

    let real_window = common::to_f32(&common::hann(6));
    let complex_window: Vec<Complex<f32>> = real_window.iter().map(|&g| Complex::new(g, 0.0)).collect();

    let from_real = idgt_fb(&coefficients, &real_window, 16, 1, &config).unwrap();
    let from_complex = idgt_fb(&coefficients, &complex_window, 16, 1, &config).unwrap();

    let error = common::max_abs_error(&from_real, &from_complex);
    assert!(error < 1e-6, "real and complex windows disagree by {}", error);
}

#[test]
fn test_done_lifecycle() {
    let config = GaborConfig::new(2, 4).unwrap();
    let mut slot = Some(IdgtFbPlan::<f64, f64>::new(&[1.0; 4], &config).unwrap());

    let f = slot.as_mut().unwrap().process(&impulse(16, 0), 8, 1).unwrap();
    assert_eq!(f.len(), 8);

    assert!(done(&mut slot).is_ok());
    assert!(slot.is_none());

    let result = done(&mut slot);
    assert_eq!(status(&result), -1);
}

#[test]
fn test_execute_status_codes() {
    let config = GaborConfig::new(2, 4).unwrap();
    let mut plan = IdgtFbPlan::<f64, f64>::new(&[1.0; 4], &config).unwrap();
    let coefficients = impulse(16, 0);
    let mut output = vec![Complex::new(0.0, 0.0); 8];

    assert_eq!(status(&plan.execute(&coefficients, 8, 1, &mut output)), 0);
    assert_eq!(status(&plan.execute(&coefficients, 7, 1, &mut output)), -9);
    assert_eq!(status(&plan.execute(&coefficients, 2, 1, &mut output)), -9);
    assert_eq!(status(&plan.execute(&coefficients, 8, 0, &mut output)), -4);
    assert_eq!(status(&plan.execute(&coefficients, 8, 2, &mut output)), -2);

    let empty: [f64; 0] = [];
    assert_eq!(status(&IdgtFbPlan::<f64, f64>::new(&empty, &config)), -4);
}
