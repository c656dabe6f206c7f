use gabor_rs::prelude::*;
use gabor_rs::{SUCCESS, status};

#[test]
fn test_config_defaults() {
    let config = GaborConfig::new(4, 16).unwrap();
    assert_eq!(config.phase(), PhaseConvention::FrequencyInvariant);
    assert_eq!(config.flags(), PlanFlags::Estimate);
    assert_eq!(config.frames(64), 16);
    assert_eq!(config.redundancy(), 4.0);
}

#[test]
fn test_config_invalid_hop() {
    let config = GaborConfig::new(0, 16);
    assert!(matches!(config, Err(_)));
    assert_eq!(status(&config), -4);
}

#[test]
fn test_config_invalid_channels() {
    let config = GaborConfig::new(4, 0);
    assert!(matches!(config, Err(GaborError::NotPositiveArgument { name: "M", .. })));
}

#[test]
fn test_undersampled_config_is_accepted_by_filterbank() {
    // M < a is not a frame, but the filterbank transforms are still defined.
    let config = GaborConfig::new(4, 2).unwrap();
    assert!(config.redundancy() < 1.0);

    let window = vec![1.0f64; 4];
    let result = idgt_fb(&vec![Complex::new(1.0, 0.0); 8], &window, 16, 1, &config);
    assert_eq!(status(&result), SUCCESS);
}

#[test]
fn test_plan_accessors_follow_config() {
    let config = GaborConfig::new(3, 12)
        .unwrap()
        .with_phase(PhaseConvention::TimeInvariant)
        .with_flags(PlanFlags::Fastest);
    let window = vec![1.0f32; 9];

    let plan = IdgtFbPlan::<f32, f32>::new(&window, &config).unwrap();
    assert_eq!(plan.hop(), 3);
    assert_eq!(plan.channels(), 12);
    assert_eq!(plan.window_len(), 9);
    assert_eq!(plan.phase(), PhaseConvention::TimeInvariant);

    let plan = DgtFbPlan::<f32, f32>::new(&window, &config).unwrap();
    assert_eq!(plan.hop(), 3);
    assert_eq!(plan.channels(), 12);
    assert_eq!(plan.window_len(), 9);
}

#[test]
fn test_error_messages_carry_values() {
    let err = GaborConfig::new(0, 8).unwrap_err();
    assert_eq!(err.to_string(), "a (passed 0) must be positive");
    assert_eq!(err.code(), -4);

    let err = idgt_fb(&[Complex::new(0.0f64, 0.0); 8], &[1.0f64; 4], 7, 1, &GaborConfig::new(2, 4).unwrap())
        .unwrap_err();
    assert!(matches!(err, GaborError::BadArgument(_)));
    assert!(err.to_string().contains("L (passed 7)"));
}

#[test]
fn test_prelude_window_conversion() {
    let g = [1.0f64, 2.0, 3.0, 4.0, 5.0];
    let long = fir2long(&g, 9).unwrap();
    assert_eq!(long, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 4.0, 5.0]);
    assert_eq!(long2fir(&long, 5).unwrap(), g.to_vec());
}
