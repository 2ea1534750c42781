use super::*;

const SCALE: f64 = 0.009_806_65;

/// Drive the pipeline the way the measuring loop does: the first sample
/// lands 1 ms after start, then one every `step_ms`.
fn run_constant(pipeline: &mut MotionPipeline, raw: RawAccel, duration_ms: u32, step_ms: u32) {
    let mut last = 0;
    let mut now = 1;
    while now < duration_ms {
        pipeline.process(raw, now - last, now);
        last = now;
        now += step_ms;
    }
}

#[test]
fn test_device_at_rest_yields_zero_motion() {
    let offsets = CalibrationOffsets::from_raw_means([0.0, 0.0, -1024.0], SCALE).unwrap();
    let mut pipeline = MotionPipeline::new(offsets, PipelineConfig::default());

    run_constant(&mut pipeline, RawAccel::new(0, 0, -1024), 2000, 10);

    assert!(crate::sensor::magnitude(&pipeline.velocity()) < 1e-9);
    let summary = pipeline.finish(2).unwrap();
    assert_eq!(summary.sample_count, 200);
    assert!(summary.mean_accel < 1e-9);
    assert!(summary.mean_velocity < 1e-9);
    // Nothing moved: floor vmax and the degenerate tau sentinel
    assert_eq!(summary.fit.vmax, FitConfig::default().vmax_floor);
    assert_eq!(summary.fit.tau, 0.0);
}

#[test]
fn test_step_acceleration_end_to_end() {
    // 5 s at 100 Hz, ~1 m/s² on x, no gravity, no noise
    let mut pipeline = MotionPipeline::new(CalibrationOffsets::zero(), PipelineConfig::default());

    let raw = RawAccel::new(102, 0, 0);
    let mut last = 0;
    let mut now = 1;
    let mut prev_velocity = 0.0;
    while now < 5000 {
        let outcome = pipeline.process(raw, now - last, now);
        assert!(outcome.velocity_magnitude >= prev_velocity);
        prev_velocity = outcome.velocity_magnitude;
        last = now;
        now += 10;
    }

    let summary = pipeline.finish(5).unwrap();
    assert_eq!(summary.sample_count, 500);
    assert_eq!(summary.buffered_points, 50);

    // The 400 ms gravity tracker absorbs a sustained step, so the motion
    // acceleration decays and the velocity saturates near a0 * tau_filter.
    assert!(summary.mean_accel > 0.07 && summary.mean_accel < 0.095);
    assert!(summary.fit.vmax > 0.39 && summary.fit.vmax < 0.42);
    assert!(
        summary.fit.tau > 0.37 && summary.fit.tau < 0.42,
        "tau was {}",
        summary.fit.tau
    );
    assert!(summary.mean_velocity < summary.fit.vmax);
}

#[test]
fn test_first_buffered_sample_is_first_processed() {
    let mut pipeline = MotionPipeline::new(CalibrationOffsets::zero(), PipelineConfig::default());
    let first = pipeline.process(RawAccel::new(50, 0, 0), 1, 1);
    assert!(first.buffered);
    assert_eq!(first.velocity_magnitude, 0.0);
    assert_eq!(pipeline.buffered()[0].t, 0.001);

    for i in 1..10 {
        assert!(!pipeline.process(RawAccel::new(50, 0, 0), 10, 1 + i * 10).buffered);
    }
    assert!(pipeline.process(RawAccel::new(50, 0, 0), 10, 101).buffered);
}

#[test]
fn test_filter_uses_measured_interval() {
    let mut steady = MotionPipeline::new(CalibrationOffsets::zero(), PipelineConfig::default());
    let mut late = MotionPipeline::new(CalibrationOffsets::zero(), PipelineConfig::default());

    let raw = RawAccel::new(0, 0, 1000);
    steady.process(raw, 10, 10);
    late.process(raw, 30, 30);

    // Longer gap: more of the input is attributed to gravity
    assert!(late.gravity_estimate()[2] > steady.gravity_estimate()[2]);
    let expected = (1.0 - 400.0 / 430.0) * 1000.0 * SCALE;
    assert!((late.gravity_estimate()[2] - expected).abs() < 1e-12);
}

#[test]
fn test_new_pipeline_is_seeded_from_calibration() {
    let offsets = CalibrationOffsets::from_raw_means([10.0, 20.0, -1000.0], SCALE).unwrap();
    let pipeline = MotionPipeline::new(offsets, PipelineConfig::default());

    assert_eq!(pipeline.gravity_estimate(), offsets.gravity);
    assert_eq!(pipeline.velocity(), [0.0; 3]);
    assert_eq!(pipeline.sample_count(), 0);
    assert!(pipeline.buffered().is_empty());
    assert_eq!(pipeline.calibration(), &offsets);
}

#[test]
fn test_finish_without_samples_is_no_samples() {
    let pipeline = MotionPipeline::new(CalibrationOffsets::zero(), PipelineConfig::default());
    assert_eq!(pipeline.finish(5), Err(RunError::NoSamples));
}

#[test]
fn test_custom_decimation() {
    let config = PipelineConfig {
        fit: FitConfig {
            decimation: 4,
            ..FitConfig::default()
        },
        ..PipelineConfig::default()
    };
    let mut pipeline = MotionPipeline::new(CalibrationOffsets::zero(), config);
    run_constant(&mut pipeline, RawAccel::new(10, 0, 0), 101, 10);

    // samples at 1, 11, ..., 91 ms: 10 processed, ceil(10 / 4) kept
    assert_eq!(pipeline.sample_count(), 10);
    assert_eq!(pipeline.buffered().len(), 3);
}
