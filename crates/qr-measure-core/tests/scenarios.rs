use approx::assert_relative_eq;
use nalgebra::Point2;
use qr_measure_core::{
    apply_observations, calibrate, measure, parse_payload, AffineMap, CalibrationError,
    CalibrationParams, CalibrationState, FrameStatus, MarkerObservation, MarkerPhysicalSize,
    MeasuredBox, Rect, Size,
};

const FIVE_CM: &str = r#"{"width": 5, "height": 5, "units": "cm"}"#;

#[test]
fn five_cm_marker_measures_box() {
    let size = parse_payload(FIVE_CM).expect("payload");
    let cal = calibrate(&Rect::new(0.0, 0.0, 200.0, 200.0), &size).expect("calibration");
    assert_eq!(cal.scale_factor(), 40.0);

    let m = measure(&Rect::new(10.0, 10.0, 400.0, 80.0), &cal).expect("measurement");
    assert_relative_eq!(m.width, 10.0);
    assert_relative_eq!(m.height, 2.0);
    assert_eq!(m.label(), "10.00 cm \n 2.00 cm");
}

#[test]
fn payload_round_trips_exact_values() {
    for (w, h, unit) in [(5.0, 5.0, "cm"), (2.75, 1.125, "in"), (1e-3, 7e4, "mm")] {
        let text = serde_json::json!({ "width": w, "height": h, "units": unit }).to_string();
        let p = parse_payload(&text).expect("payload");
        assert_eq!(p.width, w);
        assert_eq!(p.height, h);
        assert_eq!(p.unit, unit);
    }
}

#[test]
fn payload_without_units_fails() {
    assert!(parse_payload(r#"{"width":3,"height":4}"#).is_err());
}

#[test]
fn calibration_is_deterministic() {
    let size = MarkerPhysicalSize {
        width: 3.3,
        height: 3.3,
        unit: "in".to_string(),
    };
    let marker = Rect::new(12.5, 40.25, 317.7, 311.2);
    let a = calibrate(&marker, &size).expect("calibration");
    let b = calibrate(&marker, &size).expect("calibration");
    assert_eq!(a.scale_factor().to_bits(), b.scale_factor().to_bits());
}

#[test]
fn measuring_the_marker_recovers_its_width() {
    for (px, physical) in [(200.0, 5.0), (317.7, 3.3), (1234.5, 0.7), (3.0, 11.0)] {
        let size = MarkerPhysicalSize {
            width: physical,
            height: physical,
            unit: "cm".to_string(),
        };
        let marker = Rect::new(1.0, 2.0, px, px * 0.9);
        let cal = calibrate(&marker, &size).expect("calibration");
        let m = measure(&marker, &cal).expect("measurement");
        assert_relative_eq!(m.width, physical, max_relative = 1e-12);
    }
}

#[test]
fn zero_width_payload_fails_calibration() {
    let size = MarkerPhysicalSize {
        width: 0.0,
        height: 5.0,
        unit: "cm".to_string(),
    };
    let res = calibrate(&Rect::new(0.0, 0.0, 200.0, 200.0), &size);
    assert!(matches!(res, Err(CalibrationError::Degenerate { .. })));
}

#[test]
fn invalid_rects_never_reach_arithmetic() {
    let size = parse_payload(FIVE_CM).expect("payload");
    let cal = CalibrationState::default();
    for bad in [
        Rect::new(0.0, 0.0, -5.0, 10.0),
        Rect::new(f64::NAN, 0.0, 10.0, 10.0),
    ] {
        assert!(matches!(
            calibrate(&bad, &size),
            Err(CalibrationError::InvalidRect(_))
        ));
        assert!(matches!(
            measure(&bad, &cal),
            Err(CalibrationError::InvalidRect(_))
        ));
    }
}

#[test]
fn last_marker_in_frame_wins() {
    let a = MarkerObservation {
        rect: Rect::new(0.0, 0.0, 200.0, 200.0),
        payload: Some(FIVE_CM.to_string()),
    };
    let b = MarkerObservation {
        rect: Rect::new(300.0, 50.0, 150.0, 150.0),
        payload: Some(r#"{"width": 2, "height": 2, "units": "in"}"#.to_string()),
    };
    let identity = AffineMap::identity();
    let params = CalibrationParams::default();

    let out = apply_observations(
        CalibrationState::default(),
        &[a, b.clone()],
        &identity,
        &params,
    );
    assert_eq!(out.status, FrameStatus::Calibrated);
    assert_eq!(out.applied_count(), 2);

    let b_only = calibrate(
        &b.rect,
        &parse_payload(b.payload.as_deref().expect("payload")).expect("payload"),
    )
    .expect("calibration");
    assert_eq!(out.state, b_only);
}

#[test]
fn phone_display_box_measures_through_aspect_fit() {
    // 3024x4032 photo shown aspect-fit in a 390x600 view.
    let image = Size::new(3024.0, 4032.0);
    let display = Size::new(390.0, 600.0);
    let to_image = AffineMap::display_to_image(image, display).expect("usable sizes");
    let to_display = AffineMap::aspect_fit(image, display).expect("usable sizes");

    // Marker detected at 400 px wide in the photo, reported in display space.
    let marker_image = Rect::new(1000.0, 1500.0, 400.0, 400.0);
    let obs = MarkerObservation {
        rect: to_display.map_rect(&marker_image),
        payload: Some(FIVE_CM.to_string()),
    };
    let out = apply_observations(
        CalibrationState::default(),
        &[obs],
        &to_image,
        &CalibrationParams::default(),
    );
    assert_relative_eq!(out.state.scale_factor(), 80.0, max_relative = 1e-9);

    // A new box is 100x100 display units, i.e. 100 / (390/3024) image pixels.
    let mut b = MeasuredBox::default_in(display);
    let m = b.relabel(&out.state, &to_image).expect("valid box");
    let expected = 100.0 * 3024.0 / 390.0 / 80.0;
    assert_relative_eq!(m.width, expected, max_relative = 1e-9);
    assert_relative_eq!(m.height, expected, max_relative = 1e-9);

    // Dragging the bottom-right corner right by 39 display units adds 3.78 cm.
    let mut drag = b.begin_drag(Point2::new(240.0, 340.0));
    drag.update(&mut b, Point2::new(279.0, 340.0));
    let m = b.relabel(&out.state, &to_image).expect("valid box");
    assert_relative_eq!(m.width, expected + 3.78, max_relative = 1e-9);
    assert_eq!(b.label.as_deref(), Some("13.47 cm \n 9.69 cm"));
}
