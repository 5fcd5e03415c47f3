use assert_cmd::Command;
use predicates::prelude::*;

const FIVE_CM: &str = r#"{"width":5,"height":5,"units":"cm"}"#;

fn qr_measure() -> Command {
    Command::cargo_bin("qr-measure").expect("binary built")
}

#[test]
fn measure_prints_labels() {
    qr_measure()
        .args([
            "measure",
            "--payload",
            FIVE_CM,
            "--marker",
            "0,0,200,200",
            "--box",
            "10,10,400,80",
            "--box",
            "0,0,20,60",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.00 cm \n 2.00 cm"))
        .stdout(predicate::str::contains("0.50 cm \n 1.50 cm"));
}

#[test]
fn measure_json_output() {
    let out = qr_measure()
        .args([
            "measure",
            "--payload",
            FIVE_CM,
            "--marker",
            "0,0,200,200",
            "--box",
            "10,10,400,80",
            "--json",
        ])
        .output()
        .expect("run");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(v["scale_factor"], 40.0);
    assert_eq!(v["unit"], "cm");
    assert_eq!(v["boxes"][0]["measurement"]["width"], 10.0);
    assert_eq!(v["boxes"][0]["label"], "10.00 cm \n 2.00 cm");
}

#[test]
fn measure_mean_of_axes_model() {
    qr_measure()
        .args([
            "measure",
            "--payload",
            r#"{"width":4,"height":2,"units":"in"}"#,
            "--marker",
            "0,0,200,100",
            "--model",
            "mean-of-axes",
            "--box",
            "0,0,100,50",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.00 in \n 1.00 in"));
}

#[test]
fn payload_without_units_fails() {
    qr_measure()
        .args([
            "measure",
            "--payload",
            r#"{"width":3,"height":4}"#,
            "--marker",
            "0,0,200,200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("units"));
}

#[test]
fn zero_width_payload_fails() {
    qr_measure()
        .args([
            "measure",
            "--payload",
            r#"{"width":0,"height":4,"units":"cm"}"#,
            "--marker",
            "0,0,200,200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate calibration"));
}

#[test]
fn malformed_rect_is_rejected_by_parser() {
    qr_measure()
        .args(["measure", "--payload", FIVE_CM, "--marker", "0,0,200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected x,y,w,h"));
}

#[test]
fn log_level_flag_enables_info_records() {
    qr_measure()
        .args([
            "--log-level",
            "info",
            "measure",
            "--payload",
            FIVE_CM,
            "--marker",
            "0,0,200,200",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("scale: 40.0000 px per cm"));
}

#[test]
fn unknown_log_level_is_rejected() {
    qr_measure()
        .args([
            "--log-level",
            "loud",
            "measure",
            "--payload",
            FIVE_CM,
            "--marker",
            "0,0,200,200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-level"));
}

#[cfg(feature = "image")]
#[test]
fn scan_with_missing_image_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = dir.path().join("measure.json");
    std::fs::write(
        &cfg,
        r#"{"image_path": "/nonexistent/qr-measure/photo.png", "boxes": []}"#,
    )
    .expect("write config");
    qr_measure()
        .arg("scan")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load image"));
}
