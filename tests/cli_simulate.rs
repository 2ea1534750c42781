use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_motion_cli"))
}

#[test]
fn simulate_prints_summary_and_payload() {
    let output = cli()
        .args(["simulate", "--duration", "5", "--motion", "step"])
        .output()
        .expect("simulate command");

    assert!(
        output.status.success(),
        "simulate exited with {:?}",
        output.status.code()
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    let json: Value = serde_json::from_str(&stdout).expect("valid JSON report");

    assert_eq!(json["summary"]["duration_secs"], 5);
    assert!(json["summary"]["sample_count"].as_u64().unwrap_or_default() > 400);
    let telemetry = json["telemetry"].as_str().expect("telemetry string");
    assert!(telemetry.starts_with("a:"), "unexpected payload {telemetry}");
    assert!(telemetry.contains(",vm:"));
}

#[test]
fn simulate_rest_reports_degenerate_fit() {
    let output = cli()
        .args(["simulate", "--duration", "5", "--motion", "rest"])
        .output()
        .expect("simulate command");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON report");
    assert_eq!(json["summary"]["fit"]["tau"], 0.0);
}

#[test]
fn fit_reads_csv_trace() {
    let path = std::env::temp_dir().join(format!("motion-cli-fit-{}.csv", std::process::id()));
    let mut csv = String::from("t,v\n");
    for i in 0..=100 {
        let t = i as f64 * 0.1;
        let v = 3.0 * (1.0 - (-t / 0.25_f64).exp());
        csv.push_str(&format!("{t},{v}\n"));
    }
    std::fs::write(&path, csv).expect("write trace");

    let output = cli()
        .args(["fit", "--input", path.to_str().unwrap()])
        .output()
        .expect("fit command");
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON fit");
    let tau = json["tau"].as_f64().expect("tau");
    assert!((tau - 0.25).abs() < 0.0025, "tau was {tau}");
}

#[test]
fn decode_round_trips_payload() {
    let output = cli()
        .args(["decode", "a:0.082,v:0.371,vm:0.404,t:0.396"])
        .output()
        .expect("decode command");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON message");
    assert_eq!(json["vmax"], 0.404);
    assert_eq!(json["tau"], 0.396);
}

#[test]
fn decode_rejects_garbage() {
    let output = cli()
        .args(["decode", "a:1,v:2"])
        .output()
        .expect("decode command");
    assert!(!output.status.success());
}
