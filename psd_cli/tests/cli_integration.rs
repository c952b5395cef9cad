use assert_cmd::prelude::*;
use predicates::prelude::*;
use psd_core::decoder::sig;
use psd_core::mocks::baseline_signals;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[steering]
max_torque = 255

[cruise]
min_kph = 30.0
max_kph = 125.0
engage = "buttons"

[schedule]
control_hz = 100
steer_divisor = 2
long_divisor = 5
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Parked-car trace of `ticks` rows, optionally leaving one signal out.
fn write_trace(dir: &tempfile::TempDir, ticks: usize, drop: Option<&str>) -> PathBuf {
    let mut names: Vec<String> = baseline_signals()
        .into_keys()
        .filter(|k| Some(k.as_str()) != drop)
        .collect();
    names.sort();
    let base = baseline_signals();

    let path = dir.path().join("trace.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "{}", names.join(",")).unwrap();
    for _ in 0..ticks {
        let row: Vec<String> = names.iter().map(|n| base[n].to_string()).collect();
        writeln!(f, "{}", row.join(",")).unwrap();
    }
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["check-config"], 0, "Config OK", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["simulate", "--seconds", "1"], 0, "ACC_BRAKE", "stdout")]
#[case(&["simulate", "--seconds", "0"], 1, "positive", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("psd_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("error");
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
#[case::zero_rate("[schedule]\ncontrol_hz = 0\n", "schedule.control_hz")]
#[case::bad_rotation("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
#[case::bad_syntax("[cruise\nmin_kph = 30\n", "parse")]
#[case::unknown_engage("[cruise]\nengage = \"voice\"\n", "parse")]
fn invalid_config_exits_with_code_two(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    Command::cargo_bin("psd_cli")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("psd_cli")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("check-config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("could not be loaded"));
}

#[rstest]
fn replay_reports_missing_signal_with_code_three() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_trace(&dir, 5, Some(sig::BRAKE_ENGAGED));

    Command::cargo_bin("psd_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(3)
        .stderr(predicate::str::contains(sig::BRAKE_ENGAGED));
}

#[rstest]
fn replay_reports_bad_trace_cell() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    fs::write(&path, "WHEEL_SPEED.WHEELSPEED_F\nfast\n").unwrap();

    Command::cargo_bin("psd_cli")
        .unwrap()
        .arg("replay")
        .arg("--trace")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("signal trace could not be read"));
}

#[rstest]
fn replay_writes_to_out_file_and_prints_stats() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_trace(&dir, 10, None);
    let out = dir.path().join("commands.jsonl");

    Command::cargo_bin("psd_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .arg("--out")
        .arg(&out)
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("10 ticks"));

    let written = fs::read_to_string(&out).unwrap();
    // 10 diagnostic + 5 steering + 2 x (ACC_CMD_HUD, ACC_BRAKE, LKAS_HUD)
    assert_eq!(written.lines().count(), 21);
}
