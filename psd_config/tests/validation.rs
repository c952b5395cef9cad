use psd_config::{EngageMode, load_toml};
use rstest::rstest;

#[test]
fn empty_document_yields_valid_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.steering.max_torque, 255);
    assert_eq!(cfg.schedule.control_hz, 100);
    assert_eq!(cfg.cruise.engage, EngageMode::Buttons);
    assert!(cfg.schedule.openpilot_longitudinal);
}

#[test]
fn accepts_full_document() {
    let toml = r#"
[steering]
max_torque = 255
delta_up = 10
delta_down = 30
torque_bp = [0.0, 20.0]
torque_v = [255.0, 200.0]

[brake]
scale = 1.4
max_magnitude = 1.25
stock_blend = 0.6

[cruise]
min_kph = 30.0
max_kph = 125.0
engage = "pedal"

[decoder]
enable_bsm = false

[schedule]
control_hz = 100
dtc_clear_frames = 0

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.cruise.engage, EngageMode::Pedal);
    assert_eq!(cfg.steering.torque_v, vec![255.0, 200.0]);
    assert!(!cfg.decoder.enable_bsm);
}

#[rstest]
#[case("[steering]\nmax_torque = 0", "steering.max_torque must be > 0")]
#[case("[steering]\ndelta_up = 0", "steering.delta_up and steering.delta_down must be > 0")]
#[case(
    "[steering]\ntorque_bp = [0.0, 10.0]\ntorque_v = [255.0]",
    "steering.torque_bp and steering.torque_v must be non-empty and equal length"
)]
#[case(
    "[steering]\ntorque_bp = [10.0, 0.0]\ntorque_v = [255.0, 255.0]",
    "steering.torque_bp must be strictly increasing"
)]
#[case("[steering]\ntorque_v = [300.0]", "steering.torque_v entries must be in")]
#[case("[brake]\nscale = 0.0", "brake.scale must be > 0")]
#[case("[brake]\nstock_blend = 1.5", "brake.stock_blend must be in [0.0, 1.0]")]
#[case("[brake]\nlow_speed_max = 2.0", "brake.low_speed_max must be in")]
#[case("[brake]\nreset_duration_ms = 0", "brake.reset_interval_ms and brake.reset_duration_ms must be >= 1")]
#[case("[cruise]\nmin_kph = 130.0", "cruise.min_kph must be > 0 and below cruise.max_kph")]
#[case("[cruise]\nhold_step_ms = 0", "cruise.hold_step_ms must be >= 1")]
#[case("[decoder]\nhud_multiplier = 0.0", "decoder.hud_multiplier must be > 0")]
#[case("[schedule]\ncontrol_hz = 0", "schedule.control_hz must be 100")]
#[case("[schedule]\ncontrol_hz = 50", "schedule.control_hz must be 100")]
#[case("[schedule]\nlong_divisor = 0", "schedule divisors must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of never|daily|hourly")]
fn rejects_invalid_fields(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(expected),
        "unexpected error: {err}"
    );
}

#[test]
fn unknown_engage_mode_fails_to_parse() {
    let err = load_toml("[cruise]\nengage = \"stalk\"").expect_err("should not parse");
    assert!(format!("{err}").contains("engage"));
}
