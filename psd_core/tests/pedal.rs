use psd_core::pedal::{PedalPhase, PedalPressDetector};
use rstest::rstest;

fn feed(d: &mut PedalPressDetector, samples: &[f64]) -> Vec<bool> {
    samples.iter().map(|g| d.update(*g)).collect()
}

#[rstest]
fn double_press_reports_once() {
    let mut d = PedalPressDetector::new();
    let out = feed(&mut d, &[0.5, 0.5, 0.5, 0.0, 0.5, 0.0, 0.0]);
    assert_eq!(out, vec![false, false, false, false, false, true, false]);
    assert_eq!(d.phase(), PedalPhase::Idle);
}

#[rstest]
fn brief_first_press_does_not_arm() {
    let mut d = PedalPressDetector::new();
    feed(&mut d, &[0.5, 0.5, 0.0]);
    assert_eq!(d.phase(), PedalPhase::Idle);
}

#[rstest]
#[case::armed_waits_too_long(&[0.5, 0.5, 0.5, 0.0], PedalPhase::Armed, 0.0)]
#[case::second_press_held_too_long(&[0.5, 0.5, 0.5, 0.0, 0.5], PedalPhase::Pressed, 0.5)]
fn phases_time_out(#[case] prefix: &[f64], #[case] phase: PedalPhase, #[case] hold: f64) {
    let mut d = PedalPressDetector::new();
    feed(&mut d, prefix);
    assert_eq!(d.phase(), phase);
    let ticks = PedalPressDetector::TIMEOUT_TICKS as usize;
    let out = feed(&mut d, &vec![hold; ticks - 1]);
    assert!(out.iter().all(|f| !f));
    assert_eq!(d.phase(), phase);
    assert!(!d.update(hold));
    assert_eq!(d.phase(), PedalPhase::Idle);
}

#[rstest]
fn partial_pedal_counts_as_neither_press_nor_release() {
    let mut d = PedalPressDetector::new();
    // 0.05 is above the release threshold but below the press threshold
    feed(&mut d, &[0.5, 0.5, 0.5, 0.05, 0.05]);
    assert_eq!(d.phase(), PedalPhase::Idle);
    feed(&mut d, &[0.0]);
    assert_eq!(d.phase(), PedalPhase::Armed);
}
