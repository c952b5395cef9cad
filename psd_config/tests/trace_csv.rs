use std::fs::File;
use std::io::Write;

use psd_config::load_trace_csv;
use rstest::rstest;
use tempfile::tempdir;

fn write_trace(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn loads_rows_in_order() {
    let (_dir, path) = write_trace(
        "WHEEL_SPEED.WHEELSPEED_F,BRAKE.BRAKE_ENGAGED,plan.accel\n\
         10.0,false,-0.5\n\
         12.5,true,0\n",
    );
    let frames = load_trace_csv(&path).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["WHEEL_SPEED.WHEELSPEED_F"], 10.0);
    assert_eq!(frames[0]["BRAKE.BRAKE_ENGAGED"], 0.0);
    assert_eq!(frames[0]["plan.accel"], -0.5);
    assert_eq!(frames[1]["BRAKE.BRAKE_ENGAGED"], 1.0);
}

#[rstest]
fn blank_cells_are_absent() {
    let (_dir, path) = write_trace("A.X, B.Y\n1, \n,2\n");
    let frames = load_trace_csv(&path).unwrap();
    assert_eq!(frames[0].get("A.X"), Some(&1.0));
    assert!(!frames[0].contains_key("B.Y"));
    assert!(!frames[1].contains_key("A.X"));
    assert_eq!(frames[1].get("B.Y"), Some(&2.0));
}

#[rstest]
#[case("A.X\nabc\n", "invalid value 'abc' for 'A.X' in CSV row 2")]
#[case("A.X,A.X\n1,2\n", "duplicate column 'A.X'")]
#[case("A.X\n", "has no rows")]
fn rejects_malformed_traces(#[case] contents: &str, #[case] expected: &str) {
    let (_dir, path) = write_trace(contents);
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains(expected), "unexpected error: {err}");
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("nope.csv"));
}
