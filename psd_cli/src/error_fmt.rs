//! Human-readable error descriptions and structured JSON error formatting.

use psd_core::error::{BuildError, PsdError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then run `psd check-config` before driving."
        );
    }

    if let Some(pe) = err.downcast_ref::<PsdError>() {
        return match pe {
            PsdError::Config(msg) => format!(
                "What happened: The config could not be loaded ({msg}).\nLikely causes: Wrong --config path, a TOML syntax error, or an out-of-range value.\nHow to fix: Fix the file named above and rerun `psd check-config`."
            ),
            PsdError::MissingSignal(name) => format!(
                "What happened: Required signal '{name}' was absent from a tick.\nLikely causes: The trace or bus decoder does not carry this signal, or its column is blank.\nHow to fix: Add the '{name}' column to the trace, or fix the upstream DBC decoding."
            ),
            PsdError::Source(msg) => format!(
                "What happened: The signal source failed ({msg}).\nLikely causes: Bus link down or a truncated trace.\nHow to fix: Check the bus connection or trace file and rerun."
            ),
            PsdError::Sink(msg) => format!(
                "What happened: Command output failed ({msg}).\nLikely causes: Output file not writable or the reading end of the pipe closed.\nHow to fix: Check --out and disk space, then rerun."
            ),
        };
    }

    // String-based heuristics for errors coming from trace loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv") || lower.contains("csv row") {
        return format!(
            "What happened: The signal trace could not be read ({msg}).\nLikely causes: Wrong path, duplicate or empty header cells, or a non-numeric value.\nHow to fix: Use one header per signal name and numbers or true/false in every cell."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: config errors 2, missing signal 3, everything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<PsdError>() {
        Some(PsdError::Config(_)) => 2,
        Some(PsdError::MissingSignal(_)) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<PsdError>() {
        Some(PsdError::Config(_)) => "Config",
        Some(PsdError::MissingSignal(_)) => "MissingSignal",
        Some(PsdError::Source(_)) => "Source",
        Some(PsdError::Sink(_)) => "Sink",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<PsdError>() {
        Some(PsdError::MissingSignal(name)) => json!({
            "reason": reason_name(err),
            "details": { "signal": name },
            "message": msg,
        }),
        _ => json!({ "reason": reason_name(err), "message": msg }),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_signal_maps_to_code_three_and_names_the_signal() {
        let err = eyre::Report::new(PsdError::MissingSignal("BRAKE.BRAKE_ENGAGED".into()))
            .wrap_err("decode failed at tick 4");
        assert_eq!(exit_code_for_error(&err), 3);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "MissingSignal");
        assert_eq!(v["details"]["signal"], "BRAKE.BRAKE_ENGAGED");
    }

    #[test]
    fn config_errors_map_to_code_two() {
        let err = eyre::Report::new(BuildError::InvalidConfig("control_hz must be 100"));
        assert_eq!(exit_code_for_error(&err), 2);
        assert!(humanize(&err).contains("control_hz"));
        let err = eyre::Report::new(PsdError::Config("parse cfg.toml".into()));
        assert_eq!(exit_code_for_error(&err), 2);
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }
}
