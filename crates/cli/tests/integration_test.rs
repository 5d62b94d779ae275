use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn put_overlay(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_put-overlay"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run put-overlay")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_chains(path: &Path) {
    fs::write(
        path,
        "date,id,underlying,right,strike,expiry,underlying_price\n\
         2024-01-19,SPY240315P80,SPY,put,80,2024-03-15,100\n\
         2024-01-19,SPY240315P85,SPY,put,85,2024-03-15,100\n\
         2024-01-19,SPY240315P90,SPY,put,90,2024-03-15,100\n\
         2024-01-19,SPY240315C85,SPY,call,85,2024-03-15,100\n",
    )
    .unwrap();
}

#[test]
fn show_config_prints_defaults_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("Config.toml");

    let output = put_overlay(&["show-config", "--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["strategy"]["equity"], "SPY");
    assert_eq!(json["strategy"]["OOM"], "0.1");
    assert_eq!(json["strategy"]["roll_week"], 3);
}

#[test]
fn show_config_applies_profile_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("Config.toml");
    fs::write(&config, "[strategy]\nequity = \"QQQ\"\n").unwrap();
    fs::write(dir.path().join("Config.wide.toml"), "[strategy]\nOOM = \"0.2\"\n").unwrap();

    let output = put_overlay(&[
        "show-config",
        "--config",
        config.to_str().unwrap(),
        "--profile",
        "wide",
    ]);
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["strategy"]["equity"], "QQQ");
    assert_eq!(json["strategy"]["OOM"], "0.2");
}

#[test]
fn select_picks_highest_qualifying_strike() {
    let dir = tempfile::tempdir().unwrap();
    let chains = dir.path().join("chains.csv");
    let config = dir.path().join("Config.toml");
    write_chains(&chains);

    let output = put_overlay(&[
        "select",
        "--chains",
        chains.to_str().unwrap(),
        "--date",
        "2024-01-19",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("Qualifying puts (2)"), "{text}");
    assert!(text.contains("Selected: SPY 85P 2024-03-15"), "{text}");
}

#[test]
fn select_rejects_out_of_range_param() {
    let dir = tempfile::tempdir().unwrap();
    let chains = dir.path().join("chains.csv");
    let config = dir.path().join("Config.toml");
    write_chains(&chains);

    let output = put_overlay(&[
        "select",
        "--chains",
        chains.to_str().unwrap(),
        "--date",
        "2024-01-19",
        "--config",
        config.to_str().unwrap(),
        "--param",
        "OOM=1.5",
    ]);
    assert!(!output.status.success());
}

/// SPY at 100 on every weekday of January and February 2024.
fn write_closes(path: &Path) {
    let mut csv = String::from("date,symbol,close\n");
    let mut d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let last = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    while d <= last {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            csv.push_str(&format!("{d},SPY,100\n"));
        }
        d += Duration::days(1);
    }
    fs::write(path, csv).unwrap();
}

#[test]
fn replay_writes_json_report_with_param_override() {
    let dir = tempfile::tempdir().unwrap();
    let closes = dir.path().join("closes.csv");
    let chains = dir.path().join("chains.csv");
    let config = dir.path().join("Config.toml");
    let out = dir.path().join("report.json");
    write_closes(&closes);
    write_chains(&chains);
    fs::write(
        &config,
        "[backtest]\nstart = \"2024-01-01\"\nend = \"2024-03-01\"\n",
    )
    .unwrap();

    let output = put_overlay(&[
        "replay",
        "--config",
        config.to_str().unwrap(),
        "--closes",
        closes.to_str().unwrap(),
        "--chains",
        chains.to_str().unwrap(),
        "--param",
        "option_weight=0.1",
        "--json",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("REPLAY RESULTS"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let report = &json["report"];

    // Chains were only observed in January, so February falls back to the equity
    let rolls: Vec<&serde_json::Value> = report["week_ends"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry[1].get("Rolled"))
        .collect();
    assert_eq!(rolls.len(), 2);
    assert_eq!(rolls[0]["date"], "2024-01-19");
    assert_eq!(rolls[1]["date"], "2024-02-16");

    let targets: Vec<&serde_json::Value> = report["journal"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["kind"] == "set_holdings")
        .map(|entry| &entry["targets"])
        .collect();
    assert_eq!(
        targets[0],
        &serde_json::json!([
            { "instrument": "SPY", "weight": "0.9" },
            { "instrument": "SPY240315P85", "weight": "0.1" },
        ])
    );
    assert_eq!(
        targets[1],
        &serde_json::json!([{ "instrument": "SPY", "weight": "1" }])
    );

    assert_eq!(json["benchmark"].as_array().unwrap().len(), 3);
}
