//! CLI behavior: argument surface, exit codes, artifact output.

mod common;

use assert_cmd::Command;
use common::{write_episodes_parquet, write_events_csv, EventRow};
use predicates::prelude::*;
use vx_store::{read_manifest, read_table};

fn fixtures(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let episodes = dir.join("vent_episodes.parquet");
    write_episodes_parquet(&episodes, &[(200001, 1, "2165-04-24 12:00:00")]);

    let events = dir.join("chartevents.csv");
    write_events_csv(
        &events,
        &[
            EventRow::new(10006, Some(200001), 220045, "2165-04-24 11:00:00"),
            EventRow::new(10006, Some(200001), 220045, "2165-04-24 05:00:00"),
        ],
    );
    (events, episodes)
}

#[test]
fn test_help_describes_the_run() {
    Command::cargo_bin("vx-core")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("look-back windows"))
        .stdout(predicate::str::contains("--episodes"))
        .stdout(predicate::str::contains("--max-chunks"));
}

#[test]
fn test_full_run_writes_the_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let (events, episodes) = fixtures(tmp.path());
    let out = tmp.path().join("chart_events");

    Command::cargo_bin("vx-core")
        .unwrap()
        .arg(&events)
        .arg("--episodes")
        .arg(&episodes)
        .arg("--out")
        .arg(&out)
        .arg("--chunk-size")
        .arg("1")
        .arg("--quiet")
        .assert()
        .success();

    let manifest = read_manifest(&out).unwrap();
    assert_eq!(manifest.tables.len(), 2);
    assert_eq!(read_table(&out, "short").unwrap().num_rows(), 1);
    assert_eq!(read_table(&out, "long").unwrap().num_rows(), 1);
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let tmp = tempfile::tempdir().unwrap();
    let (events, episodes) = fixtures(tmp.path());

    Command::cargo_bin("vx-core")
        .unwrap()
        .arg(&events)
        .arg("--episodes")
        .arg(&episodes)
        .arg("--out")
        .arg(tmp.path().join("chart_events"))
        .arg("--chunk-size")
        .arg("0")
        .assert()
        .failure()
        .code(10);
}

#[test]
fn test_missing_events_file_fails_without_output() {
    let tmp = tempfile::tempdir().unwrap();
    let (_, episodes) = fixtures(tmp.path());
    let out = tmp.path().join("chart_events");

    Command::cargo_bin("vx-core")
        .unwrap()
        .arg(tmp.path().join("does_not_exist.csv"))
        .arg("--episodes")
        .arg(&episodes)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .code(12);

    assert!(!out.exists(), "failed run must not leave an artifact behind");
}

#[test]
fn test_conflicting_episode_end_times_abort() {
    let tmp = tempfile::tempdir().unwrap();
    let (events, _) = fixtures(tmp.path());

    let episodes = tmp.path().join("bad_episodes.parquet");
    write_episodes_parquet(
        &episodes,
        &[
            (200001, 1, "2165-04-24 12:00:00"),
            (200001, 1, "2165-04-24 13:00:00"),
        ],
    );

    Command::cargo_bin("vx-core")
        .unwrap()
        .arg(&events)
        .arg("--episodes")
        .arg(&episodes)
        .arg("--out")
        .arg(tmp.path().join("chart_events"))
        .assert()
        .failure()
        .code(11);
}
