use engine_frame_stats::aggregator::SessionSummary;
use engine_frame_stats::output::{
    read_batch_summary, write_batch_summary, write_summary_index, BatchSummary, SessionLog,
};
use engine_frame_stats::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_session_log_round_trip_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/run.json.log.txt");

    let mut log = SessionLog::new();
    log.log("execute");
    log.log("samples 0");
    log.error("run.json: UnexpectedException: boom");
    log.write(&path).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "execute\nsamples 0\nrun.json: UnexpectedException: boom"
    );
}

#[test]
fn test_index_reflects_progress() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("info.txt");
    let mut done: Vec<String> = Vec::new();

    for name in ["a.json", "b.json", "c.cpuprofile"] {
        done.push(name.to_string());
        write_summary_index(&done, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), done.join("\n"));
    }
}

#[test]
fn test_batch_summary_keeps_undefined_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");

    let sessions = vec![SessionSummary {
        file_name: "empty.cpuprofile".to_string(),
        duration_seconds: 0.0,
        engine_seconds: 0.0,
        engine_call_count: 0,
        engine_ratio: None,
    }];
    write_batch_summary(&BatchSummary::new(vec!["caps".to_string()], sessions), &path).unwrap();

    let loaded = read_batch_summary(&path).unwrap();
    assert_eq!(loaded.version, SCHEMA_VERSION);
    assert_eq!(loaded.input_dirs, vec!["caps"]);
    assert_eq!(loaded.sessions[0].engine_ratio, None);
}

#[test]
fn test_config_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "quantiles = [0.5, 0.99]\n\n[trim]\nstart_cut_us = 1000000\nend_cut_us = 2000000\n\n[markers]\nengine = \"mainLoop\""
    )
    .unwrap();

    let config = AnalysisConfig::load(file.path()).unwrap();
    assert_eq!(config.quantiles, vec![0.5, 0.99]);
    assert_eq!(config.trim.minimum_duration(), 3_000_000);
    assert_eq!(config.markers.engine, "mainLoop");
    assert_eq!(config.markers.harness, AnalysisConfig::default().markers.harness);
}
