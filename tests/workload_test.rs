/*!
 * Workload Loading Tests
 * JSON workload files and environment configuration
 */

use pretty_assertions::assert_eq;
use sched_sim::{
    ProcessSpec, RunOutcome, SchedulerConfig, SchedulerError, SchedulingPolicy, Simulator,
    Workload,
};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

const INVERSION: &str = r#"{
    "processes": [
        {"name": "L", "lifespan": 6, "priority": 1,
         "requests": [{"resource": 0, "at": 0, "duration": 4}]},
        {"name": "H", "arrival": 1, "lifespan": 3, "priority": 5,
         "requests": [{"resource": 0, "at": 0, "duration": 2}]}
    ]
}"#;

fn write_workload(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_run_workload_file() {
    let file = write_workload(INVERSION);
    let workload = Workload::load(file.path()).unwrap();

    assert_eq!(workload.len(), 2);
    assert_eq!(workload.processes[1].name.as_deref(), Some("H"));

    let config = SchedulerConfig::with_policy(SchedulingPolicy::PriorityInheritance);
    let report = Simulator::new(config, workload).unwrap().run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.ticks, 9);
}

#[test]
fn test_workload_file_round_trips() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(4).named("A").request(2, 1, 2))
        .with_process(ProcessSpec::new(2).arriving(3).priority(7));

    let file = write_workload(&workload.to_json().unwrap());
    assert_eq!(Workload::load(file.path()).unwrap(), workload);
}

#[test]
fn test_missing_file_is_invalid_workload() {
    let dir = tempfile::tempdir().unwrap();
    let err = Workload::load(dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidWorkload(_)));
    assert!(err.to_string().contains("cannot read"));
}

#[test]
fn test_malformed_file_is_invalid_workload() {
    let file = write_workload("{\"processes\": [{\"lifespan\": \"three\"}]}");
    let err = Workload::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("malformed JSON"));
}

#[test]
fn test_simulator_rejects_request_past_lifespan() {
    let workload = Workload::from_json(
        r#"{"processes": [{"lifespan": 2, "requests": [{"resource": 0, "at": 1, "duration": 2}]}]}"#,
    )
    .unwrap();

    let err = Simulator::new(SchedulerConfig::default(), workload).err().unwrap();
    assert!(matches!(err, SchedulerError::InvalidWorkload(_)));
}

#[test]
fn test_simulator_rejects_request_ending_past_tick_range() {
    let workload = Workload::from_json(
        r#"{"processes": [{"lifespan": 5, "requests": [{"resource": 0, "at": 18446744073709551615, "duration": 1}]}]}"#,
    )
    .unwrap();

    let err = Simulator::new(SchedulerConfig::default(), workload).err().unwrap();
    assert!(matches!(err, SchedulerError::InvalidWorkload(_)));
    assert!(err.to_string().contains("overflows"));
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_from_environment_lookup() {
    let config = SchedulerConfig::from_lookup(lookup(&[
        ("SCHED_POLICY", "pcp"),
        ("SCHED_NR_RESOURCES", "8"),
        ("SCHED_MAX_PRIO", "20"),
        ("SCHED_RESTORE_PRIO", "true"),
        ("SCHED_QUIET", "1"),
    ]))
    .unwrap();

    assert_eq!(config.policy, SchedulingPolicy::PriorityCeiling);
    assert_eq!(config.nr_resources, 8);
    assert_eq!(config.max_prio, 20);
    assert!(config.restore_priority_on_release);
    assert!(config.quiet);
}

#[test]
fn test_config_rejects_unknown_policy() {
    let err = SchedulerConfig::from_lookup(lookup(&[("SCHED_POLICY", "lottery")])).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidPolicy(_)));
}

#[test]
fn test_workload_limits_follow_config() {
    let workload = Workload::new().with_process(ProcessSpec::new(3).priority(15));
    let narrow = SchedulerConfig {
        max_prio: 10,
        ..SchedulerConfig::default()
    };

    assert!(workload.validate(&SchedulerConfig::default()).is_ok());
    assert!(workload.validate(&narrow).is_err());
}
