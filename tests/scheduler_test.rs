/*!
 * Scheduler Tests
 * Policy pick orders driven through the simulator
 */

use pretty_assertions::assert_eq;
use sched_sim::{
    Pid, ProcessSpec, RunOutcome, RunReport, SchedulerConfig, SchedulingPolicy, Simulator,
    Workload,
};

fn run_with(config: SchedulerConfig, workload: Workload) -> RunReport {
    let config = SchedulerConfig {
        check_invariants: true,
        ..config
    };
    Simulator::new(config, workload).unwrap().run().unwrap()
}

fn run(policy: SchedulingPolicy, workload: Workload) -> RunReport {
    run_with(SchedulerConfig::with_policy(policy), workload)
}

/// Timeline of a run without idle ticks
fn order(report: &RunReport) -> Vec<Pid> {
    report.timeline.iter().flatten().copied().collect()
}

fn two_equal_jobs() -> Workload {
    Workload::new()
        .with_process(ProcessSpec::new(3).named("A"))
        .with_process(ProcessSpec::new(3).named("B"))
}

#[test]
fn test_fcfs_runs_each_job_to_completion() {
    let report = run(SchedulingPolicy::Fcfs, two_equal_jobs());

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(order(&report), vec![1, 1, 1, 2, 2, 2]);
    assert_eq!(report.stats.preemptions, 0);
    assert_eq!(report.stats.context_switches, 2);
}

#[test]
fn test_round_robin_interleaves_every_tick() {
    let report = run(SchedulingPolicy::RoundRobin, two_equal_jobs());

    assert_eq!(order(&report), vec![1, 2, 1, 2, 1, 2]);
    assert_eq!(report.stats.total_scheduled, 6);
}

#[test]
fn test_sjf_prefers_shorter_lifespan() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(10))
        .with_process(ProcessSpec::new(2));
    let report = run(SchedulingPolicy::Sjf, workload);

    let mut expected = vec![2, 2];
    expected.extend(std::iter::repeat(1).take(10));
    assert_eq!(order(&report), expected);
}

#[test]
fn test_sjf_does_not_preempt_late_arrival() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(10))
        .with_process(ProcessSpec::new(2).arriving(5));
    let report = run(SchedulingPolicy::Sjf, workload);

    let mut expected = vec![1; 10];
    expected.extend([2, 2]);
    assert_eq!(order(&report), expected);
    assert_eq!(report.stats.preemptions, 0);
}

#[test]
fn test_stcf_preempts_for_shorter_remaining_time() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(10))
        .with_process(ProcessSpec::new(2).arriving(5));
    let report = run(SchedulingPolicy::Stcf, workload);

    let mut expected = vec![1; 5];
    expected.extend([2, 2]);
    expected.extend([1; 5]);
    assert_eq!(order(&report), expected);
    assert_eq!(report.stats.preemptions, 1);
}

#[test]
fn test_stcf_keeps_current_on_equal_remaining_time() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(4))
        .with_process(ProcessSpec::new(2).arriving(2));
    let report = run(SchedulingPolicy::Stcf, workload);

    assert_eq!(order(&report), vec![1, 1, 1, 1, 2, 2]);
}

#[test]
fn test_priority_picks_highest_first() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(2).priority(1))
        .with_process(ProcessSpec::new(2).priority(5))
        .with_process(ProcessSpec::new(1).priority(3));
    let report = run(SchedulingPolicy::Priority, workload);

    assert_eq!(order(&report), vec![2, 2, 3, 1, 1]);
}

#[test]
fn test_priority_ties_rotate_in_queue_order() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(2).priority(4))
        .with_process(ProcessSpec::new(2).priority(4));
    let report = run(SchedulingPolicy::Priority, workload);

    assert_eq!(order(&report), vec![1, 2, 1, 2]);
}

#[test]
fn test_aging_lets_lowest_priority_run() {
    let config = SchedulerConfig {
        max_prio: 10,
        ..SchedulerConfig::with_policy(SchedulingPolicy::PriorityAging)
    };
    let workload = Workload::new()
        .with_process(ProcessSpec::new(50).priority(9))
        .with_process(ProcessSpec::new(1).priority(0));
    let report = run_with(config, workload);

    let first_low = report.timeline.iter().position(|p| *p == Some(2));
    assert_eq!(first_low, Some(8));
    assert_eq!(report.outcome, RunOutcome::Completed);
}

#[test]
fn test_plain_priority_starves_low_process() {
    let config = SchedulerConfig {
        max_prio: 10,
        ..SchedulerConfig::with_policy(SchedulingPolicy::Priority)
    };
    let workload = Workload::new()
        .with_process(ProcessSpec::new(20).priority(9))
        .with_process(ProcessSpec::new(1).priority(0));
    let report = run_with(config, workload);

    let first_low = report.timeline.iter().position(|p| *p == Some(2));
    assert_eq!(first_low, Some(20));
}

#[test]
fn test_aging_restores_base_priority_when_picked() {
    let config = SchedulerConfig {
        max_prio: 10,
        ..SchedulerConfig::with_policy(SchedulingPolicy::PriorityAging)
    };
    let workload = Workload::new()
        .with_process(ProcessSpec::new(3).priority(2))
        .with_process(ProcessSpec::new(3).priority(2));
    let report = run_with(config, workload);

    for pid in [1, 2] {
        assert!(report.trace.priorities(pid).iter().all(|&(_, prio)| prio == 2));
    }
}

#[test]
fn test_finished_process_never_runs_again() {
    for policy in SchedulingPolicy::ALL {
        let report = run(policy, two_equal_jobs());
        assert_eq!(report.trace.run_count(1), 3, "{policy}");
        assert_eq!(report.trace.run_count(2), 3, "{policy}");
        assert_eq!(report.stats.terminated, 2, "{policy}");
    }
}

#[test]
fn test_identical_runs_produce_identical_traces() {
    let workload = Workload::new()
        .with_process(ProcessSpec::new(5).priority(2).request(0, 1, 3))
        .with_process(ProcessSpec::new(3).priority(7).arriving(1).request(0, 0, 2))
        .with_process(ProcessSpec::new(4).priority(4).arriving(2).request(1, 0, 4));

    for policy in SchedulingPolicy::ALL {
        let first = run(policy, workload.clone());
        let second = run(policy, workload.clone());
        assert_eq!(first.trace, second.trace, "{policy}");
        assert_eq!(first.stats, second.stats, "{policy}");
    }
}
