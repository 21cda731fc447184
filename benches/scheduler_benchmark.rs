/*!
 * Scheduler Benchmarks
 *
 * Compare pick and protocol cost of every policy on the same workloads
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sched_sim::{ProcessSpec, Scheduler, SchedulerConfig, SchedulingPolicy, Simulator, Workload};

/// `count` processes with staggered arrivals, mixed priorities and two
/// shared resources
fn contended_workload(count: usize) -> Workload {
    (0..count).fold(Workload::new(), |workload, i| {
        let lifespan = 4 + (i % 7) as u64;
        let spec = ProcessSpec::new(lifespan)
            .arriving((i / 4) as u64)
            .priority((i * 13 % 90) as u32)
            .request(i % 2, 1, 2);
        workload.with_process(spec)
    })
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    let workload = contended_workload(64);

    for policy in SchedulingPolicy::ALL {
        let config = SchedulerConfig {
            check_invariants: false,
            ..SchedulerConfig::with_policy(policy)
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(policy.short_name()),
            &config,
            |b, config| {
                b.iter(|| {
                    let simulator = Simulator::new(config.clone(), workload.clone()).unwrap();
                    black_box(simulator.run().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_schedule_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_tick");

    for size in [16u32, 256, 1024] {
        for policy in [
            SchedulingPolicy::RoundRobin,
            SchedulingPolicy::Stcf,
            SchedulingPolicy::PriorityAging,
        ] {
            group.bench_with_input(
                BenchmarkId::new(policy.short_name(), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        let mut scheduler = Scheduler::new(policy);
                        for i in 0..size {
                            scheduler.spawn(2, i % 99).unwrap();
                        }
                        while let Some(pid) = scheduler.schedule() {
                            scheduler.tick().unwrap();
                            if scheduler.process(pid).is_some_and(|p| p.is_finished()) {
                                scheduler.exit(pid).unwrap();
                            }
                        }
                        black_box(scheduler.stats())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_invariant_check(c: &mut Criterion) {
    let mut scheduler = Scheduler::new(SchedulingPolicy::Priority);
    for i in 0..512u32 {
        scheduler.spawn(10, i % 99).unwrap();
    }
    scheduler.schedule();

    c.bench_function("check_invariants_512", |b| {
        b.iter(|| black_box(scheduler.check_invariants()))
    });
}

criterion_group!(
    benches,
    bench_simulation,
    bench_schedule_only,
    bench_invariant_check
);

criterion_main!(benches);
