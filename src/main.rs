/*!
 * Scheduler Simulator - Main Entry Point
 *
 * Runs one workload file under the policy selected by SCHED_POLICY and
 * prints the run report as JSON on stdout. The event trace goes to stderr
 * unless SCHED_QUIET is set.
 */

use miette::{IntoDiagnostic, Result};
use tracing::info;

use sched_sim::{init_tracing, SchedulerConfig, Simulator, Workload};

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| miette::miette!("usage: sched-sim <workload.json>"))?;

    let config = SchedulerConfig::from_env()?;
    let workload = Workload::load(&path)?;
    info!(
        workload = %path,
        processes = workload.len(),
        policy = %config.policy,
        "Starting simulation"
    );

    let quiet = config.quiet;
    let report = Simulator::new(config, workload)?.run()?;
    if !quiet {
        report.trace.dump();
    }

    let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
