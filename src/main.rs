use std::sync::Arc;

use clap::Parser;
use primescan::cli::{CliArgs, RunPlan, init_tracing};
use primescan::{Coordinator, LineSink, LogWriter, Subscribe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_tracing();

    let plan = RunPlan::try_from(args)?;
    let sink = LineSink::create(&plan.file).await?;

    tracing::info!(
        ranges = plan.ranges.len(),
        rejected = plan.rejected.len(),
        file = %plan.file.display(),
        timeout = ?plan.config.timeout,
        "starting search"
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let coordinator = Coordinator::new(plan.config, subs);
    let res = coordinator.run(plan.ranges, sink).await;
    coordinator.shutdown().await;

    let report = res?;
    println!("{}", report.status_line());
    Ok(())
}
