use anyhow::Context;
use log::info;

use motion_trainer::{run, TrainConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = TrainConfig::from_env().context("failed to read configuration")?;
    info!(
        "training {} targets from {}",
        config.layout().targets.len(),
        config.dataset().display()
    );

    let summary = run(&config).context("training failed")?;

    println!(
        "training finished: {} models fit on {} samples, wrote {}",
        summary.targets.len(),
        summary.samples,
        summary.output.display()
    );

    Ok(())
}
