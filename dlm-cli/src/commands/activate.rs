//! Run the startup sweep and report per-fragment outcomes.

use super::{load, Paths};
use anyhow::Result;
use dlm_engine::SweepStatus;

pub fn activate(paths: &Paths) -> Result<()> {
    let (activator, store) = load(paths)?;
    let statuses = activator.activate_all().unwrap_or_default();

    if statuses.is_empty() {
        println!("No fragments configured");
    }
    for (name, status) in &statuses {
        let status = match status {
            SweepStatus::Available => "available",
            SweepStatus::Skipped => "skipped",
            SweepStatus::Unavailable => "unavailable",
        };
        println!("{name}: {status}");
    }

    println!("{}", activator.metrics());
    println!("Layouts saved: {}", store.save_count());
    Ok(())
}
