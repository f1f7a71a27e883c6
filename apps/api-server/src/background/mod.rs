//! Background maintenance jobs.

#[cfg(feature = "scheduler")]
mod scheduler;

#[cfg(feature = "scheduler")]
pub use scheduler::{Scheduler, SchedulerConfig};

#[cfg(feature = "scheduler")]
use crate::state::AppState;

/// Start the idle view-session sweep when views are tracked in memory.
#[cfg(feature = "scheduler")]
pub async fn start(config: &SchedulerConfig, state: &AppState) -> Option<Scheduler> {
    if !config.enabled {
        tracing::info!("Scheduler disabled");
        return None;
    }
    let ledger = state.local_ledger.clone()?;

    let result = async {
        let scheduler = Scheduler::new().await?;
        scheduler
            .add_cron(&config.view_sweep_cron, move || {
                let ledger = ledger.clone();
                async move {
                    let removed = ledger.sweep_idle().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Swept idle view sessions");
                    }
                }
            })
            .await?;
        scheduler.start().await?;
        Ok::<_, tokio_cron_scheduler::JobSchedulerError>(scheduler)
    }
    .await;

    match result {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start scheduler, idle view sessions will not be swept");
            None
        }
    }
}
