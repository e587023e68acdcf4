use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

use super::trigger_state::TriggerState;

/// Trait for trigger monitors that can run in different modes
#[async_trait::async_trait]
pub trait TriggerMonitorTrait {
    /// Run the monitor until the task is aborted
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate trigger monitor based on the dry_run flag
pub fn create_trigger_monitor(
    config: Arc<Config>,
    state: Arc<TriggerState>,
    dry_run: bool,
) -> Result<Box<dyn TriggerMonitorTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_trigger_monitor::DryRunTriggerMonitor::new(state)))
    } else {
        Ok(Box::new(super::trigger_monitor::RealTriggerMonitor::new(
            config, state,
        )?))
    }
}
