use crate::error::Result;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::info;

use super::r#trait::TriggerMonitorTrait;
use super::trigger_state::TriggerState;

const IDLE_PERIOD: Duration = Duration::from_secs(3);
const HOLD_PERIOD: Duration = Duration::from_secs(2);

/// Эмулирует удержание триггера: 2 секунды из каждых 5
pub struct DryRunTriggerMonitor {
    state: Arc<TriggerState>,
}

impl DryRunTriggerMonitor {
    pub fn new(state: Arc<TriggerState>) -> Self {
        info!("Инициализация DryRunTriggerMonitor");
        Self { state }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - TriggerMonitor работает в режиме эмуляции");
        let trigger = self.state.trigger();

        loop {
            sleep(IDLE_PERIOD).await;

            info!("Dry-run: эмулируем нажатие {}", trigger);
            self.state.on_event(trigger, true);

            sleep(HOLD_PERIOD).await;

            info!("Dry-run: эмулируем отпускание {}", trigger);
            self.state.on_event(trigger, false);
        }
    }
}

#[async_trait::async_trait]
impl TriggerMonitorTrait for DryRunTriggerMonitor {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
