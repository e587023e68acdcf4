use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{ClickerError, Result};
use crate::events::{KeyCode, KeyState};
use crate::utils::DeviceFinder;
use evdev::{Device, EventType, InputEvent};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use super::r#trait::TriggerMonitorTrait;
use super::trigger_state::TriggerState;

const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);
/// Столько ошибок подряд (около 5 секунд) означают, что устройство потеряно
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 50;

/// Читает события указывающего устройства через evdev.
/// Устройство не захватывается эксклюзивно: мышь продолжает работать как обычно.
pub struct RealTriggerMonitor {
    device: Device,
    device_name: String,
    state: Arc<TriggerState>,
}

impl RealTriggerMonitor {
    pub fn new(config: Arc<Config>, state: Arc<TriggerState>) -> Result<Self> {
        info!("Инициализация RealTriggerMonitor");

        let device_path =
            DeviceFinder::find_pointing_device(&config.trigger.device_path, state.trigger())?;

        let device = Device::open(&device_path).map_err(|e| {
            ClickerError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        let device_name = device.name().unwrap_or("Unknown").to_string();
        info!("Устройство: {}", device_name);
        info!("Физический путь: {:?}", device.physical_path());
        info!("Кнопка триггера: {}", state.trigger());

        Ok(Self {
            device,
            device_name,
            state,
        })
    }

    async fn run_impl(self) -> Result<()> {
        let Self {
            device,
            device_name,
            state,
        } = self;

        info!("RealTriggerMonitor запущен, начинаем чтение событий");
        let mut events = device.into_event_stream()?;
        let mut read_errors = 0u32;

        loop {
            match events.next_event().await {
                Ok(event) => {
                    read_errors = 0;
                    Self::handle_event(&state, &device_name, event);
                }
                Err(e) => {
                    read_errors += 1;
                    error!("Ошибка чтения событий: {}", e);
                    // Не оставляем цикл детекции взведённым на потерянном устройстве
                    state.force_release();
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return ClickerError::device_not_found(format!(
                            "{} перестало отвечать: {}",
                            device_name, e
                        ));
                    }
                    sleep(READ_ERROR_BACKOFF).await;
                }
            }
        }
    }

    fn handle_event(state: &TriggerState, device_name: &str, event: InputEvent) {
        if event.event_type() != EventType::KEY {
            return;
        }

        let Some(key_state) = KeyState::from_evdev_value(event.value()) else {
            debug!("Неизвестное значение события: {}", event.value());
            return;
        };

        // Аппаратные повторы не меняют состояние удержания
        let Some(pressed) = key_state.pressed() else {
            return;
        };

        let button = KeyCode(event.code());
        if button == state.trigger() {
            debug_if_enabled!("Событие триггера: {}[{}] {:?}", button, device_name, key_state);
        }
        state.on_event(button, pressed);
    }
}

#[async_trait::async_trait]
impl TriggerMonitorTrait for RealTriggerMonitor {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
