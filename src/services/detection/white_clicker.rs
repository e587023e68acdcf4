use crate::error::{ClickerError, Result};
use crate::events::Emission;
use crate::services::capture::CaptureBackend;
use crate::services::trigger_monitor::TriggerState;
use crate::services::virtual_device::InputEmitter;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

use super::detection_loop::DetectionLoop;
use super::settings::DetectorSettings;

const WORKER_NAME: &str = "white-detector";

/// Управляет потоком цикла детекции: запуск, остановка, повторный запуск
pub struct WhiteClicker {
    settings: DetectorSettings,
    emission: Emission,
    state: Arc<TriggerState>,
    worker: Option<JoinHandle<()>>,
}

impl WhiteClicker {
    pub fn new(settings: DetectorSettings, emission: Emission, state: Arc<TriggerState>) -> Self {
        info!("Инициализация WhiteClicker (отправляется: {})", emission);
        Self {
            settings,
            emission,
            state,
            worker: None,
        }
    }

    pub fn state(&self) -> &Arc<TriggerState> {
        &self.state
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Запустить цикл детекции в отдельном потоке.
    /// Сессия захвата создаётся внутри этого потока и не покидает его.
    pub fn start<C, E>(&mut self, backend: C, emitter: E) -> Result<()>
    where
        C: CaptureBackend,
        E: InputEmitter,
    {
        if self.worker.is_some() {
            return Err(ClickerError::AlreadyRunning);
        }

        self.state.reset();

        let settings = self.settings;
        let emission = self.emission;
        let state = Arc::clone(&self.state);

        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || DetectionLoop::new(settings, emission, state, backend, emitter).run())?;

        self.worker = Some(handle);
        info!("Поток {} запущен", WORKER_NAME);
        Ok(())
    }

    /// Остановить цикл и дождаться освобождения сессии захвата
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.state.request_stop();
        if worker.join().is_err() {
            error!("Поток {} завершился паникой", WORKER_NAME);
        }
        info!("Поток {} остановлен", WORKER_NAME);
    }
}

impl Drop for WhiteClicker {
    fn drop(&mut self) {
        self.stop();
    }
}
