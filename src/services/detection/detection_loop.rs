use crate::debug_if_enabled;
use crate::events::Emission;
use crate::services::capture::{capture_has_white, CaptureBackend, CaptureRegion, CaptureSession};
use crate::services::trigger_monitor::TriggerState;
use crate::services::virtual_device::InputEmitter;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::settings::{DetectorSettings, FiringPolicy, SessionLifetime};

/// Фаза цикла детекции
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Триггер не удерживается
    Idle,
    /// Триггер удерживается, идёт опрос области
    Watching,
    /// Событие только что отправлено, опрос приостановлен
    Cooldown,
}

struct LiveSession<S> {
    session: S,
    region: CaptureRegion,
}

/// Цикл детекции. Единолично владеет сессией захвата и политикой срабатывания.
pub struct DetectionLoop<C: CaptureBackend, E: InputEmitter> {
    settings: DetectorSettings,
    emission: Emission,
    state: Arc<TriggerState>,
    backend: C,
    emitter: E,
    session: Option<LiveSession<C::Session>>,
    phase: LoopPhase,
    consecutive_faults: u32,
}

impl<C: CaptureBackend, E: InputEmitter> DetectionLoop<C, E> {
    pub fn new(
        settings: DetectorSettings,
        emission: Emission,
        state: Arc<TriggerState>,
        backend: C,
        emitter: E,
    ) -> Self {
        Self {
            settings,
            emission,
            state,
            backend,
            emitter,
            session: None,
            phase: LoopPhase::Idle,
            consecutive_faults: 0,
        }
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    #[allow(dead_code)]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Крутится до запроса остановки, затем освобождает сессию
    pub fn run(mut self) {
        info!(
            "Цикл детекции запущен: область {}px, опрос {:?}, пауза {:?}, {:?}, {:?}",
            self.settings.region_size,
            self.settings.poll_interval,
            self.settings.click_cooldown,
            self.settings.firing_policy,
            self.settings.session_lifetime,
        );

        while !self.state.stop_requested() {
            self.tick();
        }

        self.release_session("остановка цикла");
        info!("Цикл детекции остановлен");
    }

    /// Один шаг конечного автомата
    pub fn tick(&mut self) {
        let poll_interval = self.settings.poll_interval;

        if !self.state.wait_active(poll_interval) {
            self.enter_idle();
            return;
        }

        if self.state.stop_requested() {
            return;
        }

        // Номер удержания, к которому относится этот кадр
        let hold = self.state.hold_generation();
        if !self.state.is_held() {
            self.enter_idle();
            return;
        }

        if self.settings.firing_policy == FiringPolicy::FireOnce && self.state.has_fired() {
            // Уже сработали за это удержание: до отпускания захват не нужен
            self.state.pause(poll_interval);
            return;
        }

        self.set_phase(LoopPhase::Watching);

        let detection = match self.ensure_session() {
            Some(live) => capture_has_white(&mut live.session, &live.region),
            None => {
                self.state.pause(poll_interval);
                return;
            }
        };

        match detection {
            Ok(true) => {
                self.on_recovered();
                self.fire(hold);
                return;
            }
            Ok(false) => self.on_recovered(),
            Err(fault) => {
                self.consecutive_faults += 1;
                if self.consecutive_faults == 1 {
                    warn!("Сбой сессии захвата, сессия будет пересоздана: {}", fault);
                } else {
                    debug!("Повторный сбой сессии захвата #{}: {}", self.consecutive_faults, fault);
                }
                self.release_session("сбой захвата");
            }
        }

        self.state.pause(poll_interval);
    }

    fn ensure_session(&mut self) -> Option<&mut LiveSession<C::Session>> {
        if self.session.is_none() {
            match self.backend.open() {
                Ok(session) => {
                    let bounds = session.display_bounds();
                    let region = CaptureRegion::centered(&bounds, self.settings.region_size);
                    debug!("Сессия захвата открыта: монитор {}, область {}", bounds, region);
                    self.session = Some(LiveSession { session, region });
                }
                Err(fault) => {
                    self.consecutive_faults += 1;
                    if self.consecutive_faults == 1 {
                        warn!("Не удалось открыть сессию захвата: {}", fault);
                    }
                    return None;
                }
            }
        }

        self.session.as_mut()
    }

    fn fire(&mut self, hold: u64) {
        debug_if_enabled!("Белый пиксель в области захвата");

        if let Err(e) = self.emitter.emit(self.emission) {
            error!("Не удалось отправить {}: {}", self.emission, e);
        }

        if self.settings.firing_policy == FiringPolicy::FireOnce {
            self.state.mark_fired(hold);
        }

        self.set_phase(LoopPhase::Cooldown);
        if !self.settings.click_cooldown.is_zero() {
            self.state.pause(self.settings.click_cooldown);
        }
    }

    fn enter_idle(&mut self) {
        self.set_phase(LoopPhase::Idle);

        if self.settings.session_lifetime == SessionLifetime::ReleaseOnTriggerRelease {
            self.release_session("триггер отпущен");
        }
    }

    fn on_recovered(&mut self) {
        if self.consecutive_faults > 0 {
            info!("Захват восстановлен после {} сбоев", self.consecutive_faults);
            self.consecutive_faults = 0;
        }
    }

    fn release_session(&mut self, reason: &str) {
        if self.session.take().is_some() {
            debug!("Сессия захвата освобождена: {}", reason);
        }
    }

    fn set_phase(&mut self, phase: LoopPhase) {
        if self.phase != phase {
            debug_if_enabled!("Цикл детекции: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}
