use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::events::KeyCode;

/// Сигналы под мьютексом: событие "триггер активен" (ручной сброс) и запрос остановки
#[derive(Debug, Default)]
struct Signals {
    active: bool,
    stop: bool,
}

/// Общее состояние триггера между монитором кнопки и циклом детекции.
///
/// Каждое нажатие открывает новое удержание со своим номером. Защёлка
/// срабатывания хранит номер удержания, в котором было событие, поэтому
/// запоздавшая отметка не переносится на следующее удержание. Мьютекс с
/// condvar служит только для пробуждения ждущего цикла.
#[derive(Debug)]
pub struct TriggerState {
    trigger: KeyCode,
    held: AtomicBool,
    hold: AtomicU64,
    fired_hold: AtomicU64,
    stop: AtomicBool,
    signals: Mutex<Signals>,
    condvar: Condvar,
}

impl TriggerState {
    pub fn new(trigger: KeyCode) -> Self {
        Self {
            trigger,
            held: AtomicBool::new(false),
            hold: AtomicU64::new(0),
            fired_hold: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            signals: Mutex::new(Signals::default()),
            condvar: Condvar::new(),
        }
    }

    pub fn trigger(&self) -> KeyCode {
        self.trigger
    }

    /// Событие кнопки. Чужие кнопки игнорируются.
    pub fn on_event(&self, button: KeyCode, pressed: bool) {
        if button != self.trigger {
            return;
        }

        if pressed {
            // Новое удержание всегда начинается взведённым
            self.hold.fetch_add(1, Ordering::SeqCst);
        }
        self.fired_hold.store(0, Ordering::SeqCst);
        self.held.store(pressed, Ordering::SeqCst);

        let mut signals = self.signals.lock();
        signals.active = pressed;
        if pressed {
            self.condvar.notify_all();
        }
    }

    /// Принудительно отпустить триггер (потеря устройства, остановка)
    pub fn force_release(&self) {
        self.on_event(self.trigger, false);
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Номер текущего удержания, 0 до первого нажатия
    pub fn hold_generation(&self) -> u64 {
        self.hold.load(Ordering::SeqCst)
    }

    pub fn has_fired(&self) -> bool {
        let hold = self.hold.load(Ordering::SeqCst);
        hold != 0 && self.fired_hold.load(Ordering::SeqCst) == hold
    }

    /// Отметить срабатывание в удержании `hold`. Для уже закончившегося
    /// удержания отметка ни на что не влияет.
    pub fn mark_fired(&self, hold: u64) {
        self.fired_hold.store(hold, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Ждать активации триггера не дольше `timeout`.
    /// Возвращает `true`, если триггер активен или запрошена остановка.
    pub fn wait_active(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut signals = self.signals.lock();

        while !signals.active && !signals.stop {
            if self.wait(&mut signals, deadline) {
                break;
            }
        }

        signals.active || signals.stop
    }

    /// Пауза, прерываемая остановкой. Возвращает `false`, если запрошена остановка.
    pub fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut signals = self.signals.lock();

        while !signals.stop {
            if self.wait(&mut signals, deadline) {
                break;
            }
        }

        !signals.stop
    }

    /// `true`, если срок истёк. Без срока ждём только пробуждения.
    fn wait(&self, signals: &mut MutexGuard<'_, Signals>, deadline: Option<Instant>) -> bool {
        match deadline {
            Some(deadline) => self.condvar.wait_until(signals, deadline).timed_out(),
            None => {
                self.condvar.wait(signals);
                false
            }
        }
    }

    pub fn request_stop(&self) {
        let mut signals = self.signals.lock();
        signals.stop = true;
        self.stop.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    /// Сброс перед новым запуском цикла
    pub fn reset(&self) {
        let mut signals = self.signals.lock();
        *signals = Signals::default();
        self.stop.store(false, Ordering::SeqCst);
        self.held.store(false, Ordering::SeqCst);
        self.fired_hold.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const TRIGGER: KeyCode = KeyCode(0x114);

    #[test]
    fn test_other_buttons_ignored() {
        let state = TriggerState::new(TRIGGER);
        state.on_event(KeyCode(0x110), true);

        assert!(!state.is_held());
        assert!(!state.wait_active(Duration::from_millis(1)));
    }

    #[test]
    fn test_press_and_release() {
        let state = TriggerState::new(TRIGGER);

        state.on_event(TRIGGER, true);
        assert!(state.is_held());
        assert!(state.wait_active(Duration::from_millis(1)));

        state.on_event(TRIGGER, false);
        assert!(!state.is_held());
        assert!(!state.wait_active(Duration::from_millis(1)));
    }

    #[test]
    fn test_press_and_release_reset_fired_latch() {
        let state = TriggerState::new(TRIGGER);

        state.on_event(TRIGGER, true);
        state.mark_fired(state.hold_generation());
        assert!(state.has_fired());

        state.on_event(TRIGGER, false);
        assert!(!state.has_fired());

        state.mark_fired(state.hold_generation());
        state.on_event(TRIGGER, true);
        assert!(!state.has_fired());
    }

    #[test]
    fn test_late_mark_does_not_latch_next_hold() {
        let state = TriggerState::new(TRIGGER);

        state.on_event(TRIGGER, true);
        let first_hold = state.hold_generation();

        // Отпустили и снова нажали, пока событие ещё отправлялось
        state.on_event(TRIGGER, false);
        state.on_event(TRIGGER, true);
        state.mark_fired(first_hold);

        assert_ne!(state.hold_generation(), first_hold);
        assert!(!state.has_fired());

        state.mark_fired(state.hold_generation());
        assert!(state.has_fired());
    }

    #[test]
    fn test_unbounded_pause_is_interrupted_by_stop() {
        let state = Arc::new(TriggerState::new(TRIGGER));
        let sleeper = {
            let state = Arc::clone(&state);
            thread::spawn(move || state.pause(Duration::MAX))
        };

        thread::sleep(Duration::from_millis(20));
        state.request_stop();

        assert!(!sleeper.join().unwrap());
        assert!(state.wait_active(Duration::MAX));
    }

    #[test]
    fn test_wait_active_times_out() {
        let state = TriggerState::new(TRIGGER);
        let started = Instant::now();

        assert!(!state.wait_active(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_press_wakes_waiter() {
        let state = Arc::new(TriggerState::new(TRIGGER));
        let waiter = {
            let state = Arc::clone(&state);
            thread::spawn(move || state.wait_active(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        state.on_event(TRIGGER, true);

        assert!(waiter.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_stop_interrupts_pause() {
        let state = Arc::new(TriggerState::new(TRIGGER));
        let sleeper = {
            let state = Arc::clone(&state);
            thread::spawn(move || state.pause(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        state.request_stop();

        assert!(!sleeper.join().unwrap());
        assert!(state.stop_requested());
        assert!(state.wait_active(Duration::from_secs(5)));
    }

    #[test]
    fn test_pause_completes_without_stop() {
        let state = TriggerState::new(TRIGGER);
        let started = Instant::now();

        assert!(state.pause(Duration::from_millis(10)));
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(state.pause(Duration::ZERO));
    }

    #[test]
    fn test_reset_clears_stop_and_hold() {
        let state = TriggerState::new(TRIGGER);
        state.on_event(TRIGGER, true);
        state.request_stop();

        state.reset();

        assert!(!state.stop_requested());
        assert!(!state.is_held());
        assert!(!state.wait_active(Duration::from_millis(1)));
    }
}
