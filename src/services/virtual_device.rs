use crate::error::{ClickerError, Result};
use crate::events::{Emission, KeyCode, KeyState, VirtualKeyEvent};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

const EV_SYN: i32 = 0;
const EV_KEY: i32 = 1;
const SYN_REPORT: i32 = 0;

/// Отправка синтетического ввода. Вызывается из потока цикла детекции.
pub trait InputEmitter: Send + 'static {
    /// Отправить пару нажатие + отпускание
    fn emit(&self, emission: Emission) -> Result<()>;
}

pub struct VirtualDevice {
    device: Mutex<Option<uinput::Device>>,
    /// Нажатая, но ещё не отпущенная клавиша
    pending: Mutex<Option<KeyCode>>,
    press_duration: Duration,
    dry_run: bool,
}

impl VirtualDevice {
    pub fn new(device_name: &str, press_duration: Duration, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name)?)
        };

        Ok(Self {
            device: Mutex::new(device),
            pending: Mutex::new(None),
            press_duration,
            dry_run,
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}'", device_name);

        // Клавиатура и кнопки мыши; относительные оси нужны, чтобы libinput признал устройство мышью
        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .event(uinput::event::Controller::All)?
            .event(uinput::event::Relative::Position(uinput::event::relative::Position::X))?
            .event(uinput::event::Relative::Position(uinput::event::relative::Position::Y))?
            .create()
            .map_err(|e| {
                ClickerError::Internal(format!(
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name, e
                ))
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    pub fn send_event(&self, event: VirtualKeyEvent) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {} {:?}", event.key_code, event.state);
            self.track(event);
            return Ok(());
        }

        let mut guard = self.device.lock();
        let device = guard
            .as_mut()
            .ok_or_else(|| ClickerError::Internal("Виртуальное устройство недоступно".to_string()))?;

        let keycode = event.key_code.value() as i32;
        device.write(EV_KEY, keycode, event.state.evdev_value()).map_err(|e| {
            ClickerError::Internal(format!("Не удалось отправить событие клавиши {}: {}", keycode, e))
        })?;
        if event.state == KeyState::Pressed {
            self.track(event);
        }

        device
            .write(EV_SYN, SYN_REPORT, 0)
            .map_err(|e| ClickerError::Internal(format!("Не удалось синхронизировать события: {}", e)))?;

        if event.state == KeyState::Released {
            self.track(event);
        }

        debug!("Виртуальное событие {} {:?} отправлено", event.key_code, event.state);
        Ok(())
    }

    fn track(&self, event: VirtualKeyEvent) {
        let mut pending = self.pending.lock();
        match event.state {
            KeyState::Pressed => *pending = Some(event.key_code),
            KeyState::Released if *pending == Some(event.key_code) => *pending = None,
            _ => {}
        }
    }

    pub fn pending_key(&self) -> Option<KeyCode> {
        *self.pending.lock()
    }

    /// Отпустить клавишу, оставшуюся нажатой после неудачной отправки
    pub fn release_pending(&self) -> Result<()> {
        match self.pending_key() {
            Some(key_code) => {
                warn!("Отпускаем залипшую клавишу {}", key_code);
                self.send_event(VirtualKeyEvent::release(key_code))
            }
            None => Ok(()),
        }
    }
}

/// Нажатие, удержание, отпускание. Отпускание отправляется всегда,
/// возвращается первая ошибка.
fn press_and_release(
    key_code: KeyCode,
    press_duration: Duration,
    mut send: impl FnMut(VirtualKeyEvent) -> Result<()>,
) -> Result<()> {
    let pressed = send(VirtualKeyEvent::press(key_code));
    if pressed.is_ok() && !press_duration.is_zero() {
        std::thread::sleep(press_duration);
    }
    let released = send(VirtualKeyEvent::release(key_code));

    pressed.and(released)
}

impl InputEmitter for VirtualDevice {
    fn emit(&self, emission: Emission) -> Result<()> {
        press_and_release(emission.key_code(), self.press_duration, |event| self.send_event(event))?;

        info!("Отправлено: {}", emission);
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Err(e) = self.release_pending() {
            warn!("Не удалось отпустить клавишу при закрытии: {}", e);
        }
        if !self.dry_run {
            info!("Закрытие виртуального устройства");
        }
    }
}
