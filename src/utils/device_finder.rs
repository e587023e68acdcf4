use crate::error::{ClickerError, Result};
use crate::events::KeyCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти указывающее устройство, у которого есть кнопка триггера
    pub fn find_pointing_device(device_path: &str, trigger: KeyCode) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                ClickerError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        Self::auto_find_pointing_device(trigger)
    }

    fn auto_find_pointing_device(trigger: KeyCode) -> Result<PathBuf> {
        info!("Начинаем автопоиск мыши с кнопкой {}...", trigger);

        if let Ok(device) = Self::find_by_id(trigger) {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        if let Ok(device) = Self::find_by_event_devices(trigger) {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        ClickerError::device_not_found(format!(
            "Не удалось найти мышь с кнопкой {}. \
             Убедитесь, что пользователь добавлен в группу 'input'",
            trigger
        ))
    }

    fn find_by_id(trigger: KeyCode) -> Result<PathBuf> {
        let by_id_dir = Path::new("/dev/input/by-id");

        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return ClickerError::device_not_found("Директория by-id не найдена");
        }

        let entries = fs::read_dir(by_id_dir)
            .map_err(|e| ClickerError::Permission(format!("Нет доступа к /dev/input/by-id: {}", e)))?;

        let mut candidates = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();

            if !name.contains("event") {
                continue;
            }

            if !Self::has_trigger_button(&path, trigger) {
                debug!("Устройство без кнопки {}: {}", trigger, name);
                continue;
            }

            let priority = Self::name_priority(&name);
            info!("Кандидат: {} (приоритет: {})", name, priority);
            candidates.push((path, priority));
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        match candidates.into_iter().next() {
            Some((device, _)) => Ok(device),
            None => ClickerError::device_not_found("Мышь не найдена в by-id"),
        }
    }

    fn find_by_event_devices(trigger: KeyCode) -> Result<PathBuf> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir)
            .map_err(|e| ClickerError::Permission(format!("Нет доступа к /dev/input: {}", e)))?;

        let mut event_devices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_event = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("event"));
            if is_event {
                event_devices.push(path);
            }
        }

        event_devices.sort();

        for device_path in event_devices {
            debug!("Проверяем устройство: {:?}", device_path);
            if Self::has_trigger_button(&device_path, trigger) {
                return Ok(device_path);
            }
        }

        ClickerError::device_not_found("Не найдено доступное устройство среди event устройств")
    }

    /// `-event-mouse` - основной интерфейс мыши, прочие интерфейсы того же устройства ниже
    fn name_priority(name: &str) -> u32 {
        if name.ends_with("-event-mouse") {
            100
        } else if name.to_lowercase().contains("mouse") {
            50
        } else {
            10
        }
    }

    fn has_trigger_button(device_path: &Path, trigger: KeyCode) -> bool {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let has_button = device
                    .supported_keys()
                    .is_some_and(|keys| keys.contains(evdev::KeyCode::new(trigger.value())));

                if has_button {
                    debug!("Устройство {:?} ({}) подходит", device_path, device.name().unwrap_or("Unknown"));
                }
                has_button
            }
            Err(e) => {
                warn!("Не удалось открыть устройство {:?}: {}", device_path, e);
                false
            }
        }
    }
}
