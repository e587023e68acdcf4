use crate::error::{ClickerError, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";
const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить права доступа к необходимым ресурсам.
/// В dry-run режиме uinput не нужен.
pub fn check_permissions(dry_run: bool) -> Result<()> {
    info!("Проверка прав доступа...");

    check_input_devices_access()?;

    if !dry_run {
        check_uinput_access()?;
    }

    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    if !Path::new(INPUT_DIR).exists() {
        return Err(ClickerError::Permission(format!("Директория {} не существует", INPUT_DIR)));
    }

    match fs::read_dir(INPUT_DIR) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", INPUT_DIR);
            Ok(())
        }
        Err(e) => Err(ClickerError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            INPUT_DIR, e
        ))),
    }
}

fn check_uinput_access() -> Result<()> {
    if !Path::new(UINPUT_DEVICE).exists() {
        // Модуль может быть загружен позже, uinput::default() сообщит точную ошибку
        warn!("{} не существует, возможно модуль uinput не загружен", UINPUT_DEVICE);
        return Ok(());
    }

    let metadata = fs::metadata(UINPUT_DEVICE).map_err(|e| {
        ClickerError::Permission(format!("Не удалось проверить права доступа к {}: {}", UINPUT_DEVICE, e))
    })?;

    if !uinput_mode_allows_access(metadata.permissions().mode()) {
        return Err(ClickerError::Permission(format!(
            "Нет прав доступа к {}. Добавьте пользователя в группу 'uinput' или 'input'",
            UINPUT_DEVICE
        )));
    }

    info!("Доступ к {} подтвержден", UINPUT_DEVICE);
    Ok(())
}

/// Обычно 660 или 666: нужен доступ группе или всем
fn uinput_mode_allows_access(mode: u32) -> bool {
    mode & 0o006 != 0 || mode & 0o060 != 0
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Рекомендуется добавить пользователя в группы 'input' и 'uinput'");
            warn!("   и запускать приложение от имени обычного пользователя");
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}

/// Получить рекомендуемые команды для настройки прав доступа
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Добавить пользователя в необходимые группы:".to_string(),
        "sudo usermod -a -G input,uinput $USER".to_string(),
        "".to_string(),
        "# Загрузить модуль uinput:".to_string(),
        "sudo modprobe uinput".to_string(),
        "".to_string(),
        "# После выполнения команд перезайдите в систему".to_string(),
    ]
}
