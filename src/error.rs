use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClickerError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Ошибка захвата экрана: {0}")]
    Capture(#[from] CaptureFault),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Цикл детекции уже запущен")]
    AlreadyRunning,

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ClickerError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(ClickerError::DeviceNotFound(msg.into()))
    }
}

/// Сбой сессии захвата. Восстанавливается локально пересозданием сессии,
/// наружу из цикла детекции не пробрасывается.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureFault {
    #[error("Основной монитор не найден")]
    NoDisplay,

    #[error("Сессия захвата недействительна: {0}")]
    Stale(String),

    #[error("Область {left},{top} {width}x{height} вне границ монитора")]
    OutOfBounds {
        left: i32,
        top: i32,
        width: u32,
        height: u32,
    },

    #[error("Кадр повреждён: ожидалось {expected} байт, получено {actual}")]
    MalformedFrame { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ClickerError>;
