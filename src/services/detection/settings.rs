use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REGION_SIZE: u32 = 50;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);
pub const DEFAULT_CLICK_COOLDOWN: Duration = Duration::from_millis(25);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
/// Верхняя граница для интервала опроса и паузы
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Политика срабатывания при обнаружении белого
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FiringPolicy {
    /// Не больше одного события за одно удержание триггера
    #[default]
    FireOnce,
    /// Событие на каждый положительный кадр, не чаще одного раза за `click_cooldown`
    Repeat,
}

/// Время жизни сессии захвата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SessionLifetime {
    /// Сессия закрывается при каждом отпускании триггера
    #[default]
    ReleaseOnTriggerRelease,
    /// Сессия живёт между удержаниями до остановки или сбоя
    PersistAcrossHolds,
}

/// Параметры цикла детекции после ограничения снизу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorSettings {
    pub region_size: u32,
    pub poll_interval: Duration,
    pub click_cooldown: Duration,
    pub firing_policy: FiringPolicy,
    pub session_lifetime: SessionLifetime,
}

impl DetectorSettings {
    /// `region_size >= 1`, `poll_interval >= 1мс`, `click_cooldown >= 0`, оба интервала не больше часа.
    /// Нечисловые значения интервалов заменяются значениями по умолчанию.
    pub fn new(
        region_size: i64,
        poll_interval_ms: f64,
        click_cooldown_ms: f64,
        firing_policy: FiringPolicy,
        session_lifetime: SessionLifetime,
    ) -> Self {
        let region_size = region_size.clamp(1, u32::MAX as i64) as u32;

        let poll_interval = millis_to_duration(poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
            .clamp(MIN_POLL_INTERVAL, MAX_INTERVAL);

        let click_cooldown = millis_to_duration(click_cooldown_ms)
            .unwrap_or(DEFAULT_CLICK_COOLDOWN)
            .min(MAX_INTERVAL);

        Self {
            region_size,
            poll_interval,
            click_cooldown,
            firing_policy,
            session_lifetime,
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            click_cooldown: DEFAULT_CLICK_COOLDOWN,
            firing_policy: FiringPolicy::default(),
            session_lifetime: SessionLifetime::default(),
        }
    }
}

/// Отрицательные значения дают ноль, NaN и бесконечность - `None`, слишком большие - `MAX_INTERVAL`
fn millis_to_duration(ms: f64) -> Option<Duration> {
    if !ms.is_finite() {
        return None;
    }
    Some(Duration::try_from_secs_f64(ms.max(0.0) / 1000.0).unwrap_or(MAX_INTERVAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(region_size: i64, poll_ms: f64, cooldown_ms: f64) -> DetectorSettings {
        DetectorSettings::new(
            region_size,
            poll_ms,
            cooldown_ms,
            FiringPolicy::FireOnce,
            SessionLifetime::ReleaseOnTriggerRelease,
        )
    }

    #[test]
    fn test_defaults() {
        let defaults = DetectorSettings::default();
        assert_eq!(defaults.region_size, 50);
        assert_eq!(defaults.poll_interval, Duration::from_millis(5));
        assert_eq!(defaults.click_cooldown, Duration::from_millis(25));
        assert_eq!(defaults, settings(50, 5.0, 25.0));
    }

    #[test]
    fn test_region_size_clamped_to_one() {
        assert_eq!(settings(0, 5.0, 25.0).region_size, 1);
        assert_eq!(settings(-10, 5.0, 25.0).region_size, 1);
        assert_eq!(settings(1, 5.0, 25.0).region_size, 1);
        assert_eq!(settings(2, 5.0, 25.0).region_size, 2);
    }

    #[test]
    fn test_poll_interval_clamped_to_one_millisecond() {
        assert_eq!(settings(50, 0.0, 25.0).poll_interval, Duration::from_millis(1));
        assert_eq!(settings(50, 0.5, 25.0).poll_interval, Duration::from_millis(1));
        assert_eq!(settings(50, -3.0, 25.0).poll_interval, Duration::from_millis(1));
        assert_eq!(settings(50, 1.0, 25.0).poll_interval, Duration::from_millis(1));
        assert_eq!(settings(50, 2.0, 25.0).poll_interval, Duration::from_millis(2));
    }

    #[test]
    fn test_click_cooldown_clamped_to_zero() {
        assert_eq!(settings(50, 5.0, -1.0).click_cooldown, Duration::ZERO);
        assert_eq!(settings(50, 5.0, 0.0).click_cooldown, Duration::ZERO);
        assert_eq!(settings(50, 5.0, 10.0).click_cooldown, Duration::from_millis(10));
    }

    #[test]
    fn test_huge_intervals_capped() {
        let s = settings(50, 1e22, 1e300);
        assert_eq!(s.poll_interval, MAX_INTERVAL);
        assert_eq!(s.click_cooldown, MAX_INTERVAL);
        assert_eq!(settings(50, 5.0, 7_200_000.0).click_cooldown, MAX_INTERVAL);
    }

    #[test]
    fn test_non_finite_intervals_fall_back_to_defaults() {
        let s = settings(50, f64::NAN, f64::INFINITY);
        assert_eq!(s.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(s.click_cooldown, DEFAULT_CLICK_COOLDOWN);
    }
}
