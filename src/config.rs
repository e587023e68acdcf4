use anyhow::{Context, Result};
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::events::{Emission, KeyCode};
use crate::mappings::KeyNameToEvdevCode;
use crate::services::detection::{DetectorSettings, FiringPolicy, SessionLifetime};

/// Префикс переменных окружения, вложенность через `__`
pub const ENV_PREFIX: &str = "WHITE_CLICK_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub trigger: TriggerConfig,
    pub detection: DetectionConfig,
    pub emit: EmitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    /// Имя кнопки мыши: left, right, middle, side, extra
    pub button: String,
    /// Путь к evdev устройству или "auto"
    pub device_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    pub region_size: i64,
    pub poll_interval_ms: f64,
    pub click_cooldown_ms: f64,
    #[serde(default)]
    pub firing_policy: FiringPolicy,
    #[serde(default)]
    pub session_lifetime: SessionLifetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EmitKind {
    Key,
    Mouse,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmitConfig {
    pub kind: EmitKind,
    pub name: String,
    pub press_duration_ms: u64,
}

/// Значения из командной строки, имеют наивысший приоритет
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub trigger_button: Option<String>,
    pub device_path: Option<String>,
    pub region_size: Option<i64>,
    pub poll_interval_ms: Option<f64>,
    pub click_cooldown_ms: Option<f64>,
    pub firing_policy: Option<FiringPolicy>,
    pub session_lifetime: Option<SessionLifetime>,
    pub emit_kind: Option<EmitKind>,
    pub emit_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            trigger: TriggerConfig {
                button: "extra".to_string(),
                device_path: "auto".to_string(),
            },
            detection: DetectionConfig {
                region_size: 50,
                poll_interval_ms: 5.0,
                click_cooldown_ms: 25.0,
                firing_policy: FiringPolicy::FireOnce,
                session_lifetime: SessionLifetime::ReleaseOnTriggerRelease,
            },
            emit: EmitConfig {
                kind: EmitKind::Key,
                name: "leftalt".to_string(),
                press_duration_ms: 10,
            },
        }
    }
}

impl Config {
    /// Значения по умолчанию, поверх них окружение `WHITE_CLICK_*`, поверх - командная строка.
    /// Конфигурационного файла нет.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Config = figment
            .extract()
            .context("Не удалось загрузить конфигурацию из окружения")?;

        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(button) = &overrides.trigger_button {
            self.trigger.button = button.clone();
        }
        if let Some(path) = &overrides.device_path {
            self.trigger.device_path = path.clone();
        }
        if let Some(size) = overrides.region_size {
            self.detection.region_size = size;
        }
        if let Some(ms) = overrides.poll_interval_ms {
            self.detection.poll_interval_ms = ms;
        }
        if let Some(ms) = overrides.click_cooldown_ms {
            self.detection.click_cooldown_ms = ms;
        }
        if let Some(policy) = overrides.firing_policy {
            self.detection.firing_policy = policy;
        }
        if let Some(lifetime) = overrides.session_lifetime {
            self.detection.session_lifetime = lifetime;
        }
        if let Some(kind) = overrides.emit_kind {
            self.emit.kind = kind;
        }
        if let Some(name) = &overrides.emit_name {
            self.emit.name = name.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        self.trigger_button()?;
        self.emission()?;

        if self.trigger.device_path.is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }

        // Числовые параметры ограничиваются, а не отвергаются; NaN здесь - опечатка в окружении
        if self.detection.poll_interval_ms.is_nan() || self.detection.click_cooldown_ms.is_nan() {
            anyhow::bail!("poll_interval_ms и click_cooldown_ms должны быть числами");
        }

        Ok(())
    }

    pub fn trigger_button(&self) -> Result<KeyCode> {
        let code = KeyNameToEvdevCode::translate_mouse_button(&self.trigger.button)
            .map_err(|e| anyhow::anyhow!("Неверная кнопка триггера: {}", e))?;
        Ok(KeyCode(code))
    }

    pub fn emission(&self) -> Result<Emission> {
        let emission = match self.emit.kind {
            EmitKind::Key => KeyNameToEvdevCode::translate(&self.emit.name)
                .map(|code| Emission::Key(KeyCode(code))),
            EmitKind::Mouse => KeyNameToEvdevCode::translate_mouse_button(&self.emit.name)
                .map(|code| Emission::MouseButton(KeyCode(code))),
        };

        emission.map_err(|e| anyhow::anyhow!("Неверное имя для {:?}: {}", self.emit.kind, e))
    }

    pub fn press_duration(&self) -> Duration {
        Duration::from_millis(self.emit.press_duration_ms)
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings::new(
            self.detection.region_size,
            self.detection.poll_interval_ms,
            self.detection.click_cooldown_ms,
            self.detection.firing_policy,
            self.detection.session_lifetime,
        )
    }
}
