use anyhow::{anyhow, Result};
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::{Config, ConfigOverrides, EmitKind};
use services::detection::{FiringPolicy, SessionLifetime};
use services::{create_trigger_monitor, TriggerState, VirtualDevice, WhiteClicker, XcapCapture};

#[derive(Parser, Debug)]
#[command(name = "white-click")]
#[command(about = "Нажимает клавишу при появлении белых пикселей в центре экрана, пока удерживается кнопка мыши")]
struct Args {
    /// Кнопка-триггер: left, right, middle, side, extra
    #[arg(long)]
    trigger_button: Option<String>,

    /// Путь к evdev устройству мыши или "auto"
    #[arg(long)]
    device: Option<String>,

    /// Сторона квадрата захвата в пикселях
    #[arg(long, allow_hyphen_values = true)]
    region_size: Option<i64>,

    /// Интервал опроса, мс
    #[arg(long, allow_hyphen_values = true)]
    poll_interval_ms: Option<f64>,

    /// Пауза после срабатывания, мс
    #[arg(long, allow_hyphen_values = true)]
    click_cooldown_ms: Option<f64>,

    /// Политика срабатывания
    #[arg(long, value_enum)]
    firing_policy: Option<FiringPolicy>,

    /// Время жизни сессии захвата
    #[arg(long, value_enum)]
    session_lifetime: Option<SessionLifetime>,

    /// Что отправлять: клавишу или кнопку мыши
    #[arg(long, value_enum)]
    emit_kind: Option<EmitKind>,

    /// Имя клавиши (leftalt, space, ...) или кнопки мыши (left, right, ...)
    #[arg(long)]
    emit_name: Option<String>,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            log_level: self.log_level.clone(),
            trigger_button: self.trigger_button.clone(),
            device_path: self.device.clone(),
            region_size: self.region_size,
            poll_interval_ms: self.poll_interval_ms,
            click_cooldown_ms: self.click_cooldown_ms,
            firing_policy: self.firing_policy,
            session_lifetime: self.session_lifetime,
            emit_kind: self.emit_kind,
            emit_name: self.emit_name.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации (окружение + командная строка)
    let config = Arc::new(Config::load(&args.overrides())?);

    // Инициализация системы логирования
    init_tracing(&config.logging.level)?;

    info!("Запуск white-click v{}", env!("CARGO_PKG_VERSION"));

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Проверка прав доступа
    if let Err(e) = utils::permissions::check_permissions(args.dry_run) {
        for line in utils::permissions::get_setup_commands() {
            warn!("{}", line);
        }
        return Err(e.into());
    }

    // Основной монитор должен существовать до входа в цикл
    let mut capture = XcapCapture::new();
    capture.probe()?;

    let settings = config.detector_settings();
    let emission = config.emission()?;
    let trigger_state = Arc::new(TriggerState::new(config.trigger_button()?));

    let virtual_device = VirtualDevice::new("white-click Virtual Device", config.press_duration(), args.dry_run)?;
    let trigger_monitor = create_trigger_monitor(config.clone(), trigger_state.clone(), args.dry_run)?;

    let mut clicker = WhiteClicker::new(settings, emission, trigger_state.clone());
    clicker.start(capture, virtual_device)?;

    info!("Все компоненты инициализированы");

    let mut monitor_handle = tokio::spawn(async move { trigger_monitor.run().await });

    info!("Удерживайте {} для активации", trigger_state.trigger());

    let cause = wait_for_shutdown(signal::ctrl_c(), &mut monitor_handle).await;

    info!("Завершение работы...");

    // Сначала цикл детекции: он освобождает сессию захвата и клавиши в своём потоке
    tokio::task::block_in_place(|| clicker.stop());

    // Монитор больше не доставляет события
    if let ShutdownCause::Signal = cause {
        monitor_handle.abort();
        let _ = monitor_handle.await;
    }
    trigger_state.force_release();

    match cause {
        ShutdownCause::Signal => {
            info!("white-click завершил работу");
            Ok(())
        }
        ShutdownCause::MonitorExited(e) => {
            error!("white-click остановлен: {}", e);
            Err(e)
        }
    }
}

#[derive(Debug)]
enum ShutdownCause {
    Signal,
    /// Без монитора триггера работа невозможна
    MonitorExited(anyhow::Error),
}

/// Ждать сигнала завершения или выхода монитора триггера
async fn wait_for_shutdown(
    shutdown: impl Future<Output = std::io::Result<()>>,
    monitor: &mut JoinHandle<error::Result<()>>,
) -> ShutdownCause {
    tokio::select! {
        result = shutdown => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            ShutdownCause::Signal
        }
        joined = monitor => {
            let e = match joined {
                Ok(Ok(())) => anyhow!("TriggerMonitor завершился без ошибки"),
                Ok(Err(e)) => anyhow::Error::new(e).context("Ошибка в TriggerMonitor"),
                Err(e) => anyhow::Error::new(e).context("Задача TriggerMonitor аварийно завершилась"),
            };
            ShutdownCause::MonitorExited(e)
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
