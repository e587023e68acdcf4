//! Захват экрана через `xcap`.
//!
//! xcap отдаёт RGBA, для детекции порядок цветовых каналов не важен.

use tracing::{debug, info};
use xcap::Monitor;

use super::frame::Frame;
use super::r#trait::{CaptureBackend, CaptureSession};
use super::region::{CaptureRegion, DisplayBounds};
use crate::error::{CaptureFault, Result};

/// Бэкенд захвата основного монитора
#[derive(Debug, Default)]
pub struct XcapCapture;

impl XcapCapture {
    pub fn new() -> Self {
        Self
    }

    /// Проверка при запуске: основной монитор существует и отдаёт геометрию
    pub fn probe(&mut self) -> Result<DisplayBounds> {
        let session = self.open()?;
        let bounds = session.display_bounds();
        info!("Основной монитор: {}", bounds);
        Ok(bounds)
    }

    fn primary_monitor() -> std::result::Result<Monitor, CaptureFault> {
        let monitors = Monitor::all().map_err(|e| CaptureFault::Stale(e.to_string()))?;

        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(monitor);
            }
            if fallback.is_none() {
                fallback = Some(monitor);
            }
        }

        // Если ни один монитор не помечен основным, берём первый
        fallback.ok_or(CaptureFault::NoDisplay)
    }
}

impl CaptureBackend for XcapCapture {
    type Session = XcapSession;

    fn open(&mut self) -> std::result::Result<XcapSession, CaptureFault> {
        let monitor = Self::primary_monitor()?;
        let stale = |e: xcap::XCapError| CaptureFault::Stale(e.to_string());

        let bounds = DisplayBounds::new(
            monitor.x().map_err(stale)?,
            monitor.y().map_err(stale)?,
            monitor.width().map_err(stale)?,
            monitor.height().map_err(stale)?,
        );

        debug!("Открыта сессия захвата для монитора {}", bounds);
        Ok(XcapSession { monitor, bounds })
    }
}

pub struct XcapSession {
    monitor: Monitor,
    bounds: DisplayBounds,
}

/// Координаты области относительно начала монитора
fn relative_origin(
    bounds: &DisplayBounds,
    region: &CaptureRegion,
) -> std::result::Result<(u32, u32), CaptureFault> {
    let x = u32::try_from(region.left as i64 - bounds.left as i64);
    let y = u32::try_from(region.top as i64 - bounds.top as i64);

    match (x, y) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(CaptureFault::OutOfBounds {
            left: region.left,
            top: region.top,
            width: region.width,
            height: region.height,
        }),
    }
}

impl CaptureSession for XcapSession {
    fn display_bounds(&self) -> DisplayBounds {
        self.bounds
    }

    fn grab(&mut self, region: &CaptureRegion) -> std::result::Result<Frame, CaptureFault> {
        let (x, y) = relative_origin(&self.bounds, region)?;

        let image = self
            .monitor
            .capture_region(x, y, region.width, region.height)
            .map_err(|e| CaptureFault::Stale(e.to_string()))?;

        let (width, height) = (image.width(), image.height());
        Frame::new(width, height, image.into_raw())
    }
}

impl Drop for XcapSession {
    fn drop(&mut self) {
        debug!("Сессия захвата закрыта");
    }
}
