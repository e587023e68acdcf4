use super::frame::Frame;
use super::region::{CaptureRegion, DisplayBounds};
use crate::error::CaptureFault;

/// Источник сессий захвата экрана.
///
/// Сессия открывается в потоке цикла детекции, поэтому от неё не требуется `Send`.
pub trait CaptureBackend: Send + 'static {
    type Session: CaptureSession;

    /// Open a session bound to the primary display
    fn open(&mut self) -> Result<Self::Session, CaptureFault>;
}

/// Открытая сессия захвата. Ресурсы освобождаются в `Drop`.
pub trait CaptureSession {
    /// Geometry of the primary display in absolute coordinates
    fn display_bounds(&self) -> DisplayBounds;

    /// Grab exactly `region` as a 4-byte-per-pixel row-major buffer
    fn grab(&mut self, region: &CaptureRegion) -> Result<Frame, CaptureFault>;
}
