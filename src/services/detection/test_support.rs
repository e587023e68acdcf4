//! Test doubles for the capture provider and the input backend.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::settings::{DetectorSettings, FiringPolicy, SessionLifetime};
use crate::error::{CaptureFault, ClickerError, Result};
use crate::events::{Emission, KeyCode};
use crate::services::capture::{CaptureBackend, CaptureRegion, CaptureSession, DisplayBounds, Frame};
use crate::services::trigger_monitor::TriggerState;
use crate::services::virtual_device::InputEmitter;

pub const TRIGGER: KeyCode = KeyCode(0x114);
pub const EMISSION: Emission = Emission::Key(KeyCode(56));

const WHITE: [u8; 4] = [255, 255, 255, 0];
const BLACK: [u8; 4] = [0, 0, 0, 255];

pub fn fast_settings(firing_policy: FiringPolicy) -> DetectorSettings {
    DetectorSettings {
        region_size: 50,
        poll_interval: Duration::from_millis(1),
        click_cooldown: Duration::from_millis(1),
        firing_policy,
        session_lifetime: SessionLifetime::ReleaseOnTriggerRelease,
    }
}

/// Ждать выполнения условия не дольше `timeout`
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[derive(Default)]
pub struct Stats {
    opens: AtomicUsize,
    drops: AtomicUsize,
    grabs: AtomicUsize,
    emit_attempts: AtomicUsize,
    fail_emits: AtomicBool,
    last_region: Mutex<Option<CaptureRegion>>,
    emitted: Mutex<Vec<(Emission, Instant)>>,
}

impl Stats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn grabs(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }

    pub fn emit_attempts(&self) -> usize {
        self.emit_attempts.load(Ordering::SeqCst)
    }

    pub fn fail_emits(&self, fail: bool) {
        self.fail_emits.store(fail, Ordering::SeqCst);
    }

    pub fn last_region(&self) -> Option<CaptureRegion> {
        *self.last_region.lock()
    }

    pub fn emitted(&self) -> Vec<(Emission, Instant)> {
        self.emitted.lock().clone()
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted.lock().len()
    }
}

/// Результаты захвата: сначала сценарий, затем `white` для всех последующих кадров
pub struct FakeCapture {
    stats: Arc<Stats>,
    script: Arc<Mutex<VecDeque<std::result::Result<bool, CaptureFault>>>>,
    white: Arc<AtomicBool>,
    failing_opens: usize,
}

impl FakeCapture {
    fn new(stats: &Arc<Stats>, white: bool) -> Self {
        Self {
            stats: Arc::clone(stats),
            script: Arc::new(Mutex::new(VecDeque::new())),
            white: Arc::new(AtomicBool::new(white)),
            failing_opens: 0,
        }
    }

    pub fn white(stats: &Arc<Stats>) -> Self {
        Self::new(stats, true)
    }

    pub fn black(stats: &Arc<Stats>) -> Self {
        Self::new(stats, false)
    }

    pub fn scripted(stats: &Arc<Stats>, script: Vec<std::result::Result<bool, CaptureFault>>) -> Self {
        let capture = Self::new(stats, false);
        capture.script.lock().extend(script);
        capture
    }

    pub fn failing_opens(mut self, count: usize) -> Self {
        self.failing_opens = count;
        self
    }

    pub fn white_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.white)
    }
}

impl CaptureBackend for FakeCapture {
    type Session = FakeSession;

    fn open(&mut self) -> std::result::Result<FakeSession, CaptureFault> {
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(CaptureFault::NoDisplay);
        }

        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            stats: Arc::clone(&self.stats),
            script: Arc::clone(&self.script),
            white: Arc::clone(&self.white),
        })
    }
}

pub struct FakeSession {
    stats: Arc<Stats>,
    script: Arc<Mutex<VecDeque<std::result::Result<bool, CaptureFault>>>>,
    white: Arc<AtomicBool>,
}

impl CaptureSession for FakeSession {
    fn display_bounds(&self) -> DisplayBounds {
        DisplayBounds::new(0, 0, 1920, 1080)
    }

    fn grab(&mut self, region: &CaptureRegion) -> std::result::Result<Frame, CaptureFault> {
        self.stats.grabs.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_region.lock() = Some(*region);

        let white = match self.script.lock().pop_front() {
            Some(result) => result?,
            None => self.white.load(Ordering::SeqCst),
        };

        let pixel = if white { WHITE } else { BLACK };
        Ok(Frame::filled(region.width, region.height, pixel))
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.stats.drops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RecordingEmitter {
    stats: Arc<Stats>,
    retap: Mutex<Option<Arc<TriggerState>>>,
}

impl RecordingEmitter {
    pub fn new(stats: Arc<Stats>) -> Self {
        Self {
            stats,
            retap: Mutex::new(None),
        }
    }

    /// Во время первой отправки триггер отпускается и сразу нажимается снова
    pub fn retapping(stats: Arc<Stats>, state: Arc<TriggerState>) -> Self {
        Self {
            stats,
            retap: Mutex::new(Some(state)),
        }
    }
}

impl InputEmitter for RecordingEmitter {
    fn emit(&self, emission: Emission) -> Result<()> {
        self.stats.emit_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(state) = self.retap.lock().take() {
            state.on_event(TRIGGER, false);
            state.on_event(TRIGGER, true);
        }
        if self.stats.fail_emits.load(Ordering::SeqCst) {
            return Err(ClickerError::Internal("uinput недоступен".to_string()));
        }

        self.stats.emitted.lock().push((emission, Instant::now()));
        Ok(())
    }
}
