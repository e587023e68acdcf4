//! Capture service: responsibility and boundaries
//!
//! This module only knows how to open a capture session for the primary display,
//! grab a rectangle from it and test the pixels for pure white. Deciding when to
//! sample and what to do with the result belongs to the detection loop.

mod frame;
mod region;
mod r#trait;
mod xcap_capture;

pub use self::frame::{capture_has_white, Frame};
pub use self::r#trait::{CaptureBackend, CaptureSession};
pub use self::region::{CaptureRegion, DisplayBounds};
pub use self::xcap_capture::XcapCapture;
