//! Detection service: the capture/activation control loop.
//!
//! `DetectionLoop` is the state machine (Idle / Watching / Cooldown) that gates
//! sampling on the trigger, runs white detection and applies the firing policy.
//! `WhiteClicker` owns the worker thread the loop runs on.

mod detection_loop;
mod settings;
mod white_clicker;

#[cfg(test)]
pub(crate) mod test_support;

pub use settings::{DetectorSettings, FiringPolicy, SessionLifetime};
pub use white_clicker::WhiteClicker;
