//! TriggerMonitor service: responsibility and boundaries
//!
//! This module only tracks whether the designated pointing-device button is held
//! and wakes the detection loop when it becomes held. It never touches the
//! capture session and never emits input.

mod dry_trigger_monitor;
mod trigger_monitor;
mod trigger_state;
mod r#trait;

pub use self::r#trait::create_trigger_monitor;
pub use self::trigger_state::TriggerState;
