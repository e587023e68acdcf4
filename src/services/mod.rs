pub mod capture;
pub mod detection;
pub mod trigger_monitor;
pub mod virtual_device;

pub use capture::XcapCapture;
pub use detection::WhiteClicker;
pub use trigger_monitor::{create_trigger_monitor, TriggerState};
pub use virtual_device::VirtualDevice;
