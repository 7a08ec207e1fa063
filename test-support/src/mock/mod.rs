//! Mock 实现模块
//!
//! 提供串行设备后端和 USB 接口的 Mock 实现，用于测试

pub mod serial;
pub mod usb;

pub use serial::MockSerialBackend;
pub use usb::{interface, stlink_interface};
