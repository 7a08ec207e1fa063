//! 设备驱动框架
//!
//! 此 crate 提供设备驱动的抽象接口和通用实现，包括：
//!
//! - [`Driver`] trait - 设备驱动基础接口
//! - [`UsbDriver`] trait 与 [`UsbCore`] - USB 驱动注册、匹配与热插拔分发
//! - [`ChrdevRegistry`] - 字符设备主设备号、设备类与设备节点登记
//! - [`SerialBackend`] / [`SerialFile`] - 串行设备文件的打开与读取接口
//!
//! # 架构解耦
//!
//! 所有注册表都是显式持有的对象，由使用方创建并以 `Arc` 共享，
//! 不存在隐式的全局状态。

#![no_std]
#![allow(clippy::module_inception)]

extern crate alloc;

pub mod chrdev;
pub mod driver;
pub mod error;
pub mod serial;
pub mod usb;

// Re-export driver
pub use driver::{DeviceType, Driver};

// Re-export error
pub use error::DeviceError;

// Re-export chrdev
pub use chrdev::{ChrdevRegistry, major, makedev, minor};

// Re-export serial
pub use serial::{SerialBackend, SerialFile};

// Re-export usb
pub use usb::{
    UsbCore, UsbDeviceId, UsbDriver, UsbEndpointDescriptor, UsbInterface, UsbInterfaceDescriptor,
};
