//! usb_reader 字符设备
//!
//! 向调用方暴露一个同一时刻只允许一个打开者的字节流设备，
//! 每次读取时从底层串行设备（默认 `/dev/ttyACM1`）转发数据。
//!
//! # 组件
//!
//! - [`ExclusivityGate`] - 单打开者控制，锁只覆盖检查与计数修改
//! - [`RelaySource`] - 打开底层设备、单次有界读取、关闭
//! - [`DeviceSession`] - 一次 open/read*/close 的会话，驱动读路径状态机
//! - [`transfer`] - 从驱动缓冲区到调用方缓冲区的边界拷贝
//! - [`UsbReaderDriver`] - USB probe/disconnect 钩子，仅做记录
//! - [`UsbReaderModule`] - 模块加载/卸载，串起上述组件
//!
//! 热插拔钩子和读路径之间没有共享状态：设备拔出不会使进行中的会话失效。

#![no_std]

extern crate alloc;

mod buffer;
mod config;
mod error;
mod gate;
mod hotplug;
mod module;
mod relay;
mod session;
pub mod transfer;

pub use buffer::{BufferLedger, InternalBuffer};
pub use config::{
    CLASS_NAME, DEVICE_NAME, DRIVER_NAME, PRODUCT_ID, ReaderConfig, USB_DEVICE_PATH, VENDOR_ID,
};
pub use error::ReaderError;
pub use gate::ExclusivityGate;
pub use hotplug::UsbReaderDriver;
pub use module::UsbReaderModule;
pub use relay::{RelayHandle, RelaySource};
pub use session::{DeviceSession, DeviceState};
pub use transfer::{TransferFault, UserBuffer};
