//! USB 驱动模块
//!
//! 包含设备 ID 匹配表、描述符、[`UsbDriver`] 接口和负责热插拔分发的 [`UsbCore`]。
//! 此处只处理 probe/disconnect 通知，不涉及传输描述符。

mod descriptor;
mod usb_core;

use alloc::vec::Vec;

use crate::driver::Driver;
use crate::error::DeviceError;

pub use descriptor::{UsbEndpointDescriptor, UsbInterfaceDescriptor};
pub use usb_core::UsbCore;

/// USB 设备标识（厂商号/产品号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbDeviceId {
    /// idVendor
    pub vendor: u16,
    /// idProduct
    pub product: u16,
}

impl UsbDeviceId {
    /// 构造匹配指定厂商号和产品号的 ID
    pub const fn new(vendor: u16, product: u16) -> Self {
        Self { vendor, product }
    }

    /// 接口所在设备是否与此 ID 匹配
    pub fn matches(&self, intf: &UsbInterface) -> bool {
        *self == intf.device
    }
}

/// 已枚举的 USB 接口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbInterface {
    /// 设备所在的总线端口
    pub port: u8,
    /// 所属设备的厂商号/产品号
    pub device: UsbDeviceId,
    /// 接口描述符
    pub descriptor: UsbInterfaceDescriptor,
    /// 端点描述符，顺序与设备上报一致
    pub endpoints: Vec<UsbEndpointDescriptor>,
}

impl UsbInterface {
    /// 接口在总线上的唯一键 (端口, 接口号)
    pub fn key(&self) -> (u8, u8) {
        (self.port, self.descriptor.b_interface_number)
    }
}

/// USB 接口驱动
pub trait UsbDriver: Driver {
    /// 驱动名，注册表中唯一
    fn name(&self) -> &str;

    /// 驱动支持的设备 ID 表
    fn id_table(&self) -> &[UsbDeviceId];

    /// 匹配的接口出现时调用
    ///
    /// 返回错误表示驱动不接管此接口，USB 核心会继续尝试其它驱动。
    fn probe(&self, intf: &UsbInterface, id: &UsbDeviceId) -> Result<(), DeviceError>;

    /// 已绑定的接口离开或驱动注销时调用
    fn disconnect(&self, intf: &UsbInterface);
}
