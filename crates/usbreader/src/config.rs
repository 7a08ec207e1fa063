//! 驱动配置
//!
//! 所有取值在模块加载时确定，运行期间不可修改。

use alloc::string::{String, ToString};
use device::UsbDeviceId;

/// 设备节点名
pub const DEVICE_NAME: &str = "usb_reader";
/// 设备类名
pub const CLASS_NAME: &str = "usb";
/// USB 驱动名
pub const DRIVER_NAME: &str = "usb_reader_drv";
/// 转发读取的底层串行设备
pub const USB_DEVICE_PATH: &str = "/dev/ttyACM1";
/// 匹配的厂商号（STMicroelectronics）
pub const VENDOR_ID: u16 = 0x0483;
/// 匹配的产品号（ST-LINK/V2-1）
pub const PRODUCT_ID: u16 = 0x374b;

/// 驱动配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// 每次读取时打开的底层设备路径
    pub relay_path: String,
    /// `/dev` 下的设备节点名
    pub device_name: String,
    /// 设备类名
    pub class_name: String,
    /// 向 USB 核心注册的驱动名
    pub driver_name: String,
    /// 热插拔匹配的设备标识，只用于 probe/disconnect 通知，与数据路径无关
    pub device_id: UsbDeviceId,
}

impl ReaderConfig {
    /// 使用默认值，仅替换底层设备路径
    pub fn with_relay_path(path: &str) -> Self {
        Self {
            relay_path: path.to_string(),
            ..Self::default()
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            relay_path: USB_DEVICE_PATH.to_string(),
            device_name: DEVICE_NAME.to_string(),
            class_name: CLASS_NAME.to_string(),
            driver_name: DRIVER_NAME.to_string(),
            device_id: UsbDeviceId::new(VENDOR_ID, PRODUCT_ID),
        }
    }
}
