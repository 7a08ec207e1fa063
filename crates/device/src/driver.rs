//! 设备驱动基础类型
//!
//! 包含 Driver trait 和 DeviceType 枚举

use alloc::string::String;

/// 设备类型枚举
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeviceType {
    /// USB 接口驱动
    Usb,
    /// 字符设备
    Char,
    /// 串行设备
    Serial,
}

/// 设备驱动程序特征
pub trait Driver: Send + Sync {
    /// 返回对应的设备类型，请参阅 DeviceType
    fn device_type(&self) -> DeviceType;

    /// 获取此驱动的唯一标识符
    /// 每个实例的标识符应该不同
    fn get_id(&self) -> String;
}
