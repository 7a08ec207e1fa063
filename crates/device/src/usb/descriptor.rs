//! USB 描述符
//!
//! 字段名沿用 USB 2.0 规范，便于与 lsusb 输出对照。

use core::fmt;

/// 接口描述符（USB 2.0 表 9-12）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsbInterfaceDescriptor {
    /// 描述符长度，固定为 9
    pub b_length: u8,
    /// 描述符类型，接口为 0x04
    pub b_descriptor_type: u8,
    /// 接口号
    pub b_interface_number: u8,
    /// 备用设置号
    pub b_alternate_setting: u8,
    /// 端点数（不含端点 0）
    pub b_num_endpoints: u8,
    /// 接口类
    pub b_interface_class: u8,
    /// 接口子类
    pub b_interface_sub_class: u8,
    /// 接口协议
    pub b_interface_protocol: u8,
    /// 接口字符串索引
    pub i_interface: u8,
}

/// 端点描述符（USB 2.0 表 9-13）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsbEndpointDescriptor {
    /// 描述符长度，固定为 7
    pub b_length: u8,
    /// 描述符类型，端点为 0x05
    pub b_descriptor_type: u8,
    /// 端点地址，bit 7 为方向
    pub b_endpoint_address: u8,
    /// 传输类型等属性
    pub bm_attributes: u8,
    /// 最大包长
    pub w_max_packet_size: u16,
    /// 轮询间隔
    pub b_interval: u8,
}

impl UsbInterfaceDescriptor {
    /// 接口描述符类型
    pub const DESCRIPTOR_TYPE: u8 = 0x04;
    /// 接口描述符长度
    pub const LENGTH: u8 = 9;
}

impl UsbEndpointDescriptor {
    /// 端点描述符类型
    pub const DESCRIPTOR_TYPE: u8 = 0x05;
    /// 端点描述符长度
    pub const LENGTH: u8 = 7;

    /// 是否为 IN 端点
    pub fn is_in(&self) -> bool {
        self.b_endpoint_address & 0x80 != 0
    }
}

impl fmt::Display for UsbInterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USB_INTERFACE_DESCRIPTOR:")?;
        writeln!(f, "-----------------------------")?;
        writeln!(f, "bLength: {:#x}", self.b_length)?;
        writeln!(f, "bDescriptorType: {:#x}", self.b_descriptor_type)?;
        writeln!(f, "bInterfaceNumber: {:#x}", self.b_interface_number)?;
        writeln!(f, "bAlternateSetting: {:#x}", self.b_alternate_setting)?;
        writeln!(f, "bNumEndpoints: {:#x}", self.b_num_endpoints)?;
        writeln!(f, "bInterfaceClass: {:#x}", self.b_interface_class)?;
        writeln!(f, "bInterfaceSubClass: {:#x}", self.b_interface_sub_class)?;
        writeln!(f, "bInterfaceProtocol: {:#x}", self.b_interface_protocol)?;
        write!(f, "iInterface: {:#x}", self.i_interface)
    }
}

impl fmt::Display for UsbEndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USB_ENDPOINT_DESCRIPTOR:")?;
        writeln!(f, "------------------------")?;
        writeln!(f, "bLength: {:#x}", self.b_length)?;
        writeln!(f, "bDescriptorType: {:#x}", self.b_descriptor_type)?;
        writeln!(f, "bEndPointAddress: {:#x}", self.b_endpoint_address)?;
        writeln!(f, "bmAttributes: {:#x}", self.bm_attributes)?;
        writeln!(f, "wMaxPacketSize: {:#x}", self.w_max_packet_size)?;
        write!(f, "bInterval: {:#x}", self.b_interval)
    }
}
