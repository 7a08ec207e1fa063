//! USB 接口构造工具

use alloc::vec;

use device::{UsbDeviceId, UsbEndpointDescriptor, UsbInterface, UsbInterfaceDescriptor};

/// 构造一个带两个 bulk 端点的 CDC 数据接口
pub fn interface(port: u8, device: UsbDeviceId) -> UsbInterface {
    let bulk = |address: u8| UsbEndpointDescriptor {
        b_length: UsbEndpointDescriptor::LENGTH,
        b_descriptor_type: UsbEndpointDescriptor::DESCRIPTOR_TYPE,
        b_endpoint_address: address,
        bm_attributes: 0x02,
        w_max_packet_size: 64,
        b_interval: 0,
    };
    UsbInterface {
        port,
        device,
        descriptor: UsbInterfaceDescriptor {
            b_length: UsbInterfaceDescriptor::LENGTH,
            b_descriptor_type: UsbInterfaceDescriptor::DESCRIPTOR_TYPE,
            b_interface_number: 1,
            b_alternate_setting: 0,
            b_num_endpoints: 2,
            b_interface_class: 0x0a,
            b_interface_sub_class: 0,
            b_interface_protocol: 0,
            i_interface: 0,
        },
        endpoints: vec![bulk(0x81), bulk(0x01)],
    }
}

/// ST-LINK/V2-1 (0483:374b) 的虚拟串口接口
pub fn stlink_interface(port: u8) -> UsbInterface {
    interface(port, UsbDeviceId::new(0x0483, 0x374b))
}
