//! USB 热插拔钩子
//!
//! probe/disconnect 只做记录，不影响任何会话。
//! 设备拔出时进行中的会话不会失效，下次读取照常打开底层设备。

use alloc::{format, string::String, vec::Vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use device::{DeviceError, DeviceType, Driver, UsbDeviceId, UsbDriver, UsbInterface};
use log::{debug, info};

/// usb_reader 的 USB 驱动
pub struct UsbReaderDriver {
    name: String,
    id_table: Vec<UsbDeviceId>,
    attached: AtomicUsize,
}

impl UsbReaderDriver {
    /// 创建匹配 `id` 的驱动
    pub fn new(name: &str, id: UsbDeviceId) -> Self {
        Self {
            name: String::from(name),
            id_table: alloc::vec![id],
            attached: AtomicUsize::new(0),
        }
    }

    /// 当前已接管的接口数
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::Acquire)
    }

    /// 匹配的设备出现
    pub fn on_attach(&self, intf: &UsbInterface) {
        info!("{} - Probe Function", self.name);
        info!("Device connected");
        debug!("{}", intf.descriptor);
        for ep in &intf.endpoints {
            debug!("{}", ep);
        }
        self.attached.fetch_add(1, Ordering::AcqRel);
    }

    /// 设备离开
    pub fn on_detach(&self, _intf: &UsbInterface) {
        info!("{} - Disconnect Function", self.name);
        info!("Device disconnected");
        let _ = self
            .attached
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

impl Driver for UsbReaderDriver {
    fn device_type(&self) -> DeviceType {
        DeviceType::Usb
    }

    fn get_id(&self) -> String {
        let id = self.id_table[0];
        format!("{}@{:04x}:{:04x}", self.name, id.vendor, id.product)
    }
}

impl UsbDriver for UsbReaderDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn id_table(&self) -> &[UsbDeviceId] {
        &self.id_table
    }

    fn probe(&self, intf: &UsbInterface, _id: &UsbDeviceId) -> Result<(), DeviceError> {
        self.on_attach(intf);
        Ok(())
    }

    fn disconnect(&self, intf: &UsbInterface) {
        self.on_detach(intf);
    }
}
