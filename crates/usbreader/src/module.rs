//! 模块加载与卸载
//!
//! 加载顺序：注册 USB 驱动 → 分配主设备号 → 创建设备类 → 创建设备节点。
//! 任一步失败都会撤销之前已完成的步骤；卸载按相反顺序进行。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use device::{ChrdevRegistry, DeviceError, SerialBackend, UsbCore, makedev};
use log::{error, info, warn};

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::hotplug::UsbReaderDriver;
use crate::relay::RelaySource;
use crate::session::{DeviceSession, DeviceState};

/// 已加载的 usb_reader 模块
///
/// 持有设备状态、转发源和热插拔驱动。离开作用域时自动卸载。
pub struct UsbReaderModule {
    config: ReaderConfig,
    state: Arc<DeviceState>,
    relay: Arc<RelaySource>,
    driver: Arc<UsbReaderDriver>,
    usb: Arc<UsbCore>,
    chrdev: Arc<ChrdevRegistry>,
    major: u32,
    loaded: AtomicBool,
}

impl UsbReaderModule {
    /// 加载模块
    pub fn init(
        config: ReaderConfig,
        backend: Arc<dyn SerialBackend>,
        usb: Arc<UsbCore>,
        chrdev: Arc<ChrdevRegistry>,
    ) -> Result<Self, DeviceError> {
        info!("{} - Init Function", config.driver_name);

        let driver = Arc::new(UsbReaderDriver::new(&config.driver_name, config.device_id));
        if let Err(e) = usb.register(driver.clone()) {
            error!("{} - Error during register!", config.driver_name);
            return Err(e);
        }

        let major = match chrdev.register_chrdev(0, &config.device_name) {
            Ok(major) => major,
            Err(e) => {
                error!("Failed to register a major number");
                undo("usb deregister", usb.deregister(&config.driver_name));
                return Err(e);
            }
        };

        if let Err(e) = chrdev.create_class(&config.class_name) {
            error!("Failed to register device class {}", config.class_name);
            undo("unregister chrdev", chrdev.unregister_chrdev(major, &config.device_name));
            undo("usb deregister", usb.deregister(&config.driver_name));
            return Err(e);
        }

        if let Err(e) = chrdev.create_device(&config.class_name, makedev(major, 0), &config.device_name)
        {
            error!("Failed to create the device {}", config.device_name);
            undo("destroy class", chrdev.destroy_class(&config.class_name));
            undo("unregister chrdev", chrdev.unregister_chrdev(major, &config.device_name));
            undo("usb deregister", usb.deregister(&config.driver_name));
            return Err(e);
        }

        let relay = Arc::new(RelaySource::new(config.relay_path.clone(), backend));
        Ok(Self {
            config,
            state: Arc::new(DeviceState::new()),
            relay,
            driver,
            usb,
            chrdev,
            major,
            loaded: AtomicBool::new(true),
        })
    }

    /// 打开设备
    ///
    /// 模块已卸载时返回 [`ReaderError::DeviceUnavailable`]。
    pub fn open(&self) -> Result<DeviceSession, ReaderError> {
        if !self.is_loaded() {
            return Err(ReaderError::DeviceUnavailable);
        }
        DeviceSession::open(self.state.clone(), self.relay.clone())
    }

    /// 卸载模块，重复调用无副作用
    ///
    /// 已打开的会话不受影响，关闭时照常释放设备状态。
    pub fn exit(&self) {
        if !self.loaded.swap(false, Ordering::AcqRel) {
            return;
        }
        let cfg = &self.config;
        undo(
            "destroy device",
            self.chrdev.destroy_device(&cfg.class_name, makedev(self.major, 0)),
        );
        undo("destroy class", self.chrdev.destroy_class(&cfg.class_name));
        undo(
            "unregister chrdev",
            self.chrdev.unregister_chrdev(self.major, &cfg.device_name),
        );
        undo("usb deregister", self.usb.deregister(&cfg.driver_name));
        info!("{} - Exit Function", cfg.driver_name);
    }

    /// 模块是否处于加载状态
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// 分配到的主设备号
    pub fn major(&self) -> u32 {
        self.major
    }

    /// 模块配置
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// 设备状态
    pub fn state(&self) -> &Arc<DeviceState> {
        &self.state
    }

    /// 热插拔驱动
    pub fn driver(&self) -> &Arc<UsbReaderDriver> {
        &self.driver
    }
}

/// 撤销一步注册，失败只记录警告
fn undo(step: &str, result: Result<(), DeviceError>) {
    if let Err(e) = result {
        warn!("usb_reader: {} failed: {}", step, e);
    }
}

impl Drop for UsbReaderModule {
    fn drop(&mut self) {
        self.exit();
    }
}
