//! USB 核心：驱动注册与热插拔分发

use alloc::{string::String, sync::Arc, vec::Vec};
use log::{debug, info};
use sync::SpinLock;

use super::{UsbDriver, UsbInterface};
use crate::error::DeviceError;

struct Binding {
    intf: UsbInterface,
    driver: Arc<dyn UsbDriver>,
}

/// probe 成功后提交绑定的结果
enum Commit {
    Bound,
    /// 探测期间接口已离开
    Detached,
    /// 探测期间驱动已注销
    Deregistered,
}

/// USB 核心
///
/// 维护已注册的驱动、在位的接口以及接口到驱动的绑定关系。
/// 回调驱动（probe/disconnect）时不持有任何内部锁，驱动可以在回调中再次访问 UsbCore。
/// 同一接口同时只有一个线程在探测，探测期间的注册、注销和接口离开在提交绑定时复核。
///
/// 锁顺序：`bindings` → `interfaces` / `drivers` / `probing`。
#[derive(Default)]
pub struct UsbCore {
    drivers: SpinLock<Vec<Arc<dyn UsbDriver>>>,
    interfaces: SpinLock<Vec<UsbInterface>>,
    bindings: SpinLock<Vec<Binding>>,
    probing: SpinLock<Vec<(u8, u8)>>,
}

impl UsbCore {
    /// 创建空的 USB 核心
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册驱动
    ///
    /// 注册后立即尝试绑定已在位但尚未绑定的接口。
    pub fn register(&self, driver: Arc<dyn UsbDriver>) -> Result<(), DeviceError> {
        {
            let mut drivers = self.drivers.lock();
            if drivers.iter().any(|d| d.name() == driver.name()) {
                return Err(DeviceError::AlreadyExists);
            }
            drivers.push(driver.clone());
        }
        info!("usbcore: registered new interface driver {}", driver.name());

        let unbound: Vec<UsbInterface> = {
            let bindings = self.bindings.lock();
            self.interfaces
                .lock()
                .iter()
                .filter(|i| !bindings.iter().any(|b| b.intf.key() == i.key()))
                .cloned()
                .collect()
        };
        for intf in unbound {
            self.try_bind(&intf);
        }
        Ok(())
    }

    /// 注销驱动，对其绑定的每个接口调用 disconnect
    pub fn deregister(&self, name: &str) -> Result<(), DeviceError> {
        {
            let mut drivers = self.drivers.lock();
            let pos = drivers
                .iter()
                .position(|d| d.name() == name)
                .ok_or(DeviceError::NotFound)?;
            drivers.remove(pos);
        }

        let released: Vec<Binding> = {
            let mut bindings = self.bindings.lock();
            let (released, kept): (Vec<Binding>, Vec<Binding>) = core::mem::take(&mut *bindings)
                .into_iter()
                .partition(|b| b.driver.name() == name);
            *bindings = kept;
            released
        };
        for binding in released {
            binding.driver.disconnect(&binding.intf);
        }
        info!("usbcore: deregistering interface driver {}", name);
        Ok(())
    }

    /// 接口出现
    ///
    /// # 返回值
    /// 接管该接口的驱动名；没有驱动匹配时返回 `None`
    pub fn attach(&self, intf: UsbInterface) -> Result<Option<String>, DeviceError> {
        {
            let mut interfaces = self.interfaces.lock();
            if interfaces.iter().any(|i| i.key() == intf.key()) {
                return Err(DeviceError::AlreadyExists);
            }
            interfaces.push(intf.clone());
        }
        debug!(
            "usbcore: new interface {:04x}:{:04x} on port {}",
            intf.device.vendor, intf.device.product, intf.port
        );
        Ok(self.try_bind(&intf))
    }

    /// 接口离开，若已绑定则调用对应驱动的 disconnect
    pub fn detach(&self, intf: &UsbInterface) -> Result<(), DeviceError> {
        let key = intf.key();
        {
            let mut interfaces = self.interfaces.lock();
            let pos = interfaces
                .iter()
                .position(|i| i.key() == key)
                .ok_or(DeviceError::NotFound)?;
            interfaces.remove(pos);
        }

        let binding = {
            let mut bindings = self.bindings.lock();
            bindings
                .iter()
                .position(|b| b.intf.key() == key)
                .map(|pos| bindings.remove(pos))
        };
        if let Some(binding) = binding {
            binding.driver.disconnect(&binding.intf);
        }
        Ok(())
    }

    /// 查询接口当前绑定的驱动名
    pub fn bound_driver(&self, intf: &UsbInterface) -> Option<String> {
        self.bindings
            .lock()
            .iter()
            .find(|b| b.intf.key() == intf.key())
            .map(|b| String::from(b.driver.name()))
    }

    /// 在位接口数
    pub fn interface_count(&self) -> usize {
        self.interfaces.lock().len()
    }

    fn try_bind(&self, intf: &UsbInterface) -> Option<String> {
        let key = intf.key();
        {
            let bindings = self.bindings.lock();
            let mut probing = self.probing.lock();
            if bindings.iter().any(|b| b.intf.key() == key) || probing.contains(&key) {
                return None;
            }
            probing.push(key);
        }

        // 每轮重新读取驱动表，探测期间新注册的驱动也有机会
        let mut tried: Vec<String> = Vec::new();
        let bound = loop {
            let next = self
                .drivers
                .lock()
                .iter()
                .filter(|d| !tried.iter().any(|t| t == d.name()))
                .find_map(|d| {
                    d.id_table()
                        .iter()
                        .find(|id| id.matches(intf))
                        .map(|id| (d.clone(), *id))
                });
            let Some((driver, id)) = next else {
                break None;
            };
            tried.push(String::from(driver.name()));

            if let Err(e) = driver.probe(intf, &id) {
                debug!("usbcore: probe of {} failed: {}", driver.name(), e);
                continue;
            }
            match self.commit(intf, &driver) {
                Commit::Bound => {
                    debug!("usbcore: {} bound to port {}", driver.get_id(), intf.port);
                    break Some(String::from(driver.name()));
                }
                Commit::Detached => {
                    debug!("usbcore: port {} left while {} probed it", intf.port, driver.name());
                    driver.disconnect(intf);
                    break None;
                }
                Commit::Deregistered => {
                    debug!("usbcore: {} deregistered during probe", driver.name());
                    driver.disconnect(intf);
                }
            }
        };

        self.probing.lock().retain(|k| *k != key);
        bound
    }

    fn commit(&self, intf: &UsbInterface, driver: &Arc<dyn UsbDriver>) -> Commit {
        let key = intf.key();
        let mut bindings = self.bindings.lock();
        if !self.interfaces.lock().iter().any(|i| i.key() == key) {
            return Commit::Detached;
        }
        if !self.drivers.lock().iter().any(|d| d.name() == driver.name()) {
            return Commit::Deregistered;
        }
        bindings.push(Binding {
            intf: intf.clone(),
            driver: driver.clone(),
        });
        Commit::Bound
    }
}
