//! 字符设备登记
//!
//! 记录主设备号、设备类和 `/dev` 设备节点三张表。
//! 主设备号传 0 时动态分配，规则与 Linux 相同：从 254 向下查找空闲号，直到 234。

use alloc::{format, string::String, vec::Vec};
use log::{debug, warn};
use sync::SpinLock;

use crate::error::DeviceError;

/// 动态分配的起始主设备号（含）
pub const DYNAMIC_MAJOR_START: u32 = 254;
/// 动态分配的最小主设备号（含）
pub const DYNAMIC_MAJOR_END: u32 = 234;

/// 由主次设备号构造设备号（glibc 编码）
pub const fn makedev(major: u32, minor: u32) -> u64 {
    let major = major as u64;
    let minor = minor as u64;
    ((major & 0xffff_f000) << 32)
        | ((major & 0x0000_0fff) << 8)
        | ((minor & 0xffff_ff00) << 12)
        | (minor & 0x0000_00ff)
}

/// 提取主设备号
pub const fn major(dev: u64) -> u32 {
    (((dev >> 32) & 0xffff_f000) | ((dev >> 8) & 0x0000_0fff)) as u32
}

/// 提取次设备号
pub const fn minor(dev: u64) -> u32 {
    (((dev >> 12) & 0xffff_ff00) | (dev & 0x0000_00ff)) as u32
}

/// `/dev` 下的一个设备节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNode {
    /// 所属设备类
    pub class: String,
    /// 节点名，例如 `usb_reader`
    pub name: String,
    /// 设备号
    pub dev: u64,
}

impl DeviceNode {
    /// 节点的完整路径
    pub fn path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

#[derive(Default)]
struct RegistryInner {
    majors: Vec<(u32, String)>,
    classes: Vec<String>,
    nodes: Vec<DeviceNode>,
}

impl RegistryInner {
    fn major_in_use(&self, major: u32) -> bool {
        self.majors.iter().any(|(m, _)| *m == major)
    }
}

/// 字符设备登记表
#[derive(Default)]
pub struct ChrdevRegistry {
    inner: SpinLock<RegistryInner>,
}

impl ChrdevRegistry {
    /// 创建空的登记表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记主设备号
    ///
    /// # 参数
    /// * `major` - 指定主设备号，0 表示动态分配
    /// * `name` - 设备名
    ///
    /// # 返回值
    /// 实际使用的主设备号
    pub fn register_chrdev(&self, major: u32, name: &str) -> Result<u32, DeviceError> {
        if name.is_empty() {
            return Err(DeviceError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        let major = if major == 0 {
            (DYNAMIC_MAJOR_END..=DYNAMIC_MAJOR_START)
                .rev()
                .find(|m| !inner.major_in_use(*m))
                .ok_or(DeviceError::Busy)?
        } else if inner.major_in_use(major) {
            return Err(DeviceError::Busy);
        } else {
            major
        };
        inner.majors.push((major, String::from(name)));
        debug!("chrdev: registered major {} for {}", major, name);
        Ok(major)
    }

    /// 注销主设备号，名字必须与登记时一致
    pub fn unregister_chrdev(&self, major: u32, name: &str) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        let pos = inner
            .majors
            .iter()
            .position(|(m, n)| *m == major && n == name)
            .ok_or(DeviceError::NotFound)?;
        inner.majors.remove(pos);
        Ok(())
    }

    /// 查询主设备号对应的设备名
    pub fn chrdev_name(&self, major: u32) -> Option<String> {
        self.inner
            .lock()
            .majors
            .iter()
            .find(|(m, _)| *m == major)
            .map(|(_, n)| n.clone())
    }

    /// 创建设备类
    pub fn create_class(&self, name: &str) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        if inner.classes.iter().any(|c| c == name) {
            return Err(DeviceError::AlreadyExists);
        }
        inner.classes.push(String::from(name));
        Ok(())
    }

    /// 销毁设备类，类下仍有设备节点时返回 `Busy`
    pub fn destroy_class(&self, name: &str) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        let pos = inner
            .classes
            .iter()
            .position(|c| c == name)
            .ok_or(DeviceError::NotFound)?;
        if inner.nodes.iter().any(|n| n.class == name) {
            warn!("chrdev: class {} still has device nodes", name);
            return Err(DeviceError::Busy);
        }
        inner.classes.remove(pos);
        Ok(())
    }

    /// 在设备类下创建设备节点
    ///
    /// 设备类和主设备号都必须已登记，节点名不能重复。
    pub fn create_device(&self, class: &str, dev: u64, name: &str) -> Result<DeviceNode, DeviceError> {
        let mut inner = self.inner.lock();
        if !inner.classes.iter().any(|c| c == class) || !inner.major_in_use(major(dev)) {
            return Err(DeviceError::NotFound);
        }
        if inner.nodes.iter().any(|n| n.name == name || n.dev == dev) {
            return Err(DeviceError::AlreadyExists);
        }
        let node = DeviceNode {
            class: String::from(class),
            name: String::from(name),
            dev,
        };
        inner.nodes.push(node.clone());
        debug!(
            "chrdev: created {} ({}:{})",
            node.path(),
            major(dev),
            minor(dev)
        );
        Ok(node)
    }

    /// 删除设备节点
    pub fn destroy_device(&self, class: &str, dev: u64) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        let pos = inner
            .nodes
            .iter()
            .position(|n| n.class == class && n.dev == dev)
            .ok_or(DeviceError::NotFound)?;
        inner.nodes.remove(pos);
        Ok(())
    }

    /// 按节点名查找设备节点
    pub fn find_node(&self, name: &str) -> Option<DeviceNode> {
        self.inner
            .lock()
            .nodes
            .iter()
            .find(|n| n.name == name)
            .cloned()
    }
}
