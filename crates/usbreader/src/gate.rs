//! 单打开者控制

use log::warn;
use sync::SpinLock;

use crate::error::ReaderError;

/// 单打开者控制
///
/// `open_count` 只取 0 或 1，所有读写都在锁内完成。
/// 被拒绝的 acquire 立即返回 [`ReaderError::AlreadyOpen`]，不排队也不等待。
/// 锁只覆盖检查与计数修改，绝不跨越底层 I/O。
#[derive(Debug, Default)]
pub struct ExclusivityGate {
    open_count: SpinLock<usize>,
}

impl ExclusivityGate {
    /// 创建未被占用的控制器
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用设备
    pub fn acquire(&self) -> Result<(), ReaderError> {
        let mut count = self.open_count.lock();
        if *count != 0 {
            return Err(ReaderError::AlreadyOpen);
        }
        *count += 1;
        Ok(())
    }

    /// 释放设备，总是成功
    ///
    /// 每次成功的 acquire 对应一次 release，由调用方保证；
    /// 多余的 release 不会使计数变为负数。
    pub fn release(&self) {
        let mut count = self.open_count.lock();
        if *count == 0 {
            warn!("usb_reader: release without matching open");
            return;
        }
        *count -= 1;
    }

    /// 当前打开计数
    pub fn open_count(&self) -> usize {
        *self.open_count.lock()
    }
}
