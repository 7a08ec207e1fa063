//! 串行设备文件接口
//!
//! 驱动通过 [`SerialBackend`] 按路径打开底层串行设备（例如 `/dev/ttyACM1`），
//! 得到一个 [`SerialFile`]，读取完毕后显式关闭。
//! 宿主环境（内核 VFS 或用户态的 `std::fs`）负责提供实现。

use alloc::boxed::Box;
use uapi::fcntl::OpenFlags;

/// 打开串行设备文件的能力
pub trait SerialBackend: Send + Sync {
    /// 按路径打开设备文件
    ///
    /// # 返回值
    /// 成功返回打开的文件，失败返回正数 errno
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Box<dyn SerialFile>, i32>;
}

/// 已打开的串行设备文件
pub trait SerialFile: Send {
    /// 从当前位置读取，最多读取 `buf.len()` 字节
    ///
    /// 单次调用，不保证读满；返回 0 表示暂无数据。
    /// 失败返回正数 errno。
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32>;

    /// 关闭文件并释放底层资源
    fn close(self: Box<Self>);
}
