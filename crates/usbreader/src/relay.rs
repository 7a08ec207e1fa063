//! 底层设备转发
//!
//! 每次读取都重新打开底层设备，读一次，立即关闭，不缓存句柄。

use alloc::{boxed::Box, string::String, sync::Arc};
use device::{SerialBackend, SerialFile};
use log::error;
use uapi::{errno, fcntl::OpenFlags};

use crate::buffer::InternalBuffer;
use crate::error::ReaderError;

/// 单次读取独占的底层设备句柄
///
/// 显式 [`close`](Self::close) 或离开作用域时关闭，保证每次打开恰好关闭一次。
pub struct RelayHandle {
    file: Option<Box<dyn SerialFile>>,
}

impl RelayHandle {
    /// 只读打开底层设备
    ///
    /// 失败返回底层 errno
    pub fn open(backend: &dyn SerialBackend, path: &str) -> Result<Self, i32> {
        let file = backend.open(path, OpenFlags::O_RDONLY)?;
        Ok(Self { file: Some(file) })
    }

    /// 单次读取，最多 `buf.len()` 字节
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(errno::EBADF),
        }
    }

    /// 关闭句柄
    pub fn close(mut self) {
        if let Some(file) = self.file.take() {
            file.close();
        }
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            file.close();
        }
    }
}

/// 转发源
///
/// 持有底层设备路径和打开它的能力，路径在构造时确定。
pub struct RelaySource {
    path: String,
    backend: Arc<dyn SerialBackend>,
}

impl RelaySource {
    /// 创建转发源
    pub fn new(path: String, backend: Arc<dyn SerialBackend>) -> Self {
        Self { path, backend }
    }

    /// 底层设备路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 从底层设备读取一次到 `buffer`
    ///
    /// 最多读取 `buffer.capacity() - 1` 字节，短读（包括 0 字节）直接接受，不重试。
    /// 数据之后写入终止符。无论成功与否，返回前底层句柄都已关闭。
    ///
    /// # 返回值
    /// 读到的字节数
    pub fn pull(&self, buffer: &mut InternalBuffer<'_>) -> Result<usize, ReaderError> {
        let mut handle = RelayHandle::open(&*self.backend, &self.path).map_err(|e| {
            error!("Failed to open {}", self.path);
            ReaderError::SourceUnavailable(e)
        })?;

        let limit = buffer.payload_capacity();
        let result = handle.read(buffer.payload_mut());
        handle.close();

        let count = result.map_err(|e| {
            error!("Failed to read from {}", self.path);
            ReaderError::ReadFailed(e)
        })?;
        if count > limit {
            error!(
                "Failed to read from {}: backend reported {} bytes for a {} byte read",
                self.path, count, limit
            );
            return Err(ReaderError::ReadFailed(errno::EIO));
        }

        buffer.terminate(count);
        Ok(count)
    }
}
