//! 驱动错误类型

use core::fmt;

use uapi::errno;

/// usb_reader 错误
///
/// 每次调用只返回一个错误，调用中已获取的资源在返回前全部释放。
/// 可通过 [`ReaderError::to_errno()`] 转换为系统调用错误码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// 设备已被其它调用方打开 (-EBUSY)
    AlreadyOpen,
    /// 模块未加载或加载失败 (-ENODEV)
    DeviceUnavailable,
    /// 内部缓冲区分配失败 (-ENOMEM)
    OutOfMemory,
    /// 底层设备打开失败，携带底层 errno
    SourceUnavailable(i32),
    /// 底层设备读取失败，携带底层 errno
    ReadFailed(i32),
    /// 调用方缓冲区不可写 (-EFAULT)
    FaultyCallerBuffer,
}

impl ReaderError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        -(self.errno() as isize)
    }

    fn errno(&self) -> i32 {
        match self {
            ReaderError::AlreadyOpen => errno::EBUSY,
            ReaderError::DeviceUnavailable => errno::ENODEV,
            ReaderError::OutOfMemory => errno::ENOMEM,
            ReaderError::SourceUnavailable(e) | ReaderError::ReadFailed(e) => *e,
            ReaderError::FaultyCallerBuffer => errno::EFAULT,
        }
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::AlreadyOpen => f.write_str("device already open"),
            ReaderError::DeviceUnavailable => f.write_str("device unavailable"),
            ReaderError::OutOfMemory => f.write_str("out of memory"),
            ReaderError::SourceUnavailable(e) => {
                write!(f, "relay source unavailable: {}", errno::strerror(*e))
            }
            ReaderError::ReadFailed(e) => {
                write!(f, "relay read failed: {}", errno::strerror(*e))
            }
            ReaderError::FaultyCallerBuffer => f.write_str("bad caller buffer"),
        }
    }
}
