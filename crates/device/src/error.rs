//! 设备框架错误类型

use core::fmt;

use uapi::errno;

/// 设备框架错误
///
/// 各错误码对应标准 POSIX errno 值，可通过 [`DeviceError::to_errno()`] 转换。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 同名对象已注册 (-EEXIST)
    AlreadyExists,
    /// 对象不存在 (-ENOENT)
    NotFound,
    /// 资源耗尽或被占用，例如没有可用的动态主设备号 (-EBUSY)
    Busy,
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 驱动 probe 失败，携带驱动返回的 errno
    ProbeFailed(i32),
}

impl DeviceError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        let code = match self {
            DeviceError::AlreadyExists => errno::EEXIST,
            DeviceError::NotFound => errno::ENOENT,
            DeviceError::Busy => errno::EBUSY,
            DeviceError::InvalidArgument => errno::EINVAL,
            DeviceError::ProbeFailed(e) => *e,
        };
        -(code as isize)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::AlreadyExists => f.write_str("already registered"),
            DeviceError::NotFound => f.write_str("not registered"),
            DeviceError::Busy => f.write_str("no free major number"),
            DeviceError::InvalidArgument => f.write_str("invalid argument"),
            DeviceError::ProbeFailed(e) => {
                write!(f, "probe failed: {}", errno::strerror(*e))
            }
        }
    }
}
