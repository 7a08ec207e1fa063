//! 基于 `std::fs` 的串行设备后端

use std::fs::{File, OpenOptions};
use std::io::{self, Read};

use device::{SerialBackend, SerialFile};
use uapi::{errno, fcntl::OpenFlags};

/// 直接打开宿主机上的 tty 设备文件
pub struct HostSerial;

fn to_errno(e: io::Error) -> i32 {
    e.raw_os_error().unwrap_or(errno::EIO)
}

impl SerialBackend for HostSerial {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Box<dyn SerialFile>, i32> {
        let file = OpenOptions::new()
            .read(flags.readable())
            .write(flags.writable())
            .open(path)
            .map_err(to_errno)?;
        Ok(Box::new(HostSerialFile(file)))
    }
}

struct HostSerialFile(File);

impl SerialFile for HostSerialFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32> {
        self.0.read(buf).map_err(to_errno)
    }

    fn close(self: Box<Self>) {}
}
