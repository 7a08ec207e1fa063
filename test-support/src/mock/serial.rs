//! 串行设备后端的 Mock 实现
//!
//! 每次打开都从数据起点读取，可注入打开/读取失败，并统计打开、关闭和读取次数。

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use device::{SerialBackend, SerialFile};
use sync::SpinLock;
use uapi::fcntl::OpenFlags;

#[derive(Default)]
struct MockState {
    data: SpinLock<Vec<u8>>,
    open_error: SpinLock<Option<i32>>,
    read_error: SpinLock<Option<i32>>,
    over_report: AtomicBool,
    opens: AtomicUsize,
    closes: AtomicUsize,
    reads: AtomicUsize,
    last_read_len: AtomicUsize,
    last_path: SpinLock<String>,
    last_flags: SpinLock<Option<OpenFlags>>,
}

/// Mock 的串行设备后端
#[derive(Clone, Default)]
pub struct MockSerialBackend {
    state: Arc<MockState>,
}

impl MockSerialBackend {
    /// 创建后端，每次读取返回 `data` 的前缀
    pub fn new(data: &[u8]) -> Self {
        let backend = Self::default();
        backend.set_data(data);
        backend
    }

    /// 替换可读数据
    pub fn set_data(&self, data: &[u8]) {
        *self.state.data.lock() = data.to_vec();
    }

    /// 之后的打开都以 `errno` 失败
    pub fn fail_open(&self, errno: i32) {
        *self.state.open_error.lock() = Some(errno);
    }

    /// 之后的读取都以 `errno` 失败
    pub fn fail_read(&self, errno: i32) {
        *self.state.read_error.lock() = Some(errno);
    }

    /// 之后的读取上报比缓冲区多一个字节
    pub fn over_report(&self) {
        self.state.over_report.store(true, Ordering::SeqCst);
    }

    /// 清除所有注入的错误
    pub fn clear_faults(&self) {
        *self.state.open_error.lock() = None;
        *self.state.read_error.lock() = None;
        self.state.over_report.store(false, Ordering::SeqCst);
    }

    /// 成功打开次数
    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    /// 关闭次数
    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// 尚未关闭的句柄数
    pub fn open_handles(&self) -> usize {
        self.opens() - self.closes()
    }

    /// 读取次数（包括失败的读取）
    pub fn reads(&self) -> usize {
        self.state.reads.load(Ordering::SeqCst)
    }

    /// 最近一次读取传入的缓冲区长度
    pub fn last_read_len(&self) -> usize {
        self.state.last_read_len.load(Ordering::SeqCst)
    }

    /// 最近一次打开的路径
    pub fn last_path(&self) -> String {
        self.state.last_path.lock().clone()
    }

    /// 最近一次打开的标志
    pub fn last_flags(&self) -> Option<OpenFlags> {
        *self.state.last_flags.lock()
    }
}

impl SerialBackend for MockSerialBackend {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Box<dyn SerialFile>, i32> {
        *self.state.last_path.lock() = String::from(path);
        *self.state.last_flags.lock() = Some(flags);
        if let Some(errno) = *self.state.open_error.lock() {
            return Err(errno);
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSerialFile {
            state: self.state.clone(),
        }))
    }
}

struct MockSerialFile {
    state: Arc<MockState>,
}

impl SerialFile for MockSerialFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, i32> {
        self.state.reads.fetch_add(1, Ordering::SeqCst);
        self.state.last_read_len.store(buf.len(), Ordering::SeqCst);
        if let Some(errno) = *self.state.read_error.lock() {
            return Err(errno);
        }
        if self.state.over_report.load(Ordering::SeqCst) {
            return Ok(buf.len() + 1);
        }
        let data = self.state.data.lock();
        let n = buf.len().min(data.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn close(self: Box<Self>) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
