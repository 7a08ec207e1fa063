//! 读路径内部缓冲区

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ReaderError;

/// 缓冲区台账
///
/// 记录当前未释放的内部缓冲区数量和累计分配次数，用于观察缓冲区生命周期。
#[derive(Debug, Default)]
pub struct BufferLedger {
    outstanding: AtomicUsize,
    allocated: AtomicUsize,
}

impl BufferLedger {
    /// 创建空台账
    pub const fn new() -> Self {
        Self {
            outstanding: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    /// 尚未释放的缓冲区数
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// 累计成功分配的缓冲区数
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }
}

/// 单次读取独占的内部缓冲区
///
/// 容量等于调用方请求的长度，最多存放 `capacity - 1` 字节数据，
/// 数据之后紧跟一个 NUL 终止符。离开作用域时释放并更新台账。
pub struct InternalBuffer<'a> {
    bytes: Vec<u8>,
    ledger: &'a BufferLedger,
}

impl<'a> InternalBuffer<'a> {
    /// 分配容量为 `capacity` 的缓冲区
    ///
    /// 使用可失败分配，内存不足时返回 [`ReaderError::OutOfMemory`] 而不是终止进程。
    pub fn allocate(capacity: usize, ledger: &'a BufferLedger) -> Result<Self, ReaderError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| ReaderError::OutOfMemory)?;
        bytes.resize(capacity, 0);
        ledger.outstanding.fetch_add(1, Ordering::AcqRel);
        ledger.allocated.fetch_add(1, Ordering::AcqRel);
        Ok(Self { bytes, ledger })
    }

    /// 总容量
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// 可存放的数据字节数，保留一个字节给终止符
    pub fn payload_capacity(&self) -> usize {
        self.bytes.len().saturating_sub(1)
    }

    /// 数据区，长度为 [`payload_capacity`](Self::payload_capacity)
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let limit = self.payload_capacity();
        &mut self.bytes[..limit]
    }

    /// 在第 `len` 个字节处写入终止符
    ///
    /// `len` 超过 [`payload_capacity`](Self::payload_capacity) 时截到上限；
    /// 容量为 0 的缓冲区没有位置放终止符，什么也不做。
    pub fn terminate(&mut self, len: usize) {
        let len = len.min(self.payload_capacity());
        if let Some(byte) = self.bytes.get_mut(len) {
            *byte = 0;
        }
    }

    /// 前 `len` 个字节，最多 [`payload_capacity`](Self::payload_capacity) 个
    pub fn data(&self, len: usize) -> &[u8] {
        &self.bytes[..len.min(self.payload_capacity())]
    }

    /// 前 `len` 个字节加终止符
    pub fn as_c_bytes(&self, len: usize) -> &[u8] {
        let end = len.min(self.payload_capacity()) + 1;
        &self.bytes[..end.min(self.bytes.len())]
    }
}

impl Drop for InternalBuffer<'_> {
    fn drop(&mut self) {
        self.ledger.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_tracks_lifetime() {
        let ledger = BufferLedger::new();
        {
            let buf = InternalBuffer::allocate(16, &ledger).unwrap();
            assert_eq!(buf.capacity(), 16);
            assert_eq!(buf.payload_capacity(), 15);
            assert_eq!(ledger.outstanding(), 1);
        }
        assert_eq!(ledger.outstanding(), 0);
        assert_eq!(ledger.allocated(), 1);
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let ledger = BufferLedger::new();
        let result = InternalBuffer::allocate(usize::MAX, &ledger);
        assert!(matches!(result, Err(ReaderError::OutOfMemory)));
        assert_eq!(ledger.outstanding(), 0);
        assert_eq!(ledger.allocated(), 0);
    }

    #[test]
    fn test_terminator_follows_data() {
        let ledger = BufferLedger::new();
        let mut buf = InternalBuffer::allocate(8, &ledger).unwrap();
        buf.payload_mut()[..3].copy_from_slice(b"abc");
        buf.terminate(3);
        assert_eq!(buf.data(3), b"abc");
        assert_eq!(buf.as_c_bytes(3), b"abc\0");
    }

    #[test]
    fn test_single_byte_buffer_has_no_payload() {
        let ledger = BufferLedger::new();
        let mut buf = InternalBuffer::allocate(1, &ledger).unwrap();
        assert_eq!(buf.payload_mut().len(), 0);
        buf.terminate(0);
        assert_eq!(buf.as_c_bytes(0), b"\0");
    }

    #[test]
    fn test_out_of_range_lengths_are_clamped() {
        let ledger = BufferLedger::new();
        let mut buf = InternalBuffer::allocate(4, &ledger).unwrap();
        buf.payload_mut().copy_from_slice(b"xyz");
        buf.terminate(100);
        assert_eq!(buf.data(100), b"xyz");
        assert_eq!(buf.as_c_bytes(100), b"xyz\0");

        let mut empty = InternalBuffer::allocate(0, &ledger).unwrap();
        empty.terminate(5);
        assert!(empty.data(5).is_empty());
        assert!(empty.as_c_bytes(5).is_empty());
    }
}
