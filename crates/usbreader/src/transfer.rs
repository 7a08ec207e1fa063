//! 边界拷贝
//!
//! 把驱动持有的数据拷贝到调用方持有的缓冲区。
//! 目标不可写时报告 [`ReaderError::FaultyCallerBuffer`]，不会 panic。

use crate::error::ReaderError;

/// 拷贝到调用方缓冲区时发生的访问错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFault;

/// 调用方持有的缓冲区
///
/// 内核环境下对应一段用户地址空间；宿主环境下通常就是一个字节切片。
pub trait UserBuffer {
    /// 把 `src` 全部拷贝到缓冲区起始处
    ///
    /// 目标空间不足或不可访问时返回 [`TransferFault`]，此时目标内容不保证。
    fn copy_to_user(&mut self, src: &[u8]) -> Result<(), TransferFault>;
}

impl UserBuffer for [u8] {
    fn copy_to_user(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        let dst = self.get_mut(..src.len()).ok_or(TransferFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// 从 `src` 拷贝恰好 `count` 字节到 `dst`
///
/// # 返回值
/// 成功时返回 `count`
pub fn deliver<B: UserBuffer + ?Sized>(
    dst: &mut B,
    src: &[u8],
    count: usize,
) -> Result<usize, ReaderError> {
    let src = src.get(..count).ok_or(ReaderError::FaultyCallerBuffer)?;
    dst.copy_to_user(src)
        .map_err(|_| ReaderError::FaultyCallerBuffer)?;
    Ok(count)
}
