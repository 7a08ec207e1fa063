//! 设备会话与读路径

use alloc::sync::Arc;
use log::{debug, info};

use crate::buffer::{BufferLedger, InternalBuffer};
use crate::error::ReaderError;
use crate::gate::ExclusivityGate;
use crate::relay::RelaySource;
use crate::transfer::{self, UserBuffer};

/// 设备状态
///
/// 每个已加载模块一份，随模块创建与销毁，以 `Arc` 共享给所有会话。
#[derive(Debug, Default)]
pub struct DeviceState {
    gate: ExclusivityGate,
    buffers: BufferLedger,
}

impl DeviceState {
    /// 创建未被打开的设备状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前打开计数（0 或 1）
    pub fn open_count(&self) -> usize {
        self.gate.open_count()
    }

    /// 内部缓冲区台账
    pub fn buffers(&self) -> &BufferLedger {
        &self.buffers
    }
}

/// 一次 open/read*/close 会话
///
/// 持有会话即占用设备；[`close`](Self::close) 或离开作用域时释放，恰好一次。
/// 读取需要 `&mut self`，同一会话上的读取只能顺序进行。
pub struct DeviceSession {
    state: Arc<DeviceState>,
    relay: Arc<RelaySource>,
}

impl DeviceSession {
    /// 打开设备
    ///
    /// 已有打开者时立即返回 [`ReaderError::AlreadyOpen`]，不等待。
    pub fn open(state: Arc<DeviceState>, relay: Arc<RelaySource>) -> Result<Self, ReaderError> {
        state.gate.acquire()?;
        info!("Open Device file ...");
        Ok(Self { state, relay })
    }

    /// 读取底层设备并拷贝到 `dst`
    ///
    /// 状态流转 Idle → Allocating → Relaying → Transferring → Idle，
    /// 任一步失败都直接回到 Idle，已分配的缓冲区和已打开的底层句柄在返回前释放。
    /// `len` 为 0 时直接返回 0，不分配也不访问底层设备。
    ///
    /// # 返回值
    /// 拷贝给调用方的字节数，范围 `0..len`
    pub fn read<B: UserBuffer + ?Sized>(
        &mut self,
        dst: &mut B,
        len: usize,
    ) -> Result<usize, ReaderError> {
        if len == 0 {
            return Ok(0);
        }

        // Allocating
        let mut buffer = InternalBuffer::allocate(len, &self.state.buffers)?;
        // Relaying
        let count = self.relay.pull(&mut buffer)?;
        // Transferring
        transfer::deliver(dst, buffer.data(count), count)?;

        info!("Read Data ...");
        debug!("usb_reader: delivered {} of {} requested bytes", count, len);
        Ok(count)
    }

    /// 会话所属的设备状态
    pub fn state(&self) -> &Arc<DeviceState> {
        &self.state
    }

    /// 关闭会话，总是成功
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.state.gate.release();
        info!("Close Device file ...");
    }
}
