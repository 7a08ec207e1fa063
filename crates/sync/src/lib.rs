//! 同步原语
//!
//! 向驱动的其它模块提供基本的互斥锁。
//!
//! [`RawSpinLock`] 实现了 [`lock_api::RawMutex`]，数据保护由 `lock_api`
//! 提供的 [`SpinLock`] 完成。临界区应尽可能短，不允许在持锁期间执行阻塞 I/O。

#![no_std]

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::*;
pub use spin_lock::*;
