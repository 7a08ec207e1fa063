//! 与用户空间共用定义和声明
//!
//! 包含 errno 常量和打开标志，确保驱动和用户空间程序的一致性

#![no_std]
// uapi 中包含大量与 Linux 兼容的常量定义；逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod errno;
pub mod fcntl;
