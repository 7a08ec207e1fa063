//! usb_reader 用户态程序
//!
//! 加载驱动，打开设备读取一次，然后每秒显示一次读到的数据，直到 Ctrl+C。
//! 第一个命令行参数可替换底层串行设备路径。

mod host_serial;

use std::borrow::Cow;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use device::{ChrdevRegistry, UsbCore};
use usbreader::{ReaderConfig, UsbReaderModule};

const BUFFER_SIZE: usize = 1024;

fn main() -> ExitCode {
    // 默认输出 info 级别，可用 RUST_LOG 覆盖
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ReaderConfig::with_relay_path(&path),
        None => ReaderConfig::default(),
    };

    let module = match UsbReaderModule::init(
        config,
        Arc::new(host_serial::HostSerial),
        Arc::new(UsbCore::new()),
        Arc::new(ChrdevRegistry::new()),
    ) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("Failed to load usb_reader: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = match module.open() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open device file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut buffer = [0u8; BUFFER_SIZE];
    let count = match session.read(&mut buffer[..], BUFFER_SIZE - 1) {
        Ok(count) => count,
        Err(e) => {
            eprintln!("Failed to read from the device: {}", e);
            session.close();
            return ExitCode::FAILURE;
        }
    };

    let text = displayed(&buffer[..count]);
    println!("click Ctrl+C for quit:");
    loop {
        println!("Data read from USB device: {}", text);
        thread::sleep(Duration::from_secs(1));
    }
}

/// 按 C 字符串显示：遇到第一个 NUL 即截止
fn displayed(bytes: &[u8]) -> Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}
