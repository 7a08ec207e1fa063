use std::sync::Arc;

use device::{ChrdevRegistry, DeviceError, UsbCore, major, makedev};
use test_support::mock::{MockSerialBackend, stlink_interface};
use usbreader::{ReaderConfig, ReaderError, UsbReaderModule};

fn load(
    config: ReaderConfig,
    backend: &MockSerialBackend,
) -> (Result<UsbReaderModule, DeviceError>, Arc<UsbCore>, Arc<ChrdevRegistry>) {
    let usb = Arc::new(UsbCore::new());
    let chrdev = Arc::new(ChrdevRegistry::new());
    let module = UsbReaderModule::init(
        config,
        Arc::new(backend.clone()),
        usb.clone(),
        chrdev.clone(),
    );
    (module, usb, chrdev)
}

#[test]
fn test_init_registers_node_and_driver() {
    let backend = MockSerialBackend::new(b"ok");
    let (module, usb, chrdev) = load(ReaderConfig::default(), &backend);
    let module = module.unwrap();

    let node = chrdev.find_node("usb_reader").unwrap();
    assert_eq!(node.path(), "/dev/usb_reader");
    assert_eq!(node.class, "usb");
    assert_eq!(major(node.dev), module.major());
    assert_eq!(chrdev.chrdev_name(module.major()).as_deref(), Some("usb_reader"));

    let intf = stlink_interface(1);
    assert_eq!(
        usb.attach(intf.clone()).unwrap().as_deref(),
        Some("usb_reader_drv")
    );
    assert_eq!(module.driver().attached(), 1);
}

#[test]
fn test_open_read_close_through_module() {
    let backend = MockSerialBackend::new(b"temperature=21.5");
    let (module, _usb, _chrdev) = load(ReaderConfig::with_relay_path("/dev/ttyUSB7"), &backend);
    let module = module.unwrap();

    let mut session = module.open().unwrap();
    assert!(matches!(module.open(), Err(ReaderError::AlreadyOpen)));

    let mut buf = [0u8; 1024];
    let n = session.read(&mut buf[..], 1023).unwrap();
    assert_eq!(&buf[..n], b"temperature=21.5");
    assert_eq!(backend.last_path(), "/dev/ttyUSB7");

    session.close();
    assert_eq!(module.state().open_count(), 0);
    assert!(module.open().is_ok());
}

#[test]
fn test_exit_tears_everything_down() {
    let backend = MockSerialBackend::new(b"");
    let (module, usb, chrdev) = load(ReaderConfig::default(), &backend);
    let module = module.unwrap();
    let m = module.major();
    let intf = stlink_interface(2);
    usb.attach(intf.clone()).unwrap();

    module.exit();
    assert!(!module.is_loaded());
    assert!(chrdev.find_node("usb_reader").is_none());
    assert!(chrdev.chrdev_name(m).is_none());
    assert!(usb.bound_driver(&intf).is_none());
    assert_eq!(module.driver().attached(), 0);
    assert!(matches!(module.open(), Err(ReaderError::DeviceUnavailable)));

    // 重复卸载无副作用
    module.exit();
}

#[test]
fn test_session_outlives_exit() {
    let backend = MockSerialBackend::new(b"late");
    let (module, _usb, _chrdev) = load(ReaderConfig::default(), &backend);
    let module = module.unwrap();
    let mut session = module.open().unwrap();
    let state = module.state().clone();

    drop(module);
    let mut buf = [0u8; 8];
    assert_eq!(session.read(&mut buf[..], 8), Ok(4));
    session.close();
    assert_eq!(state.open_count(), 0);
}

#[test]
fn test_init_fails_when_driver_name_taken() {
    let backend = MockSerialBackend::new(b"");
    let usb = Arc::new(UsbCore::new());
    let chrdev = Arc::new(ChrdevRegistry::new());
    let _first = UsbReaderModule::init(
        ReaderConfig::default(),
        Arc::new(backend.clone()),
        usb.clone(),
        chrdev.clone(),
    )
    .unwrap();

    let second = UsbReaderModule::init(
        ReaderConfig::default(),
        Arc::new(backend.clone()),
        usb.clone(),
        chrdev.clone(),
    );
    assert!(matches!(second, Err(DeviceError::AlreadyExists)));
}

#[test]
fn test_init_unwinds_on_class_conflict() {
    let backend = MockSerialBackend::new(b"");
    let usb = Arc::new(UsbCore::new());
    let chrdev = Arc::new(ChrdevRegistry::new());
    chrdev.create_class("usb").unwrap();

    let result = UsbReaderModule::init(
        ReaderConfig::default(),
        Arc::new(backend.clone()),
        usb.clone(),
        chrdev.clone(),
    );
    assert!(matches!(result, Err(DeviceError::AlreadyExists)));
    // 主设备号和 USB 驱动都已撤销
    assert!(chrdev.chrdev_name(254).is_none());
    assert_eq!(usb.deregister("usb_reader_drv"), Err(DeviceError::NotFound));
}

#[test]
fn test_init_unwinds_on_node_conflict() {
    let backend = MockSerialBackend::new(b"");
    let usb = Arc::new(UsbCore::new());
    let chrdev = Arc::new(ChrdevRegistry::new());
    let other = chrdev.register_chrdev(10, "other").unwrap();
    chrdev.create_class("misc").unwrap();
    chrdev
        .create_device("misc", makedev(other, 0), "usb_reader")
        .unwrap();

    let result = UsbReaderModule::init(
        ReaderConfig::default(),
        Arc::new(backend.clone()),
        usb.clone(),
        chrdev.clone(),
    );
    assert!(matches!(result, Err(DeviceError::AlreadyExists)));
    assert!(chrdev.chrdev_name(254).is_none());
    // 类已撤销，可以重新创建
    assert_eq!(chrdev.create_class("usb"), Ok(()));
    assert_eq!(usb.deregister("usb_reader_drv"), Err(DeviceError::NotFound));
}
