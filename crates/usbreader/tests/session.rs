use std::sync::Arc;

use test_support::mock::MockSerialBackend;
use uapi::{errno, fcntl::OpenFlags};
use usbreader::{
    DeviceSession, DeviceState, ReaderError, RelaySource, TransferFault, USB_DEVICE_PATH,
    UserBuffer,
};

fn setup(data: &[u8]) -> (MockSerialBackend, Arc<DeviceState>, Arc<RelaySource>) {
    let backend = MockSerialBackend::new(data);
    let relay = Arc::new(RelaySource::new(
        USB_DEVICE_PATH.to_string(),
        Arc::new(backend.clone()),
    ));
    (backend, Arc::new(DeviceState::new()), relay)
}

/// 总是拒绝写入的调用方缓冲区
struct FaultyUserBuffer;

impl UserBuffer for FaultyUserBuffer {
    fn copy_to_user(&mut self, _src: &[u8]) -> Result<(), TransferFault> {
        Err(TransferFault)
    }
}

fn assert_released(backend: &MockSerialBackend, state: &DeviceState) {
    assert_eq!(backend.open_handles(), 0);
    assert_eq!(state.buffers().outstanding(), 0);
}

#[test]
fn test_read_ten_bytes_then_reopen() {
    let (backend, state, relay) = setup(b"0123456789");
    let mut session = DeviceSession::open(state.clone(), relay.clone()).unwrap();

    let mut buf = [0u8; 64];
    assert_eq!(session.read(&mut buf[..], 64), Ok(10));
    assert_eq!(&buf[..10], b"0123456789");
    assert_eq!(backend.last_read_len(), 63);
    assert_eq!(backend.last_path(), "/dev/ttyACM1");
    assert_eq!(backend.last_flags(), Some(OpenFlags::O_RDONLY));
    assert_released(&backend, &state);

    session.close();
    assert_eq!(state.open_count(), 0);
    assert!(DeviceSession::open(state, relay).is_ok());
}

#[test]
fn test_read_count_is_below_requested_length() {
    let (backend, state, relay) = setup(&[b'x'; 100]);
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    for len in [1usize, 2, 5, 64, 100, 101, 200] {
        let mut buf = vec![0u8; len];
        let n = session.read(&mut buf[..], len).unwrap();
        assert!(n <= len - 1, "len {} returned {}", len, n);
        assert_eq!(n, (len - 1).min(100));
    }
    assert_eq!(backend.opens(), 7);
    assert_released(&backend, &state);
}

#[test]
fn test_zero_length_read_touches_nothing() {
    let (backend, state, relay) = setup(b"data");
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(session.read(&mut buf[..], 0), Ok(0));
    assert_eq!(backend.opens(), 0);
    assert_eq!(state.buffers().allocated(), 0);
}

#[test]
fn test_empty_source_is_success() {
    let (backend, state, relay) = setup(b"");
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(session.read(&mut buf[..], 16), Ok(0));
    assert_released(&backend, &state);
}

#[test]
fn test_source_open_failure() {
    let (backend, state, relay) = setup(b"data");
    backend.fail_open(errno::ENOENT);
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    let err = session.read(&mut buf[..], 16).unwrap_err();
    assert_eq!(err, ReaderError::SourceUnavailable(errno::ENOENT));
    assert_eq!(err.to_errno(), -2);
    assert_eq!(state.buffers().allocated(), 1);
    assert_released(&backend, &state);
    // 会话仍然打开
    assert_eq!(state.open_count(), 1);
}

#[test]
fn test_source_read_failure_closes_handle() {
    let (backend, state, relay) = setup(b"data");
    backend.fail_read(errno::EIO);
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(
        session.read(&mut buf[..], 16),
        Err(ReaderError::ReadFailed(errno::EIO))
    );
    assert_eq!(backend.opens(), 1);
    assert_eq!(backend.closes(), 1);
    assert_released(&backend, &state);
}

#[test]
fn test_over_reporting_backend_is_a_read_failure() {
    let (backend, state, relay) = setup(b"data");
    backend.over_report();
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(
        session.read(&mut buf[..], 16),
        Err(ReaderError::ReadFailed(errno::EIO))
    );
    assert_released(&backend, &state);
}

#[test]
fn test_transfer_fault() {
    let (backend, state, relay) = setup(b"data");
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    assert_eq!(
        session.read(&mut FaultyUserBuffer, 16),
        Err(ReaderError::FaultyCallerBuffer)
    );
    assert_released(&backend, &state);

    // 调用方缓冲区比请求长度短，同样报告错误而不是 panic
    let mut short = [0u8; 2];
    assert_eq!(
        session.read(&mut short[..], 16),
        Err(ReaderError::FaultyCallerBuffer)
    );
    assert_released(&backend, &state);
}

#[test]
fn test_allocation_failure() {
    let (backend, state, relay) = setup(b"data");
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(
        session.read(&mut buf[..], usize::MAX),
        Err(ReaderError::OutOfMemory)
    );
    assert_eq!(backend.opens(), 0);
    assert_eq!(state.buffers().allocated(), 0);
    assert_released(&backend, &state);
}

#[test]
fn test_recovers_after_fault_cleared() {
    let (backend, state, relay) = setup(b"hello");
    backend.fail_open(errno::ENODEV);
    let mut session = DeviceSession::open(state.clone(), relay).unwrap();

    let mut buf = [0u8; 16];
    assert!(session.read(&mut buf[..], 16).is_err());
    backend.clear_faults();
    assert_eq!(session.read(&mut buf[..], 16), Ok(5));
    assert_eq!(&buf[..5], b"hello");
}

#[test]
fn test_second_open_is_denied_until_close() {
    let (_backend, state, relay) = setup(b"");
    let first = DeviceSession::open(state.clone(), relay.clone()).unwrap();

    let second = DeviceSession::open(state.clone(), relay.clone());
    assert!(matches!(second, Err(ReaderError::AlreadyOpen)));
    assert_eq!(state.open_count(), 1);

    first.close();
    assert!(DeviceSession::open(state.clone(), relay).is_ok());
}

#[test]
fn test_drop_releases_exactly_once() {
    let (_backend, state, relay) = setup(b"");
    {
        let _session = DeviceSession::open(state.clone(), relay.clone()).unwrap();
        assert_eq!(state.open_count(), 1);
    }
    assert_eq!(state.open_count(), 0);

    // 被拒绝的 open 不会释放别人的占用
    let held = DeviceSession::open(state.clone(), relay.clone()).unwrap();
    let _ = DeviceSession::open(state.clone(), relay.clone());
    assert_eq!(state.open_count(), 1);
    drop(held);
    assert_eq!(state.open_count(), 0);
}
