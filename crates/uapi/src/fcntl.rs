//! 文件打开标志

use bitflags::bitflags;

bitflags! {
    /// open(2) 标志位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0o0;
        const O_WRONLY = 0o1;
        const O_RDWR = 0o2;
        const O_NONBLOCK = 0o4000;
        const O_CLOEXEC = 0o2000000;
    }
}

impl OpenFlags {
    const ACCMODE: u32 = 0o3;

    /// 访问模式位 (O_RDONLY / O_WRONLY / O_RDWR)
    pub fn access_mode(&self) -> u32 {
        self.bits() & Self::ACCMODE
    }

    /// 是否允许读
    pub fn readable(&self) -> bool {
        self.access_mode() != Self::O_WRONLY.bits()
    }

    /// 是否允许写
    pub fn writable(&self) -> bool {
        let mode = self.access_mode();
        mode == Self::O_WRONLY.bits() || mode == Self::O_RDWR.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::OpenFlags;

    #[test]
    fn test_rdonly_is_readable_only() {
        let flags = OpenFlags::O_RDONLY;
        assert!(flags.readable());
        assert!(!flags.writable());
    }

    #[test]
    fn test_access_modes() {
        assert!(!OpenFlags::O_WRONLY.readable());
        assert!(OpenFlags::O_WRONLY.writable());
        assert!(OpenFlags::O_RDWR.readable());
        assert!(OpenFlags::O_RDWR.writable());
        assert!((OpenFlags::O_RDONLY | OpenFlags::O_NONBLOCK).readable());
    }
}
