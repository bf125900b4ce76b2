//! src/scanner/process/mod.rs
//! Live process readers, one per OS

use crate::error::RecoveryError;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::ProcessMemory;
#[cfg(windows)]
pub use windows::ProcessMemory;
#[cfg(not(any(windows, target_os = "linux")))]
pub use unsupported::ProcessMemory;

pub(crate) fn access_error(pid: u32, reason: impl std::fmt::Display) -> RecoveryError {
    RecoveryError::ProcessAccess {
        pid,
        reason: reason.to_string(),
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
mod unsupported {
    use super::access_error;
    use crate::error::{RecoveryError, Result};
    use crate::scanner::region::{MemoryReader, MemoryRegion};

    /// No process reader on this platform; `open` always fails.
    #[derive(Debug)]
    pub struct ProcessMemory {
        _private: (),
    }

    impl ProcessMemory {
        pub fn open(pid: u32) -> Result<Self> {
            Err(access_error(pid, "unsupported platform"))
        }
    }

    impl MemoryReader for ProcessMemory {
        fn regions(&self) -> Result<Vec<MemoryRegion>> {
            Ok(Vec::new())
        }

        fn read_at(&self, address: usize, _buf: &mut [u8]) -> Result<usize> {
            Err(RecoveryError::NotFound(format!("unmapped address {address:#x}")))
        }
    }
}
