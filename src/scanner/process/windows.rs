//! src/scanner/process/windows.rs
//! `VirtualQueryEx` enumeration and `ReadProcessMemory` reads

use super::access_error;
use crate::error::{RecoveryError, Result};
use crate::scanner::region::{MemoryReader, MemoryRegion, RegionKind};
use tracing::debug;
use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, HANDLE};
use windows_sys::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows_sys::Win32::System::Memory::{
    VirtualQueryEx, MEMORY_BASIC_INFORMATION, MEM_COMMIT, MEM_IMAGE, MEM_MAPPED, MEM_PRIVATE,
    PAGE_EXECUTE_READ, PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_GUARD, PAGE_NOACCESS,
    PAGE_READONLY, PAGE_READWRITE, PAGE_WRITECOPY,
};
use windows_sys::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

const READABLE: u32 = PAGE_READONLY
    | PAGE_READWRITE
    | PAGE_WRITECOPY
    | PAGE_EXECUTE_READ
    | PAGE_EXECUTE_READWRITE
    | PAGE_EXECUTE_WRITECOPY;

/// Read handle on a live process. The handle is closed on drop.
#[derive(Debug)]
pub struct ProcessMemory {
    pid: u32,
    handle: HANDLE,
}

impl ProcessMemory {
    #[allow(unsafe_code)]
    pub fn open(pid: u32) -> Result<Self> {
        let handle = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid) };
        if handle == 0 {
            let code = unsafe { GetLastError() };
            return Err(access_error(pid, format!("OpenProcess failed (error {code})")));
        }
        debug!(pid, "opened process handle");
        Ok(Self { pid, handle })
    }
}

impl Drop for ProcessMemory {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

fn region_kind(ty: u32) -> Option<RegionKind> {
    match ty {
        MEM_PRIVATE => Some(RegionKind::Private),
        MEM_MAPPED => Some(RegionKind::Mapped),
        MEM_IMAGE => Some(RegionKind::Image),
        _ => None,
    }
}

impl MemoryReader for ProcessMemory {
    #[allow(unsafe_code)]
    fn regions(&self) -> Result<Vec<MemoryRegion>> {
        let mut regions = Vec::new();
        let mut addr: usize = 0;
        loop {
            let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
            let queried = unsafe {
                VirtualQueryEx(
                    self.handle,
                    addr as _,
                    std::ptr::from_mut(&mut mbi),
                    std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if queried == 0 {
                break;
            }

            let base = mbi.BaseAddress as usize;
            let protect = mbi.Protect;
            let readable = protect & READABLE != 0
                && protect & PAGE_GUARD == 0
                && protect & PAGE_NOACCESS == 0;
            if mbi.State == MEM_COMMIT && readable {
                if let Some(kind) = region_kind(mbi.Type) {
                    regions.push(MemoryRegion {
                        base_address: base,
                        size: mbi.RegionSize,
                        protection: protect,
                        kind,
                    });
                }
            }

            let next = base.saturating_add(mbi.RegionSize);
            if next <= addr {
                break;
            }
            addr = next;
        }

        if regions.is_empty() {
            return Err(access_error(self.pid, "no readable regions"));
        }
        Ok(regions)
    }

    #[allow(unsafe_code)]
    fn read_at(&self, address: usize, buf: &mut [u8]) -> Result<usize> {
        let mut read: usize = 0;
        let ok = unsafe {
            ReadProcessMemory(
                self.handle,
                address as _,
                buf.as_mut_ptr().cast(),
                buf.len(),
                std::ptr::from_mut(&mut read),
            )
        };
        // partial copies report failure but still fill `read` bytes
        if ok == 0 && read == 0 {
            let code = unsafe { GetLastError() };
            return Err(RecoveryError::Io(std::io::Error::from_raw_os_error(code as i32)));
        }
        Ok(read)
    }
}
