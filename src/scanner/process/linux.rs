//! src/scanner/process/linux.rs
//! `/proc/<pid>/maps` enumeration and `/proc/<pid>/mem` reads

use super::access_error;
use crate::error::Result;
use crate::scanner::region::{MemoryReader, MemoryRegion, RegionKind};
use std::fs::{self, File};
use std::os::unix::fs::FileExt;
use tracing::debug;

const PROT_READ: u32 = 1;
const PROT_WRITE: u32 = 2;
const PROT_EXEC: u32 = 4;

/// Read handle on a live process.
#[derive(Debug)]
pub struct ProcessMemory {
    pid: u32,
    mem: File,
}

impl ProcessMemory {
    pub fn open(pid: u32) -> Result<Self> {
        let mem = File::open(format!("/proc/{pid}/mem")).map_err(|e| access_error(pid, e))?;
        debug!(pid, "opened process memory");
        Ok(Self { pid, mem })
    }
}

impl MemoryReader for ProcessMemory {
    fn regions(&self) -> Result<Vec<MemoryRegion>> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid))
            .map_err(|e| access_error(self.pid, e))?;
        Ok(parse_maps(&maps))
    }

    fn read_at(&self, address: usize, buf: &mut [u8]) -> Result<usize> {
        Ok(self.mem.read_at(buf, address as u64)?)
    }
}

/// Readable regions listed in a `maps` file. Kernel pseudo-mappings are skipped.
pub(crate) fn parse_maps(maps: &str) -> Vec<MemoryRegion> {
    maps.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<MemoryRegion> {
    let mut fields = line.split_whitespace();
    let (start, end) = fields.next()?.split_once('-')?;
    let perms = fields.next()?.as_bytes();
    let path = fields.nth(3).unwrap_or("");

    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    if end <= start || perms.first() != Some(&b'r') {
        return None;
    }
    if matches!(path, "[vvar]" | "[vsyscall]") {
        return None;
    }

    let mut protection = PROT_READ;
    if perms.get(1) == Some(&b'w') {
        protection |= PROT_WRITE;
    }
    if perms.get(2) == Some(&b'x') {
        protection |= PROT_EXEC;
    }

    let kind = if path.is_empty() || path.starts_with('[') {
        RegionKind::Private
    } else if protection & PROT_EXEC != 0 {
        RegionKind::Image
    } else {
        RegionKind::Mapped
    };

    Some(MemoryRegion {
        base_address: start,
        size: end - start,
        protection,
        kind,
    })
}
