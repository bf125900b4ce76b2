//! src/scanner/region.rs
//! Platform-neutral view of a target's address space

use crate::error::{RecoveryError, Result};
use serde::Serialize;
use std::path::Path;

/// Backing of a memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    /// Anonymous / heap / stack.
    Private,
    /// File or section mapping.
    Mapped,
    /// Executable image.
    Image,
}

/// A committed, readable span of the target's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub base_address: usize,
    pub size: usize,
    /// Raw OS protection bits (`PAGE_*` on Windows, `r=1 w=2 x=4` elsewhere).
    pub protection: u32,
    pub kind: RegionKind,
}

impl MemoryRegion {
    #[must_use]
    pub const fn end(&self) -> usize {
        self.base_address.saturating_add(self.size)
    }
}

/// Read access to one target's memory. Implemented once per OS.
pub trait MemoryReader {
    /// Committed, readable, non-guarded regions, enumerated fresh on each call.
    fn regions(&self) -> Result<Vec<MemoryRegion>>;

    /// Read up to `buf.len()` bytes at `address`; returns bytes read.
    fn read_at(&self, address: usize, buf: &mut [u8]) -> Result<usize>;
}

/// In-memory address space: saved dumps, offline analysis, tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    regions: Vec<(MemoryRegion, Vec<u8>)>,
}

impl MemorySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a private, readable region holding `data` at `base_address`.
    #[must_use]
    pub fn with_region(mut self, base_address: usize, data: Vec<u8>) -> Self {
        let region = MemoryRegion {
            base_address,
            size: data.len(),
            protection: 1,
            kind: RegionKind::Private,
        };
        self.regions.push((region, data));
        self
    }

    /// Load a raw dump file as one region at `base_address`.
    pub fn from_dump(path: impl AsRef<Path>, base_address: usize) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new().with_region(base_address, data))
    }
}

impl MemoryReader for MemorySnapshot {
    fn regions(&self) -> Result<Vec<MemoryRegion>> {
        Ok(self.regions.iter().map(|(region, _)| *region).collect())
    }

    fn read_at(&self, address: usize, buf: &mut [u8]) -> Result<usize> {
        let (region, data) = self
            .regions
            .iter()
            .find(|(r, _)| address >= r.base_address && address < r.end())
            .ok_or_else(|| RecoveryError::NotFound(format!("unmapped address {address:#x}")))?;

        let start = address - region.base_address;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }
}
