//! # Read-only physical memory access
//!
//! Nothing in this crate dereferences a physical address directly. All reads
//! go through a [`PhysMapRo`], which decides how (and whether) a physical
//! range is visible in the current address space.
//!
//! * [`DirectMap`] covers the usual early-boot situation: physical memory is
//!   identity mapped, or mapped at a fixed higher-half offset.
//! * [`SliceMap`] presents a borrowed byte buffer as physical memory. Hosts use
//!   it for memory dumps; tests use it for synthetic firmware images.

use crate::PhysAddr;

/// Map a physical region and return a *read-only* byte slice for its contents.
///
/// Implementations return `None` when the range (or any part of it) is not
/// reachable. The returned slice must cover exactly `len` bytes.
pub trait PhysMapRo {
    fn map_ro(&self, paddr: PhysAddr, len: usize) -> Option<&[u8]>;
}

impl<T> PhysMapRo for &T
where
    T: PhysMapRo + ?Sized,
{
    #[inline]
    fn map_ro(&self, paddr: PhysAddr, len: usize) -> Option<&[u8]> {
        (**self).map_ro(paddr, len)
    }
}

/// Physical memory that is visible at `paddr + offset`.
///
/// With an offset of zero this is an identity map, which is what a BIOS
/// boot loader runs under. A kernel using a higher-half direct map passes
/// the HHDM base instead.
#[derive(Debug, Clone, Copy)]
pub struct DirectMap {
    offset: u64,
}

impl DirectMap {
    /// Physical memory is identity mapped.
    ///
    /// # Safety
    /// Every physical range this mapper is asked for must be mapped and
    /// readable at its own address for the lifetime of the mapper.
    #[must_use]
    pub const unsafe fn identity() -> Self {
        Self { offset: 0 }
    }

    /// Physical memory is mapped at `paddr + offset`.
    ///
    /// # Safety
    /// Every physical range this mapper is asked for must be mapped and
    /// readable at `paddr + offset` for the lifetime of the mapper.
    #[must_use]
    pub const unsafe fn with_offset(offset: u64) -> Self {
        Self { offset }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl PhysMapRo for DirectMap {
    fn map_ro(&self, paddr: PhysAddr, len: usize) -> Option<&[u8]> {
        let va = paddr.as_u64().checked_add(self.offset)?;
        let end = va.checked_add(u64::try_from(len).ok()?)?;

        // Slices must not straddle the end of the address space nor start at null.
        let va = usize::try_from(va).ok()?;
        if va == 0 || end > isize::MAX.unsigned_abs() as u64 {
            return None;
        }

        let ptr = core::ptr::with_exposed_provenance::<u8>(va);

        // SAFETY: The constructor contract guarantees the range is mapped and readable.
        Some(unsafe { core::slice::from_raw_parts(ptr, len) })
    }
}

/// A byte buffer standing in for physical memory starting at `base`.
///
/// ```rust
/// # use boot_rsdp::{PhysAddr, PhysMapRo, SliceMap};
/// let bytes = [0xAA_u8; 64];
/// let map = SliceMap::new(PhysAddr::new(0x1000), &bytes);
/// assert_eq!(map.map_ro(PhysAddr::new(0x1010), 16).map(<[u8]>::len), Some(16));
/// assert!(map.map_ro(PhysAddr::new(0x0FFF), 1).is_none());
/// assert!(map.map_ro(PhysAddr::new(0x1030), 17).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SliceMap<'a> {
    base: PhysAddr,
    bytes: &'a [u8],
}

impl<'a> SliceMap<'a> {
    #[must_use]
    pub const fn new(base: PhysAddr, bytes: &'a [u8]) -> Self {
        Self { base, bytes }
    }

    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.base
    }

    /// Exclusive end of the represented physical range.
    #[must_use]
    pub const fn end(&self) -> Option<PhysAddr> {
        self.base.checked_add_usize(self.bytes.len())
    }
}

impl PhysMapRo for SliceMap<'_> {
    fn map_ro(&self, paddr: PhysAddr, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(self.base.distance_to(paddr)?).ok()?;
        let end = start.checked_add(len)?;
        self.bytes.get(start..end)
    }
}
