//! # Bounds-checked physical memory windows
//!
//! A [`PhysWindow`] is a validated span of physical memory: a base address and
//! the bytes a [`PhysMapRo`] handed out for it. Every typed read names an
//! offset relative to the base and fails with `None` unless the whole value
//! lies inside the span, so a scan can never wander past the region it was
//! given.

use core::fmt;
use core::iter::StepBy;
use core::ops::Range;

use crate::{PhysAddr, PhysMapRo};

/// A read-only span `[base, base + len)` of physical memory.
#[derive(Clone, Copy)]
pub struct PhysWindow<'a> {
    base: PhysAddr,
    bytes: &'a [u8],
}

impl<'a> PhysWindow<'a> {
    /// Map `len` bytes at `base` through `map`.
    ///
    /// Returns `None` if the mapper cannot provide the range, hands out a slice
    /// of the wrong size, or if the range wraps the physical address space.
    #[must_use]
    pub fn map<M>(map: &'a M, base: PhysAddr, len: usize) -> Option<Self>
    where
        M: PhysMapRo + ?Sized,
    {
        base.checked_add_usize(len)?;
        let bytes = map.map_ro(base, len)?;
        if bytes.len() != len {
            return None;
        }
        Some(Self { base, bytes })
    }

    /// Map the half-open range `[start, end)`.
    #[must_use]
    pub fn map_range<M>(map: &'a M, start: PhysAddr, end: PhysAddr) -> Option<Self>
    where
        M: PhysMapRo + ?Sized,
    {
        let len = usize::try_from(start.distance_to(end)?).ok()?;
        Self::map(map, start, len)
    }

    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.base
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Physical address of `offset`, allowing the one-past-the-end position.
    #[must_use]
    pub const fn address_of(&self, offset: usize) -> Option<PhysAddr> {
        if offset > self.bytes.len() {
            return None;
        }
        self.base.checked_add_usize(offset)
    }

    /// The `len` bytes starting at `offset`.
    #[must_use]
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }

    #[must_use]
    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    #[must_use]
    pub fn read_array<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        self.bytes(offset, N)?.try_into().ok()
    }

    #[must_use]
    pub fn read_u16_le(&self, offset: usize) -> Option<u16> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    #[must_use]
    pub fn read_u32_le(&self, offset: usize) -> Option<u32> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    #[must_use]
    pub fn read_u64_le(&self, offset: usize) -> Option<u64> {
        self.read_array(offset).map(u64::from_le_bytes)
    }

    /// The window `[base + offset, base + offset + len)`; must lie inside `self`.
    #[must_use]
    pub fn subwindow(&self, offset: usize, len: usize) -> Option<Self> {
        let bytes = self.bytes(offset, len)?;
        let base = self.address_of(offset)?;
        Some(Self { base, bytes })
    }

    /// Everything from `offset` to the end of the window.
    #[must_use]
    pub fn tail(&self, offset: usize) -> Option<Self> {
        let len = self.len().checked_sub(offset)?;
        self.subwindow(offset, len)
    }

    /// Offsets `0, stride, 2 * stride, …` below [`len`](Self::len).
    ///
    /// A `stride` of zero is treated as one.
    #[must_use]
    pub fn offsets(&self, stride: usize) -> StepBy<Range<usize>> {
        (0..self.len()).step_by(stride.max(1))
    }
}

impl fmt::Debug for PhysWindow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysWindow")
            .field("base", &self.base)
            .field("len", &self.len())
            .finish()
    }
}
