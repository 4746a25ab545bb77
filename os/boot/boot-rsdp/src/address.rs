use core::fmt;

/// Physical memory address.
///
/// A thin wrapper around a `u64` that denotes a **physical** address as seen
/// by firmware. It carries intent only; whether the address is backed by
/// memory is decided by the [`PhysMapRo`](crate::PhysMapRo) in use.
///
/// ### Examples
/// ```rust
/// # use boot_rsdp::PhysAddr;
/// let ebda = PhysAddr::new(0x9FC0 << 4);
/// assert_eq!(ebda.as_u64(), 0x9_FC00);
/// assert!(ebda.is_aligned(16));
/// assert_eq!(ebda.checked_add(0x10), Some(PhysAddr::new(0x9_FC10)));
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysAddr(u64);

impl PhysAddr {
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Advance by `offset` bytes, returning `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, offset: u64) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Advance by a `usize` byte offset, returning `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add_usize(self, offset: usize) -> Option<Self> {
        self.checked_add(offset as u64)
    }

    /// Number of bytes from `self` up to `end`, or `None` if `end` lies below `self`.
    #[inline]
    #[must_use]
    pub const fn distance_to(self, end: Self) -> Option<u64> {
        end.0.checked_sub(self.0)
    }

    /// Whether the address is a multiple of `align`. An `align` of 0 is never satisfied.
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, align: u64) -> bool {
        align != 0 && self.0 % align == 0
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<u64> for PhysAddr {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<u32> for PhysAddr {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(u64::from(v))
    }
}

impl From<PhysAddr> for u64 {
    #[inline]
    fn from(a: PhysAddr) -> Self {
        a.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_add_overflows_to_none() {
        assert_eq!(PhysAddr::new(u64::MAX).checked_add(1), None);
        assert_eq!(
            PhysAddr::new(0xE_0000).checked_add_usize(0x10),
            Some(PhysAddr::new(0xE_0010))
        );
    }

    #[test]
    fn distance_is_directional() {
        let a = PhysAddr::new(0x1000);
        let b = PhysAddr::new(0x1400);
        assert_eq!(a.distance_to(b), Some(0x400));
        assert_eq!(b.distance_to(a), None);
    }

    #[test]
    fn alignment() {
        assert!(PhysAddr::new(0xE_0010).is_aligned(16));
        assert!(!PhysAddr::new(0xE_0018).is_aligned(16));
        assert!(!PhysAddr::new(0x10).is_aligned(0));
    }

    #[test]
    fn formatting() {
        let pa = PhysAddr::new(0x40E);
        assert_eq!(format!("{pa}"), "0x000000000000040E");
        assert_eq!(format!("{pa:?}"), "PA(0x000000000000040E)");
        assert_eq!(format!("{pa:#x}"), "0x40e");
    }
}
