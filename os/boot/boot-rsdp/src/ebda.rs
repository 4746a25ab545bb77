//! # Extended BIOS Data Area

use crate::platform::PlatformLayout;
use crate::window::PhysWindow;
use crate::{PhysAddr, PhysMapRo};

/// Location of the EBDA as announced by the BIOS Data Area.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Ebda {
    /// Physical base (segment << 4).
    pub base: PhysAddr,
    /// Size in KiB, as stored in the first word of the EBDA.
    pub size_kib: u16,
}

impl Ebda {
    /// Read the EBDA segment from the BDA and the size word from the EBDA itself.
    ///
    /// Returns `None` if either word cannot be mapped.
    #[must_use]
    pub fn locate<M>(map: &M, layout: &PlatformLayout) -> Option<Self>
    where
        M: PhysMapRo + ?Sized,
    {
        let segment = read_u16(map, layout.ebda_segment_ptr)?;
        let base = PhysAddr::new(u64::from(segment) << 4);
        let size_kib = read_u16(map, base)?;
        Some(Self { base, size_kib })
    }

    /// A zero size word means the BIOS did not describe an EBDA.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.size_kib != 0
    }
}

fn read_u16<M>(map: &M, addr: PhysAddr) -> Option<u16>
where
    M: PhysMapRo + ?Sized,
{
    PhysWindow::map(map, addr, size_of::<u16>())?.read_u16_le(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SliceMap;

    #[test]
    fn segment_is_shifted_into_a_base() {
        let mut image = vec![0u8; 0xA_0000];
        image[0x40E..0x410].copy_from_slice(&0x9FC0u16.to_le_bytes());
        image[0x9_FC00..0x9_FC02].copy_from_slice(&1u16.to_le_bytes());
        let map = SliceMap::new(PhysAddr::zero(), &image);

        let ebda = Ebda::locate(&map, &PlatformLayout::PC_AT).expect("mapped");
        assert_eq!(ebda.base, PhysAddr::new(0x9_FC00));
        assert_eq!(ebda.size_kib, 1);
        assert!(ebda.is_present());
    }

    #[test]
    fn zero_size_word_means_absent() {
        let mut image = vec![0u8; 0x1000];
        image[0x40E..0x410].copy_from_slice(&0x0080u16.to_le_bytes());
        let map = SliceMap::new(PhysAddr::zero(), &image);

        let ebda = Ebda::locate(&map, &PlatformLayout::PC_AT).expect("mapped");
        assert_eq!(ebda.base, PhysAddr::new(0x800));
        assert!(!ebda.is_present());
    }

    #[test]
    fn unmapped_ebda_is_none() {
        let mut image = vec![0u8; 0x1000];
        image[0x40E..0x410].copy_from_slice(&0x9FC0u16.to_le_bytes());
        let map = SliceMap::new(PhysAddr::zero(), &image);

        assert_eq!(Ebda::locate(&map, &PlatformLayout::PC_AT), None);
    }
}
