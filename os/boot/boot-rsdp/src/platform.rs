//! # Platform layout
//!
//! The firmware locations searched for the RSDP are fixed by the PC/AT
//! platform, not by ACPI. They are collected here so that a platform which
//! moves them only has to describe its own [`PlatformLayout`].

use crate::PhysAddr;

/// BDA word holding the real-mode segment of the EBDA.
pub const EBDA_SEGMENT_PTR: PhysAddr = PhysAddr::new(0x040E);

/// Bytes of the EBDA that are searched, independent of its reported size.
pub const EBDA_SCAN_LEN: usize = 0x400;

/// Start of the upper BIOS ROM shadow area.
pub const BIOS_AREA_START: PhysAddr = PhysAddr::new(0x000E_0000);

/// Exclusive end of the upper BIOS ROM shadow area.
pub const BIOS_AREA_END: PhysAddr = PhysAddr::new(0x0010_0000);

/// The RSDP always starts on a 16-byte boundary.
pub const RSDP_ALIGN: usize = 16;

/// Where to look for the RSDP on a given platform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlatformLayout {
    /// Physical address of the 16-bit EBDA segment value.
    pub ebda_segment_ptr: PhysAddr,

    /// Number of bytes searched from the EBDA base.
    pub ebda_scan_len: usize,

    /// First byte of the BIOS ROM window.
    pub bios_area_start: PhysAddr,

    /// One past the last byte of the BIOS ROM window.
    pub bios_area_end: PhysAddr,

    /// Step between candidate addresses. Also the alignment every candidate has
    /// relative to the start of its region.
    pub scan_stride: usize,
}

impl PlatformLayout {
    /// Legacy BIOS layout of IBM PC/AT compatibles.
    pub const PC_AT: Self = Self {
        ebda_segment_ptr: EBDA_SEGMENT_PTR,
        ebda_scan_len: EBDA_SCAN_LEN,
        bios_area_start: BIOS_AREA_START,
        bios_area_end: BIOS_AREA_END,
        scan_stride: RSDP_ALIGN,
    };

    /// Size of the BIOS ROM window in bytes; zero if the bounds are inverted.
    #[must_use]
    pub const fn bios_area_len(&self) -> u64 {
        match self.bios_area_start.distance_to(self.bios_area_end) {
            Some(len) => len,
            None => 0,
        }
    }
}

impl Default for PlatformLayout {
    fn default() -> Self {
        Self::PC_AT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_at_layout() {
        let layout = PlatformLayout::default();
        assert_eq!(layout, PlatformLayout::PC_AT);
        assert_eq!(layout.ebda_segment_ptr.as_u64(), 0x40E);
        assert_eq!(layout.ebda_scan_len, 1024);
        assert_eq!(layout.bios_area_len(), 0x2_0000);
        assert_eq!(layout.scan_stride, 16);
    }

    #[test]
    fn inverted_bios_area_is_empty() {
        let layout = PlatformLayout {
            bios_area_start: BIOS_AREA_END,
            bios_area_end: BIOS_AREA_START,
            ..PlatformLayout::PC_AT
        };
        assert_eq!(layout.bios_area_len(), 0);
    }
}
