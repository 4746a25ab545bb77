//! # Multiboot (v1) boot modules
//!
//! A Multiboot loader hands the kernel the physical address of its
//! information structure. When the `mods` flag is set, the structure points to
//! a table of loaded modules, any of which may carry a copy of the RSDP.
//!
//! Only the fields needed to enumerate modules are read:
//!
//! ```text
//! offset  field
//! ------  ----------
//!      0  flags
//!     20  mods_count   (valid if flags.mods)
//!     24  mods_addr    (valid if flags.mods)
//!
//! module entry (16 bytes): mod_start, mod_end, cmdline, reserved
//! ```

use bitfield_struct::bitfield;
use log::warn;

use crate::modules::BootModule;
use crate::window::PhysWindow;
use crate::{PhysAddr, PhysMapRo};

/// Value a Multiboot loader leaves in `EAX` when entering the kernel.
pub const MULTIBOOT_BOOTLOADER_MAGIC: u32 = 0x2BAD_B002;

const FLAGS_OFFSET: usize = 0;
const MODS_COUNT_OFFSET: usize = 20;
const MODS_ADDR_OFFSET: usize = 24;
const INFO_FIXED_LEN: usize = 28;

const MODULE_ENTRY_LEN: usize = 16;
const MOD_START_OFFSET: usize = 0;
const MOD_END_OFFSET: usize = 4;

/// The `flags` word of the Multiboot information structure.
///
/// Each bit announces that the corresponding group of fields is valid.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct MultibootFlags {
    /// Bit 0: `mem_lower` / `mem_upper`.
    pub memory: bool,

    /// Bit 1: `boot_device`.
    pub boot_device: bool,

    /// Bit 2: `cmdline`.
    pub cmdline: bool,

    /// Bit 3: `mods_count` / `mods_addr`.
    pub mods: bool,

    /// Bit 4: a.out symbol table.
    pub aout_syms: bool,

    /// Bit 5: ELF section header table.
    pub elf_shdr: bool,

    /// Bit 6: `mmap_length` / `mmap_addr`.
    pub mem_map: bool,

    /// Bit 7: `drives_length` / `drives_addr`.
    pub drive_info: bool,

    /// Bit 8: `config_table`.
    pub config_table: bool,

    /// Bit 9: `boot_loader_name`.
    pub boot_loader_name: bool,

    /// Bit 10: `apm_table`.
    pub apm_table: bool,

    /// Bit 11: VBE fields.
    pub vbe_info: bool,

    /// Bit 12: framebuffer fields.
    pub framebuffer_info: bool,

    /// Bits 13..=31: reserved.
    #[bits(19, default = 0)]
    _reserved_13_31: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultibootError {
    #[error("boot loader magic {0:#010x} is not the Multiboot magic")]
    BadMagic(u32),
    #[error("Multiboot information at {0} cannot be mapped")]
    Unmapped(PhysAddr),
    #[error("Multiboot module table at {addr} ({count} entries) cannot be mapped")]
    ModulesUnmapped { addr: PhysAddr, count: u32 },
}

/// The part of the Multiboot information structure that describes modules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MultibootInfo {
    address: PhysAddr,
    flags: MultibootFlags,
    mods_count: u32,
    mods_addr: PhysAddr,
}

impl MultibootInfo {
    /// Check the loader magic, then read the structure at `addr`.
    ///
    /// # Errors
    /// [`MultibootError::BadMagic`] if the kernel was not started by a
    /// Multiboot loader, otherwise as [`read`](Self::read).
    pub fn from_handoff<M>(map: &M, magic: u32, addr: PhysAddr) -> Result<Self, MultibootError>
    where
        M: PhysMapRo + ?Sized,
    {
        if magic != MULTIBOOT_BOOTLOADER_MAGIC {
            return Err(MultibootError::BadMagic(magic));
        }
        Self::read(map, addr)
    }

    /// Read the flags and module fields of the structure at `addr`.
    ///
    /// # Errors
    /// [`MultibootError::Unmapped`] if the fixed part cannot be mapped.
    pub fn read<M>(map: &M, addr: PhysAddr) -> Result<Self, MultibootError>
    where
        M: PhysMapRo + ?Sized,
    {
        let unmapped = || MultibootError::Unmapped(addr);
        let window = PhysWindow::map(map, addr, INFO_FIXED_LEN).ok_or_else(unmapped)?;

        let flags = window.read_u32_le(FLAGS_OFFSET).ok_or_else(unmapped)?;
        let mods_count = window.read_u32_le(MODS_COUNT_OFFSET).ok_or_else(unmapped)?;
        let mods_addr = window.read_u32_le(MODS_ADDR_OFFSET).ok_or_else(unmapped)?;

        Ok(Self {
            address: addr,
            flags: MultibootFlags::from_bits(flags),
            mods_count,
            mods_addr: PhysAddr::from(mods_addr),
        })
    }

    #[must_use]
    pub const fn address(&self) -> PhysAddr {
        self.address
    }

    #[must_use]
    pub const fn flags(&self) -> MultibootFlags {
        self.flags
    }

    /// Number of modules; zero unless the `mods` flag is set.
    #[must_use]
    pub const fn module_count(&self) -> u32 {
        if self.flags.mods() { self.mods_count } else { 0 }
    }

    /// Iterate the module table.
    ///
    /// Returns `Ok(None)` when the loader reported no modules.
    ///
    /// # Errors
    /// [`MultibootError::ModulesUnmapped`] if the table cannot be mapped.
    pub fn modules<'a, M>(&self, map: &'a M) -> Result<Option<MultibootModules<'a>>, MultibootError>
    where
        M: PhysMapRo + ?Sized,
    {
        let count = self.module_count();
        if count == 0 {
            return Ok(None);
        }

        let unmapped = || MultibootError::ModulesUnmapped {
            addr: self.mods_addr,
            count,
        };
        let len = usize::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(MODULE_ENTRY_LEN))
            .ok_or_else(unmapped)?;
        let window = PhysWindow::map(map, self.mods_addr, len).ok_or_else(unmapped)?;

        Ok(Some(MultibootModules { window, offset: 0 }))
    }

    /// Copy the module table into `buf` and return the filled prefix.
    ///
    /// Entries beyond `buf.len()` are dropped with a warning; the boot module
    /// stage then considers only the first `buf.len()` modules.
    ///
    /// # Errors
    /// As [`modules`](Self::modules).
    pub fn copy_modules<'b, M>(
        &self,
        map: &M,
        buf: &'b mut [BootModule],
    ) -> Result<&'b [BootModule], MultibootError>
    where
        M: PhysMapRo + ?Sized,
    {
        let Some(modules) = self.modules(map)? else {
            return Ok(&buf[..0]);
        };

        let total = modules.len();
        let mut filled = 0;
        for (slot, module) in buf.iter_mut().zip(modules) {
            *slot = module;
            filled += 1;
        }

        if filled < total {
            warn!("Multiboot reports {total} modules, only the first {filled} are considered");
        }

        Ok(&buf[..filled])
    }
}

/// Iterator over a mapped Multiboot module table.
#[derive(Debug, Clone)]
pub struct MultibootModules<'a> {
    window: PhysWindow<'a>,
    offset: usize,
}

impl Iterator for MultibootModules<'_> {
    type Item = BootModule;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.window.subwindow(self.offset, MODULE_ENTRY_LEN)?;
        self.offset += MODULE_ENTRY_LEN;

        let start = entry.read_u32_le(MOD_START_OFFSET)?;
        let end = entry.read_u32_le(MOD_END_OFFSET)?;
        Some(BootModule::new(PhysAddr::from(start), PhysAddr::from(end)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.window.len().saturating_sub(self.offset) / MODULE_ENTRY_LEN;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MultibootModules<'_> {}
