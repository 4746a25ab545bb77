//! # RSDP discovery for legacy BIOS boot
//!
//! Finds the ACPI Root System Description Pointer before any memory manager or
//! operating system service is available. The caller gets back a physical
//! address and parses the RSDT/XSDT from there; this crate looks at nothing
//! beyond the pointer structure itself.
//!
//! ## Search order
//!
//! ```text
//! boot modules        pre-loaded copies, if the boot environment supplies a list
//!     ↓
//! EBDA                first 1 KiB of the Extended BIOS Data Area
//!     ↓
//! BIOS area           0xE0000..0x100000
//! ```
//!
//! Within a region, candidates are tested at 16-byte steps in ascending order
//! and the first valid structure is returned. Each call scans again from
//! scratch.
//!
//! ## Versions
//!
//! * [`locate_rsdp_v1`]: revision 0 (ACPI 1.0), 20 bytes, one checksum.
//! * [`locate_rsdp_v2`]: revision ≥ 1 (ACPI 2.0+), `length` bytes, a second
//!   checksum over the whole structure.
//!
//! ## Memory access
//!
//! Firmware memory is reached through a [`PhysMapRo`] and read through
//! bounds-checked [`PhysWindow`]s. A candidate whose fields would extend past
//! the region being scanned simply fails validation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boot_rsdp::{DirectMap, RsdpLocator};
//!
//! // SAFETY: Low memory is identity mapped during early boot.
//! let map = unsafe { DirectMap::identity() };
//! let locator = RsdpLocator::new(&map);
//!
//! match locator.locate_v2().or_else(|_| locator.locate_v1()) {
//!     Ok(location) => {
//!         let view = locator.view(&location).expect("just validated");
//!         log::info!("RSDT at {}", view.rsdt_address());
//!     }
//!     Err(e) => log::warn!("{e}; assuming no ACPI"),
//! }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod address;
mod ebda;
mod error;
mod locate;
mod modules;
#[cfg(feature = "multiboot")]
pub mod multiboot;
mod phys;
pub mod platform;
pub mod rsdp;
mod window;

#[cfg(test)]
mod testing;

pub use address::PhysAddr;
pub use ebda::Ebda;
pub use error::RsdpError;
pub use locate::{RsdpLocation, RsdpLocator, RsdpSource, locate_rsdp_v1, locate_rsdp_v2};
pub use modules::BootModule;
pub use phys::{DirectMap, PhysMapRo, SliceMap};
pub use platform::PlatformLayout;
pub use rsdp::{RsdpVersion, RsdpView};
pub use window::PhysWindow;

/// The ACPI checksum: all bytes added with wrap-around.
fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}
