//! # RSDP discovery
//!
//! Search order, first match wins:
//!
//! ```text
//! boot modules (if supplied)   start of each module, list order
//!     ↓
//! EBDA                         first 1 KiB, 16-byte steps; skipped if its size word is 0
//!     ↓
//! BIOS area                    0xE0000..0x100000, 16-byte steps
//!     ↓
//! RsdpError::NotFound
//! ```

use core::fmt;

use log::{debug, info, trace, warn};

use crate::ebda::Ebda;
use crate::error::RsdpError;
use crate::modules::{self, BootModule};
use crate::platform::PlatformLayout;
use crate::rsdp::{RsdpVersion, RsdpView};
use crate::window::PhysWindow;
use crate::{PhysAddr, PhysMapRo};

/// Where a search found its structure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RsdpSource {
    /// At the start of the boot module with this index.
    BootModule(usize),
    /// Inside the Extended BIOS Data Area.
    Ebda,
    /// Inside the upper BIOS ROM window.
    BiosArea,
}

impl fmt::Display for RsdpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BootModule(index) => write!(f, "boot module {index}"),
            Self::Ebda => f.write_str("EBDA"),
            Self::BiosArea => f.write_str("BIOS area"),
        }
    }
}

/// A validated pointer structure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RsdpLocation {
    pub address: PhysAddr,
    pub source: RsdpSource,
    pub version: RsdpVersion,
}

/// Searches firmware memory for the RSDP.
///
/// Nothing is cached; every call re-scans.
pub struct RsdpLocator<'a, M>
where
    M: ?Sized,
{
    map: &'a M,
    modules: Option<&'a [BootModule]>,
    layout: PlatformLayout,
}

impl<M> Clone for RsdpLocator<'_, M>
where
    M: ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for RsdpLocator<'_, M> where M: ?Sized {}

impl<'a, M> RsdpLocator<'a, M>
where
    M: PhysMapRo + ?Sized,
{
    /// A locator for the PC/AT layout without a boot module list.
    #[must_use]
    pub const fn new(map: &'a M) -> Self {
        Self {
            map,
            modules: None,
            layout: PlatformLayout::PC_AT,
        }
    }

    /// Consult `modules`, in order, before scanning firmware memory.
    #[must_use]
    pub const fn with_modules(mut self, modules: &'a [BootModule]) -> Self {
        self.modules = Some(modules);
        self
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: PlatformLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub const fn layout(&self) -> &PlatformLayout {
        &self.layout
    }

    /// Find an ACPI 1.0 (revision 0) RSDP.
    ///
    /// # Errors
    /// [`RsdpError::NotFound`] if no region holds a valid structure.
    pub fn locate_v1(&self) -> Result<RsdpLocation, RsdpError> {
        self.locate(RsdpVersion::V1)
    }

    /// Find an ACPI 2.0+ (revision ≥ 1) RSDP.
    ///
    /// # Errors
    /// [`RsdpError::NotFound`] if no region holds a valid structure.
    pub fn locate_v2(&self) -> Result<RsdpLocation, RsdpError> {
        self.locate(RsdpVersion::V2)
    }

    /// Run the search for `version`.
    ///
    /// # Errors
    /// [`RsdpError::NotFound`] if no region holds a valid structure.
    pub fn locate(&self, version: RsdpVersion) -> Result<RsdpLocation, RsdpError> {
        if let Some(modules) = self.modules {
            debug!(
                "Looking for RSDP {version}. Scanning {} boot modules",
                modules.len()
            );
            if let Some((index, address)) = modules::scan(self.map, modules, version) {
                return Ok(found(address, RsdpSource::BootModule(index), version));
            }
        }

        debug!("Looking for RSDP {version}. Scanning EBDA");
        if let Some(address) = self.scan_ebda(version) {
            return Ok(found(address, RsdpSource::Ebda, version));
        }

        debug!("Looking for RSDP {version}. Scanning BIOS area");
        if let Some(address) = self.scan_bios_area(version) {
            return Ok(found(address, RsdpSource::BiosArea, version));
        }

        debug!("No RSDP {version} found");
        Err(RsdpError::NotFound { version })
    }

    /// Map a located structure back into a view of its fields.
    #[must_use]
    pub fn view(&self, location: &RsdpLocation) -> Option<RsdpView<'a>> {
        let window = PhysWindow::map(self.map, location.address, location.version.record_len())?;
        RsdpView::new(&window, 0)
    }

    fn scan_ebda(&self, version: RsdpVersion) -> Option<PhysAddr> {
        let Some(ebda) = Ebda::locate(self.map, &self.layout) else {
            warn!("EBDA pointer cannot be read; skipping EBDA");
            return None;
        };

        if !ebda.is_present() {
            trace!("EBDA at {} reports a size of zero; skipping EBDA", ebda.base);
            return None;
        }

        // Only the first `ebda_scan_len` bytes are searched, whatever the EBDA claims.
        trace!(
            "EBDA at {}, {} KiB reported, scanning {:#x} bytes",
            ebda.base, ebda.size_kib, self.layout.ebda_scan_len
        );
        let Some(window) = PhysWindow::map(self.map, ebda.base, self.layout.ebda_scan_len) else {
            warn!("EBDA at {} cannot be mapped; skipping EBDA", ebda.base);
            return None;
        };

        scan_window(&window, self.layout.scan_stride, version)
    }

    fn scan_bios_area(&self, version: RsdpVersion) -> Option<PhysAddr> {
        let Some(window) = PhysWindow::map_range(
            self.map,
            self.layout.bios_area_start,
            self.layout.bios_area_end,
        ) else {
            warn!(
                "BIOS area {}..{} cannot be mapped",
                self.layout.bios_area_start, self.layout.bios_area_end
            );
            return None;
        };

        scan_window(&window, self.layout.scan_stride, version)
    }
}

/// Test every `stride`-aligned offset of `window`, lowest address first.
pub(crate) fn scan_window(
    window: &PhysWindow<'_>,
    stride: usize,
    version: RsdpVersion,
) -> Option<PhysAddr> {
    window
        .offsets(stride)
        .find(|&offset| version.accepts(window, offset))
        .and_then(|offset| window.address_of(offset))
}

fn found(address: PhysAddr, source: RsdpSource, version: RsdpVersion) -> RsdpLocation {
    info!("Found RSDP {version} at {address} ({source})");
    RsdpLocation {
        address,
        source,
        version,
    }
}

/// Find an ACPI 1.0 RSDP using the PC/AT layout.
///
/// # Errors
/// [`RsdpError::NotFound`] if no region holds a valid structure.
pub fn locate_rsdp_v1<M>(
    map: &M,
    modules: Option<&[BootModule]>,
) -> Result<RsdpLocation, RsdpError>
where
    M: PhysMapRo + ?Sized,
{
    locator(map, modules).locate_v1()
}

/// Find an ACPI 2.0+ RSDP using the PC/AT layout.
///
/// # Errors
/// [`RsdpError::NotFound`] if no region holds a valid structure.
pub fn locate_rsdp_v2<M>(
    map: &M,
    modules: Option<&[BootModule]>,
) -> Result<RsdpLocation, RsdpError>
where
    M: PhysMapRo + ?Sized,
{
    locator(map, modules).locate_v2()
}

fn locator<'a, M>(map: &'a M, modules: Option<&'a [BootModule]>) -> RsdpLocator<'a, M>
where
    M: PhysMapRo + ?Sized,
{
    let locator = RsdpLocator::new(map);
    match modules {
        Some(modules) => locator.with_modules(modules),
        None => locator,
    }
}
