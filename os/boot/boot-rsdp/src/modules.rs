//! # Boot modules
//!
//! A boot environment that pre-loads modules (e.g. a Multiboot loader) may
//! have placed a verified copy of the RSDP at the start of one of them. Those
//! copies are consulted before any blind scan of firmware memory.

use log::{trace, warn};

use crate::rsdp::RsdpVersion;
use crate::window::PhysWindow;
use crate::{PhysAddr, PhysMapRo};

/// A loaded module occupying the physical range `[start, end)`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct BootModule {
    pub start: PhysAddr,
    pub end: PhysAddr,
}

impl BootModule {
    #[must_use]
    pub const fn new(start: PhysAddr, end: PhysAddr) -> Self {
        Self { start, end }
    }

    /// Size in bytes, or `None` if `end` lies below `start`.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.start.distance_to(self.end)
    }
}

/// Test the structure at the start of each module, in list order.
///
/// Returns the index and start address of the first module that holds a
/// structure accepted for `version`.
pub(crate) fn scan<M>(
    map: &M,
    modules: &[BootModule],
    version: RsdpVersion,
) -> Option<(usize, PhysAddr)>
where
    M: PhysMapRo + ?Sized,
{
    let min_size = version.record_len() as u64;

    for (index, module) in modules.iter().enumerate() {
        let Some(size) = module.size() else {
            trace!("Skipping boot module {index}: inverted range {module:?}");
            continue;
        };

        if size < min_size {
            trace!("Skipping boot module {index}: {size} bytes is too small for an RSDP {version}");
            continue;
        }

        let Some(window) = PhysWindow::map_range(map, module.start, module.end) else {
            warn!(
                "Boot module {index} at {}..{} cannot be mapped",
                module.start, module.end
            );
            continue;
        };

        if version.accepts(&window, 0) {
            return Some((index, module.start));
        }
    }

    None
}
