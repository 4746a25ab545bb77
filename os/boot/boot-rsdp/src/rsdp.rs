//! # RSDP/XSDP (Root/Extended System Description Pointer)
//!
//! Layouts of the two pointer structures and the predicate deciding whether a
//! location in memory holds a valid one.
//!
//! ```text
//! offset  size  field               record
//! ------  ----  ------------------  ------
//!      0     8  signature           v1
//!      8     1  checksum            v1   (sum of bytes 0..20 == 0)
//!      9     6  OEM id              v1
//!     15     1  revision            v1   (0 for ACPI 1.0)
//!     16     4  RSDT address        v1
//!     20     4  length              v2
//!     24     8  XSDT address        v2
//!     32     1  extended checksum   v2   (sum of bytes 0..length == 0)
//!     33     3  reserved            v2
//! ```
//!
//! Ref: ACPI v6.4 sec 5.2.5.3

use core::mem::{offset_of, size_of};

use crate::window::PhysWindow;
use crate::{PhysAddr, sum};

/// `"RSD PTR "`, note the trailing space.
pub const RSDP_SIGNATURE: [u8; 8] = *b"RSD PTR ";

/// Size of the ACPI 1.0 structure; also the span of the first checksum.
pub const RSDP_V1_LEN: usize = size_of::<Rsdp>();

/// Size of the ACPI 2.0+ structure.
pub const RSDP_V2_LEN: usize = size_of::<Xsdp>();

/// Upper bound (exclusive) accepted for the v2 `length` field.
///
/// Not mandated by ACPI; keeps a corrupt length from stretching the checksum
/// over arbitrary memory.
pub const RSDP_V2_MAX_LEN: u32 = 1024;

/// ACPI 1.0 Root System Description Pointer (RSDP)
#[allow(dead_code)]
#[repr(C, packed)]
struct Rsdp {
    signature: [u8; 8],
    checksum: u8,
    oem_id: [u8; 6],
    revision: u8,
    rsdt_addr: u32,
}

/// ACPI 2.0 Extended System Description Pointer (XSDP)
#[allow(dead_code)]
#[repr(C, packed)]
struct Xsdp {
    v1: Rsdp,
    length: u32,
    xsdt_addr: u64,
    ext_checksum: u8,
    reserved: [u8; 3],
}

const _: () = assert!(RSDP_V1_LEN == 20, "RSDP must be 20 bytes");
const _: () = assert!(RSDP_V2_LEN == 36, "XSDP must be 36 bytes");

const SIGNATURE_OFFSET: usize = offset_of!(Rsdp, signature);
const CHECKSUM_OFFSET: usize = offset_of!(Rsdp, checksum);
const OEM_ID_OFFSET: usize = offset_of!(Rsdp, oem_id);
const REVISION_OFFSET: usize = offset_of!(Rsdp, revision);
const RSDT_ADDR_OFFSET: usize = offset_of!(Rsdp, rsdt_addr);
const LENGTH_OFFSET: usize = offset_of!(Xsdp, length);
const XSDT_ADDR_OFFSET: usize = offset_of!(Xsdp, xsdt_addr);
const EXT_CHECKSUM_OFFSET: usize = offset_of!(Xsdp, ext_checksum);

/// Which pointer structure a search is after.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RsdpVersion {
    /// Revision 0, ACPI 1.0.
    V1,
    /// Revision 1 or later, ACPI 2.0+.
    V2,
}

impl RsdpVersion {
    /// Size of the record for this version.
    ///
    /// Boot modules smaller than this are not considered.
    #[must_use]
    pub const fn record_len(self) -> usize {
        match self {
            Self::V1 => RSDP_V1_LEN,
            Self::V2 => RSDP_V2_LEN,
        }
    }

    /// The full validation predicate for the structure at `offset` in `window`.
    ///
    /// * Both versions: the 20-byte header lies in the window, the signature
    ///   matches, and the header bytes sum to zero.
    /// * `V1`: the revision is zero.
    /// * `V2`: the revision is non-zero, `length` is below
    ///   [`RSDP_V2_MAX_LEN`], and the first `length` bytes sum to zero.
    ///
    /// Any read that would leave the window fails the predicate.
    #[must_use]
    pub fn accepts(self, window: &PhysWindow<'_>, offset: usize) -> bool {
        let Some(view) = RsdpView::new(window, offset) else {
            return false;
        };

        if !view.header_valid() {
            return false;
        }

        match self {
            Self::V1 => view.revision() == 0,
            Self::V2 => view.revision() != 0 && view.extended_valid(),
        }
    }
}

impl core::fmt::Display for RsdpVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// A read-only view of a pointer structure in firmware memory.
///
/// Holding a view only guarantees that the 20-byte v1 header is inside the
/// window. The v2 accessors return `None` when their fields are not.
#[derive(Debug, Clone, Copy)]
pub struct RsdpView<'a> {
    window: PhysWindow<'a>,
}

impl<'a> RsdpView<'a> {
    /// View the structure at `offset`; `None` if the v1 header does not fit.
    #[must_use]
    pub fn new(window: &PhysWindow<'a>, offset: usize) -> Option<Self> {
        let window = window.tail(offset)?;
        if window.len() < RSDP_V1_LEN {
            return None;
        }
        Some(Self { window })
    }

    /// Physical address of the structure.
    #[must_use]
    pub const fn address(&self) -> PhysAddr {
        self.window.base()
    }

    #[must_use]
    pub fn signature(&self) -> [u8; 8] {
        self.window.read_array(SIGNATURE_OFFSET).unwrap_or_default()
    }

    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.window.read_u8(CHECKSUM_OFFSET).unwrap_or_default()
    }

    #[must_use]
    pub fn oem_id(&self) -> [u8; 6] {
        self.window.read_array(OEM_ID_OFFSET).unwrap_or_default()
    }

    #[must_use]
    pub fn revision(&self) -> u8 {
        self.window.read_u8(REVISION_OFFSET).unwrap_or_default()
    }

    /// 32-bit physical address of the RSDT.
    #[must_use]
    pub fn rsdt_address(&self) -> PhysAddr {
        PhysAddr::from(self.window.read_u32_le(RSDT_ADDR_OFFSET).unwrap_or_default())
    }

    /// The v2 `length` field, if it lies inside the window.
    #[must_use]
    pub fn length(&self) -> Option<u32> {
        self.window.read_u32_le(LENGTH_OFFSET)
    }

    /// 64-bit physical address of the XSDT, if it lies inside the window.
    #[must_use]
    pub fn xsdt_address(&self) -> Option<PhysAddr> {
        self.window.read_u64_le(XSDT_ADDR_OFFSET).map(PhysAddr::new)
    }

    #[must_use]
    pub fn extended_checksum(&self) -> Option<u8> {
        self.window.read_u8(EXT_CHECKSUM_OFFSET)
    }

    /// Signature matches and the 20 header bytes sum to zero.
    #[must_use]
    pub fn header_valid(&self) -> bool {
        self.signature() == RSDP_SIGNATURE
            && self
                .window
                .bytes(0, RSDP_V1_LEN)
                .is_some_and(|header| sum(header) == 0)
    }

    /// `length` is sane and the first `length` bytes sum to zero.
    ///
    /// The revision is not looked at.
    #[must_use]
    pub fn extended_valid(&self) -> bool {
        let Some(length) = self.length() else {
            return false;
        };
        if length >= RSDP_V2_MAX_LEN {
            return false;
        }
        usize::try_from(length)
            .ok()
            .and_then(|length| self.window.bytes(0, length))
            .is_some_and(|all| sum(all) == 0)
    }
}
