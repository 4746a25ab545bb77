use crate::rsdp::RsdpVersion;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RsdpError {
    /// No region held a structure passing validation. On machines without
    /// ACPI this is the expected outcome.
    #[error("no valid RSDP {version} in boot modules, EBDA or BIOS area")]
    NotFound { version: RsdpVersion },
}
