//! Builders for well-formed pointer structures.

use crate::sum;

pub fn rsdp_v1(oem_id: [u8; 6], rsdt: u32) -> [u8; 20] {
    let mut rec = [0u8; 20];
    rec[..8].copy_from_slice(b"RSD PTR ");
    rec[9..15].copy_from_slice(&oem_id);
    rec[16..20].copy_from_slice(&rsdt.to_le_bytes());
    rec[8] = 0u8.wrapping_sub(sum(&rec));
    rec
}

pub fn rsdp_v2(oem_id: [u8; 6], rsdt: u32, xsdt: u64) -> [u8; 36] {
    let mut rec = [0u8; 36];
    rec[..8].copy_from_slice(b"RSD PTR ");
    rec[9..15].copy_from_slice(&oem_id);
    rec[15] = 2;
    rec[16..20].copy_from_slice(&rsdt.to_le_bytes());
    rec[20..24].copy_from_slice(&36u32.to_le_bytes());
    rec[24..32].copy_from_slice(&xsdt.to_le_bytes());
    rec[8] = 0u8.wrapping_sub(sum(&rec[..20]));
    rec[32] = 0u8.wrapping_sub(sum(&rec));
    rec
}
