//! Reed-Solomon-style P/Q error correction code engine.
//!
//! Both the P and Q codes share the same interleaved-parity algorithm, parameterized
//! differently: P uses `(major_count=86, minor_count=24, major_mult=2, minor_inc=86)` and
//! Q uses `(major_count=52, minor_count=43, major_mult=86, minor_inc=88)`.
//!
//! Both operate over a single 2340-byte `region`: the sector bytes starting at the address
//! field (full-sector offset `0xC`) through the end of the Q code. Q's source window (2236
//! bytes) extends past P's (2064 bytes) and into the 172 bytes P itself occupies, so P must be
//! written into the region before Q is computed from it, exactly as the original encoder
//! computes P in place and then folds it into Q's input.
use crate::lut::{ECC_B, ECC_F};

/// P-code parameters: `(major_count, minor_count, major_mult, minor_inc)`.
pub const P_PARAMS: (u32, u32, u32, u32) = (86, 24, 2, 86);
/// Q-code parameters: `(major_count, minor_count, major_mult, minor_inc)`.
pub const Q_PARAMS: (u32, u32, u32, u32) = (52, 43, 86, 88);

/// Byte length of the region `generate`/`verify` operate on: address field through the end of Q.
pub const REGION_LEN: usize = 2340;
/// Offset of the P code within the region.
pub const P_OFFSET: usize = 2064;
/// Offset of the Q code within the region.
pub const Q_OFFSET: usize = 2236;

fn compute_block(src: &[u8], major_count: u32, minor_count: u32, major_mult: u32, minor_inc: u32) -> Vec<u8> {
    let size = major_count * minor_count;
    let mut dest = vec![0u8; (major_count * 2) as usize];
    for major in 0..major_count {
        let mut index = (major >> 1) * major_mult + (major & 1);
        let mut ecc_a: u8 = 0;
        let mut ecc_b: u8 = 0;
        for _ in 0..minor_count {
            let temp = src[index as usize];
            index += minor_inc;
            if index >= size {
                index -= size;
            }
            ecc_a ^= temp;
            ecc_b ^= temp;
            ecc_a = ECC_F[ecc_a as usize];
        }
        ecc_a = ECC_B[(ECC_F[ecc_a as usize] ^ ecc_b) as usize];
        dest[major as usize] = ecc_a;
        dest[(major + major_count) as usize] = ecc_a ^ ecc_b;
    }
    dest
}

/// Zero `region[0..4]` (the sector's address field) for the duration of `f`, restoring it
/// afterward. Used when computing Mode 2 Form 1 ECC, whose P/Q codes are computed as though
/// the sector had no address.
fn with_zeroed_address<T>(region: &mut [u8], zeroaddress: bool, f: impl FnOnce(&mut [u8]) -> T) -> T {
    if !zeroaddress {
        return f(region);
    }
    let mut saved = [0u8; 4];
    saved.copy_from_slice(&region[0..4]);
    region[0..4].fill(0);
    let result = f(region);
    region[0..4].copy_from_slice(&saved);
    result
}

/// Compute the P and Q ECC bytes for `region` and write them into `region[P_OFFSET..]` and
/// `region[Q_OFFSET..]`. `region` must be exactly [`REGION_LEN`] bytes: the sector's address
/// field through the end of the Q code.
///
/// If `zeroaddress` is set, `region[0..4]` is logically zeroed for the duration of the
/// computation (Mode 2 Form 1) and restored afterward.
pub fn generate(region: &mut [u8; REGION_LEN], zeroaddress: bool) {
    with_zeroed_address(region, zeroaddress, |region| {
        let (major_count, minor_count, major_mult, minor_inc) = P_PARAMS;
        let p = compute_block(region, major_count, minor_count, major_mult, minor_inc);
        region[P_OFFSET..Q_OFFSET].copy_from_slice(&p);

        let (major_count, minor_count, major_mult, minor_inc) = Q_PARAMS;
        let q = compute_block(&region[..Q_OFFSET], major_count, minor_count, major_mult, minor_inc);
        region[Q_OFFSET..].copy_from_slice(&q);
    });
}

/// Verify that `region`'s existing P and Q codes (at `region[P_OFFSET..]` and
/// `region[Q_OFFSET..]`) match what would be generated for the rest of the region. Returns
/// `true` iff both match exactly.
pub fn verify(region: &mut [u8; REGION_LEN], zeroaddress: bool) -> bool {
    with_zeroed_address(region, zeroaddress, |region| {
        let (major_count, minor_count, major_mult, minor_inc) = P_PARAMS;
        if compute_block(&region[..P_OFFSET], major_count, minor_count, major_mult, minor_inc) != region[P_OFFSET..Q_OFFSET] {
            return false;
        }
        let (major_count, minor_count, major_mult, minor_inc) = Q_PARAMS;
        compute_block(&region[..Q_OFFSET], major_count, minor_count, major_mult, minor_inc) == region[Q_OFFSET..]
    })
}
