//! Reconstructs a full sector from its stripped, EDC/ECC-free representation.
//!
//! This is the decode-side counterpart to [`classify`](crate::sector::classify): given the
//! bytes the encoder kept (the ones it couldn't derive), rebuild the exact original sector.
use crate::ecc;
use crate::edc::edc_update;
use crate::sector::{SectorType, MODE_OFFSET, SYNC_PATTERN};
use byteorder::{ByteOrder, LittleEndian};

/// Number of bytes of stripped payload [`synthesize`] expects for each sector type.
pub const fn stripped_len(sector_type: SectorType) -> usize {
    sector_type.stripped_len()
}

/// Reconstruct a sector of `sector_type` from its `stripped` payload into `scratch`, a
/// 2352-byte scratch buffer. Returns the byte range of `scratch` that should be emitted to
/// the output stream: the full buffer for [`SectorType::Mode1`], or `scratch[16..]` for the
/// Mode 2 forms (which are conventionally stored and transmitted header-free).
///
/// `stripped.len()` must equal [`stripped_len`] for the requested `sector_type`; this is an
/// internal invariant maintained by the decoder driver, not a user-facing precondition, so it
/// is checked with a `debug_assert!` rather than returning a `Result`.
pub fn synthesize<'a>(sector_type: SectorType, stripped: &[u8], scratch: &'a mut [u8; 2352]) -> &'a [u8] {
    debug_assert_eq!(stripped.len(), stripped_len(sector_type));
    match sector_type {
        SectorType::Literal => unreachable!("literal runs are copied verbatim, not synthesized"),
        SectorType::Mode1 => synthesize_mode1(stripped, scratch),
        SectorType::Mode2Form1 => synthesize_mode2_form1(stripped, scratch),
        SectorType::Mode2Form2 => synthesize_mode2_form2(stripped, scratch),
    }
}

fn synthesize_mode1<'a>(stripped: &[u8], scratch: &'a mut [u8; 2352]) -> &'a [u8] {
    scratch[0..12].copy_from_slice(&SYNC_PATTERN);
    scratch[12..15].copy_from_slice(&stripped[0..3]);
    scratch[MODE_OFFSET] = 0x01;
    scratch[16..16 + 2048].copy_from_slice(&stripped[3..3 + 2048]);

    let edc = edc_update(0, &scratch[0..0x810]);
    LittleEndian::write_u32(&mut scratch[0x810..0x814], edc);
    scratch[0x814..0x81C].fill(0);

    let region: &mut [u8; ecc::REGION_LEN] = (&mut scratch[12..]).try_into().unwrap();
    ecc::generate(region, false);

    &scratch[..]
}

fn synthesize_mode2_form1<'a>(stripped: &[u8], scratch: &'a mut [u8; 2352]) -> &'a [u8] {
    scratch[0..12].copy_from_slice(&SYNC_PATTERN);
    scratch[12..15].fill(0);
    scratch[MODE_OFFSET] = 0x02;
    scratch[0x14..0x14 + stripped.len()].copy_from_slice(stripped);
    let (lo, hi) = scratch.split_at_mut(0x14);
    lo[0x10..0x14].copy_from_slice(&hi[0..4]);

    let edc = edc_update(0, &scratch[0x10..0x818]);
    LittleEndian::write_u32(&mut scratch[0x818..0x81C], edc);

    let region: &mut [u8; ecc::REGION_LEN] = (&mut scratch[12..]).try_into().unwrap();
    ecc::generate(region, true);

    &scratch[0x10..]
}

fn synthesize_mode2_form2<'a>(stripped: &[u8], scratch: &'a mut [u8; 2352]) -> &'a [u8] {
    scratch[0..12].copy_from_slice(&SYNC_PATTERN);
    scratch[12..15].fill(0);
    scratch[MODE_OFFSET] = 0x02;
    scratch[0x14..0x14 + stripped.len()].copy_from_slice(stripped);
    let (lo, hi) = scratch.split_at_mut(0x14);
    lo[0x10..0x14].copy_from_slice(&hi[0..4]);

    let edc = edc_update(0, &scratch[0x10..0x92C]);
    LittleEndian::write_u32(&mut scratch[0x92C..0x930], edc);

    &scratch[0x10..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::classify::classify;

    #[test]
    fn mode1_round_trips_through_classifier() {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode1)];
        stripped[0..3].copy_from_slice(&[0x00, 0x02, 0x00]);
        for (i, b) in stripped[3..].iter_mut().enumerate() {
            *b = (i * 7) as u8;
        }
        let mut scratch = [0u8; 2352];
        let sector = synthesize(SectorType::Mode1, &stripped, &mut scratch).to_vec();
        assert_eq!(sector.len(), 2352);
        assert_eq!(classify(&sector), SectorType::Mode1);
    }

    #[test]
    fn mode2_form1_round_trips_through_classifier() {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode2Form1)];
        stripped[0..4].copy_from_slice(&[1, 2, 3, 4]);
        for (i, b) in stripped[4..].iter_mut().enumerate() {
            *b = (i * 13) as u8;
        }
        let mut scratch = [0u8; 2352];
        let sector = synthesize(SectorType::Mode2Form1, &stripped, &mut scratch).to_vec();
        assert_eq!(sector.len(), 2336);
        assert_eq!(classify(&sector), SectorType::Mode2Form1);
    }

    #[test]
    fn mode2_form2_round_trips_through_classifier() {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode2Form2)];
        stripped[0..4].copy_from_slice(&[9, 8, 7, 6]);
        for (i, b) in stripped[4..].iter_mut().enumerate() {
            *b = (i * 3) as u8;
        }
        let mut scratch = [0u8; 2352];
        let sector = synthesize(SectorType::Mode2Form2, &stripped, &mut scratch).to_vec();
        assert_eq!(sector.len(), 2336);
        assert_eq!(classify(&sector), SectorType::Mode2Form2);
    }
}
