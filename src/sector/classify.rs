//! Decides which, if any, of the three recognized sector shapes a lookahead window matches.
//!
//! This is the encode-side counterpart to [`synth`](crate::sector::synth). The gate chain is
//! short-circuit: cheap structural checks run first, then EDC (which rejects the overwhelming
//! majority of non-matching windows), and only then the costlier ECC recomputation.
use crate::ecc;
use crate::edc::edc_update;
use crate::sector::SectorType;
use byteorder::{ByteOrder, LittleEndian};

/// Classify a lookahead `window` as one of the three sector shapes, or [`SectorType::Literal`]
/// if none match.
///
/// A `window` shorter than 2336 bytes is always [`SectorType::Literal`]. Mode 1 requires at
/// least 2352 bytes; a shorter window can still match a Mode 2 form.
pub fn classify(window: &[u8]) -> SectorType {
    if window.len() < 2336 {
        return SectorType::Literal;
    }

    let mut can_be_1 = window.len() >= 2352;
    let mut can_be_2 = true;
    let mut can_be_3 = true;

    if can_be_1 {
        can_be_1 = window[0x00..0x0C] == crate::sector::SYNC_PATTERN
            && window[0x0F] == 0x01
            && window[0x814..0x81C].iter().all(|&b| b == 0);
    }

    if window[0x0..0x4] != window[0x4..0x8] {
        can_be_2 = false;
        can_be_3 = false;
        if !can_be_1 {
            return SectorType::Literal;
        }
    }

    if can_be_2 {
        let edc = edc_update(0, &window[0..0x808]);
        can_be_2 = LittleEndian::read_u32(&window[0x808..0x80C]) == edc;
    }

    if can_be_1 {
        let edc = edc_update(0, &window[0..0x810]);
        can_be_1 = LittleEndian::read_u32(&window[0x810..0x814]) == edc;
    }

    if can_be_3 {
        let edc = edc_update(0, &window[0..0x91C]);
        can_be_3 = LittleEndian::read_u32(&window[0x91C..0x920]) == edc;
    }

    if can_be_1 {
        let mut region = [0u8; ecc::REGION_LEN];
        region.copy_from_slice(&window[12..12 + ecc::REGION_LEN]);
        can_be_1 = ecc::verify(&mut region, false);
    }

    if can_be_2 {
        can_be_2 = verify_mode2_ecc(window);
    }

    if can_be_1 {
        SectorType::Mode1
    } else if can_be_2 {
        SectorType::Mode2Form1
    } else if can_be_3 {
        SectorType::Mode2Form2
    } else {
        SectorType::Literal
    }
}

/// Verify the Mode 2 Form 1 ECC for a 2336-byte `window` (the payload starting at conceptual
/// full-sector offset 0x10). [`ecc::verify`] operates on a region starting at the address field
/// (conceptual offset 0xC), 4 bytes before the window; those 4 bytes are always zeroed under
/// `zeroaddress = true`, so the region is simply 4 zero bytes followed by the window.
fn verify_mode2_ecc(window: &[u8]) -> bool {
    let mut region = [0u8; ecc::REGION_LEN];
    region[4..].copy_from_slice(&window[0..ecc::REGION_LEN - 4]);
    ecc::verify(&mut region, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::synth::{stripped_len, synthesize};

    fn mode1_sector() -> Vec<u8> {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode1)];
        for (i, b) in stripped.iter_mut().enumerate() {
            *b = (i * 17) as u8;
        }
        stripped[0..3].copy_from_slice(&[0, 0, 0]);
        let mut scratch = [0u8; 2352];
        synthesize(SectorType::Mode1, &stripped, &mut scratch).to_vec()
    }

    fn mode2_form1_sector() -> Vec<u8> {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode2Form1)];
        for (i, b) in stripped.iter_mut().enumerate() {
            *b = (i * 31) as u8;
        }
        let mut scratch = [0u8; 2352];
        synthesize(SectorType::Mode2Form1, &stripped, &mut scratch).to_vec()
    }

    fn mode2_form2_sector() -> Vec<u8> {
        let mut stripped = vec![0u8; stripped_len(SectorType::Mode2Form2)];
        for (i, b) in stripped.iter_mut().enumerate() {
            *b = (i * 53) as u8;
        }
        let mut scratch = [0u8; 2352];
        synthesize(SectorType::Mode2Form2, &stripped, &mut scratch).to_vec()
    }

    #[test]
    fn recognizes_mode1() {
        assert_eq!(classify(&mode1_sector()), SectorType::Mode1);
    }

    #[test]
    fn recognizes_mode2_form1() {
        assert_eq!(classify(&mode2_form1_sector()), SectorType::Mode2Form1);
    }

    #[test]
    fn recognizes_mode2_form2() {
        assert_eq!(classify(&mode2_form2_sector()), SectorType::Mode2Form2);
    }

    #[test]
    fn rejects_garbage() {
        let garbage = vec![0x5Au8; 2352];
        assert_eq!(classify(&garbage), SectorType::Literal);
    }

    #[test]
    fn short_window_is_literal() {
        assert_eq!(classify(&[0u8; 100]), SectorType::Literal);
    }

    #[test]
    fn corrupted_mode1_falls_back_to_literal() {
        let mut sector = mode1_sector();
        sector[100] ^= 0xFF;
        assert_eq!(classify(&sector), SectorType::Literal);
    }
}
