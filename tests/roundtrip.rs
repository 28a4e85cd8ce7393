//! Black-box encode/decode round-trip tests exercising the documented edge cases: empty
//! input, short and boundary-length literal runs, a synthesized sector, and a mixed stream
//! that must split into more than one record.
use ecm::sector::synth::{stripped_len, synthesize};
use ecm::sector::SectorType;
use ecm::{decode, encode};

fn round_trip(input: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::new();
    encode(input, &mut encoded, None).expect("encode");
    let mut decoded = Vec::new();
    decode(&encoded[..], &mut decoded, None).expect("decode");
    decoded
}

#[test]
fn empty_input() {
    assert_eq!(round_trip(&[]), Vec::<u8>::new());
}

#[test]
fn single_literal_byte() {
    assert_eq!(round_trip(&[0x42]), vec![0x42]);
}

#[test]
fn literal_run_of_32_bytes() {
    let data: Vec<u8> = (0..32u16).map(|i| i as u8).collect();
    assert_eq!(round_trip(&data), data);
}

#[test]
fn literal_run_of_33_bytes() {
    let data: Vec<u8> = (0..33u16).map(|i| i as u8).collect();
    assert_eq!(round_trip(&data), data);
}

fn mode1_sector(seed: u8) -> Vec<u8> {
    let mut stripped = vec![0u8; stripped_len(SectorType::Mode1)];
    stripped[0..3].copy_from_slice(&[0x00, 0x05, 0x10]);
    for (i, b) in stripped[3..].iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    let mut scratch = [0u8; 2352];
    synthesize(SectorType::Mode1, &stripped, &mut scratch).to_vec()
}

fn mode2_form2_sector(seed: u8) -> Vec<u8> {
    let mut stripped = vec![0u8; stripped_len(SectorType::Mode2Form2)];
    stripped[0..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
    for (i, b) in stripped[4..].iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    let mut scratch = [0u8; 2352];
    synthesize(SectorType::Mode2Form2, &stripped, &mut scratch).to_vec()
}

#[test]
fn single_mode1_sector_produces_one_record() {
    let sector = mode1_sector(7);
    let mut encoded = Vec::new();
    let tally = encode(&sector[..], &mut encoded, None).unwrap();
    assert_eq!(tally.mode1, 1);
    assert_eq!(tally.literal, 0);
    assert_eq!(round_trip(&sector), sector);
}

#[test]
fn mixed_literal_and_mode2_form2_stream_splits_into_two_records() {
    let mut input = Vec::new();
    input.extend_from_slice(b"leading garbage, not a sector");
    input.extend_from_slice(&mode2_form2_sector(99));

    let mut encoded = Vec::new();
    let tally = encode(&input[..], &mut encoded, None).unwrap();
    assert_eq!(tally.literal, 29);
    assert_eq!(tally.mode2_form2, 1);

    let mut decoded = Vec::new();
    decode(&encoded[..], &mut decoded, None).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn consecutive_mode1_sectors_coalesce_into_a_single_run() {
    let mut input = Vec::new();
    input.extend_from_slice(&mode1_sector(1));
    input.extend_from_slice(&mode1_sector(2));
    input.extend_from_slice(&mode1_sector(3));

    let mut encoded = Vec::new();
    let tally = encode(&input[..], &mut encoded, None).unwrap();
    assert_eq!(tally.mode1, 3);

    assert_eq!(round_trip(&input), input);
}

#[test]
fn corrupted_ecm_trailer_is_rejected() {
    let mut encoded = Vec::new();
    encode(&b"some literal bytes"[..], &mut encoded, None).unwrap();
    let last = encoded.len() - 1;
    encoded[last] ^= 0xFF;

    let mut decoded = Vec::new();
    let err = decode(&encoded[..], &mut decoded, None).unwrap_err();
    assert!(matches!(err, ecm::EcmError::EdcMismatch { .. }));
}
