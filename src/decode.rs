//! Decoder driver: reads framed records and reconstructs the original byte stream.
use crate::edc::edc_update;
use crate::error::{EcmError, EcmResult};
use crate::framing::{self, Record};
use crate::sector::synth::synthesize;
use crate::sector::SectorType;
use crate::Progress;
use std::io::{Read, Write};

/// Drives the decode pipeline. Carries only the total-size hint used for progress reporting.
pub struct Decoder {
    total_bytes_hint: u64,
}

impl Decoder {
    /// A new decoder with no size hint; progress callbacks receive `0` as the total.
    pub fn new() -> Self {
        Decoder { total_bytes_hint: 0 }
    }

    /// A new decoder that reports `total_bytes` as the second argument to its progress
    /// callback (e.g. the ECM file's size, when known in advance).
    pub fn with_total_bytes(total_bytes: u64) -> Self {
        Decoder { total_bytes_hint: total_bytes }
    }

    /// Decode an ECM stream `r`, writing the reconstructed bytes to `w`.
    pub fn decode<R: Read, W: Write>(&mut self, mut r: R, mut w: W, mut progress: Option<&mut Progress<'_>>) -> EcmResult<()> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                EcmError::BadMagic
            } else {
                EcmError::from(e)
            }
        })?;
        if &magic != framing::MAGIC {
            return Err(EcmError::BadMagic);
        }
        log::debug!("decode: magic OK, total size hint {} bytes", self.total_bytes_hint);

        let mut edc_acc: u32 = 0;
        let mut consumed: u64 = 0;
        let mut last_reported_mib: u64 = 0;
        let mut scratch = [0u8; 2352];

        loop {
            match framing::read_header(&mut r)? {
                Record::End => break,
                Record::Run { sector_type: SectorType::Literal, count } => {
                    let mut remaining = count as u64;
                    let mut chunk = vec![0u8; 2352];
                    while remaining > 0 {
                        let take = remaining.min(2352) as usize;
                        chunk.resize(take, 0);
                        r.read_exact(&mut chunk)?;
                        edc_acc = edc_update(edc_acc, &chunk);
                        w.write_all(&chunk)?;
                        remaining -= take as u64;
                        consumed += take as u64;
                        report(&mut progress, consumed, self.total_bytes_hint, &mut last_reported_mib);
                    }
                }
                Record::Run { sector_type, count } => {
                    log::trace!("synthesizing run: {sector_type:?} x {count}");
                    let mut stripped = vec![0u8; sector_type.stripped_len()];
                    for _ in 0..count {
                        r.read_exact(&mut stripped)?;
                        let sector = synthesize(sector_type, &stripped, &mut scratch);
                        edc_acc = edc_update(edc_acc, sector);
                        w.write_all(sector)?;
                        consumed += sector.len() as u64;
                        report(&mut progress, consumed, self.total_bytes_hint, &mut last_reported_mib);
                    }
                }
            }
        }

        let mut trailer = [0u8; 4];
        r.read_exact(&mut trailer)?;
        let expected = u32::from_le_bytes(trailer);
        if expected != edc_acc {
            return Err(EcmError::EdcMismatch { expected, actual: edc_acc });
        }

        if let Some(cb) = progress.as_deref_mut() {
            cb(consumed, self.total_bytes_hint);
        }

        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn report(progress: &mut Option<&mut Progress<'_>>, consumed: u64, total: u64, last_reported_mib: &mut u64) {
    if consumed >> 20 != *last_reported_mib {
        *last_reported_mib = consumed >> 20;
        if let Some(cb) = progress.as_deref_mut() {
            cb(consumed, total);
        }
    }
}

/// Decode `r` into `w` using default decoder settings. A convenience wrapper over
/// [`Decoder::decode`] for callers that don't need a size hint for progress reporting.
pub fn decode<R: Read, W: Write>(r: R, w: W, progress: Option<&mut Progress<'_>>) -> EcmResult<()> {
    Decoder::new().decode(r, w, progress)
}
