//! Encoder driver: scans the input through a bounded lookahead buffer, coalesces consecutive
//! sectors of the same recognized shape into runs, and writes the framed, stripped output.
use crate::edc::edc_update;
use crate::error::EcmResult;
use crate::framing::{self, MAGIC};
use crate::sector::classify::classify;
use crate::sector::SectorType;
use crate::Progress;
use std::io::{Read, Write};

/// Size of each chunk read from the input when the lookahead buffer runs low.
const REFILL_CHUNK: usize = 1_048_576;
/// Minimum lookahead the classifier needs to recognize a full Mode 1 sector.
const LOOKAHEAD: usize = 2352;

/// Per-sector-type run counts, returned by [`Encoder::encode`] for verbose reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    /// Bytes that did not form a recognized sector shape.
    pub literal: u64,
    /// Mode 1 sectors.
    pub mode1: u64,
    /// Mode 2 Form 1 sectors.
    pub mode2_form1: u64,
    /// Mode 2 Form 2 sectors.
    pub mode2_form2: u64,
}

impl RunTally {
    fn add(&mut self, sector_type: SectorType, count: u64) {
        match sector_type {
            SectorType::Literal => self.literal += count,
            SectorType::Mode1 => self.mode1 += count,
            SectorType::Mode2Form1 => self.mode2_form1 += count,
            SectorType::Mode2Form2 => self.mode2_form2 += count,
        }
    }
}

/// Drives the encode pipeline. Carries only the total-size hint used for progress reporting;
/// the lookahead buffer is local to a single [`encode`](Encoder::encode) call.
pub struct Encoder {
    total_bytes_hint: u64,
}

impl Encoder {
    /// A new encoder with no size hint; progress callbacks receive `0` as the total.
    pub fn new() -> Self {
        Encoder { total_bytes_hint: 0 }
    }

    /// A new encoder that reports `total_bytes` as the second argument to its progress
    /// callback (e.g. the input file's size, when known in advance).
    pub fn with_total_bytes(total_bytes: u64) -> Self {
        Encoder { total_bytes_hint: total_bytes }
    }

    /// Encode `r` into the ECM container format, writing it to `w`. Returns a tally of how
    /// many units of each sector shape were found.
    pub fn encode<R: Read, W: Write>(
        &mut self,
        mut r: R,
        mut w: W,
        mut progress: Option<&mut Progress<'_>>,
    ) -> EcmResult<RunTally> {
        w.write_all(MAGIC)?;
        log::debug!("encode: total size hint {} bytes", self.total_bytes_hint);

        let mut buf: Vec<u8> = Vec::new();
        let mut run_start = 0usize;
        let mut pos = 0usize;
        let mut eof = false;
        let mut current_type: Option<SectorType> = None;
        let mut current_count: u64 = 0;
        let mut input_edc: u32 = 0;
        let mut consumed: u64 = 0;
        let mut last_reported_mib: u64 = 0;
        let mut tally = RunTally::default();

        loop {
            while !eof && buf.len() - pos < LOOKAHEAD {
                let mut chunk = vec![0u8; REFILL_CHUNK];
                let n = read_fill(&mut r, &mut chunk)?;
                chunk.truncate(n);
                if n == 0 {
                    eof = true;
                }
                buf.extend_from_slice(&chunk);
            }

            if pos >= buf.len() {
                break;
            }

            let remaining = buf.len() - pos;
            let detected = if remaining < 2336 { SectorType::Literal } else { classify(&buf[pos..]) };

            if Some(detected) != current_type {
                if let Some(finished_type) = current_type {
                    log::trace!("flushing run: {finished_type:?} x {current_count}, offset {run_start}");
                    input_edc = flush_run(&buf[run_start..pos], finished_type, current_count, input_edc, &mut w, &mut tally)?;
                }
                current_type = Some(detected);
                current_count = 1;
                run_start = pos;
            } else {
                current_count += 1;
            }

            let stride = detected.native_stride();
            pos += stride;
            consumed += stride as u64;

            if consumed >> 20 != last_reported_mib {
                last_reported_mib = consumed >> 20;
                if let Some(cb) = progress.as_deref_mut() {
                    cb(consumed, self.total_bytes_hint);
                }
            }

            // An open run that never changes type (the common case for non-CD data, which is
            // one giant Literal run) would otherwise hold `run_start` at 0 forever and grow
            // `buf` to the size of the whole input. Force a flush once the open run's span
            // reaches a refill chunk so a long uniform run is written as several consecutive
            // records of the same type instead of one unbounded one.
            if pos - run_start >= REFILL_CHUNK {
                if let Some(finished_type) = current_type {
                    log::trace!("flushing run (buffer bound): {finished_type:?} x {current_count}, offset {run_start}");
                    input_edc = flush_run(&buf[run_start..pos], finished_type, current_count, input_edc, &mut w, &mut tally)?;
                }
                current_type = None;
                current_count = 0;
                run_start = pos;
            }

            if run_start > REFILL_CHUNK {
                buf.drain(0..run_start);
                pos -= run_start;
                run_start = 0;
            }
        }

        if let Some(finished_type) = current_type {
            input_edc = flush_run(&buf[run_start..pos], finished_type, current_count, input_edc, &mut w, &mut tally)?;
        }

        framing::write_terminator(&mut w)?;
        w.write_all(&input_edc.to_le_bytes())?;

        if let Some(cb) = progress.as_deref_mut() {
            cb(consumed, self.total_bytes_hint);
        }

        Ok(tally)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read up to `buf.len()` bytes, looping on short reads, and returning the number actually
/// read (less than `buf.len()` only at true end of input).
fn read_fill<R: Read>(r: &mut R, buf: &mut [u8]) -> EcmResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = r.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

fn flush_run<W: Write>(
    raw: &[u8],
    sector_type: SectorType,
    count: u64,
    edc_seed: u32,
    w: &mut W,
    tally: &mut RunTally,
) -> EcmResult<u32> {
    let edc = edc_update(edc_seed, raw);
    framing::write_header(w, sector_type, count as u32)?;
    tally.add(sector_type, count);

    match sector_type {
        SectorType::Literal => w.write_all(raw)?,
        SectorType::Mode1 => {
            for sector in raw.chunks_exact(2352) {
                w.write_all(&sector[12..15])?;
                w.write_all(&sector[16..16 + 2048])?;
            }
        }
        SectorType::Mode2Form1 => {
            for sector in raw.chunks_exact(2336) {
                w.write_all(&sector[0x04..0x808])?;
            }
        }
        SectorType::Mode2Form2 => {
            for sector in raw.chunks_exact(2336) {
                w.write_all(&sector[0x04..0x91C])?;
            }
        }
    }
    Ok(edc)
}

/// Encode `r` into `w` using default encoder settings. A convenience wrapper over
/// [`Encoder::encode`] for callers that don't need a size hint for progress reporting.
pub fn encode<R: Read, W: Write>(r: R, w: W, progress: Option<&mut Progress<'_>>) -> EcmResult<RunTally> {
    Encoder::new().encode(r, w, progress)
}
