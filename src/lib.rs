//! ECM (Error Code Modeler) CD-ROM sector container codec.
//!
//! CD-ROM sectors carry error detection and correction bytes (EDC, P-ECC, Q-ECC) that are a
//! pure function of the sector's user data. For the three recognized sector shapes (Mode 1,
//! Mode 2 Form 1, and Mode 2 Form 2) this crate recognizes the shape, strips the derivable
//! bytes, and reconstructs them bit-exactly on decode. Bytes that don't form a recognized
//! sector are stored verbatim.
//!
//! The [`encode`] and [`decode`] entry points drive the whole pipeline over a `Read`/`Write`
//! pair; the lower-level modules (sector classification, synthesis, the EDC/ECC engines, and
//! the container framing) are public for callers that want to operate on individual sectors.
pub mod decode;
pub mod ecc;
pub mod edc;
pub mod encode;
pub mod error;
pub mod framing;
pub mod lut;
pub mod sector;

pub use decode::{decode, Decoder};
pub use encode::{encode, Encoder, RunTally};
pub use error::{EcmError, EcmResult};

/// Callback invoked periodically with `(bytes_processed, total_bytes)` during encode/decode.
pub type Progress<'a> = dyn FnMut(u64, u64) + 'a;
